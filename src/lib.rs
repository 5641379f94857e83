pub mod app;
pub mod cli;
pub mod config;
pub mod filter;
pub mod render;
pub mod server;
pub mod source;

#[cfg(test)]
mod tests;
