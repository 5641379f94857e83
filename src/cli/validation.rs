use std::net::SocketAddr;

use crate::cli::args::CliArgs;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if let Some(data) = args.data.as_deref() {
        if data.trim().is_empty() {
            return Err("invalid --data, expected a file path".to_string());
        }
    }
    if let Some(raw) = args.bind.as_deref() {
        raw.trim()
            .parse::<SocketAddr>()
            .map_err(|e| format!("invalid --bind '{raw}': {e}"))?;
    }
    if args.output.is_none() {
        if args.search.is_some() {
            return Err("--search only applies together with --output".to_string());
        }
        if args.export {
            return Err("--export only applies together with --output".to_string());
        }
    }
    Ok(())
}
