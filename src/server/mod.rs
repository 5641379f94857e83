mod handlers;
mod request_tracing;

use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use axum::middleware;
use axum::routing::get;
use axum::Router;
use chrono::NaiveDateTime;
use tokio::net::TcpListener;

use crate::render::{self, PageContext, ViewMode, ViewSettings};
use crate::source::{RecordSource, SourceError};

pub const DEFAULT_STYLESHEET: &str = include_str!("../../static/style.css");

#[derive(Clone, Debug)]
pub struct AppState {
    pub source: Arc<RecordSource>,
    pub settings: Arc<ViewSettings>,
    pub stylesheet: Option<Arc<PathBuf>>,
}

impl AppState {
    pub fn new(source: RecordSource, settings: ViewSettings, stylesheet: Option<PathBuf>) -> Self {
        Self {
            source: Arc::new(source),
            settings: Arc::new(settings),
            stylesheet: stylesheet.map(Arc::new),
        }
    }
}

/// Query parameters accepted by the roster page.
#[derive(Clone, Debug, Default)]
pub struct PageQuery {
    pub search: Option<String>,
    pub export: Option<String>,
}

impl PageQuery {
    /// Builds the query from raw parameters; a repeated key keeps its last value.
    pub fn from_params(mut params: HashMap<String, String>) -> Self {
        Self {
            search: params.remove("search"),
            export: params.remove("export"),
        }
    }

    pub fn mode(&self) -> ViewMode {
        ViewMode::from_export_param(self.export.as_deref())
    }
}

#[derive(Clone, Debug)]
pub struct RenderedPage {
    pub mode: ViewMode,
    pub loaded: usize,
    pub shown: usize,
    pub html: String,
}

/// Load, filter and render one page. Blocking: reads the source synchronously.
pub fn build_page(
    source: &RecordSource,
    query: &PageQuery,
    settings: &ViewSettings,
    now: NaiveDateTime,
) -> Result<RenderedPage, SourceError> {
    let mode = query.mode();
    let dataset = source.load()?;
    let search = query.search.as_deref().unwrap_or_default();
    let shown = dataset.filtered(Some(search));
    let ctx = PageContext {
        records: shown.records(),
        query: search,
        generated_at: now,
        settings,
    };
    Ok(RenderedPage {
        mode,
        loaded: dataset.len(),
        shown: shown.len(),
        html: render::render_page(mode, &ctx),
    })
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::roster_page))
        .route("/style.css", get(handlers::stylesheet))
        .fallback(handlers::not_found)
        .layer(middleware::from_fn(
            request_tracing::request_tracing_middleware,
        ))
        .with_state(state)
}

pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c; shutting down");
    }
    tracing::info!("shutdown signal received");
}
