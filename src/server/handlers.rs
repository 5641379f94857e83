use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use chrono::Local;
use tokio::task;
use tracing::{debug, error, warn};

use super::{build_page, AppState, PageQuery, DEFAULT_STYLESHEET};

fn plain_text(status: StatusCode, body: &'static str) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response()
}

pub(super) async fn roster_page(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let query = PageQuery::from_params(params);
    let source = Arc::clone(&state.source);
    let settings = Arc::clone(&state.settings);
    let now = Local::now().naive_local();

    let outcome = task::spawn_blocking(move || build_page(&source, &query, &settings, now)).await;
    match outcome {
        Ok(Ok(page)) => {
            debug!(
                mode = ?page.mode,
                loaded = page.loaded,
                shown = page.shown,
                "rendered roster page"
            );
            Html(page.html).into_response()
        }
        Ok(Err(e)) => {
            error!(error = %e, source = %state.source.describe(), "failed to load roster");
            plain_text(StatusCode::INTERNAL_SERVER_ERROR, e.public_message())
        }
        Err(e) => {
            error!(error = %e, "render task failed");
            plain_text(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
    }
}

pub(super) async fn stylesheet(State(state): State<AppState>) -> Response {
    let css = match state.stylesheet.as_deref() {
        Some(path) => match tokio::fs::read_to_string(path).await {
            Ok(css) => css,
            Err(e) => {
                warn!(error = %e, path = %path.display(), "stylesheet unavailable");
                return plain_text(StatusCode::NOT_FOUND, "stylesheet not found");
            }
        },
        None => DEFAULT_STYLESHEET.to_string(),
    };
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        css,
    )
        .into_response()
}

pub(super) async fn not_found() -> Response {
    plain_text(StatusCode::NOT_FOUND, "not found")
}
