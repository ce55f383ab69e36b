#![forbid(unsafe_code)]

pub mod error;
pub mod render;
pub mod routes;
pub mod state;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use state::{AppState, SharedState};

/// Used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "subcheck_web=info,subcheck_core=info,tower_http=info";

pub fn app(state: SharedState) -> Router {
    let limit = state.config.max_upload_bytes;
    let api = Router::new()
        .route("/api/process", post(routes::process_api))
        .layer(CorsLayer::permissive());

    Router::new()
        .route("/", get(routes::index))
        .route("/process", post(routes::process_form))
        .route("/healthz", get(routes::healthz))
        .merge(api)
        .layer(DefaultBodyLimit::max(limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::EnvFilter;

    #[test]
    fn default_log_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_LOG_FILTER).is_ok());
    }
}
