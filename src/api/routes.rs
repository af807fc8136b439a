use axum::{
    Router,
    extract::{Json, State, rejection::JsonRejection},
    response::IntoResponse,
    routing::{get, post},
};
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};

use crate::AppState;
use crate::api::models::{HealthResponse, TrackRequest, TrackResponse};
use crate::api::response;
use crate::browser::BrowserLauncher;
use crate::error::AppError;

pub fn create_router<L: BrowserLauncher>(app_state: AppState<L>) -> Router {
    Router::new()
        .route("/api/rankings", post(track_handler::<L>))
        .route("/api/health", get(health_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

async fn health_handler() -> impl IntoResponse {
    response::success(HealthResponse { status: "ok" })
}

async fn track_handler<L: BrowserLauncher>(
    State(state): State<AppState<L>>,
    payload: std::result::Result<Json<TrackRequest>, JsonRejection>,
) -> impl IntoResponse {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            let err = AppError::InvalidInput(rejection.body_text());
            tracing::info!("rejected rank request: {err}");
            return response::error(&err);
        }
    };

    tracing::info!(
        domain = %req.domain,
        keywords = req.keywords.len(),
        "processing rank request"
    );
    let start_time = std::time::Instant::now();

    let query = match req.into_query(&state.config.tracker.default_search_host) {
        Ok(query) => query,
        Err(err) => {
            tracing::info!("rejected rank request: {err}");
            return response::error(&err);
        }
    };

    // Past the deadline the tracker stops navigating and reports the
    // remaining keywords as cancelled.
    let cancel = CancellationToken::new();
    let deadline = {
        let cancel = cancel.clone();
        let timeout = state.config.request_timeout;
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            cancel.cancel();
        })
    };

    let result = state.tracker.track_keywords_until(&query, &cancel).await;
    deadline.abort();

    let elapsed = start_time.elapsed();
    match result {
        Ok(results) => {
            if cancel.is_cancelled() {
                tracing::warn!("rank request hit its deadline after {elapsed:?}");
            } else {
                tracing::info!("rank request took {elapsed:?}");
            }
            response::success(TrackResponse {
                domain: query.domain,
                location: query.search_engine_host,
                results,
            })
        }
        Err(err) => {
            tracing::error!("rank request failed after {elapsed:?}: {err}");
            response::error(&err)
        }
    }
}
