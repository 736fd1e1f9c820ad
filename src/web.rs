use crate::{
    config::Config,
    extract::{ExtractError, Pipeline},
    record::ContentRecord,
    scrape,
};
use axum::{extract::State, response::IntoResponse, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tokio::signal;

struct SharedState {
    pipeline: Arc<Pipeline>,
}

pub fn router(pipeline: Arc<Pipeline>) -> Router {
    let shared_state = Arc::new(SharedState { pipeline });

    Router::new()
        .route("/api/extract", post(extract))
        .layer(
            tower_http::trace::TraceLayer::new_for_http()
                .make_span_with(
                    tower_http::trace::DefaultMakeSpan::new().level(tracing::Level::INFO),
                )
                .on_response(
                    tower_http::trace::DefaultOnResponse::new().level(tracing::Level::INFO),
                ),
        )
        .with_state(shared_state)
}

async fn start_app(config: Config) {
    let pipeline = Arc::new(Pipeline::new(&config));
    let app = router(pipeline);

    async fn shutdown_signal() {
        let ctrl_c = async {
            signal::ctrl_c()
                .await
                .expect("failed to install Ctrl+C handler");
        };

        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("failed to install signal handler")
                .recv()
                .await;
        };

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }

        log::warn!("shutting down");
        scrape::shutdown_browser();
    }

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .unwrap();
    log::info!("listening on {}", config.bind_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();
}

pub fn start_daemon(config: Config) {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(async { start_app(config).await });
}

// Make our own error that wraps `ExtractError`.
#[derive(Debug)]
struct HttpError(ExtractError);

// Tell axum how to convert `ExtractError` into a response.
impl IntoResponse for HttpError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.0 {
            ExtractError::InvalidUrl(_) => axum::http::StatusCode::BAD_REQUEST,
            ExtractError::UnsupportedPlatform(_) => axum::http::StatusCode::UNPROCESSABLE_ENTITY,
            // the pipeline absorbs tier errors; this arm is defensive
            _ => {
                log::error!("{self:?}");
                axum::http::StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (
            status,
            json!({
                "error": {
                    "kind": self.0.kind(),
                    "message": self.0.to_string(),
                }
            })
            .to_string(),
        )
            .into_response()
    }
}

impl From<ExtractError> for HttpError {
    fn from(err: ExtractError) -> Self {
        Self(err)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractRequest {
    pub url: String,
}

async fn extract(
    State(state): State<Arc<SharedState>>,
    Json(payload): Json<ExtractRequest>,
) -> Result<axum::Json<ContentRecord>, HttpError> {
    log::debug!("payload: {payload:?}");

    let pipeline = state.pipeline.clone();

    tokio::task::block_in_place(move || {
        pipeline
            .run(&payload.url)
            .map(Into::into)
            .map_err(Into::into)
    })
}
