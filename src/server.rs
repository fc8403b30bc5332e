use axum::{
    http::{Method, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Extension, Router,
};
use hyper::Server;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::app::EnrichUseCase;
use crate::constants::SERVICE_NAME;
use crate::domain::CreatedEvent;

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Record-created notification. Enrichment runs in the background; the
/// caller only learns that the event was accepted.
async fn song_created(
    Extension(use_case): Extension<Arc<EnrichUseCase>>,
    Json(event): Json<CreatedEvent>,
) -> impl IntoResponse {
    let key = event.key.clone();
    tokio::spawn(async move {
        use_case.handle_created(&event.key, &event.record).await;
    });

    (
        StatusCode::ACCEPTED,
        Json(serde_json::json!({ "accepted": true, "key": key })),
    )
}

/// Run the pipeline inline and report the outcome. Failures are still 200s:
/// the outcome body says what happened.
async fn enrich_now(
    Extension(use_case): Extension<Arc<EnrichUseCase>>,
    Json(event): Json<CreatedEvent>,
) -> impl IntoResponse {
    Json(use_case.handle_created(&event.key, &event.record).await)
}

/// Create the HTTP router for trigger delivery
pub fn create_server(use_case: Arc<EnrichUseCase>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/triggers/songs", post(song_created))
        .route("/enrich", post(enrich_now))
        .layer(Extension(use_case))
        .layer(ServiceBuilder::new().layer(cors))
}

/// Start the HTTP server on the specified port
pub async fn start_server(
    use_case: Arc<EnrichUseCase>,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_server(use_case);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("Trigger receiver listening on http://localhost:{port}");
    info!("Health check: http://localhost:{port}/health");

    Server::bind(&addr).serve(app.into_make_service()).await?;

    Ok(())
}
