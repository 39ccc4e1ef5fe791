//! HTTP front for the bulk mailer

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use log::{error, info};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::error::MailerError;
use crate::mailer::BulkMailer;
use crate::store::ContactRecord;

#[derive(Clone)]
pub struct AppState {
    pub mailer: Arc<BulkMailer>,
}

impl AppState {
    pub fn new(mailer: BulkMailer) -> Self {
        AppState {
            mailer: Arc::new(mailer),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SendEmailRequest {
    pub posts: Vec<ContactRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchFailure {
    pub success: bool,
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/send-email", post(send_email))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(addr: &str, state: AppState) -> Result<(), std::io::Error> {
    info!("🚀 Starting mail API on http://{}", addr);

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await
}

pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// The body is parsed by hand so a malformed request gets the same
/// `{success: false, error}` 500 as a batch setup failure.
pub async fn send_email(State(state): State<AppState>, body: Bytes) -> Response {
    let result = async {
        let request: SendEmailRequest = serde_json::from_slice(&body)?;
        info!("Send request received with {} contact(s)", request.posts.len());
        state.mailer.send_bulk(&request.posts).await
    }
    .await;

    match result {
        Ok(batch) => (StatusCode::OK, Json(batch)).into_response(),
        Err(e) => {
            error!("Send request failed: {}", e);
            failure(e)
        }
    }
}

fn failure(e: MailerError) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(BatchFailure {
            success: false,
            error: e.to_string(),
        }),
    )
        .into_response()
}
