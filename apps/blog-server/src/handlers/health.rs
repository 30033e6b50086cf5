//! Liveness endpoint.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub datastore: &'static str,
    pub published_posts: Option<u64>,
    pub timestamp: String,
}

/// GET /health
///
/// Probes the datastore with a published-post count. A failing probe still
/// answers 200 with `status: "degraded"`.
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let (status, datastore, published_posts) = match state.published.count().await {
        Ok(count) => ("ok", "up", Some(count)),
        Err(e) => {
            tracing::warn!(error = %e, "Datastore health probe failed");
            ("degraded", "down", None)
        }
    };

    HttpResponse::Ok().json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        datastore,
        published_posts,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
