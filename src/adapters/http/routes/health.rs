use super::common::*;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// GET /api/health
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
