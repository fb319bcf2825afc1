use super::common::*;
use crate::application::use_cases::payment::PaymentWebhookEvent;

const ASAAS_TOKEN_HEADER: &str = "asaas-access-token";

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/asaas", post(asaas_webhook))
}

/// POST /api/webhooks/asaas
/// Authenticated by the shared token header. The body is only parsed after the
/// token checks out.
async fn asaas_webhook(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> AppResult<impl IntoResponse> {
    let token = headers
        .get(ASAAS_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok());
    app_state.payment_use_cases.verify_webhook_token(token)?;

    let event: PaymentWebhookEvent = serde_json::from_str(&body)
        .map_err(|e| AppError::InvalidInput(format!("invalid webhook payload: {e}")))?;

    let outcome = app_state.payment_use_cases.handle_webhook(event).await?;
    tracing::info!(outcome = ?outcome, "Asaas webhook processed");

    Ok(Json(serde_json::json!({ "received": true })))
}
