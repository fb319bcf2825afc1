use std::str::FromStr;

use super::common::*;
use crate::{
    application::ports::payment_gateway::{CustomerRef, NewCustomer},
    domain::entities::billing_type::BillingType,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/customers", post(create_customer))
        .route("/pix", post(create_pix_charge))
        .route("/charges", post(create_charge))
        .route("/{payment_id}/status", get(get_payment_status))
}

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateCustomerPayload {
    name: Option<String>,
    cpf_cnpj: Option<String>,
    email: Option<String>,
    phone: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateCustomerResponse {
    customer_id: CustomerRef,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChargePayload {
    subscription_id: Option<String>,
    /// Falls back to the customer stored on the subscription.
    customer_id: Option<String>,
    billing_type: Option<String>,
    due_date: Option<String>,
}

fn customer_ref(raw: Option<String>) -> Option<CustomerRef> {
    raw.map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .map(CustomerRef)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/payments/customers
async fn create_customer(
    State(app_state): State<AppState>,
    AppJson(payload): AppJson<CreateCustomerPayload>,
) -> AppResult<impl IntoResponse> {
    let customer = NewCustomer {
        name: required_str("name", payload.name.as_deref())?.to_string(),
        cpf_cnpj: required_str("cpfCnpj", payload.cpf_cnpj.as_deref())?.to_string(),
        email: payload.email.filter(|e| !e.trim().is_empty()),
        phone: payload.phone.filter(|p| !p.trim().is_empty()),
    };

    let customer_id = app_state.payment_use_cases.create_customer(customer).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateCustomerResponse { customer_id }),
    ))
}

/// POST /api/payments/pix
/// Creates a PIX charge for one subscription cycle and returns the QR code.
async fn create_pix_charge(
    State(app_state): State<AppState>,
    AppJson(payload): AppJson<ChargePayload>,
) -> AppResult<impl IntoResponse> {
    let subscription_id = required_uuid("subscriptionId", payload.subscription_id.as_deref())?;
    let due_date = optional_date("dueDate", payload.due_date.as_deref())?;

    let pix = app_state
        .payment_use_cases
        .create_pix_charge_for_subscription(
            subscription_id,
            customer_ref(payload.customer_id),
            due_date,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(pix)))
}

/// POST /api/payments/charges
async fn create_charge(
    State(app_state): State<AppState>,
    AppJson(payload): AppJson<ChargePayload>,
) -> AppResult<impl IntoResponse> {
    let subscription_id = required_uuid("subscriptionId", payload.subscription_id.as_deref())?;
    let billing_type = BillingType::from_str(required_str(
        "billingType",
        payload.billing_type.as_deref(),
    )?)
    .map_err(|_| AppError::InvalidInput("billingType must be PIX, BOLETO or CREDIT_CARD".into()))?;
    let due_date = optional_date("dueDate", payload.due_date.as_deref())?;

    let charge = app_state
        .payment_use_cases
        .create_subscription_charge(
            subscription_id,
            customer_ref(payload.customer_id),
            billing_type,
            due_date,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(charge)))
}

/// GET /api/payments/{paymentId}/status
/// Polls the gateway and applies a settled payment to its subscription.
async fn get_payment_status(
    State(app_state): State<AppState>,
    Path(payment_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let result = app_state
        .payment_use_cases
        .sync_payment_status(payment_id.trim())
        .await?;
    Ok(Json(result))
}
