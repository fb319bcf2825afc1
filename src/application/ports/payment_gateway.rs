use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    app_error::AppResult,
    domain::entities::{billing_type::BillingType, payment_status::PaymentStatus},
};

// ============================================================================
// Port Types - Gateway-agnostic types
// ============================================================================

/// Customer identifier on the payment gateway side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerRef(pub String);

impl CustomerRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CustomerRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub name: String,
    /// Digits only.
    pub cpf_cnpj: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ChargeRequest {
    pub customer: CustomerRef,
    pub billing_type: BillingType,
    /// Amount in centavos.
    pub value_cents: i64,
    pub due_date: NaiveDate,
    pub description: Option<String>,
    /// Our subscription id, echoed back by status lookups and webhooks.
    pub external_reference: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Charge {
    pub payment_id: String,
    pub status: PaymentStatus,
    pub billing_type: BillingType,
    pub value_cents: i64,
    pub due_date: NaiveDate,
    /// Hosted payment page.
    pub invoice_url: Option<String>,
    /// Boleto PDF, only for boleto charges.
    pub bank_slip_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PixCharge {
    pub payment_id: String,
    /// Base64 PNG of the QR code.
    pub qr_code: String,
    /// "Copia e cola" payload.
    pub copy_paste: String,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusInfo {
    pub payment_id: String,
    pub status: PaymentStatus,
    pub external_reference: Option<String>,
}

// ============================================================================
// Payment Gateway Port
// ============================================================================

/// Payment gateway port. The shipped implementation talks to Asaas.
///
/// Implementations map transport failures, timeouts, 5xx and 429 responses to
/// `AppError::GatewayUnavailable`, and any other rejection to
/// `AppError::GatewayRejected` with the gateway's own message.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_customer(&self, customer: &NewCustomer) -> AppResult<CustomerRef>;

    async fn create_charge(&self, request: &ChargeRequest) -> AppResult<Charge>;

    /// Create a PIX charge and fetch its QR code.
    async fn create_pix_charge(
        &self,
        customer: &CustomerRef,
        value_cents: i64,
        due_date: NaiveDate,
        external_reference: Option<&str>,
    ) -> AppResult<PixCharge>;

    async fn get_payment_status(&self, payment_id: &str) -> AppResult<PaymentStatusInfo>;
}
