use std::{str::FromStr, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use url::Url;

use super::{InfraError, http_client::try_build_client_with_timeout};
use crate::{
    app_error::{AppError, AppResult},
    application::ports::payment_gateway::{
        Charge, ChargeRequest, CustomerRef, NewCustomer, PaymentGateway, PaymentStatusInfo,
        PixCharge,
    },
    domain::entities::{billing_type::BillingType, payment_status::PaymentStatus},
};

const USER_AGENT: &str = concat!("agencias-billing/", env!("CARGO_PKG_VERSION"));

/// Asaas reports PIX expirations in Brasília time without an offset.
const BRT_OFFSET_SECS: i32 = 3 * 3600;

/// Asaas API v3 client.
#[derive(Clone)]
pub struct AsaasClient {
    client: Client,
    base_url: String,
    api_key: SecretString,
}

impl AsaasClient {
    pub fn new(base_url: Url, api_key: SecretString, timeout: Duration) -> Result<Self, InfraError> {
        let client = try_build_client_with_timeout(timeout).map_err(InfraError::HttpClient)?;
        Ok(Self {
            client,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let response = self
            .client
            .get(self.url(path))
            .header("access_token", self.api_key.expose_secret())
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .map_err(transport_error)?;
        self.handle_response(response).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> AppResult<T> {
        let response = self
            .client
            .post(self.url(path))
            .header("access_token", self.api_key.expose_secret())
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;
        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> AppResult<T> {
        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            tracing::error!(status = %status, body = %body, "Asaas API error");
            return Err(classify_error_response(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(body = %body, error = %e, "Failed to parse Asaas response");
            AppError::Internal(format!("Failed to parse Asaas response: {e}"))
        })
    }
}

fn transport_error(e: reqwest::Error) -> AppError {
    if e.is_timeout() {
        AppError::GatewayUnavailable("request to Asaas timed out".into())
    } else {
        AppError::GatewayUnavailable(format!("request to Asaas failed: {e}"))
    }
}

/// Map a non-2xx Asaas response to a retriable or non-retriable error.
pub fn classify_error_response(status: StatusCode, body: &str) -> AppError {
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        return AppError::GatewayUnavailable(format!("Asaas responded {status}"));
    }

    let description = serde_json::from_str::<AsaasErrorResponse>(body)
        .ok()
        .and_then(|r| r.errors.into_iter().next())
        .map(|e| e.description)
        .filter(|d| !d.trim().is_empty());

    AppError::GatewayRejected(description.unwrap_or_else(|| format!("Asaas responded {status}")))
}

fn cents_to_value(cents: i64) -> f64 {
    cents as f64 / 100.0
}

fn value_to_cents(value: f64) -> i64 {
    (value * 100.0).round() as i64
}

fn parse_pix_expiration(raw: &str) -> Option<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").ok()?;
    let brt = FixedOffset::west_opt(BRT_OFFSET_SECS)?;
    naive
        .and_local_timezone(brt)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

#[async_trait]
impl PaymentGateway for AsaasClient {
    async fn create_customer(&self, customer: &NewCustomer) -> AppResult<CustomerRef> {
        let body = AsaasCustomerRequest {
            name: &customer.name,
            cpf_cnpj: &customer.cpf_cnpj,
            email: customer.email.as_deref(),
            mobile_phone: customer.phone.as_deref(),
        };
        let created: AsaasCustomer = self.post("/customers", &body).await?;
        Ok(CustomerRef::new(created.id))
    }

    async fn create_charge(&self, request: &ChargeRequest) -> AppResult<Charge> {
        let body = AsaasPaymentRequest {
            customer: request.customer.as_str(),
            billing_type: request.billing_type,
            value: cents_to_value(request.value_cents),
            due_date: request.due_date,
            description: request.description.as_deref(),
            external_reference: request.external_reference.as_deref(),
        };
        let payment: AsaasPayment = self.post("/payments", &body).await?;

        Ok(Charge {
            status: PaymentStatus::from_gateway(&payment.status),
            billing_type: payment
                .billing_type
                .as_deref()
                .and_then(|b| BillingType::from_str(b).ok())
                .unwrap_or(request.billing_type),
            value_cents: payment
                .value
                .map(value_to_cents)
                .unwrap_or(request.value_cents),
            due_date: payment.due_date.unwrap_or(request.due_date),
            invoice_url: payment.invoice_url,
            bank_slip_url: payment.bank_slip_url,
            payment_id: payment.id,
        })
    }

    async fn create_pix_charge(
        &self,
        customer: &CustomerRef,
        value_cents: i64,
        due_date: NaiveDate,
        external_reference: Option<&str>,
    ) -> AppResult<PixCharge> {
        let charge = self
            .create_charge(&ChargeRequest {
                customer: customer.clone(),
                billing_type: BillingType::Pix,
                value_cents,
                due_date,
                description: None,
                external_reference: external_reference.map(str::to_string),
            })
            .await?;

        let qr: AsaasPixQrCode = self
            .get(&format!("/payments/{}/pixQrCode", charge.payment_id))
            .await?;

        Ok(PixCharge {
            payment_id: charge.payment_id,
            qr_code: qr.encoded_image,
            copy_paste: qr.payload,
            expires_at: qr.expiration_date.as_deref().and_then(parse_pix_expiration),
        })
    }

    async fn get_payment_status(&self, payment_id: &str) -> AppResult<PaymentStatusInfo> {
        if payment_id.is_empty() || !payment_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(AppError::InvalidInput("invalid payment id".into()));
        }
        let payment: AsaasPayment = self.get(&format!("/payments/{payment_id}")).await?;
        Ok(PaymentStatusInfo {
            payment_id: payment.id,
            status: PaymentStatus::from_gateway(&payment.status),
            external_reference: payment.external_reference,
        })
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AsaasCustomerRequest<'a> {
    name: &'a str,
    cpf_cnpj: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mobile_phone: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct AsaasCustomer {
    id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AsaasPaymentRequest<'a> {
    customer: &'a str,
    billing_type: BillingType,
    value: f64,
    due_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    external_reference: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AsaasPayment {
    id: String,
    status: String,
    /// Can be UNDEFINED when the payer picks the method.
    billing_type: Option<String>,
    value: Option<f64>,
    due_date: Option<NaiveDate>,
    invoice_url: Option<String>,
    bank_slip_url: Option<String>,
    external_reference: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AsaasPixQrCode {
    encoded_image: String,
    payload: String,
    expiration_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AsaasErrorResponse {
    errors: Vec<AsaasError>,
}

#[derive(Debug, Deserialize)]
struct AsaasError {
    description: String,
}
