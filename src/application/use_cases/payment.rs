use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::{
        ports::payment_gateway::{
            Charge, ChargeRequest, CustomerRef, NewCustomer, PaymentGateway, PixCharge,
        },
        use_cases::subscription::SubscriptionUseCases,
        validators::{is_valid_email, normalize_cpf_cnpj},
    },
    domain::entities::{
        billing_type::BillingType, payment_status::PaymentStatus, subscription::Subscription,
        subscription_status::SubscriptionStatus,
    },
};

/// Webhook body posted by Asaas for payment events.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentWebhookEvent {
    pub event: String,
    pub payment: Option<WebhookPayment>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayment {
    pub id: String,
    pub status: Option<String>,
    pub external_reference: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookOutcome {
    PaymentConfirmed,
    MarkedOverdue,
    Ignored,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSyncResult {
    pub payment_id: String,
    pub status: PaymentStatus,
    pub subscription_updated: bool,
}

pub struct PaymentUseCases {
    gateway: Arc<dyn PaymentGateway>,
    subscriptions: Arc<SubscriptionUseCases>,
    webhook_token: SecretString,
    pix_due_days: i64,
}

impl PaymentUseCases {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        subscriptions: Arc<SubscriptionUseCases>,
        webhook_token: SecretString,
        pix_due_days: i64,
    ) -> Self {
        Self {
            gateway,
            subscriptions,
            webhook_token,
            pix_due_days,
        }
    }

    /// Register a payer with the gateway.
    #[instrument(skip(self, customer), fields(name = %customer.name))]
    pub async fn create_customer(&self, customer: NewCustomer) -> AppResult<CustomerRef> {
        let name = customer.name.trim();
        if name.is_empty() {
            return Err(AppError::InvalidInput("name is required".into()));
        }
        let cpf_cnpj = normalize_cpf_cnpj(&customer.cpf_cnpj)
            .ok_or_else(|| AppError::InvalidInput("cpfCnpj must have 11 or 14 digits".into()))?;
        if let Some(email) = customer.email.as_deref()
            && !is_valid_email(email)
        {
            return Err(AppError::InvalidInput("email is invalid".into()));
        }

        let customer = NewCustomer {
            name: name.to_string(),
            cpf_cnpj,
            email: customer.email.map(|e| e.trim().to_string()),
            phone: customer.phone,
        };
        let customer_ref = self.gateway.create_customer(&customer).await?;
        tracing::info!(customer_id = %customer_ref, "Gateway customer created");
        Ok(customer_ref)
    }

    /// Charge one cycle of a subscription through any billing type.
    #[instrument(skip(self))]
    pub async fn create_subscription_charge(
        &self,
        subscription_id: Uuid,
        customer: Option<CustomerRef>,
        billing_type: BillingType,
        due_date: Option<NaiveDate>,
    ) -> AppResult<Charge> {
        let (subscription, customer) = self.chargeable(subscription_id, customer).await?;
        let request = ChargeRequest {
            customer,
            billing_type,
            value_cents: subscription.plan_value,
            due_date: self.resolve_due_date(due_date)?,
            description: Some(charge_description(&subscription)),
            external_reference: Some(subscription.id.to_string()),
        };

        let charge = self.gateway.create_charge(&request).await?;
        tracing::info!(
            subscription_id = %subscription_id,
            payment_id = %charge.payment_id,
            billing_type = %billing_type,
            "Charge created"
        );
        Ok(charge)
    }

    /// Charge one cycle of a subscription via PIX and return the QR code.
    #[instrument(skip(self))]
    pub async fn create_pix_charge_for_subscription(
        &self,
        subscription_id: Uuid,
        customer: Option<CustomerRef>,
        due_date: Option<NaiveDate>,
    ) -> AppResult<PixCharge> {
        let (subscription, customer) = self.chargeable(subscription_id, customer).await?;
        let due_date = self.resolve_due_date(due_date)?;
        let reference = subscription.id.to_string();

        let pix = self
            .gateway
            .create_pix_charge(&customer, subscription.plan_value, due_date, Some(&reference))
            .await?;
        tracing::info!(
            subscription_id = %subscription_id,
            payment_id = %pix.payment_id,
            "PIX charge created"
        );
        Ok(pix)
    }

    /// Poll the gateway and apply a settled payment to its subscription.
    #[instrument(skip(self))]
    pub async fn sync_payment_status(&self, payment_id: &str) -> AppResult<PaymentSyncResult> {
        let info = self.gateway.get_payment_status(payment_id).await?;

        let mut subscription_updated = false;
        if info.status.is_paid()
            && let Some(subscription_id) = parse_reference(info.external_reference.as_deref())
        {
            subscription_updated = self
                .subscriptions
                .confirm_payment(subscription_id, &info.payment_id)
                .await?;
        }

        Ok(PaymentSyncResult {
            payment_id: info.payment_id,
            status: info.status,
            subscription_updated,
        })
    }

    /// Check the `asaas-access-token` header against the configured token.
    pub fn verify_webhook_token(&self, provided: Option<&str>) -> AppResult<()> {
        let expected = self.webhook_token.expose_secret();
        match provided {
            Some(token) if !expected.is_empty() && constant_time_eq(token, expected) => Ok(()),
            _ => Err(AppError::Unauthorized),
        }
    }

    /// Apply a gateway payment event.
    ///
    /// Events that do not map to a known subscription, or that the state machine
    /// refuses, are acknowledged so the gateway stops retrying them.
    #[instrument(skip(self, event), fields(event = %event.event))]
    pub async fn handle_webhook(&self, event: PaymentWebhookEvent) -> AppResult<WebhookOutcome> {
        let Some(payment) = event.payment else {
            tracing::debug!("Webhook without payment, ignoring");
            return Ok(WebhookOutcome::Ignored);
        };
        let Some(subscription_id) = parse_reference(payment.external_reference.as_deref()) else {
            tracing::info!(payment_id = %payment.id, "Webhook payment has no subscription reference");
            return Ok(WebhookOutcome::Ignored);
        };

        let (result, outcome) = match event.event.as_str() {
            "PAYMENT_CONFIRMED" | "PAYMENT_RECEIVED" => (
                self.subscriptions
                    .confirm_payment(subscription_id, &payment.id)
                    .await,
                WebhookOutcome::PaymentConfirmed,
            ),
            "PAYMENT_OVERDUE" => (
                self.subscriptions.mark_overdue(subscription_id).await,
                WebhookOutcome::MarkedOverdue,
            ),
            other => {
                tracing::debug!(event = other, payment_id = %payment.id, "Unhandled webhook event");
                return Ok(WebhookOutcome::Ignored);
            }
        };

        match result {
            Ok(true) => Ok(outcome),
            // Storage failed: let the gateway retry.
            Ok(false) => Err(AppError::Database(
                "failed to persist webhook payment event".into(),
            )),
            Err(e @ (AppError::NotFound | AppError::InvalidTransition { .. })) => {
                tracing::warn!(
                    subscription_id = %subscription_id,
                    payment_id = %payment.id,
                    error = %e,
                    "Webhook event not applicable, acknowledging"
                );
                Ok(WebhookOutcome::Ignored)
            }
            Err(e) => Err(e),
        }
    }

    async fn chargeable(
        &self,
        subscription_id: Uuid,
        customer: Option<CustomerRef>,
    ) -> AppResult<(Subscription, CustomerRef)> {
        let subscription = self.subscriptions.get_subscription(subscription_id).await?;
        if subscription.status == SubscriptionStatus::Cancelled {
            return Err(AppError::InvalidInput(
                "subscription is cancelled".into(),
            ));
        }

        let customer = customer
            .filter(|c| !c.as_str().trim().is_empty())
            .or_else(|| subscription.external_customer_id.clone().map(CustomerRef))
            .ok_or_else(|| AppError::InvalidInput("customerId is required".into()))?;

        Ok((subscription, customer))
    }

    fn resolve_due_date(&self, due_date: Option<NaiveDate>) -> AppResult<NaiveDate> {
        let today = Utc::now().date_naive();
        match due_date {
            Some(date) if date < today => Err(AppError::InvalidInput(
                "dueDate cannot be in the past".into(),
            )),
            Some(date) => Ok(date),
            None => Ok(today + Duration::days(self.pix_due_days)),
        }
    }
}

fn parse_reference(reference: Option<&str>) -> Option<Uuid> {
    reference.and_then(|r| Uuid::parse_str(r.trim()).ok())
}

fn charge_description(subscription: &Subscription) -> String {
    format!("Assinatura plano {}", subscription.plan_type)
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        diff |= x ^ y;
    }
    diff == 0
}
