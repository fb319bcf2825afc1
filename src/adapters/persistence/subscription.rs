use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::subscription::{NewSubscription, StatusChange, SubscriptionRepo},
    domain::entities::{
        subscription::Subscription, subscription_status::SubscriptionStatus, user_id::UserId,
    },
};

fn row_to_subscription(row: &sqlx::postgres::PgRow) -> Subscription {
    Subscription {
        id: row.get("id"),
        user_id: row.get("user_id"),
        plan_type: row.get("plan_type"),
        plan_value: row.get("plan_value"),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        status: row.get("status"),
        last_payment_id: row.get("last_payment_id"),
        grace_period_ends_at: row.get("grace_period_ends_at"),
        external_customer_id: row.get("external_customer_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

const SELECT_COLS: &str = r#"
    id, user_id, plan_type, plan_value, start_date, end_date, status,
    last_payment_id, grace_period_ends_at, external_customer_id,
    created_at, updated_at
"#;

/// Upper bound on rows handled by one sweep pass.
const SWEEP_BATCH_SIZE: i64 = 500;

#[async_trait]
impl SubscriptionRepo for PostgresPersistence {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Subscription>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM user_subscriptions WHERE id = $1",
            SELECT_COLS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_subscription))
    }

    async fn find_active_by_user(&self, user_id: &UserId) -> AppResult<Option<Subscription>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM user_subscriptions WHERE user_id = $1 AND status = $2 LIMIT 1",
            SELECT_COLS
        ))
        .bind(user_id)
        .bind(SubscriptionStatus::Active)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_subscription))
    }

    async fn find_current_by_user(&self, user_id: &UserId) -> AppResult<Option<Subscription>> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {} FROM user_subscriptions
            WHERE user_id = $1 AND status <> $2
            ORDER BY created_at DESC
            LIMIT 1
            "#,
            SELECT_COLS
        ))
        .bind(user_id)
        .bind(SubscriptionStatus::Cancelled)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_subscription))
    }

    async fn insert(&self, new: &NewSubscription) -> AppResult<Subscription> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO user_subscriptions
                (id, user_id, plan_type, plan_value, start_date, end_date, status, external_customer_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(Uuid::new_v4())
        .bind(&new.user_id)
        .bind(new.plan_type)
        .bind(new.plan_value)
        .bind(new.start_date)
        .bind(new.end_date)
        .bind(SubscriptionStatus::Active)
        .bind(new.external_customer_id.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row_to_subscription(&row))
    }

    async fn apply_status_change(
        &self,
        id: Uuid,
        change: &StatusChange,
    ) -> AppResult<Option<Subscription>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE user_subscriptions
            SET status = $3,
                end_date = $4,
                grace_period_ends_at = $5,
                last_payment_id = $6,
                updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(id)
        .bind(change.expected_status)
        .bind(change.status)
        .bind(change.end_date)
        .bind(change.grace_period_ends_at)
        .bind(change.last_payment_id.as_deref())
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_subscription))
    }

    async fn list_due_for_renewal(&self, now: DateTime<Utc>) -> AppResult<Vec<Subscription>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM user_subscriptions
            WHERE status = $1 AND end_date <= $2
            ORDER BY end_date
            LIMIT $3
            "#,
            SELECT_COLS
        ))
        .bind(SubscriptionStatus::Active)
        .bind(now)
        .bind(SWEEP_BATCH_SIZE)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.iter().map(row_to_subscription).collect())
    }

    async fn list_grace_expired(&self, now: DateTime<Utc>) -> AppResult<Vec<Subscription>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM user_subscriptions
            WHERE status = $1 AND grace_period_ends_at IS NOT NULL AND grace_period_ends_at <= $2
            ORDER BY grace_period_ends_at
            LIMIT $3
            "#,
            SELECT_COLS
        ))
        .bind(SubscriptionStatus::PendingPayment)
        .bind(now)
        .bind(SWEEP_BATCH_SIZE)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.iter().map(row_to_subscription).collect())
    }
}
