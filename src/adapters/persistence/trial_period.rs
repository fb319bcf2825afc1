use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::trial::TrialPeriodRepo,
    domain::entities::{plan_type::PlanType, trial_period::TrialPeriod, user_id::UserId},
};

const SELECT_COLS: &str = r#"
    id, user_id, plan_type, start_date, end_date, converted_to_paid, created_at, updated_at
"#;

#[async_trait]
impl TrialPeriodRepo for PostgresPersistence {
    async fn find_latest_by_user(&self, user_id: &UserId) -> AppResult<Option<TrialPeriod>> {
        sqlx::query_as::<_, TrialPeriod>(&format!(
            "SELECT {} FROM trial_periods WHERE user_id = $1 ORDER BY created_at DESC LIMIT 1",
            SELECT_COLS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)
    }

    async fn insert(
        &self,
        user_id: &UserId,
        plan_type: PlanType,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> AppResult<TrialPeriod> {
        sqlx::query_as::<_, TrialPeriod>(&format!(
            r#"
            INSERT INTO trial_periods (id, user_id, plan_type, start_date, end_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(plan_type)
        .bind(start_date)
        .bind(end_date)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)
    }

    async fn mark_converted(&self, user_id: &UserId) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE trial_periods
            SET converted_to_paid = TRUE, updated_at = NOW()
            WHERE user_id = $1 AND converted_to_paid = FALSE
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(result.rows_affected() > 0)
    }
}
