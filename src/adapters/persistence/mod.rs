use sqlx::PgPool;

use crate::app_error::AppError;

pub mod subscription;
pub mod trial_period;

/// Unique constraint on `trial_periods.user_id`.
pub const TRIAL_PER_USER_CONSTRAINT: &str = "trial_periods_user_id_key";
/// Partial unique index on `user_subscriptions(user_id) WHERE status = 'active'`.
pub const ONE_ACTIVE_SUBSCRIPTION_CONSTRAINT: &str = "user_subscriptions_one_active_per_user";

#[derive(Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    pub fn new(pool: PgPool) -> Self {
        PostgresPersistence { pool }
    }
}

/// Map a violated constraint to the domain conflict it stands for.
fn constraint_error(constraint: &str) -> Option<AppError> {
    match constraint {
        TRIAL_PER_USER_CONSTRAINT => Some(AppError::TrialAlreadyUsed),
        ONE_ACTIVE_SUBSCRIPTION_CONSTRAINT => Some(AppError::DuplicateActiveSubscription),
        _ => None,
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => AppError::NotFound,
            sqlx::Error::Database(db_err) => {
                if let Some(mapped) = db_err.constraint().and_then(constraint_error) {
                    return mapped;
                }

                let msg = db_err.message();
                // PostgreSQL unique violation
                if msg.contains("duplicate key") || msg.contains("unique constraint") {
                    AppError::InvalidInput("A record with this value already exists".into())
                }
                // PostgreSQL check violation
                else if msg.contains("violates check constraint") {
                    AppError::InvalidInput("Value violates a data constraint".into())
                } else {
                    // Log the actual error for debugging, but don't expose details
                    tracing::error!(error = ?err, "Database error");
                    AppError::Database("Database operation failed".into())
                }
            }
            _ => {
                tracing::error!(error = ?err, "Database error");
                AppError::Database("Database operation failed".into())
            }
        }
    }
}
