use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Too many requests. Please slow down.")]
    RateLimited,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown plan: {0}")]
    UnknownPlan(String),

    #[error("Invalid subscription status: {0}")]
    InvalidStatus(String),

    #[error("User already has an active subscription")]
    DuplicateActiveSubscription,

    #[error("Trial period already used")]
    TrialAlreadyUsed,

    #[error("Cannot transition subscription from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Not found")]
    NotFound,

    #[error("Payment gateway unavailable: {0}")]
    GatewayUnavailable(String),

    #[error("Payment gateway rejected the request: {0}")]
    GatewayRejected(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Clone, Copy, Debug)]
pub enum ErrorCode {
    DatabaseError,
    RateLimited,
    InvalidInput,
    UnknownPlan,
    InvalidStatus,
    DuplicateActiveSubscription,
    TrialAlreadyUsed,
    InvalidTransition,
    NotFound,
    GatewayUnavailable,
    GatewayRejected,
    Unauthorized,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::RateLimited => "RATE_LIMITED",
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::UnknownPlan => "UNKNOWN_PLAN",
            ErrorCode::InvalidStatus => "INVALID_STATUS",
            ErrorCode::DuplicateActiveSubscription => "DUPLICATE_ACTIVE_SUBSCRIPTION",
            ErrorCode::TrialAlreadyUsed => "TRIAL_ALREADY_USED",
            ErrorCode::InvalidTransition => "INVALID_TRANSITION",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::GatewayUnavailable => "GATEWAY_UNAVAILABLE",
            ErrorCode::GatewayRejected => "GATEWAY_REJECTED",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Database(_) => ErrorCode::DatabaseError,
            AppError::RateLimited => ErrorCode::RateLimited,
            AppError::InvalidInput(_) => ErrorCode::InvalidInput,
            AppError::UnknownPlan(_) => ErrorCode::UnknownPlan,
            AppError::InvalidStatus(_) => ErrorCode::InvalidStatus,
            AppError::DuplicateActiveSubscription => ErrorCode::DuplicateActiveSubscription,
            AppError::TrialAlreadyUsed => ErrorCode::TrialAlreadyUsed,
            AppError::InvalidTransition { .. } => ErrorCode::InvalidTransition,
            AppError::NotFound => ErrorCode::NotFound,
            AppError::GatewayUnavailable(_) => ErrorCode::GatewayUnavailable,
            AppError::GatewayRejected(_) => ErrorCode::GatewayRejected,
            AppError::Unauthorized => ErrorCode::Unauthorized,
            AppError::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Transient gateway failures the caller may retry.
    pub fn is_retriable(&self) -> bool {
        matches!(self, AppError::GatewayUnavailable(_))
    }
}

pub type AppResult<T> = Result<T, AppError>;
