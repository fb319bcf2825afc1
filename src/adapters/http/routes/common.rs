//! Shared imports and request parsing helpers for the route modules.

// Core framework - re-exported for use by sibling modules
pub use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
pub use serde::{Deserialize, Serialize};
pub use uuid::Uuid;

// App-level imports
pub use crate::adapters::http::{app_state::AppState, extractors::AppJson};
pub use crate::app_error::{AppError, AppResult};
pub use crate::domain::entities::user_id::UserId;

use chrono::NaiveDate;

/// Required user id. Any non-blank string issued by the auth provider is accepted.
pub(crate) fn required_user_id(field: &str, value: Option<&str>) -> AppResult<UserId> {
    UserId::parse(required_str(field, value)?)
        .ok_or_else(|| AppError::InvalidInput(format!("{field} is required")))
}

/// Parse a required UUID field, naming the field in the 400 response.
pub(crate) fn required_uuid(field: &str, value: Option<&str>) -> AppResult<Uuid> {
    let raw = required_str(field, value)?;
    Uuid::parse_str(raw).map_err(|_| AppError::InvalidInput(format!("{field} must be a UUID")))
}

/// Trimmed, non-empty string field.
pub(crate) fn required_str<'a>(field: &str, value: Option<&'a str>) -> AppResult<&'a str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::InvalidInput(format!("{field} is required")))
}

/// Optional `YYYY-MM-DD` date.
pub(crate) fn optional_date(field: &str, value: Option<&str>) -> AppResult<Option<NaiveDate>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| AppError::InvalidInput(format!("{field} must be YYYY-MM-DD"))),
    }
}
