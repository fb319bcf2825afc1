use super::common::*;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_access))
        .route("/vehicles", get(get_vehicle_quota))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccessQuery {
    user_id: Option<String>,
    used: Option<String>,
}

/// GET /api/access?userId=
async fn get_access(
    State(app_state): State<AppState>,
    Query(query): Query<AccessQuery>,
) -> AppResult<impl IntoResponse> {
    let user_id = required_user_id("userId", query.user_id.as_deref())?;
    let decision = app_state.access_use_cases.check_user_access(&user_id).await;
    Ok(Json(decision))
}

/// GET /api/access/vehicles?userId=&used=
async fn get_vehicle_quota(
    State(app_state): State<AppState>,
    Query(query): Query<AccessQuery>,
) -> AppResult<impl IntoResponse> {
    let user_id = required_user_id("userId", query.user_id.as_deref())?;
    let used = match query.used.as_deref().map(str::trim) {
        None | Some("") => 0,
        Some(raw) => raw
            .parse::<u32>()
            .map_err(|_| AppError::InvalidInput("used must be a non-negative integer".into()))?,
    };

    let quota = app_state
        .access_use_cases
        .check_vehicle_quota(&user_id, used)
        .await;
    Ok(Json(quota))
}
