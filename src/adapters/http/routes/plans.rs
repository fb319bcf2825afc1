use super::common::*;
use crate::application::use_cases::plan_catalog::{get_plan_config, list_plans};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_plans))
        .route("/{plan_type}", get(get_plan))
}

/// GET /api/plans
async fn get_plans() -> impl IntoResponse {
    Json(list_plans())
}

/// GET /api/plans/{planType}
async fn get_plan(Path(plan_type): Path<String>) -> AppResult<impl IntoResponse> {
    Ok(Json(get_plan_config(&plan_type)?))
}
