use super::common::*;
use crate::{
    application::use_cases::plan_catalog::{PlanConfig, list_plans, parse_plan_type},
    domain::entities::{
        access_decision::AccessDecision, subscription::Subscription, trial_period::TrialPeriod,
    },
};

pub(crate) fn router() -> Router<AppState> {
    Router::new().route(
        "/",
        get(get_subscription_overview)
            .post(create_subscription)
            .put(update_subscription_status),
    )
}

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserQuery {
    user_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubscriptionOverview {
    subscription: Option<Subscription>,
    trial_period: Option<TrialPeriod>,
    access: AccessDecision,
    plans: Vec<PlanConfig>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateSubscriptionPayload {
    user_id: Option<String>,
    plan_type: Option<String>,
    asaas_customer_id: Option<String>,
    #[serde(default)]
    start_trial: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
enum CreatedResponse {
    TrialPeriod(TrialPeriod),
    Subscription(Subscription),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateStatusPayload {
    subscription_id: Option<String>,
    status: Option<String>,
    payment_id: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/subscriptions?userId=
/// Current subscription, trial, access decision and the plan catalog in one call.
async fn get_subscription_overview(
    State(app_state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> AppResult<impl IntoResponse> {
    let user_id = required_user_id("userId", query.user_id.as_deref())?;

    let subscription = app_state
        .subscription_use_cases
        .get_current_subscription(&user_id)
        .await?;
    let trial = app_state.trial_use_cases.check_trial(&user_id).await?;
    let access = app_state.access_use_cases.check_user_access(&user_id).await;

    Ok(Json(SubscriptionOverview {
        subscription,
        trial_period: trial.trial_period,
        access,
        plans: list_plans(),
    }))
}

/// POST /api/subscriptions
/// Starts the free trial when `startTrial` is set, otherwise opens a paid subscription.
async fn create_subscription(
    State(app_state): State<AppState>,
    AppJson(payload): AppJson<CreateSubscriptionPayload>,
) -> AppResult<impl IntoResponse> {
    let user_id = required_user_id("userId", payload.user_id.as_deref())?;
    let plan_type = parse_plan_type(required_str("planType", payload.plan_type.as_deref())?)?;

    let created = if payload.start_trial {
        let trial = app_state
            .trial_use_cases
            .create_trial(&user_id, plan_type)
            .await?;
        CreatedResponse::TrialPeriod(trial)
    } else {
        let customer = payload
            .asaas_customer_id
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        let subscription = app_state
            .subscription_use_cases
            .create_subscription(&user_id, plan_type, customer)
            .await?;
        CreatedResponse::Subscription(subscription)
    };

    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/subscriptions
async fn update_subscription_status(
    State(app_state): State<AppState>,
    AppJson(payload): AppJson<UpdateStatusPayload>,
) -> AppResult<impl IntoResponse> {
    let subscription_id = required_uuid("subscriptionId", payload.subscription_id.as_deref())?;
    let status = required_str("status", payload.status.as_deref())?;
    let payment_id = payload
        .payment_id
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty());

    let updated = app_state
        .subscription_use_cases
        .update_subscription_status(subscription_id, status, payment_id)
        .await?;
    if !updated {
        return Err(AppError::Database(
            "subscription status could not be persisted".into(),
        ));
    }

    Ok(Json(serde_json::json!({ "success": true })))
}
