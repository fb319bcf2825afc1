use std::str::FromStr;

use serde::Serialize;

use crate::{
    app_error::{AppError, AppResult},
    domain::entities::plan_type::PlanType,
};

/// Every plan bills in 30-day cycles.
pub const PLAN_DURATION_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanConfig {
    pub plan_type: PlanType,
    pub label: &'static str,
    /// Monthly price in centavos (BRL).
    pub price_cents: i64,
    /// Monthly price in reais, for display.
    pub price: f64,
    /// `None` means unlimited.
    pub max_vehicles: Option<u32>,
    pub max_photos: u32,
    pub can_create_agency: bool,
    pub duration_days: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleQuota {
    pub allowed: bool,
    pub limit: Option<u32>,
    pub used: u32,
}

/// Parse a plan identifier, accepting the legacy `basic` alias.
pub fn parse_plan_type(raw: &str) -> AppResult<PlanType> {
    PlanType::from_str(raw.trim()).map_err(|_| AppError::UnknownPlan(raw.to_string()))
}

pub fn plan_config(plan_type: PlanType) -> PlanConfig {
    let (label, price_cents, max_vehicles, max_photos, can_create_agency) = match plan_type {
        PlanType::Individual => ("Individual", 2990, Some(3), 10, false),
        PlanType::Basico => ("Básico", 4990, Some(10), 15, true),
        PlanType::Premium => ("Premium", 9990, Some(30), 20, true),
        PlanType::PremiumPlus => ("Premium Plus", 14990, Some(60), 30, true),
        PlanType::Ilimitado => ("Ilimitado", 29990, None, 40, true),
    };

    PlanConfig {
        plan_type,
        label,
        price_cents,
        price: price_cents as f64 / 100.0,
        max_vehicles,
        max_photos,
        can_create_agency,
        duration_days: PLAN_DURATION_DAYS,
    }
}

/// Look up a plan by its identifier.
pub fn get_plan_config(raw: &str) -> AppResult<PlanConfig> {
    parse_plan_type(raw).map(plan_config)
}

/// All plans in display order.
pub fn list_plans() -> Vec<PlanConfig> {
    PlanType::all().iter().copied().map(plan_config).collect()
}

/// Whether a user on `plan` may publish one more vehicle.
pub fn check_vehicle_quota(plan: Option<PlanType>, used: u32) -> VehicleQuota {
    match plan.map(plan_config) {
        Some(config) => VehicleQuota {
            allowed: config.max_vehicles.is_none_or(|max| used < max),
            limit: config.max_vehicles,
            used,
        },
        None => VehicleQuota {
            allowed: false,
            limit: Some(0),
            used,
        },
    }
}
