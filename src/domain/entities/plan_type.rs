use serde::{Deserialize, Serialize};
use strum::EnumString;

/// Plan tier a dealership or private seller can subscribe to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, EnumString,
)]
#[sqlx(type_name = "plan_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive)]
pub enum PlanType {
    #[strum(serialize = "basico", serialize = "basic")]
    Basico,
    #[strum(serialize = "premium")]
    Premium,
    #[strum(serialize = "premium_plus")]
    PremiumPlus,
    #[strum(serialize = "individual")]
    Individual,
    #[strum(serialize = "ilimitado")]
    Ilimitado,
}

impl PlanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanType::Basico => "basico",
            PlanType::Premium => "premium",
            PlanType::PremiumPlus => "premium_plus",
            PlanType::Individual => "individual",
            PlanType::Ilimitado => "ilimitado",
        }
    }

    /// All plans in display order (cheapest first).
    pub fn all() -> &'static [PlanType] {
        &[
            PlanType::Individual,
            PlanType::Basico,
            PlanType::Premium,
            PlanType::PremiumPlus,
            PlanType::Ilimitado,
        ]
    }
}

impl std::fmt::Display for PlanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
