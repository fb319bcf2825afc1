pub mod access_decision;
pub mod billing_type;
pub mod payment_status;
pub mod plan_type;
pub mod subscription;
pub mod subscription_status;
pub mod time_window;
pub mod trial_period;
pub mod user_id;
