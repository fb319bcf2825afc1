pub mod access;
pub mod payment;
pub mod plan_catalog;
pub mod subscription;
pub mod trial;
