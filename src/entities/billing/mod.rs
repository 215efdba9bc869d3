pub mod organization_entity;
pub mod plan_entity;
pub mod subscription_entity;
pub mod transaction_entity;
