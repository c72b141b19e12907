pub mod admin;
pub mod advertisement;
pub mod ai;
pub mod auth;
pub mod category;
pub mod subscription;
pub mod user;

pub use admin::admin_config;
pub use advertisement::advertisement_config;
pub use ai::ai_config;
pub use auth::auth_config;
pub use category::category_config;
pub use subscription::subscription_config;
pub use user::user_config;
