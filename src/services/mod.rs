pub mod admin_service;
pub mod advertisement_service;
pub mod ai_service;
pub mod auth_service;
pub mod category_service;
pub mod subscription_service;
pub mod user_service;

pub use admin_service::*;
pub use advertisement_service::*;
pub use ai_service::*;
pub use auth_service::*;
pub use category_service::*;
pub use subscription_service::*;
pub use user_service::*;
