pub mod advertisement_images;
pub mod advertisements;
pub mod categories;
pub mod subscription_plans;
pub mod user_addresses;
pub mod user_favorites;
pub mod user_subscriptions;
pub mod users;

pub use advertisement_images as advertisement_image_entity;
pub use advertisements as advertisement_entity;
pub use categories as category_entity;
pub use subscription_plans as subscription_plan_entity;
pub use user_addresses as user_address_entity;
pub use user_favorites as user_favorite_entity;
pub use user_subscriptions as user_subscription_entity;
pub use users as user_entity;
