use crate::models::{AdStatus, ModerationStatus};
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

// The table also carries a generated `search_vector` column used for
// full-text filtering; it is never read through the entity.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "advertisements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub category_id: Uuid,
    pub title: String,
    pub description: String,
    pub price_cents: i64,
    pub status: AdStatus,
    pub moderation_status: ModerationStatus,
    pub is_featured: bool,
    pub ai_description_used: bool,
    pub view_count: i32,
    pub favorite_count: i32,
    pub created_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id"
    )]
    Categories,
    #[sea_orm(has_many = "super::advertisement_images::Entity")]
    AdvertisementImages,
    #[sea_orm(has_many = "super::user_favorites::Entity")]
    UserFavorites,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl Related<super::advertisement_images::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AdvertisementImages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
