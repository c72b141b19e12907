use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "advertisement_images")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub advertisement_id: Uuid,
    pub image_url: String,
    pub sort_order: i32,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::advertisements::Entity",
        from = "Column::AdvertisementId",
        to = "super::advertisements::Column::Id"
    )]
    Advertisements,
}

impl Related<super::advertisements::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Advertisements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
