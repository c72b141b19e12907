use crate::entities::{
    advertisement_entity as advertisements, advertisement_image_entity as advertisement_images,
    category_entity as categories, user_address_entity as user_addresses, user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, ExprTrait, IntoCondition};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, sea_orm::FromQueryResult)]
struct ModerationRow {
    id: Uuid,
    title: String,
    description: String,
    price_cents: i64,
    status: AdStatus,
    is_featured: bool,
    view_count: i32,
    favorite_count: i32,
    created_at: DateTime<Utc>,
    published_at: Option<DateTime<Utc>>,
    category_name: String,
    seller_name: String,
    seller_username: String,
    city: Option<String>,
    state: Option<String>,
}

#[derive(Clone)]
pub struct AdminService {
    pool: DatabaseConnection,
}

impl AdminService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// Gate for every admin operation. Admin rights live on the user row,
    /// not in the token, so revocation takes effect immediately.
    pub async fn require_admin(&self, user_id: Uuid) -> AppResult<()> {
        let user = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Usuário não encontrado".to_string()))?;

        if !user.is_admin {
            return Err(AppError::Forbidden(
                "Acesso restrito a administradores".to_string(),
            ));
        }

        Ok(())
    }

    /// Moderation queue, any visibility state. Defaults to pending listings,
    /// oldest first so nothing starves at the back.
    pub async fn get_moderation_queue(
        &self,
        query: &ModerationQuery,
    ) -> AppResult<Vec<AdvertisementResponse>> {
        let moderation_status = query
            .moderation_status
            .clone()
            .unwrap_or(ModerationStatus::Pending);

        let rows = advertisements::Entity::find()
            .select_only()
            .columns([
                advertisements::Column::Id,
                advertisements::Column::Title,
                advertisements::Column::Description,
                advertisements::Column::PriceCents,
                advertisements::Column::Status,
                advertisements::Column::IsFeatured,
                advertisements::Column::ViewCount,
                advertisements::Column::FavoriteCount,
                advertisements::Column::CreatedAt,
                advertisements::Column::PublishedAt,
            ])
            .column_as(categories::Column::Name, "category_name")
            .column_as(users::Column::FullName, "seller_name")
            .column_as(users::Column::Username, "seller_username")
            .column_as(user_addresses::Column::City, "city")
            .column_as(user_addresses::Column::State, "state")
            .join(JoinType::InnerJoin, advertisements::Relation::Users.def())
            .join(JoinType::InnerJoin, advertisements::Relation::Categories.def())
            .join(
                JoinType::LeftJoin,
                users::Relation::UserAddresses.def().on_condition(|_left, right| {
                    Expr::col((right, user_addresses::Column::IsPrimary))
                        .eq(true)
                        .into_condition()
                }),
            )
            .filter(advertisements::Column::ModerationStatus.eq(moderation_status))
            .order_by_asc(advertisements::Column::CreatedAt)
            .into_model::<ModerationRow>()
            .all(&self.pool)
            .await?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut primary_images = self.primary_images_for(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| AdvertisementResponse {
                primary_image: primary_images.remove(&row.id),
                id: row.id,
                title: row.title,
                description: row.description,
                price_cents: row.price_cents,
                status: row.status,
                is_featured: row.is_featured,
                view_count: row.view_count,
                favorite_count: row.favorite_count,
                created_at: row.created_at,
                published_at: row.published_at,
                category_name: row.category_name,
                seller_name: row.seller_name,
                seller_username: row.seller_username,
                city: row.city,
                state: row.state,
            })
            .collect())
    }

    /// Approve keeps the listing's own status untouched; reject also pulls
    /// it out of circulation by marking the listing itself rejected.
    pub async fn moderate_advertisement(
        &self,
        advertisement_id: Uuid,
        request: ModerateAdvertisementRequest,
    ) -> AppResult<()> {
        let advertisement = advertisements::Entity::find_by_id(advertisement_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Anúncio não encontrado".to_string()))?;

        let mut model = advertisement.into_active_model();
        match request.action {
            ModerationAction::Approve => {
                model.moderation_status = Set(ModerationStatus::Approved);
            }
            ModerationAction::Reject => {
                model.moderation_status = Set(ModerationStatus::Rejected);
                model.status = Set(AdStatus::Rejected);
            }
        }
        model.update(&self.pool).await?;

        log::info!(
            "Advertisement {advertisement_id} moderated: {:?}",
            request.action
        );

        Ok(())
    }

    /// Suspend, ban or reinstate an account. Listings are untouched; the
    /// public query hides them while the seller is not active.
    pub async fn set_user_status(
        &self,
        user_id: Uuid,
        request: UpdateUserStatusRequest,
    ) -> AppResult<UserResponse> {
        let user = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Usuário não encontrado".to_string()))?;

        let mut model = user.into_active_model();
        model.status = Set(request.status.clone());
        model.updated_at = Set(Utc::now());
        let user = model.update(&self.pool).await?;

        log::info!("User {user_id} status set to {:?}", request.status);

        let address = user_addresses::Entity::find()
            .filter(user_addresses::Column::UserId.eq(user_id))
            .filter(user_addresses::Column::IsPrimary.eq(true))
            .one(&self.pool)
            .await?;

        let (city, state) = match address {
            Some(address) => (Some(address.city), Some(address.state)),
            None => (None, None),
        };

        Ok(UserResponse::from_model(user, city, state))
    }

    async fn primary_images_for(&self, ids: &[Uuid]) -> AppResult<HashMap<Uuid, String>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let images = advertisement_images::Entity::find()
            .filter(advertisement_images::Column::AdvertisementId.is_in(ids.iter().copied()))
            .filter(advertisement_images::Column::IsPrimary.eq(true))
            .all(&self.pool)
            .await?;

        Ok(images
            .into_iter()
            .map(|image| (image.advertisement_id, image.image_url))
            .collect())
    }
}
