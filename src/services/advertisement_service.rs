use crate::entities::{
    advertisement_entity as advertisements, advertisement_image_entity as advertisement_images,
    category_entity as categories, user_address_entity as user_addresses,
    user_entity as users, user_favorite_entity as user_favorites,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::SubscriptionService;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, IntoCondition};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use std::collections::HashMap;
use uuid::Uuid;

/// Flattened join row produced by the listing query; the primary image is
/// resolved in a second query.
#[derive(Debug, sea_orm::FromQueryResult)]
struct AdvertisementRow {
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

impl AdvertisementRow {
    fn into_response(self, primary_image: Option<String>) -> AdvertisementResponse {
        AdvertisementResponse {
            id: self.id,
            title: self.title,
            description: self.description,
            price_cents: self.price_cents,
            status: self.status,
            is_featured: self.is_featured,
            view_count: self.view_count,
            favorite_count: self.favorite_count,
            created_at: self.created_at,
            published_at: self.published_at,
            category_name: self.category_name,
            seller_name: self.seller_name,
            seller_username: self.seller_username,
            city: self.city,
            state: self.state,
            primary_image,
        }
    }
}

#[derive(Clone)]
pub struct AdvertisementService {
    pool: DatabaseConnection,
    subscription_service: SubscriptionService,
}

impl AdvertisementService {
    pub fn new(pool: DatabaseConnection, subscription_service: SubscriptionService) -> Self {
        Self {
            pool,
            subscription_service,
        }
    }

    /// Creates a listing with its images in one transaction. The first image
    /// becomes the primary one. The listing goes live immediately but stays
    /// out of public results until a moderator approves it.
    ///
    /// The quota check and the insert are not atomic; concurrent creates by
    /// the same user can slip past the limit by one. Accepted: listing
    /// creation is not a contended resource.
    pub async fn create_advertisement(
        &self,
        user_id: Uuid,
        request: CreateAdvertisementRequest,
    ) -> AppResult<CreateAdvertisementResponse> {
        request.validate()?;

        let category = categories::Entity::find_by_id(request.category_id)
            .filter(categories::Column::IsActive.eq(true))
            .one(&self.pool)
            .await?;
        if category.is_none() {
            return Err(AppError::NotFound("Categoria não encontrada".to_string()));
        }

        if !self
            .subscription_service
            .can_create_advertisement(user_id)
            .await
        {
            return Err(AppError::QuotaExceeded(
                "Limite de anúncios atingido. Faça upgrade do seu plano.".to_string(),
            ));
        }

        let now = Utc::now();
        let txn = self.pool.begin().await?;

        let advertisement = advertisements::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            category_id: Set(request.category_id),
            title: Set(request.title.trim().to_string()),
            description: Set(request.description.trim().to_string()),
            price_cents: Set(request.price_cents),
            status: Set(AdStatus::Active),
            moderation_status: Set(ModerationStatus::Pending),
            is_featured: Set(false),
            ai_description_used: Set(request.ai_generated.unwrap_or(false)),
            view_count: Set(0),
            favorite_count: Set(0),
            created_at: Set(now),
            published_at: Set(Some(now)),
        }
        .insert(&txn)
        .await?;

        for (index, image_url) in request.images.iter().enumerate() {
            advertisement_images::ActiveModel {
                id: Set(Uuid::new_v4()),
                advertisement_id: Set(advertisement.id),
                image_url: Set(image_url.clone()),
                sort_order: Set(index as i32),
                is_primary: Set(index == 0),
                created_at: Set(now),
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;

        log::info!("User {user_id} created advertisement {}", advertisement.id);

        Ok(CreateAdvertisementResponse {
            id: advertisement.id,
        })
    }

    /// Public listing query. Regardless of the caller's filters, only rows
    /// that are active, approved by moderation and owned by an active seller
    /// ever come back.
    pub async fn find_advertisements(
        &self,
        filters: &AdvertisementFilters,
    ) -> AppResult<Vec<AdvertisementResponse>> {
        filters.validate()?;

        let rows = self
            .filtered_listings_query(filters)
            .limit(filters.limit())
            .offset(filters.offset())
            .into_model::<AdvertisementRow>()
            .all(&self.pool)
            .await?;

        self.attach_primary_images(rows).await
    }

    /// Caller filters and the fixed ordering, applied on top of the
    /// visibility gate.
    fn filtered_listings_query(
        &self,
        filters: &AdvertisementFilters,
    ) -> sea_orm::Select<advertisements::Entity> {
        use sea_orm::sea_query::extension::postgres::PgExpr;

        let mut query = self.visible_listings_query();

        if let Some(category) = &filters.category {
            query = query.filter(categories::Column::Slug.eq(category.clone()));
        }

        if let Some(search) = &filters.search {
            // Full-text relevance over the generated tsvector, not substring
            query = query.filter(Expr::cust_with_values(
                "advertisements.search_vector @@ plainto_tsquery('portuguese', $1)",
                [search.clone()],
            ));
        }

        if let Some(min_price) = filters.min_price {
            query = query.filter(advertisements::Column::PriceCents.gte(min_price));
        }

        if let Some(max_price) = filters.max_price {
            query = query.filter(advertisements::Column::PriceCents.lte(max_price));
        }

        if let Some(city) = &filters.city {
            query = query.filter(
                Expr::col((user_addresses::Entity, user_addresses::Column::City))
                    .ilike(format!("%{city}%")),
            );
        }

        if let Some(state) = &filters.state {
            query = query.filter(user_addresses::Column::State.eq(state.clone()));
        }

        if filters.featured == Some(true) {
            query = query.filter(advertisements::Column::IsFeatured.eq(true));
            query = query.order_by_desc(advertisements::Column::CreatedAt);
        } else {
            // Fixed two-key sort: featured listings first, then recency
            query = query
                .order_by_desc(advertisements::Column::IsFeatured)
                .order_by_desc(advertisements::Column::CreatedAt);
        }

        query
    }

    /// Single listing through the same visibility gate as the public search.
    pub async fn get_advertisement(&self, id: Uuid) -> AppResult<AdvertisementResponse> {
        let row = self
            .visible_listings_query()
            .filter(advertisements::Column::Id.eq(id))
            .into_model::<AdvertisementRow>()
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Anúncio não encontrado".to_string()))?;

        let mut responses = self.attach_primary_images(vec![row]).await?;
        Ok(responses.remove(0))
    }

    pub async fn record_view(&self, id: Uuid) -> AppResult<()> {
        use sea_orm::sea_query::ExprTrait;

        advertisements::Entity::update_many()
            .col_expr(
                advertisements::Column::ViewCount,
                Expr::col(advertisements::Column::ViewCount).add(1),
            )
            .filter(advertisements::Column::Id.eq(id))
            .exec(&self.pool)
            .await?;

        Ok(())
    }

    /// All of the seller's own listings, any status, newest first.
    pub async fn get_user_advertisements(
        &self,
        user_id: Uuid,
    ) -> AppResult<Vec<AdvertisementResponse>> {
        let seller = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Usuário não encontrado".to_string()))?;

        #[derive(Debug, sea_orm::FromQueryResult)]
        struct OwnAdRow {
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
        }

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
            .join(JoinType::InnerJoin, advertisements::Relation::Categories.def())
            .filter(advertisements::Column::UserId.eq(user_id))
            .order_by_desc(advertisements::Column::CreatedAt)
            .into_model::<OwnAdRow>()
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
                seller_name: seller.full_name.clone(),
                seller_username: seller.username.clone(),
                city: None,
                state: None,
            })
            .collect())
    }

    /// Adds or removes the caller's favorite and keeps the denormalized
    /// counter in step, in one transaction.
    pub async fn toggle_favorite(
        &self,
        user_id: Uuid,
        advertisement_id: Uuid,
    ) -> AppResult<FavoriteResponse> {
        if advertisements::Entity::find_by_id(advertisement_id)
            .one(&self.pool)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound("Anúncio não encontrado".to_string()));
        }

        let existing = user_favorites::Entity::find()
            .filter(user_favorites::Column::UserId.eq(user_id))
            .filter(user_favorites::Column::AdvertisementId.eq(advertisement_id))
            .one(&self.pool)
            .await?;

        let txn = self.pool.begin().await?;

        let favorited = match existing {
            Some(favorite) => {
                user_favorites::Entity::delete_by_id(favorite.id)
                    .exec(&txn)
                    .await?;
                advertisements::Entity::update_many()
                    .col_expr(
                        advertisements::Column::FavoriteCount,
                        Expr::col(advertisements::Column::FavoriteCount).sub(1),
                    )
                    .filter(advertisements::Column::Id.eq(advertisement_id))
                    .filter(advertisements::Column::FavoriteCount.gt(0))
                    .exec(&txn)
                    .await?;
                false
            }
            None => {
                user_favorites::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    user_id: Set(user_id),
                    advertisement_id: Set(advertisement_id),
                    created_at: Set(Utc::now()),
                }
                .insert(&txn)
                .await?;
                advertisements::Entity::update_many()
                    .col_expr(
                        advertisements::Column::FavoriteCount,
                        Expr::col(advertisements::Column::FavoriteCount).add(1),
                    )
                    .filter(advertisements::Column::Id.eq(advertisement_id))
                    .exec(&txn)
                    .await?;
                true
            }
        };

        txn.commit().await?;

        // Read the counter back after commit; a concurrent toggle may have
        // moved it while this one was in flight.
        let favorite_count = advertisements::Entity::find_by_id(advertisement_id)
            .one(&self.pool)
            .await?
            .map(|advertisement| advertisement.favorite_count)
            .unwrap_or(0);

        Ok(FavoriteResponse {
            favorited,
            favorite_count,
        })
    }

    /// Base select for publicly visible listings: the flattened join plus
    /// the unconditional status gate.
    fn visible_listings_query(&self) -> sea_orm::Select<advertisements::Entity> {
        advertisements::Entity::find()
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
            .filter(advertisements::Column::Status.eq(AdStatus::Active))
            .filter(advertisements::Column::ModerationStatus.eq(ModerationStatus::Approved))
            .filter(users::Column::Status.eq(UserStatus::Active))
    }

    async fn attach_primary_images(
        &self,
        rows: Vec<AdvertisementRow>,
    ) -> AppResult<Vec<AdvertisementResponse>> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut primary_images = self.primary_images_for(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let image = primary_images.remove(&row.id);
                row.into_response(image)
            })
            .collect())
    }

    /// Exactly one primary image per listing when any image exists, none
    /// otherwise.
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

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::sea_query::PostgresQueryBuilder;
    use sea_orm::{DatabaseBackend, MockDatabase, QueryTrait};

    fn service() -> AdvertisementService {
        let pool = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let subscription_service = SubscriptionService::new(pool.clone());
        AdvertisementService::new(pool, subscription_service)
    }

    fn listing_sql(filters: &AdvertisementFilters) -> String {
        service()
            .filtered_listings_query(filters)
            .as_query()
            .to_string(PostgresQueryBuilder)
    }

    #[test]
    fn test_visibility_gate_applied_regardless_of_filters() {
        let filter_sets = [
            AdvertisementFilters::default(),
            AdvertisementFilters {
                featured: Some(true),
                ..Default::default()
            },
            AdvertisementFilters {
                category: Some("vasos".to_string()),
                search: Some("samambaia".to_string()),
                min_price: Some(1000),
                max_price: Some(9900),
                city: Some("Curitiba".to_string()),
                state: Some("PR".to_string()),
                ..Default::default()
            },
        ];

        for filters in &filter_sets {
            let sql = listing_sql(filters);
            assert!(
                sql.contains(r#""advertisements"."status" = 'active'"#),
                "missing listing status gate in: {sql}"
            );
            assert!(
                sql.contains(r#""advertisements"."moderation_status" = 'approved'"#),
                "missing moderation gate in: {sql}"
            );
            assert!(
                sql.contains(r#""users"."status" = 'active'"#),
                "missing seller status gate in: {sql}"
            );
        }
    }

    #[test]
    fn test_featured_first_ordering_by_default() {
        let sql = listing_sql(&AdvertisementFilters::default());
        assert!(
            sql.contains(
                r#"ORDER BY "advertisements"."is_featured" DESC, "advertisements"."created_at" DESC"#
            ),
            "unexpected ordering in: {sql}"
        );
    }

    #[test]
    fn test_featured_filter_narrows_and_sorts_by_recency() {
        let sql = listing_sql(&AdvertisementFilters {
            featured: Some(true),
            ..Default::default()
        });
        assert!(sql.contains(r#""advertisements"."is_featured" = TRUE"#));
        assert!(sql.contains(r#"ORDER BY "advertisements"."created_at" DESC"#));
        assert!(!sql.contains(r#""is_featured" DESC"#));
    }
}
