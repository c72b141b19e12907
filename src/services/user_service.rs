use crate::entities::{
    advertisement_entity as advertisements, user_address_entity as user_addresses,
    user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::SubscriptionService;
use sea_orm::sea_query::{Expr, ExprTrait};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect,
};
use uuid::Uuid;

#[derive(Clone)]
pub struct UserService {
    pool: DatabaseConnection,
    subscription_service: SubscriptionService,
}

impl UserService {
    pub fn new(pool: DatabaseConnection, subscription_service: SubscriptionService) -> Self {
        Self {
            pool,
            subscription_service,
        }
    }

    pub async fn get_user_profile(&self, user_id: Uuid) -> AppResult<UserResponse> {
        let user = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Usuário não encontrado".to_string()))?;

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

    /// Dashboard numbers for the seller panel: listing counts, accumulated
    /// views/favorites and the current plan name.
    pub async fn get_seller_stats(&self, user_id: Uuid) -> AppResult<SellerStatsResponse> {
        #[derive(Debug, sea_orm::FromQueryResult)]
        struct StatsRow {
            total_ads: i64,
            active_ads: i64,
            total_views: Option<i64>,
            total_favorites: Option<i64>,
        }

        let stats = advertisements::Entity::find()
            .filter(advertisements::Column::UserId.eq(user_id))
            .select_only()
            .column_as(Expr::val(1).count(), "total_ads")
            .column_as(
                Expr::cust("COUNT(*) FILTER (WHERE advertisements.status = 'active')"),
                "active_ads",
            )
            .column_as(Expr::col(advertisements::Column::ViewCount).sum(), "total_views")
            .column_as(
                Expr::col(advertisements::Column::FavoriteCount).sum(),
                "total_favorites",
            )
            .into_model::<StatsRow>()
            .one(&self.pool)
            .await?;

        let plan_name = self
            .subscription_service
            .get_active_subscription(user_id)
            .await?
            .map(|(_, plan)| plan.name)
            .unwrap_or_else(|| "Grátis".to_string());

        Ok(match stats {
            Some(row) => SellerStatsResponse {
                total_ads: row.total_ads,
                active_ads: row.active_ads,
                total_views: row.total_views.unwrap_or(0),
                total_favorites: row.total_favorites.unwrap_or(0),
                plan_name,
            },
            None => SellerStatsResponse {
                total_ads: 0,
                active_ads: 0,
                total_views: 0,
                total_favorites: 0,
                plan_name,
            },
        })
    }
}
