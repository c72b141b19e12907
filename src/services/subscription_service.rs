use crate::entities::{
    advertisement_entity as advertisements, subscription_plan_entity as subscription_plans,
    user_subscription_entity as user_subscriptions,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use sea_orm::sea_query::{Expr, ExprTrait};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

/// Monthly listing limit assumed for users without any subscription row.
/// Matches the seeded Grátis plan.
const FREE_PLAN_AD_LIMIT: i32 = 3;

/// First instant of the calendar month containing `now`. Quota windows are
/// evaluated in UTC regardless of the seller's locale.
pub fn month_start_utc(now: DateTime<Utc>) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(now.year(), now.month(), 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .unwrap_or(now)
}

/// End of a subscription period opened at `start`: one calendar month later,
/// clamped to the last day when the target month is shorter.
pub fn period_end(start: DateTime<Utc>) -> DateTime<Utc> {
    start + Months::new(1)
}

#[derive(Clone)]
pub struct SubscriptionService {
    pool: DatabaseConnection,
}

impl SubscriptionService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// Current active, non-expired subscription with its plan. Multiple
    /// active rows are tolerated; the most recently created one wins.
    pub async fn get_active_subscription(
        &self,
        user_id: Uuid,
    ) -> AppResult<Option<(user_subscriptions::Model, subscription_plans::Model)>> {
        let found = user_subscriptions::Entity::find()
            .filter(user_subscriptions::Column::UserId.eq(user_id))
            .filter(user_subscriptions::Column::Status.eq(SubscriptionStatus::Active))
            .filter(user_subscriptions::Column::CurrentPeriodEnd.gt(Utc::now()))
            .order_by_desc(user_subscriptions::Column::CreatedAt)
            .find_also_related(subscription_plans::Entity)
            .one(&self.pool)
            .await?;

        match found {
            Some((subscription, Some(plan))) => Ok(Some((subscription, plan))),
            Some((subscription, None)) => Err(AppError::InternalError(format!(
                "Subscription {} references a missing plan",
                subscription.id
            ))),
            None => Ok(None),
        }
    }

    /// Quota gate for new listings. Never lets a store failure escape: when
    /// the lookup errors the policy denies, it does not allow.
    pub async fn can_create_advertisement(&self, user_id: Uuid) -> bool {
        match self.check_ad_quota(user_id).await {
            Ok(allowed) => allowed,
            Err(e) => {
                log::error!("Quota check failed for user {user_id}: {e:?}");
                false
            }
        }
    }

    async fn check_ad_quota(&self, user_id: Uuid) -> AppResult<bool> {
        let max_ads = match self.get_active_subscription(user_id).await? {
            Some((_, plan)) => plan.max_ads_per_month,
            // No subscription row at all: fall back to the free plan limit
            None => Some(FREE_PLAN_AD_LIMIT),
        };

        let Some(max_ads) = max_ads else {
            // null limit means unlimited
            return Ok(true);
        };

        #[derive(Debug, sea_orm::FromQueryResult)]
        struct CountRow {
            count: i64,
        }
        let created_this_month = advertisements::Entity::find()
            .filter(advertisements::Column::UserId.eq(user_id))
            .filter(advertisements::Column::CreatedAt.gte(month_start_utc(Utc::now())))
            .select_only()
            .column_as(Expr::val(1).count(), "count")
            .into_model::<CountRow>()
            .one(&self.pool)
            .await?
            .map(|r| r.count)
            .unwrap_or(0);

        Ok(created_this_month < max_ads as i64)
    }

    /// Whether the user's plan includes AI-generated descriptions. Users
    /// without a subscription sit on the free tier, which does not.
    pub async fn has_ai_descriptions(&self, user_id: Uuid) -> AppResult<bool> {
        Ok(self
            .get_active_subscription(user_id)
            .await?
            .map(|(_, plan)| plan.ai_descriptions_included)
            .unwrap_or(false))
    }

    pub async fn get_plans(&self) -> AppResult<Vec<PlanResponse>> {
        let plans = subscription_plans::Entity::find()
            .filter(subscription_plans::Column::IsActive.eq(true))
            .order_by_asc(subscription_plans::Column::PriceMonthlyCents)
            .all(&self.pool)
            .await?;

        Ok(plans.into_iter().map(PlanResponse::from).collect())
    }

    /// Switch the user onto a new plan. The previous active subscription is
    /// superseded (status -> cancelled), never mutated in place, and the new
    /// row starts a fresh monthly period.
    pub async fn upgrade_subscription(
        &self,
        user_id: Uuid,
        request: UpgradeSubscriptionRequest,
    ) -> AppResult<SubscriptionResponse> {
        let plan = subscription_plans::Entity::find_by_id(request.plan_id)
            .filter(subscription_plans::Column::IsActive.eq(true))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Plano não encontrado".to_string()))?;

        let now = Utc::now();
        let period_ends_at = period_end(now);

        let txn = self.pool.begin().await?;

        user_subscriptions::Entity::update_many()
            .col_expr(
                user_subscriptions::Column::Status,
                Expr::value(SubscriptionStatus::Cancelled),
            )
            .filter(user_subscriptions::Column::UserId.eq(user_id))
            .filter(user_subscriptions::Column::Status.eq(SubscriptionStatus::Active))
            .exec(&txn)
            .await?;

        let subscription = user_subscriptions::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            plan_id: Set(plan.id),
            status: Set(SubscriptionStatus::Active),
            current_period_start: Set(now),
            current_period_end: Set(period_ends_at),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        log::info!("User {user_id} switched to plan {}", plan.name);

        Ok(SubscriptionResponse {
            id: subscription.id,
            plan: PlanResponse::from(plan),
            status: subscription.status,
            current_period_start: subscription.current_period_start,
            current_period_end: subscription.current_period_end,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, Value};
    use std::collections::BTreeMap;

    type MockRow = BTreeMap<&'static str, Value>;

    fn count_row(count: i64) -> MockRow {
        BTreeMap::from([("count", Value::BigInt(Some(count)))])
    }

    // Combined row for the subscription-with-plan join; `A_` columns are the
    // subscription, `B_` columns the plan.
    fn active_subscription_row(max_ads_per_month: Option<i32>) -> MockRow {
        let now = Utc::now();
        let plan_id = Uuid::new_v4();
        BTreeMap::from([
            ("A_id", Uuid::new_v4().into()),
            ("A_user_id", Uuid::new_v4().into()),
            ("A_plan_id", plan_id.into()),
            ("A_status", "active".into()),
            ("A_current_period_start", now.into()),
            ("A_current_period_end", period_end(now).into()),
            ("A_created_at", now.into()),
            ("B_id", plan_id.into()),
            ("B_name", "Premium".into()),
            ("B_description", Value::String(None)),
            ("B_price_monthly_cents", 990i64.into()),
            ("B_max_ads_per_month", Value::Int(max_ads_per_month)),
            ("B_ai_descriptions_included", true.into()),
            ("B_featured_ads_included", true.into()),
            ("B_is_active", true.into()),
            ("B_created_at", now.into()),
        ])
    }

    #[tokio::test]
    async fn test_quota_free_fallback_allows_below_limit() {
        // No subscription row at all: the free limit of 3 applies
        let pool = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<MockRow>::new()])
            .append_query_results([vec![count_row(2)]])
            .into_connection();
        let service = SubscriptionService::new(pool);

        assert!(service.can_create_advertisement(Uuid::new_v4()).await);
    }

    #[tokio::test]
    async fn test_quota_free_fallback_denies_at_limit() {
        let pool = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<MockRow>::new()])
            .append_query_results([vec![count_row(3)]])
            .into_connection();
        let service = SubscriptionService::new(pool);

        assert!(!service.can_create_advertisement(Uuid::new_v4()).await);
    }

    #[tokio::test]
    async fn test_quota_plan_limit_boundary() {
        let pool = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![active_subscription_row(Some(5))]])
            .append_query_results([vec![count_row(4)]])
            .append_query_results([vec![active_subscription_row(Some(5))]])
            .append_query_results([vec![count_row(5)]])
            .into_connection();
        let service = SubscriptionService::new(pool);

        assert!(service.can_create_advertisement(Uuid::new_v4()).await);
        assert!(!service.can_create_advertisement(Uuid::new_v4()).await);
    }

    #[tokio::test]
    async fn test_quota_null_limit_is_unlimited() {
        // No count query is mocked: the policy must short-circuit before
        // counting anything
        let pool = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![active_subscription_row(None)]])
            .into_connection();
        let service = SubscriptionService::new(pool);

        assert!(service.can_create_advertisement(Uuid::new_v4()).await);
    }

    #[tokio::test]
    async fn test_quota_lookup_failure_denies() {
        let pool = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Custom("conexão perdida".to_string())])
            .into_connection();
        let service = SubscriptionService::new(pool);

        assert!(!service.can_create_advertisement(Uuid::new_v4()).await);
    }

    #[test]
    fn test_period_end_clamps_to_shorter_month() {
        let jan_31 = Utc.with_ymd_and_hms(2025, 1, 31, 10, 0, 0).unwrap();
        assert_eq!(
            period_end(jan_31),
            Utc.with_ymd_and_hms(2025, 2, 28, 10, 0, 0).unwrap()
        );

        let mid_month = Utc.with_ymd_and_hms(2025, 4, 10, 8, 30, 0).unwrap();
        assert_eq!(
            period_end(mid_month),
            Utc.with_ymd_and_hms(2025, 5, 10, 8, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_month_start_utc() {
        let mid_month = Utc.with_ymd_and_hms(2025, 8, 17, 15, 30, 45).unwrap();
        let start = month_start_utc(mid_month);
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 8, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_month_start_utc_on_boundary() {
        let first = Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap();
        assert_eq!(month_start_utc(first), first);

        // An ad created one second before midnight on the 31st belongs to
        // the previous month's window.
        let last_second = Utc.with_ymd_and_hms(2025, 8, 31, 23, 59, 59).unwrap();
        assert!(last_second >= month_start_utc(last_second));
        assert!(month_start_utc(first) > last_second);
    }
}
