use crate::entities::subscription_plan_entity;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    #[sea_orm(string_value = "expired")]
    Expired,
    #[sea_orm(string_value = "pending")]
    Pending,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PlanResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Monthly price in centavos
    pub price_monthly_cents: i64,
    /// None means unlimited ads
    pub max_ads_per_month: Option<i32>,
    pub ai_descriptions_included: bool,
    pub featured_ads_included: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionResponse {
    pub id: Uuid,
    pub plan: PlanResponse,
    pub status: SubscriptionStatus,
    pub current_period_start: DateTime<Utc>,
    pub current_period_end: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpgradeSubscriptionRequest {
    pub plan_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CanCreateAdResponse {
    pub can_create: bool,
}

impl From<subscription_plan_entity::Model> for PlanResponse {
    fn from(plan: subscription_plan_entity::Model) -> Self {
        Self {
            id: plan.id,
            name: plan.name,
            description: plan.description,
            price_monthly_cents: plan.price_monthly_cents,
            max_ads_per_month: plan.max_ads_per_month,
            ai_descriptions_included: plan.ai_descriptions_included,
            featured_ads_included: plan.featured_ads_included,
        }
    }
}
