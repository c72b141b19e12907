use crate::entities::user_entity;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    #[sea_orm(string_value = "buyer")]
    Buyer,
    #[sea_orm(string_value = "seller")]
    Seller,
    #[sea_orm(string_value = "both")]
    Both,
}

#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "suspended")]
    Suspended,
    #[sea_orm(string_value = "banned")]
    Banned,
    #[sea_orm(string_value = "pending")]
    Pending,
}

/// Identity resolved from a verified token, attached to the request by the
/// auth middleware. Handlers read this instead of re-parsing the credential.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub full_name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "maria@exemplo.com.br")]
    pub email: String,
    #[schema(example = "senha123")]
    pub password: String,
    #[schema(example = "maria_plantas")]
    pub username: String,
    #[schema(example = "Maria Silva")]
    pub full_name: String,
    #[schema(example = "+5511999990000")]
    pub phone: Option<String>,
    pub user_type: UserType,
    #[schema(example = "São Paulo")]
    pub city: String,
    #[schema(example = "SP")]
    pub state: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "maria@exemplo.com.br")]
    pub email: String,
    #[schema(example = "senha123")]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateUserStatusRequest {
    pub status: UserStatus,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub user_type: UserType,
    pub status: UserStatus,
    pub city: Option<String>,
    pub state: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: String,
    pub expires_in: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SellerStatsResponse {
    pub total_ads: i64,
    pub active_ads: i64,
    pub total_views: i64,
    pub total_favorites: i64,
    pub plan_name: String,
}

impl UserResponse {
    pub fn from_model(
        user: user_entity::Model,
        city: Option<String>,
        state: Option<String>,
    ) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            full_name: user.full_name,
            phone: user.phone,
            user_type: user.user_type,
            status: user.status,
            city,
            state,
            created_at: user.created_at,
        }
    }
}

impl From<&user_entity::Model> for AuthUser {
    fn from(user: &user_entity::Model) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            full_name: user.full_name.clone(),
        }
    }
}
