use crate::error::{AppError, AppResult};
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum AdStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "sold")]
    Sold,
    #[sea_orm(string_value = "expired")]
    Expired,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// Admin approval state, independent of the listing's own lifecycle status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum ModerationStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateAdvertisementRequest {
    pub category_id: Uuid,
    #[schema(example = "Zamioculca em vaso")]
    pub title: String,
    pub description: String,
    /// Price in centavos
    #[schema(example = 4990)]
    pub price_cents: i64,
    /// Image URLs; the first one becomes the primary image
    pub images: Vec<String>,
    pub ai_generated: Option<bool>,
}

impl CreateAdvertisementRequest {
    pub fn validate(&self) -> AppResult<()> {
        if self.title.trim().len() < 5 {
            return Err(AppError::ValidationError(
                "Título deve ter pelo menos 5 caracteres".to_string(),
            ));
        }
        if self.description.trim().len() < 20 {
            return Err(AppError::ValidationError(
                "Descrição deve ter pelo menos 20 caracteres".to_string(),
            ));
        }
        if self.price_cents <= 0 {
            return Err(AppError::ValidationError(
                "Preço deve ser positivo".to_string(),
            ));
        }
        if self.images.is_empty() {
            return Err(AppError::ValidationError(
                "Pelo menos uma imagem é obrigatória".to_string(),
            ));
        }
        Ok(())
    }
}

/// Caller-supplied listing filters. Everything is optional; the visibility
/// gate (active + approved + active seller) is applied unconditionally by the
/// query builder.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct AdvertisementFilters {
    pub category: Option<String>,
    pub search: Option<String>,
    /// Inclusive lower price bound, in centavos
    pub min_price: Option<i64>,
    /// Inclusive upper price bound, in centavos
    pub max_price: Option<i64>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub featured: Option<bool>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl AdvertisementFilters {
    /// Rejects out-of-range bounds before any query is built.
    pub fn validate(&self) -> AppResult<()> {
        if let Some(min) = self.min_price
            && min < 0
        {
            return Err(AppError::ValidationError(
                "Preço mínimo não pode ser negativo".to_string(),
            ));
        }
        if let Some(max) = self.max_price
            && max < 0
        {
            return Err(AppError::ValidationError(
                "Preço máximo não pode ser negativo".to_string(),
            ));
        }
        if let (Some(min), Some(max)) = (self.min_price, self.max_price)
            && min > max
        {
            return Err(AppError::ValidationError(
                "Preço mínimo não pode ser maior que o máximo".to_string(),
            ));
        }
        Ok(())
    }

    pub fn limit(&self) -> u64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> u64 {
        self.offset.unwrap_or(0)
    }
}

/// Flattened listing row: advertisement plus category name, seller identity
/// and primary location, with the single primary image when one exists.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdvertisementResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price_cents: i64,
    pub status: AdStatus,
    pub is_featured: bool,
    pub view_count: i32,
    pub favorite_count: i32,
    pub created_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
    pub category_name: String,
    pub seller_name: String,
    pub seller_username: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub primary_image: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateAdvertisementResponse {
    pub id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FavoriteResponse {
    pub favorited: bool,
    pub favorite_count: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ModerationAction {
    Approve,
    Reject,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ModerateAdvertisementRequest {
    pub action: ModerationAction,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ModerationQuery {
    pub moderation_status: Option<ModerationStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_request() -> CreateAdvertisementRequest {
        CreateAdvertisementRequest {
            category_id: Uuid::new_v4(),
            title: "Zamioculca em vaso".to_string(),
            description: "Planta saudável, cultivada em vaso de cerâmica.".to_string(),
            price_cents: 4990,
            images: vec!["/uploads/zamioculca.jpg".to_string()],
            ai_generated: None,
        }
    }

    #[test]
    fn test_create_request_validation() {
        assert!(base_request().validate().is_ok());

        let mut short_title = base_request();
        short_title.title = "Zami".to_string();
        assert!(short_title.validate().is_err());

        let mut short_description = base_request();
        short_description.description = "Planta bonita".to_string();
        assert!(short_description.validate().is_err());

        let mut free = base_request();
        free.price_cents = 0;
        assert!(free.validate().is_err());

        let mut no_images = base_request();
        no_images.images.clear();
        assert!(no_images.validate().is_err());
    }

    #[test]
    fn test_filter_price_bounds() {
        let ok = AdvertisementFilters {
            min_price: Some(1000),
            max_price: Some(5000),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());

        let negative = AdvertisementFilters {
            min_price: Some(-1),
            ..Default::default()
        };
        assert!(negative.validate().is_err());

        let inverted = AdvertisementFilters {
            min_price: Some(5000),
            max_price: Some(1000),
            ..Default::default()
        };
        assert!(inverted.validate().is_err());
    }

    #[test]
    fn test_filter_pagination_defaults() {
        let filters = AdvertisementFilters::default();
        assert_eq!(filters.limit(), 20);
        assert_eq!(filters.offset(), 0);

        let oversized = AdvertisementFilters {
            limit: Some(1000),
            offset: Some(40),
            ..Default::default()
        };
        assert_eq!(oversized.limit(), 100);
        assert_eq!(oversized.offset(), 40);
    }
}
