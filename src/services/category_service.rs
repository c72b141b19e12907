use crate::entities::category_entity as categories;
use crate::error::AppResult;
use crate::models::*;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

#[derive(Clone)]
pub struct CategoryService {
    pool: DatabaseConnection,
}

impl CategoryService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// Active categories in display order.
    pub async fn get_categories(&self) -> AppResult<Vec<CategoryResponse>> {
        let rows = categories::Entity::find()
            .filter(categories::Column::IsActive.eq(true))
            .order_by_asc(categories::Column::SortOrder)
            .order_by_asc(categories::Column::Name)
            .all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(CategoryResponse::from).collect())
    }
}
