//! PostgreSQL adapter for ProductRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use super::unique_violation;
use crate::domain::entities::{NewProduct, Product, ProductId, ProductUpdate};
use crate::domain::ports::ProductRepository;
use crate::entity::products;
use crate::error::DomainError;

/// PostgreSQL implementation of ProductRepository
pub struct PostgresProductRepository {
    db: DatabaseConnection,
}

impl PostgresProductRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// `%term%` with LIKE wildcards in the term escaped
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait]
impl ProductRepository for PostgresProductRepository {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, DomainError> {
        let result = products::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.map(|m| m.into()))
    }

    async fn find_by_material(&self, material: &str) -> Result<Option<Product>, DomainError> {
        let result = products::Entity::find()
            .filter(products::Column::Material.eq(material.trim().to_uppercase()))
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.map(|m| m.into()))
    }

    async fn search(&self, query: Option<&str>, limit: u64) -> Result<Vec<Product>, DomainError> {
        let mut select = products::Entity::find()
            .filter(products::Column::Active.eq(true))
            .order_by_asc(products::Column::Material)
            .limit(limit);

        if let Some(term) = query.map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = like_pattern(term);
            select = select.filter(Expr::cust_with_values(
                "(material ILIKE $1 OR description ILIKE $2)",
                [pattern.clone(), pattern],
            ));
        }

        let results = select
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn create(&self, product: &NewProduct) -> Result<Product, DomainError> {
        let now = Utc::now().fixed_offset();

        let model = products::ActiveModel {
            id: Set(Uuid::new_v4()),
            material: Set(product.material.trim().to_uppercase()),
            description: Set(product.description.trim().to_string()),
            unit: Set(product.unit.trim().to_uppercase()),
            list_price: Set(product.list_price),
            currency: Set(product.currency.trim().to_uppercase()),
            configurable: Set(product.configurable),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| unique_violation(e, format!("product {}", product.material)))?;

        Ok(result.into())
    }

    async fn update(
        &self,
        id: &ProductId,
        update: &ProductUpdate,
    ) -> Result<Product, DomainError> {
        let existing = products::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?
            .ok_or_else(|| DomainError::NotFound(format!("Product {}", id)))?;

        let mut model: products::ActiveModel = existing.into();
        if let Some(description) = &update.description {
            model.description = Set(description.trim().to_string());
        }
        if let Some(unit) = &update.unit {
            model.unit = Set(unit.trim().to_uppercase());
        }
        if let Some(price) = update.list_price {
            model.list_price = Set(price);
        }
        if let Some(currency) = &update.currency {
            model.currency = Set(currency.trim().to_uppercase());
        }
        if let Some(configurable) = update.configurable {
            model.configurable = Set(configurable);
        }
        if let Some(active) = update.active {
            model.active = Set(active);
        }
        model.updated_at = Set(Utc::now().fixed_offset());

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.into())
    }

    async fn delete(&self, id: &ProductId) -> Result<bool, DomainError> {
        let result = products::Entity::delete_by_id(id.0)
            .exec(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}

impl From<products::Model> for Product {
    fn from(model: products::Model) -> Self {
        Product {
            id: ProductId(model.id),
            material: model.material,
            description: model.description,
            unit: model.unit,
            list_price: model.list_price,
            currency: model.currency,
            configurable: model.configurable,
            active: model.active,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}
