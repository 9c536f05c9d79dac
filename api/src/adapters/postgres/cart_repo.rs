//! PostgreSQL adapter for CartRepository

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::unique_violation;
use crate::domain::entities::{
    Cart, CartId, CartItem, CartItemId, Characteristic, CompanyId, NewCartItem, UserId,
};
use crate::domain::ports::CartRepository;
use crate::entity::{cart_items, carts};
use crate::error::DomainError;

/// PostgreSQL implementation of CartRepository
pub struct PostgresCartRepository {
    db: DatabaseConnection,
}

impl PostgresCartRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn touch(&self, cart_id: &CartId) -> Result<(), DomainError> {
        carts::ActiveModel {
            id: Set(cart_id.0),
            updated_at: Set(Utc::now().fixed_offset()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(())
    }

    async fn find_item(
        &self,
        cart_id: &CartId,
        item_id: &CartItemId,
    ) -> Result<Option<cart_items::Model>, DomainError> {
        cart_items::Entity::find_by_id(item_id.0)
            .filter(cart_items::Column::CartId.eq(cart_id.0))
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))
    }
}

#[async_trait]
impl CartRepository for PostgresCartRepository {
    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<Cart>, DomainError> {
        let Some(cart) = carts::Entity::find()
            .filter(carts::Column::UserId.eq(user_id.0))
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?
        else {
            return Ok(None);
        };

        let items = cart_items::Entity::find()
            .filter(cart_items::Column::CartId.eq(cart.id))
            .order_by_asc(cart_items::Column::Position)
            .order_by_asc(cart_items::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(Some(Cart {
            id: CartId(cart.id),
            user_id: UserId(cart.user_id),
            company_id: cart.company_id.map(CompanyId),
            items: items.into_iter().map(|m| m.into()).collect(),
            updated_at: cart.updated_at.with_timezone(&Utc),
        }))
    }

    async fn create(
        &self,
        user_id: &UserId,
        company_id: Option<&CompanyId>,
    ) -> Result<Cart, DomainError> {
        let model = carts::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id.0),
            company_id: Set(company_id.map(|c| c.0)),
            updated_at: Set(Utc::now().fixed_offset()),
        };

        let cart = model
            .insert(&self.db)
            .await
            .map_err(|e| unique_violation(e, format!("cart for user {}", user_id)))?;

        Ok(Cart {
            id: CartId(cart.id),
            user_id: UserId(cart.user_id),
            company_id: cart.company_id.map(CompanyId),
            items: vec![],
            updated_at: cart.updated_at.with_timezone(&Utc),
        })
    }

    async fn add_item(
        &self,
        cart_id: &CartId,
        item: &NewCartItem,
        position: i32,
    ) -> Result<CartItem, DomainError> {
        let configuration = serde_json::to_value(&item.configuration)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let model = cart_items::ActiveModel {
            id: Set(Uuid::new_v4()),
            cart_id: Set(cart_id.0),
            material: Set(item.material.trim().to_uppercase()),
            quantity: Set(item.quantity),
            unit: Set(item.unit.as_ref().map(|u| u.trim().to_uppercase())),
            plant: Set(item.plant.as_ref().map(|p| p.trim().to_uppercase())),
            configuration: Set(configuration),
            position: Set(position),
            created_at: Set(Utc::now().fixed_offset()),
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        self.touch(cart_id).await?;
        Ok(result.into())
    }

    async fn update_quantity(
        &self,
        cart_id: &CartId,
        item_id: &CartItemId,
        quantity: Decimal,
    ) -> Result<Option<CartItem>, DomainError> {
        let Some(existing) = self.find_item(cart_id, item_id).await? else {
            return Ok(None);
        };

        let mut model: cart_items::ActiveModel = existing.into();
        model.quantity = Set(quantity);
        let result = model
            .update(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        self.touch(cart_id).await?;
        Ok(Some(result.into()))
    }

    async fn remove_item(
        &self,
        cart_id: &CartId,
        item_id: &CartItemId,
    ) -> Result<bool, DomainError> {
        let result = cart_items::Entity::delete_many()
            .filter(cart_items::Column::Id.eq(item_id.0))
            .filter(cart_items::Column::CartId.eq(cart_id.0))
            .exec(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        if result.rows_affected > 0 {
            self.touch(cart_id).await?;
        }
        Ok(result.rows_affected > 0)
    }

    async fn clear(&self, cart_id: &CartId) -> Result<(), DomainError> {
        cart_items::Entity::delete_many()
            .filter(cart_items::Column::CartId.eq(cart_id.0))
            .exec(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        self.touch(cart_id).await
    }
}

impl From<cart_items::Model> for CartItem {
    fn from(model: cart_items::Model) -> Self {
        let configuration: Vec<Characteristic> =
            serde_json::from_value(model.configuration).unwrap_or_default();
        CartItem {
            id: CartItemId(model.id),
            material: model.material,
            quantity: model.quantity,
            unit: model.unit,
            plant: model.plant,
            configuration,
            position: model.position,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}
