//! Cart service
//!
//! Keeps one open cart per user. Lines are validated against the catalog.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::domain::entities::{
    validate_quantity, Cart, CartItem, CartItemId, NewCartItem, PortalUser,
};
use crate::domain::ports::{CartRepository, ProductRepository};
use crate::error::AppError;

pub struct CartService {
    carts: Arc<dyn CartRepository>,
    products: Arc<dyn ProductRepository>,
}

impl CartService {
    pub fn new(carts: Arc<dyn CartRepository>, products: Arc<dyn ProductRepository>) -> Self {
        Self { carts, products }
    }

    /// The user's cart, created empty on first access
    pub async fn get_or_create(&self, user: &PortalUser) -> Result<Cart, AppError> {
        if let Some(cart) = self.carts.find_by_user(&user.id).await? {
            return Ok(cart);
        }
        Ok(self.carts.create(&user.id, user.company_id.as_ref()).await?)
    }

    /// Add a line to the cart
    ///
    /// Unconfigured lines for a material already in the cart (same plant) are
    /// merged by adding up the quantities.
    pub async fn add_item(&self, user: &PortalUser, item: &NewCartItem) -> Result<CartItem, AppError> {
        item.validate().map_err(AppError::BadRequest)?;

        let product = self
            .products
            .find_by_material(&item.material)
            .await?
            .filter(|p| p.active)
            .ok_or_else(|| AppError::NotFound(format!("Material {}", item.material.trim())))?;

        if !item.configuration.is_empty() && !product.configurable {
            return Err(AppError::BadRequest(format!(
                "Material {} is not configurable",
                product.material
            )));
        }

        let cart = self.get_or_create(user).await?;
        let plant = item.plant.as_ref().map(|p| p.trim().to_uppercase());

        if item.configuration.is_empty() {
            let existing = cart.items.iter().find(|i| {
                i.material == product.material && !i.is_configured() && i.plant == plant
            });
            if let Some(existing) = existing {
                let quantity = existing.quantity + item.quantity;
                return self
                    .carts
                    .update_quantity(&cart.id, &existing.id, quantity)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Cart item {}", existing.id)));
            }
        }

        let line = NewCartItem {
            material: product.material.clone(),
            quantity: item.quantity,
            unit: item.unit.clone().or_else(|| Some(product.unit.clone())),
            plant,
            configuration: item.configuration.clone(),
        };
        Ok(self
            .carts
            .add_item(&cart.id, &line, cart.next_position())
            .await?)
    }

    pub async fn update_quantity(
        &self,
        user: &PortalUser,
        item_id: &CartItemId,
        quantity: Decimal,
    ) -> Result<CartItem, AppError> {
        validate_quantity(quantity).map_err(AppError::BadRequest)?;
        let cart = self.get_or_create(user).await?;

        self.carts
            .update_quantity(&cart.id, item_id, quantity)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Cart item {}", item_id)))
    }

    pub async fn remove_item(&self, user: &PortalUser, item_id: &CartItemId) -> Result<(), AppError> {
        let cart = self.get_or_create(user).await?;
        if !self.carts.remove_item(&cart.id, item_id).await? {
            return Err(AppError::NotFound(format!("Cart item {}", item_id)));
        }
        Ok(())
    }

    pub async fn clear(&self, user: &PortalUser) -> Result<(), AppError> {
        if let Some(cart) = self.carts.find_by_user(&user.id).await? {
            self.carts.clear(&cart.id).await?;
        }
        Ok(())
    }
}
