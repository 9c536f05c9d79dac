//! Catalog service
//!
//! Product search and administration, plus short recommendation texts written
//! by the completion API.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::entities::{NewProduct, Product, ProductId, ProductUpdate};
use crate::domain::ports::{CompletionClient, ProductRepository};
use crate::error::{AppError, CompletionError};

/// Default and maximum number of search hits
pub const SEARCH_LIMIT: u64 = 50;
/// Products handed to the completion API as candidates
const RECOMMEND_CANDIDATES: u64 = 8;

const RECOMMEND_SYSTEM: &str = "You are a product advisor in a B2B web shop. \
Recommend only products from the provided list, reference them by material number \
and answer in at most three sentences.";

/// Recommendation answer
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub products: Vec<Product>,
}

pub struct CatalogService {
    products: Arc<dyn ProductRepository>,
    completion: Arc<dyn CompletionClient>,
}

impl CatalogService {
    pub fn new(products: Arc<dyn ProductRepository>, completion: Arc<dyn CompletionClient>) -> Self {
        Self {
            products,
            completion,
        }
    }

    pub async fn search(&self, query: Option<&str>, limit: Option<u64>) -> Result<Vec<Product>, AppError> {
        let limit = limit.unwrap_or(SEARCH_LIMIT).clamp(1, SEARCH_LIMIT);
        Ok(self.products.search(query, limit).await?)
    }

    pub async fn get(&self, id: &ProductId) -> Result<Product, AppError> {
        self.products
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Product {}", id)))
    }

    pub async fn create(&self, product: &NewProduct) -> Result<Product, AppError> {
        product.validate().map_err(AppError::BadRequest)?;
        Ok(self.products.create(product).await?)
    }

    pub async fn update(&self, id: &ProductId, update: &ProductUpdate) -> Result<Product, AppError> {
        if let Some(price) = update.list_price {
            if price.is_sign_negative() {
                return Err(AppError::BadRequest("List price cannot be negative".to_string()));
            }
        }
        if let Some(currency) = &update.currency {
            if currency.trim().len() != 3 {
                return Err(AppError::BadRequest(
                    "Currency must be an ISO 4217 code".to_string(),
                ));
            }
        }
        self.get(id).await?;
        Ok(self.products.update(id, update).await?)
    }

    pub async fn delete(&self, id: &ProductId) -> Result<(), AppError> {
        if !self.products.delete(id).await? {
            return Err(AppError::NotFound(format!("Product {}", id)));
        }
        Ok(())
    }

    /// Search the catalog and let the completion API describe the best fits
    ///
    /// The text is left out when the completion API is unconfigured or fails;
    /// the matching products are always returned.
    pub async fn recommend(&self, query: &str) -> Result<Recommendation, AppError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::BadRequest("query is required".to_string()));
        }

        let mut products = self.products.search(Some(query), RECOMMEND_CANDIDATES).await?;
        if products.is_empty() {
            // fall back to the first catalog page so the advisor has something to offer
            products = self.products.search(None, RECOMMEND_CANDIDATES).await?;
        }
        if products.is_empty() {
            return Ok(Recommendation {
                text: None,
                products,
            });
        }

        let text = match self
            .completion
            .complete(RECOMMEND_SYSTEM, &recommend_prompt(query, &products))
            .await
        {
            Ok(text) => Some(text),
            Err(CompletionError::NotConfigured) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Product recommendation failed");
                None
            }
        };

        Ok(Recommendation { text, products })
    }
}

fn recommend_prompt(query: &str, products: &[Product]) -> String {
    let mut prompt = format!("Customer request: {}\n\nAvailable products:\n", query);
    for product in products {
        prompt.push_str(&format!(
            "- {}: {} ({} {} per {}{})\n",
            product.material,
            product.description,
            product.list_price,
            product.currency,
            product.unit,
            if product.configurable {
                ", configurable"
            } else {
                ""
            }
        ));
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{test_product, InMemoryProductRepository, MockCompletionClient};

    fn service(products: InMemoryProductRepository, completion: MockCompletionClient) -> CatalogService {
        CatalogService::new(Arc::new(products), Arc::new(completion))
    }

    #[test]
    fn prompt_lists_candidates() {
        let mut product = test_product("PUMP-100");
        product.configurable = true;
        let prompt = recommend_prompt("pump for oil", &[product]);

        assert!(prompt.starts_with("Customer request: pump for oil"));
        assert!(prompt.contains("- PUMP-100: Test product PUMP-100"));
        assert!(prompt.contains("configurable"));
    }

    #[tokio::test]
    async fn recommend_returns_text_and_products() {
        let completion = MockCompletionClient::answering("Take PUMP-100.");
        let service = service(
            InMemoryProductRepository::new().with_product(test_product("PUMP-100")),
            completion.clone(),
        );

        let recommendation = service.recommend("pump").await.unwrap();
        assert_eq!(recommendation.text.as_deref(), Some("Take PUMP-100."));
        assert_eq!(recommendation.products.len(), 1);
        assert!(completion.prompts()[0].contains("PUMP-100"));
    }

    #[tokio::test]
    async fn recommend_omits_text_on_completion_failure() {
        let service = service(
            InMemoryProductRepository::new().with_product(test_product("PUMP-100")),
            MockCompletionClient::failing(),
        );

        let recommendation = service.recommend("pump").await.unwrap();
        assert!(recommendation.text.is_none());
        assert_eq!(recommendation.products.len(), 1);
    }

    #[tokio::test]
    async fn recommend_falls_back_to_catalog_when_nothing_matches() {
        let service = service(
            InMemoryProductRepository::new().with_product(test_product("VALVE-7")),
            MockCompletionClient::unconfigured(),
        );

        let recommendation = service.recommend("gearbox").await.unwrap();
        assert!(recommendation.text.is_none());
        assert_eq!(recommendation.products[0].material, "VALVE-7");
    }

    #[tokio::test]
    async fn recommend_requires_query() {
        let service = service(InMemoryProductRepository::new(), MockCompletionClient::unconfigured());
        assert!(matches!(
            service.recommend("  ").await,
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn delete_missing_product_is_not_found() {
        let service = service(InMemoryProductRepository::new(), MockCompletionClient::unconfigured());
        let err = service
            .delete(&ProductId(uuid::Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
