//! PostgreSQL adapters for OrderRepository and QuoteRepository
//!
//! Lines and SAP messages are stored as JSONB snapshots.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::entities::{
    CompanyId, DocumentStatus, NewOrder, NewQuote, Order, OrderId, Quote, QuoteId, UserId,
};
use crate::domain::ports::{OrderRepository, QuoteRepository};
use crate::entity::{orders, quotes};
use crate::error::DomainError;

fn to_json<T: Serialize>(value: &T) -> Result<Value, DomainError> {
    serde_json::to_value(value).map_err(|e| DomainError::Internal(e.to_string()))
}

fn parse_status(status: &str) -> DocumentStatus {
    status.parse().unwrap_or(DocumentStatus::Failed)
}

/// PostgreSQL implementation of OrderRepository
pub struct PostgresOrderRepository {
    db: DatabaseConnection,
}

impl PostgresOrderRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn create(&self, order: &NewOrder) -> Result<Order, DomainError> {
        let model = orders::ActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(order.company_id.0),
            user_id: Set(order.user_id.0),
            sap_document: Set(order.sap_document.clone()),
            status: Set(order.status.to_string()),
            purchase_order: Set(order.purchase_order.clone()),
            ship_to: Set(order.ship_to.clone()),
            requested_date: Set(order.requested_date),
            net_value: Set(order.net_value),
            currency: Set(order.currency.clone()),
            lines: Set(to_json(&order.lines)?),
            messages: Set(to_json(&order.messages)?),
            created_at: Set(Utc::now().fixed_offset()),
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.into())
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError> {
        let result = orders::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.map(|m| m.into()))
    }

    async fn list_by_company(
        &self,
        company_id: &CompanyId,
        limit: u64,
    ) -> Result<Vec<Order>, DomainError> {
        let results = orders::Entity::find()
            .filter(orders::Column::CompanyId.eq(company_id.0))
            .order_by_desc(orders::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }
}

impl From<orders::Model> for Order {
    fn from(model: orders::Model) -> Self {
        Order {
            id: OrderId(model.id),
            company_id: CompanyId(model.company_id),
            user_id: UserId(model.user_id),
            sap_document: model.sap_document,
            status: parse_status(&model.status),
            purchase_order: model.purchase_order,
            ship_to: model.ship_to,
            requested_date: model.requested_date,
            net_value: model.net_value,
            currency: model.currency,
            lines: serde_json::from_value(model.lines).unwrap_or_default(),
            messages: serde_json::from_value(model.messages).unwrap_or_default(),
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

/// PostgreSQL implementation of QuoteRepository
pub struct PostgresQuoteRepository {
    db: DatabaseConnection,
}

impl PostgresQuoteRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl QuoteRepository for PostgresQuoteRepository {
    async fn create(&self, quote: &NewQuote) -> Result<Quote, DomainError> {
        let model = quotes::ActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(quote.company_id.0),
            user_id: Set(quote.user_id.0),
            sap_document: Set(quote.sap_document.clone()),
            status: Set(quote.status.to_string()),
            purchase_order: Set(quote.purchase_order.clone()),
            ship_to: Set(quote.ship_to.clone()),
            valid_from: Set(quote.valid_from),
            valid_to: Set(quote.valid_to),
            lines: Set(to_json(&quote.lines)?),
            messages: Set(to_json(&quote.messages)?),
            created_at: Set(Utc::now().fixed_offset()),
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.into())
    }

    async fn find_by_id(&self, id: &QuoteId) -> Result<Option<Quote>, DomainError> {
        let result = quotes::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.map(|m| m.into()))
    }

    async fn list_by_company(
        &self,
        company_id: &CompanyId,
        limit: u64,
    ) -> Result<Vec<Quote>, DomainError> {
        let results = quotes::Entity::find()
            .filter(quotes::Column::CompanyId.eq(company_id.0))
            .order_by_desc(quotes::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }
}

impl From<quotes::Model> for Quote {
    fn from(model: quotes::Model) -> Self {
        Quote {
            id: QuoteId(model.id),
            company_id: CompanyId(model.company_id),
            user_id: UserId(model.user_id),
            sap_document: model.sap_document,
            status: parse_status(&model.status),
            purchase_order: model.purchase_order,
            ship_to: model.ship_to,
            valid_from: model.valid_from,
            valid_to: model.valid_to,
            lines: serde_json::from_value(model.lines).unwrap_or_default(),
            messages: serde_json::from_value(model.messages).unwrap_or_default(),
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}
