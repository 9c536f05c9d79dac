//! PostgreSQL adapter for CompanyRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::unique_violation;
use crate::domain::entities::{Company, CompanyId, CompanyUpdate, NewCompany, SalesArea};
use crate::domain::ports::CompanyRepository;
use crate::entity::companies;
use crate::error::DomainError;

/// PostgreSQL implementation of CompanyRepository
pub struct PostgresCompanyRepository {
    db: DatabaseConnection,
}

impl PostgresCompanyRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CompanyRepository for PostgresCompanyRepository {
    async fn find_by_id(&self, id: &CompanyId) -> Result<Option<Company>, DomainError> {
        let result = companies::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.map(|m| m.into()))
    }

    async fn find_by_sold_to(&self, sold_to: &str) -> Result<Option<Company>, DomainError> {
        let result = companies::Entity::find()
            .filter(companies::Column::SoldTo.eq(sold_to.trim()))
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.map(|m| m.into()))
    }

    async fn list(&self) -> Result<Vec<Company>, DomainError> {
        let results = companies::Entity::find()
            .order_by_asc(companies::Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn create(&self, company: &NewCompany) -> Result<Company, DomainError> {
        let model = companies::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(company.name.trim().to_string()),
            sold_to: Set(company.sold_to.trim().to_string()),
            sales_org: Set(company.sales_area.sales_org.trim().to_string()),
            distribution_channel: Set(company.sales_area.distribution_channel.trim().to_string()),
            division: Set(company.sales_area.division.trim().to_string()),
            default_ship_to: Set(company.default_ship_to.as_ref().map(|s| s.trim().to_string())),
            order_type: Set(company.order_type()),
            quote_type: Set(company.quote_type()),
            active: Set(true),
            created_at: Set(Utc::now().fixed_offset()),
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| unique_violation(e, format!("company with sold-to {}", company.sold_to)))?;

        Ok(result.into())
    }

    async fn update(
        &self,
        id: &CompanyId,
        update: &CompanyUpdate,
    ) -> Result<Company, DomainError> {
        let existing = companies::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?
            .ok_or_else(|| DomainError::NotFound(format!("Company {}", id)))?;

        let mut model: companies::ActiveModel = existing.into();
        if let Some(name) = &update.name {
            model.name = Set(name.trim().to_string());
        }
        if let Some(area) = &update.sales_area {
            model.sales_org = Set(area.sales_org.trim().to_string());
            model.distribution_channel = Set(area.distribution_channel.trim().to_string());
            model.division = Set(area.division.trim().to_string());
        }
        if let Some(ship_to) = &update.default_ship_to {
            let ship_to = ship_to.trim();
            model.default_ship_to = Set((!ship_to.is_empty()).then(|| ship_to.to_string()));
        }
        if let Some(order_type) = &update.order_type {
            model.order_type = Set(order_type.trim().to_uppercase());
        }
        if let Some(quote_type) = &update.quote_type {
            model.quote_type = Set(quote_type.trim().to_uppercase());
        }
        if let Some(active) = update.active {
            model.active = Set(active);
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.into())
    }
}

impl From<companies::Model> for Company {
    fn from(model: companies::Model) -> Self {
        Company {
            id: CompanyId(model.id),
            name: model.name,
            sold_to: model.sold_to,
            sales_area: SalesArea {
                sales_org: model.sales_org,
                distribution_channel: model.distribution_channel,
                division: model.division,
            },
            default_ship_to: model.default_ship_to,
            order_type: model.order_type,
            quote_type: model.quote_type,
            active: model.active,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}
