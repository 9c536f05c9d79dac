//! PostgreSQL adapter for UserRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::unique_violation;
use crate::domain::entities::{CompanyId, NewUser, PortalUser, Role, UserId};
use crate::domain::ports::UserRepository;
use crate::entity::portal_users;
use crate::error::DomainError;

/// PostgreSQL implementation of UserRepository
pub struct PostgresUserRepository {
    db: DatabaseConnection,
}

impl PostgresUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_api_key_hash(&self, hash: &str) -> Result<Option<PortalUser>, DomainError> {
        let result = portal_users::Entity::find()
            .filter(portal_users::Column::ApiKeyHash.eq(hash))
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.map(|m| m.into()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<PortalUser>, DomainError> {
        let result = portal_users::Entity::find()
            .filter(portal_users::Column::Email.eq(email.trim().to_lowercase()))
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.map(|m| m.into()))
    }

    async fn list(&self, company_id: Option<&CompanyId>) -> Result<Vec<PortalUser>, DomainError> {
        let mut query = portal_users::Entity::find().order_by_asc(portal_users::Column::Email);
        if let Some(company_id) = company_id {
            query = query.filter(portal_users::Column::CompanyId.eq(company_id.0));
        }

        let results = query
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn create(&self, user: &NewUser) -> Result<PortalUser, DomainError> {
        let model = portal_users::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(user.email.trim().to_lowercase()),
            display_name: Set(user.display_name.trim().to_string()),
            role: Set(user.role.to_string()),
            company_id: Set(user.company_id.map(|id| id.0)),
            api_key_hash: Set(user.api_key_hash.clone()),
            created_at: Set(Utc::now().fixed_offset()),
            last_seen_at: Set(None),
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| unique_violation(e, format!("user {}", user.email)))?;

        Ok(result.into())
    }

    async fn update_last_seen(&self, id: &UserId) -> Result<(), DomainError> {
        portal_users::ActiveModel {
            id: Set(id.0),
            last_seen_at: Set(Some(Utc::now().fixed_offset())),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(())
    }
}

impl From<portal_users::Model> for PortalUser {
    fn from(model: portal_users::Model) -> Self {
        PortalUser {
            id: UserId(model.id),
            email: model.email,
            display_name: model.display_name,
            // unknown roles get the least privileged one
            role: model.role.parse().unwrap_or(Role::Customer),
            company_id: model.company_id.map(CompanyId),
            api_key_hash: model.api_key_hash,
            created_at: model.created_at.with_timezone(&Utc),
            last_seen_at: model.last_seen_at.map(|dt| dt.with_timezone(&Utc)),
        }
    }
}
