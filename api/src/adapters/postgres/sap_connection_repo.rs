//! PostgreSQL adapter for SapConnectionRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, Set};

use crate::domain::entities::{CompanyId, NewSapConnection, OrderChannel, SapConnection};
use crate::domain::ports::SapConnectionRepository;
use crate::entity::sap_connections;
use crate::error::DomainError;

/// PostgreSQL implementation of SapConnectionRepository
pub struct PostgresSapConnectionRepository {
    db: DatabaseConnection,
}

impl PostgresSapConnectionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SapConnectionRepository for PostgresSapConnectionRepository {
    async fn find_by_company(
        &self,
        company_id: &CompanyId,
    ) -> Result<Option<SapConnection>, DomainError> {
        let result = sap_connections::Entity::find_by_id(company_id.0)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        result.map(SapConnection::try_from).transpose()
    }

    async fn upsert(
        &self,
        company_id: &CompanyId,
        connection: &NewSapConnection,
    ) -> Result<SapConnection, DomainError> {
        let model = sap_connections::ActiveModel {
            company_id: Set(company_id.0),
            base_url: Set(connection.base_url.trim().trim_end_matches('/').to_string()),
            client: Set(connection.client.clone()),
            username: Set(connection.username.trim().to_string()),
            password: Set(connection.password.clone()),
            order_channel: Set(connection.order_channel.to_string()),
            updated_at: Set(Utc::now().fixed_offset()),
        };

        sap_connections::Entity::insert(model)
            .on_conflict(
                OnConflict::column(sap_connections::Column::CompanyId)
                    .update_columns([
                        sap_connections::Column::BaseUrl,
                        sap_connections::Column::Client,
                        sap_connections::Column::Username,
                        sap_connections::Column::Password,
                        sap_connections::Column::OrderChannel,
                        sap_connections::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        self.find_by_company(company_id)
            .await?
            .ok_or_else(|| DomainError::Internal("SAP connection vanished after upsert".to_string()))
    }
}

impl TryFrom<sap_connections::Model> for SapConnection {
    type Error = DomainError;

    fn try_from(model: sap_connections::Model) -> Result<Self, Self::Error> {
        let order_channel: OrderChannel = model
            .order_channel
            .parse()
            .map_err(DomainError::Internal)?;

        Ok(SapConnection {
            company_id: CompanyId(model.company_id),
            base_url: model.base_url,
            client: model.client,
            username: model.username,
            password: model.password,
            order_channel,
            updated_at: model.updated_at.with_timezone(&Utc),
        })
    }
}
