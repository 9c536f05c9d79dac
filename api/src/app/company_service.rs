//! Company service
//!
//! Company administration, SAP connection management and resolution of the
//! company (and connection) a request acts for.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::entities::{
    Company, CompanyId, CompanyUpdate, NewCompany, NewSapConnection, PortalUser, SapConnection,
};
use crate::domain::ports::{CompanyRepository, SapConnectionRepository, SapGateway};
use crate::error::{AppError, SapError};

/// Outcome of a connection test
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionTest {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct CompanyService {
    companies: Arc<dyn CompanyRepository>,
    connections: Arc<dyn SapConnectionRepository>,
    sap: Arc<dyn SapGateway>,
}

impl CompanyService {
    pub fn new(
        companies: Arc<dyn CompanyRepository>,
        connections: Arc<dyn SapConnectionRepository>,
        sap: Arc<dyn SapGateway>,
    ) -> Self {
        Self {
            companies,
            connections,
            sap,
        }
    }

    pub async fn list(&self) -> Result<Vec<Company>, AppError> {
        Ok(self.companies.list().await?)
    }

    pub async fn get(&self, id: &CompanyId) -> Result<Company, AppError> {
        self.companies
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Company {}", id)))
    }

    pub async fn create(&self, company: &NewCompany) -> Result<Company, AppError> {
        company.validate().map_err(AppError::BadRequest)?;
        let created = self.companies.create(company).await?;
        tracing::info!(company_id = %created.id, sold_to = %created.sold_to, "Created company");
        Ok(created)
    }

    pub async fn update(&self, id: &CompanyId, update: &CompanyUpdate) -> Result<Company, AppError> {
        if let Some(name) = &update.name {
            if name.trim().is_empty() || name.len() > 200 {
                return Err(AppError::BadRequest(
                    "Company name must be between 1 and 200 characters".to_string(),
                ));
            }
        }
        if let Some(area) = &update.sales_area {
            area.validate().map_err(AppError::BadRequest)?;
        }
        self.get(id).await?;
        Ok(self.companies.update(id, update).await?)
    }

    /// Create or replace the SAP connection of a company
    pub async fn set_connection(
        &self,
        id: &CompanyId,
        connection: &NewSapConnection,
    ) -> Result<SapConnection, AppError> {
        connection.validate().map_err(AppError::BadRequest)?;
        self.get(id).await?;
        let stored = self.connections.upsert(id, connection).await?;
        tracing::info!(
            company_id = %id,
            channel = %stored.order_channel,
            "Stored SAP connection"
        );
        Ok(stored)
    }

    /// Check the stored credentials with a CSRF handshake
    pub async fn test_connection(&self, id: &CompanyId) -> Result<ConnectionTest, AppError> {
        let company = self.get(id).await?;
        let connection = self.connection(&company).await?;

        match self.sap.ping(&connection).await {
            Ok(()) => Ok(ConnectionTest {
                ok: true,
                error: None,
            }),
            Err(e) => {
                tracing::warn!(company_id = %id, error = %e, "SAP connection test failed");
                Ok(ConnectionTest {
                    ok: false,
                    error: Some(e.to_string()),
                })
            }
        }
    }

    /// The SAP connection of a company, `NotConfigured` when missing
    pub async fn connection(&self, company: &Company) -> Result<SapConnection, AppError> {
        self.connections
            .find_by_company(&company.id)
            .await?
            .ok_or_else(|| AppError::Sap(SapError::NotConfigured(company.name.clone())))
    }

    /// Resolve the company a user acts for
    pub async fn company_for(
        &self,
        user: &PortalUser,
        requested: Option<CompanyId>,
    ) -> Result<Company, AppError> {
        let id = match user.effective_company(requested) {
            Some(id) => id,
            None if requested.is_some() => return Err(AppError::Forbidden),
            None => {
                return Err(AppError::BadRequest(
                    "company_id is required for users without a company".to_string(),
                ))
            }
        };

        let company = self.get(&id).await?;
        if !company.active {
            return Err(AppError::Forbidden);
        }
        Ok(company)
    }

    /// Resolve the company a user acts for together with its SAP connection
    pub async fn sap_context(
        &self,
        user: &PortalUser,
        requested: Option<CompanyId>,
    ) -> Result<(Company, SapConnection), AppError> {
        let company = self.company_for(user, requested).await?;
        let connection = self.connection(&company).await?;
        Ok((company, connection))
    }
}
