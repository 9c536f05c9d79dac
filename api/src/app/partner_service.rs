//! Partner service
//!
//! Business partner and ship-to lookups. Both change rarely, so answers are
//! kept in the session cache for a while.
//!
//! Customer users only see the partners of their own company: the sold-to
//! party, the default ship-to and the ship-to parties SAP lists for it.

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};

use crate::domain::entities::{Company, Partner, PortalUser, SapConnection};
use crate::domain::ports::{SapGateway, SessionCache};
use crate::error::{AppError, SapError};

pub struct PartnerService {
    sap: Arc<dyn SapGateway>,
    cache: Arc<dyn SessionCache>,
    ttl_secs: u64,
}

impl PartnerService {
    pub fn new(sap: Arc<dyn SapGateway>, cache: Arc<dyn SessionCache>, ttl_secs: u64) -> Self {
        Self {
            sap,
            cache,
            ttl_secs,
        }
    }

    pub fn partner_key(company: &Company, number: &str) -> String {
        format!("sap:partner:{}:{}", company.id, number)
    }

    pub fn ship_to_key(company: &Company) -> String {
        format!("sap:ship-to:{}", company.id)
    }

    /// Business partner with addresses
    pub async fn partner(
        &self,
        user: &PortalUser,
        company: &Company,
        connection: &SapConnection,
        number: &str,
    ) -> Result<Partner, AppError> {
        let number = number.trim();
        if number.is_empty()
            || number.len() > 10
            || !number.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(AppError::BadRequest("Invalid partner number".to_string()));
        }
        self.ensure_visible(user, company, connection, number).await?;

        let key = Self::partner_key(company, number);
        if let Some(partner) = self.cached::<Partner>(&key).await {
            return Ok(partner);
        }

        let partner = self.sap.get_partner(connection, number).await?;
        self.store(&key, &partner).await;
        Ok(partner)
    }

    /// Ship-to parties of the company's sold-to party with their details
    ///
    /// The sold-to party itself is always part of the answer. Partners that
    /// cannot be read are skipped.
    pub async fn ship_to_parties(
        &self,
        company: &Company,
        connection: &SapConnection,
    ) -> Result<Vec<Partner>, AppError> {
        let key = Self::ship_to_key(company);
        if let Some(partners) = self.cached::<Vec<Partner>>(&key).await {
            return Ok(partners);
        }

        let area = &company.sales_area;
        let mut numbers = self
            .sap
            .list_ship_to_parties(
                connection,
                &company.sold_to,
                &area.sales_org,
                &area.distribution_channel,
                &area.division,
            )
            .await?;
        if !numbers.iter().any(|n| n == &company.sold_to) {
            numbers.insert(0, company.sold_to.clone());
        }

        let mut partners = Vec::with_capacity(numbers.len());
        for number in numbers {
            match self.sap.get_partner(connection, &number).await {
                Ok(partner) => partners.push(partner),
                Err(SapError::OData { status: 404, .. }) => {
                    tracing::debug!(partner = %number, "Ship-to partner not found");
                }
                Err(e) => return Err(e.into()),
            }
        }

        self.store(&key, &partners).await;
        Ok(partners)
    }

    /// Reject a requested ship-to the user may not deliver to
    pub async fn ensure_ship_to(
        &self,
        user: &PortalUser,
        company: &Company,
        connection: &SapConnection,
        ship_to: Option<&str>,
    ) -> Result<(), AppError> {
        match ship_to.map(str::trim).filter(|s| !s.is_empty()) {
            Some(number) => self.ensure_visible(user, company, connection, number).await,
            None => Ok(()),
        }
    }

    /// Staff see every partner; anyone else gets `NotFound` for partners
    /// outside their company
    async fn ensure_visible(
        &self,
        user: &PortalUser,
        company: &Company,
        connection: &SapConnection,
        number: &str,
    ) -> Result<(), AppError> {
        if user.is_staff()
            || same_partner(number, &company.sold_to)
            || company
                .default_ship_to
                .as_deref()
                .is_some_and(|s| same_partner(number, s))
        {
            return Ok(());
        }

        let ship_to = self.ship_to_parties(company, connection).await?;
        if ship_to.iter().any(|p| same_partner(&p.number, number)) {
            return Ok(());
        }

        tracing::debug!(user_id = %user.id, partner = %number, "Partner outside company refused");
        Err(AppError::NotFound(format!("Partner {}", number)))
    }

    async fn cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.cache.get(key).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).ok(),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(key, error = %e, "Partner cache read failed");
                None
            }
        }
    }

    async fn store<T: Serialize>(&self, key: &str, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to serialize partner cache entry");
                return;
            }
        };
        if let Err(e) = self.cache.set_ex(key, &raw, self.ttl_secs).await {
            tracing::warn!(key, error = %e, "Partner cache write failed");
        }
    }
}

/// Partner numbers compare without SAP's leading zero padding
fn same_partner(a: &str, b: &str) -> bool {
    a.trim().trim_start_matches('0').eq_ignore_ascii_case(b.trim().trim_start_matches('0'))
}
