//! Document service
//!
//! Read access to the SAP documents of a company. Deliveries and invoices can
//! be served from demo data when SAP is unreachable and the fallback is
//! switched on.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::entities::{
    Company, Delivery, DeliveryItem, DocumentSource, Invoice, SalesDocumentSummary, SapConnection,
};
use crate::domain::ports::SapGateway;
use crate::error::{AppError, SapError};

pub const DEFAULT_TOP: u32 = 50;
pub const MAX_TOP: u32 = 200;

/// Documents together with where they came from
#[derive(Debug, Clone, Serialize)]
pub struct DocumentList<T> {
    pub source: DocumentSource,
    pub documents: Vec<T>,
}

impl<T> DocumentList<T> {
    fn sap(documents: Vec<T>) -> Self {
        Self {
            source: DocumentSource::Sap,
            documents,
        }
    }

    fn demo(documents: Vec<T>) -> Self {
        Self {
            source: DocumentSource::Demo,
            documents,
        }
    }
}

pub struct DocumentService {
    sap: Arc<dyn SapGateway>,
    demo_fallback: bool,
}

impl DocumentService {
    pub fn new(sap: Arc<dyn SapGateway>, demo_fallback: bool) -> Self {
        Self { sap, demo_fallback }
    }

    pub async fn sales_orders(
        &self,
        company: &Company,
        connection: &SapConnection,
        top: Option<u32>,
    ) -> Result<DocumentList<SalesDocumentSummary>, AppError> {
        let documents = self
            .sap
            .list_sales_orders(connection, &company.sold_to, clamp_top(top))
            .await?;
        Ok(DocumentList::sap(documents))
    }

    pub async fn quotations(
        &self,
        company: &Company,
        connection: &SapConnection,
        top: Option<u32>,
    ) -> Result<DocumentList<SalesDocumentSummary>, AppError> {
        let documents = self
            .sap
            .list_quotations(connection, &company.sold_to, clamp_top(top))
            .await?;
        Ok(DocumentList::sap(documents))
    }

    pub async fn deliveries(
        &self,
        company: &Company,
        connection: &SapConnection,
        top: Option<u32>,
    ) -> Result<DocumentList<Delivery>, AppError> {
        match self
            .sap
            .list_deliveries(connection, &company.sold_to, clamp_top(top))
            .await
        {
            Ok(documents) => Ok(DocumentList::sap(documents)),
            Err(e) if self.use_demo(&e) => {
                tracing::warn!(company_id = %company.id, error = %e, "Serving demo deliveries");
                Ok(DocumentList::demo(demo_deliveries(company, today())))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn invoices(
        &self,
        company: &Company,
        connection: &SapConnection,
        top: Option<u32>,
    ) -> Result<DocumentList<Invoice>, AppError> {
        match self
            .sap
            .list_invoices(connection, &company.sold_to, clamp_top(top))
            .await
        {
            Ok(documents) => Ok(DocumentList::sap(documents)),
            Err(e) if self.use_demo(&e) => {
                tracing::warn!(company_id = %company.id, error = %e, "Serving demo invoices");
                Ok(DocumentList::demo(demo_invoices(today())))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Upstream failures qualify for demo data, bad requests do not
    fn use_demo(&self, error: &SapError) -> bool {
        self.demo_fallback
            && !matches!(
                error,
                SapError::NotConfigured(_) | SapError::InvalidRequest(_)
            )
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn clamp_top(top: Option<u32>) -> u32 {
    top.unwrap_or(DEFAULT_TOP).clamp(1, MAX_TOP)
}

fn demo_deliveries(company: &Company, today: NaiveDate) -> Vec<Delivery> {
    let ship_to = company.ship_to_or_default(None);
    vec![
        Delivery {
            number: "80000102".to_string(),
            delivery_date: Some(today + Duration::days(2)),
            goods_issue_date: None,
            goods_movement_status: Some("A".to_string()),
            ship_to: Some(ship_to.clone()),
            items: vec![DeliveryItem {
                item_number: "10".to_string(),
                material: "DEMO-PUMP-100".to_string(),
                quantity: Decimal::new(4, 0),
                unit: Some("EA".to_string()),
                reference_document: Some("5000123".to_string()),
            }],
        },
        Delivery {
            number: "80000097".to_string(),
            delivery_date: Some(today - Duration::days(5)),
            goods_issue_date: Some(today - Duration::days(6)),
            goods_movement_status: Some("C".to_string()),
            ship_to: Some(ship_to),
            items: vec![
                DeliveryItem {
                    item_number: "10".to_string(),
                    material: "DEMO-VALVE-20".to_string(),
                    quantity: Decimal::new(12, 0),
                    unit: Some("EA".to_string()),
                    reference_document: Some("5000118".to_string()),
                },
                DeliveryItem {
                    item_number: "20".to_string(),
                    material: "DEMO-HOSE-5".to_string(),
                    quantity: Decimal::new(255, 1),
                    unit: Some("M".to_string()),
                    reference_document: Some("5000118".to_string()),
                },
            ],
        },
    ]
}

fn demo_invoices(today: NaiveDate) -> Vec<Invoice> {
    vec![
        Invoice {
            number: "90000311".to_string(),
            billing_date: Some(today - Duration::days(4)),
            billing_type: Some("F2".to_string()),
            net_amount: Some(Decimal::new(184_000, 2)),
            tax_amount: Some(Decimal::new(34_960, 2)),
            currency: Some("EUR".to_string()),
            cancelled: false,
        },
        Invoice {
            number: "90000287".to_string(),
            billing_date: Some(today - Duration::days(31)),
            billing_type: Some("F2".to_string()),
            net_amount: Some(Decimal::new(42_550, 2)),
            tax_amount: Some(Decimal::new(8_085, 2)),
            currency: Some("EUR".to_string()),
            cancelled: false,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::OrderChannel;
    use crate::test_utils::{test_company, test_connection, MockSapGateway};

    #[test]
    fn top_is_clamped() {
        assert_eq!(clamp_top(None), DEFAULT_TOP);
        assert_eq!(clamp_top(Some(0)), 1);
        assert_eq!(clamp_top(Some(5000)), MAX_TOP);
    }

    #[tokio::test]
    async fn deliveries_fall_back_to_demo_when_enabled() {
        let company = test_company();
        let connection = test_connection(company.id, OrderChannel::OData);
        let service = DocumentService::new(Arc::new(MockSapGateway::new().unreachable()), true);

        let list = service.deliveries(&company, &connection, None).await.unwrap();
        assert_eq!(list.source, DocumentSource::Demo);
        assert_eq!(list.documents.len(), 2);
        assert_eq!(
            list.documents[0].ship_to.as_deref(),
            Some(company.sold_to.as_str())
        );
    }

    #[tokio::test]
    async fn invoices_fail_without_fallback() {
        let company = test_company();
        let connection = test_connection(company.id, OrderChannel::OData);
        let service = DocumentService::new(Arc::new(MockSapGateway::new().unreachable()), false);

        let err = service.invoices(&company, &connection, None).await.unwrap_err();
        assert!(matches!(err, AppError::Sap(_)));
    }

    #[tokio::test]
    async fn sales_orders_never_use_demo_data() {
        let company = test_company();
        let connection = test_connection(company.id, OrderChannel::OData);
        let service = DocumentService::new(Arc::new(MockSapGateway::new().unreachable()), true);

        assert!(service.sales_orders(&company, &connection, None).await.is_err());
    }

    #[tokio::test]
    async fn sap_documents_are_tagged_with_source() {
        let company = test_company();
        let connection = test_connection(company.id, OrderChannel::OData);
        let service = DocumentService::new(Arc::new(MockSapGateway::new()), true);

        let list = service.invoices(&company, &connection, Some(10)).await.unwrap();
        assert_eq!(list.source, DocumentSource::Sap);
        assert_eq!(list.documents[0].number, "90001234");
    }
}
