//! Order service
//!
//! Turns the user's cart into SAP sales documents: pricing simulation, order
//! checkout and quotation requests. Every submitted document is recorded
//! locally with the SAP answer, whether SAP accepted it or not.
//!
//! Once SAP has answered, the answer is what the caller gets. A local record
//! that cannot be written is logged with the document number and left out of
//! the response; the cart is still cleared so a retry cannot create the same
//! order twice.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{
    Cart, Company, CompanyId, DocumentLine, DocumentStatus, NewOrder, NewQuote, Order, OrderId,
    PortalUser, Quote, QuoteId, SalesDocumentRequest, SapConnection, SapResult, Simulation,
};
use crate::domain::ports::{
    CartRepository, EmailMessage, Mailer, OrderRepository, QuoteRepository, SapGateway,
};
use crate::error::{AppError, DomainError, MailError};

/// Days a quotation stays valid unless the request says otherwise
pub const DEFAULT_QUOTE_VALIDITY_DAYS: i64 = 30;
/// Number of local records returned by the list endpoints
pub const RECORD_LIST_LIMIT: u64 = 100;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SimulateRequest {
    #[serde(default)]
    pub company_id: Option<CompanyId>,
    #[serde(default)]
    pub ship_to: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub company_id: Option<CompanyId>,
    #[serde(default)]
    pub purchase_order: Option<String>,
    #[serde(default)]
    pub ship_to: Option<String>,
    #[serde(default)]
    pub requested_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteRequest {
    #[serde(default)]
    pub company_id: Option<CompanyId>,
    #[serde(default)]
    pub purchase_order: Option<String>,
    #[serde(default)]
    pub ship_to: Option<String>,
    #[serde(default)]
    pub valid_from: Option<NaiveDate>,
    #[serde(default)]
    pub valid_to: Option<NaiveDate>,
}

/// SAP answer plus the local order record, when it could be written
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutOutcome {
    #[serde(flatten)]
    pub result: SapResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<Order>,
}

/// SAP answer plus the local quote record, when it could be written
#[derive(Debug, Clone, Serialize)]
pub struct QuoteOutcome {
    #[serde(flatten)]
    pub result: SapResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote: Option<Quote>,
}

pub struct OrderService {
    carts: Arc<dyn CartRepository>,
    orders: Arc<dyn OrderRepository>,
    quotes: Arc<dyn QuoteRepository>,
    sap: Arc<dyn SapGateway>,
    mailer: Arc<dyn Mailer>,
}

impl OrderService {
    pub fn new(
        carts: Arc<dyn CartRepository>,
        orders: Arc<dyn OrderRepository>,
        quotes: Arc<dyn QuoteRepository>,
        sap: Arc<dyn SapGateway>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            carts,
            orders,
            quotes,
            sap,
            mailer,
        }
    }

    async fn filled_cart(&self, user: &PortalUser) -> Result<Cart, AppError> {
        match self.carts.find_by_user(&user.id).await? {
            Some(cart) if !cart.is_empty() => Ok(cart),
            _ => Err(AppError::Domain(DomainError::Validation(
                "Cart is empty".to_string(),
            ))),
        }
    }

    /// Price the cart in SAP without creating a document
    pub async fn simulate(
        &self,
        user: &PortalUser,
        company: &Company,
        connection: &SapConnection,
        request: &SimulateRequest,
    ) -> Result<Simulation, AppError> {
        let cart = self.filled_cart(user).await?;
        let sap_request = SalesDocumentRequest::from_cart(
            company,
            &cart,
            &company.order_type,
            request.ship_to.as_deref(),
        );

        Ok(self.sap.simulate_order(connection, &sap_request).await?)
    }

    /// Create a sales order from the cart
    ///
    /// The cart is priced first so the record and the confirmation carry the
    /// net value. Pricing problems never block the order itself. The cart is
    /// only cleared when SAP created the document.
    pub async fn checkout(
        &self,
        user: &PortalUser,
        company: &Company,
        connection: &SapConnection,
        request: &CheckoutRequest,
    ) -> Result<CheckoutOutcome, AppError> {
        if let Some(date) = request.requested_date {
            if date < Utc::now().date_naive() {
                return Err(AppError::BadRequest(
                    "requested_date must not be in the past".to_string(),
                ));
            }
        }

        let cart = self.filled_cart(user).await?;
        let sap_request = SalesDocumentRequest::from_cart(
            company,
            &cart,
            &company.order_type,
            request.ship_to.as_deref(),
        )
        .with_purchase_order(request.purchase_order.clone())
        .with_requested_date(request.requested_date);

        let pricing = match self.sap.simulate_order(connection, &sap_request).await {
            Ok(simulation) if simulation.success => Some(simulation),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(company_id = %company.id, error = %e, "Pricing before checkout failed");
                None
            }
        };

        let result = self.sap.create_order(connection, &sap_request).await?;

        let record = NewOrder {
            company_id: company.id,
            user_id: user.id,
            sap_document: result.document_number.clone(),
            status: DocumentStatus::from_result(&result),
            purchase_order: sap_request.purchase_order.clone(),
            ship_to: sap_request.ship_to.clone(),
            requested_date: sap_request.requested_date,
            net_value: pricing.as_ref().map(|p| p.net_value),
            currency: pricing.and_then(|p| p.currency),
            lines: DocumentLine::from_request(&sap_request),
            messages: result.messages.clone(),
        };
        let order = match self.orders.create(&record).await {
            Ok(order) => Some(order),
            Err(e) => {
                tracing::error!(
                    company_id = %company.id,
                    document = ?result.document_number,
                    success = result.success,
                    error = %e,
                    "Failed to record sales order"
                );
                None
            }
        };

        if result.success {
            if let Err(e) = self.carts.clear(&cart.id).await {
                tracing::error!(
                    cart_id = %cart.id,
                    document = ?result.document_number,
                    error = %e,
                    "Failed to clear cart after checkout"
                );
            }
            tracing::info!(
                company_id = %company.id,
                document = ?result.document_number,
                "Sales order created"
            );
            self.notify(order_confirmation(user, &record));
        } else {
            tracing::warn!(
                company_id = %company.id,
                error = ?result.first_error(),
                "SAP rejected sales order"
            );
        }

        Ok(CheckoutOutcome { result, order })
    }

    /// Request a quotation for the cart
    ///
    /// The cart is kept so the user can still order it.
    pub async fn request_quote(
        &self,
        user: &PortalUser,
        company: &Company,
        connection: &SapConnection,
        request: &QuoteRequest,
    ) -> Result<QuoteOutcome, AppError> {
        let (valid_from, valid_to) = quote_validity(
            request.valid_from,
            request.valid_to,
            Utc::now().date_naive(),
        )?;

        let cart = self.filled_cart(user).await?;
        let sap_request = SalesDocumentRequest::from_cart(
            company,
            &cart,
            &company.quote_type,
            request.ship_to.as_deref(),
        )
        .with_purchase_order(request.purchase_order.clone())
        .with_validity(valid_from, valid_to);

        let result = self.sap.create_quote(connection, &sap_request).await?;

        let record = NewQuote {
            company_id: company.id,
            user_id: user.id,
            sap_document: result.document_number.clone(),
            status: DocumentStatus::from_result(&result),
            purchase_order: sap_request.purchase_order.clone(),
            ship_to: sap_request.ship_to.clone(),
            valid_from,
            valid_to,
            lines: DocumentLine::from_request(&sap_request),
            messages: result.messages.clone(),
        };
        let quote = match self.quotes.create(&record).await {
            Ok(quote) => Some(quote),
            Err(e) => {
                tracing::error!(
                    company_id = %company.id,
                    document = ?result.document_number,
                    success = result.success,
                    error = %e,
                    "Failed to record quotation"
                );
                None
            }
        };

        if result.success {
            tracing::info!(
                company_id = %company.id,
                document = ?result.document_number,
                "Quotation created"
            );
            self.notify(quote_confirmation(user, &record));
        } else {
            tracing::warn!(
                company_id = %company.id,
                error = ?result.first_error(),
                "SAP rejected quotation"
            );
        }

        Ok(QuoteOutcome { result, quote })
    }

    pub async fn list_orders(&self, company_id: &CompanyId) -> Result<Vec<Order>, AppError> {
        Ok(self
            .orders
            .list_by_company(company_id, RECORD_LIST_LIMIT)
            .await?)
    }

    /// A single order, hidden from users outside its company
    pub async fn get_order(&self, user: &PortalUser, id: &OrderId) -> Result<Order, AppError> {
        self.orders
            .find_by_id(id)
            .await?
            .filter(|o| user.can_access(&o.company_id))
            .ok_or_else(|| AppError::NotFound(format!("Order {}", id)))
    }

    pub async fn list_quotes(&self, company_id: &CompanyId) -> Result<Vec<Quote>, AppError> {
        Ok(self
            .quotes
            .list_by_company(company_id, RECORD_LIST_LIMIT)
            .await?)
    }

    /// A single quote, hidden from users outside its company
    pub async fn get_quote(&self, user: &PortalUser, id: &QuoteId) -> Result<Quote, AppError> {
        self.quotes
            .find_by_id(id)
            .await?
            .filter(|q| user.can_access(&q.company_id))
            .ok_or_else(|| AppError::NotFound(format!("Quote {}", id)))
    }

    /// Send a mail in the background; failures are only logged and a missing
    /// provider is skipped quietly
    fn notify(&self, message: EmailMessage) {
        let mailer = self.mailer.clone();
        tokio::spawn(async move {
            match mailer.send(&message).await {
                Ok(()) => {}
                Err(MailError::NotConfigured) => {
                    tracing::debug!(to = %message.to, subject = %message.subject, "Mail disabled, confirmation skipped");
                }
                Err(e) => {
                    tracing::warn!(to = %message.to, error = %e, "Failed to send confirmation mail");
                }
            }
        });
    }
}

/// Resolve the validity period of a quotation
fn quote_validity(
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<(NaiveDate, NaiveDate), AppError> {
    let valid_from = from.unwrap_or(today);
    let valid_to = to.unwrap_or(valid_from + Duration::days(DEFAULT_QUOTE_VALIDITY_DAYS));
    if valid_to < valid_from {
        return Err(AppError::BadRequest(
            "valid_to must not precede valid_from".to_string(),
        ));
    }
    Ok((valid_from, valid_to))
}

fn line_summary(lines: &[DocumentLine]) -> String {
    lines
        .iter()
        .map(|l| {
            format!(
                "{:>6}  {}  {} {}",
                l.item_number,
                l.material,
                l.quantity.normalize(),
                l.unit.as_deref().unwrap_or("")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn order_confirmation(user: &PortalUser, order: &NewOrder) -> EmailMessage {
    let number = order.sap_document.as_deref().unwrap_or("-");
    let mut text = format!(
        "Hello {},\n\nyour order {} has been created.\n",
        user.display_name, number
    );
    if let Some(po) = &order.purchase_order {
        text.push_str(&format!("Purchase order: {}\n", po));
    }
    if let (Some(value), Some(currency)) = (order.net_value, &order.currency) {
        text.push_str(&format!("Net value: {} {}\n", value, currency));
    }
    text.push_str(&format!("\n{}\n", line_summary(&order.lines)));

    EmailMessage {
        to: user.email.clone(),
        subject: format!("Order confirmation {}", number),
        text,
    }
}

fn quote_confirmation(user: &PortalUser, quote: &NewQuote) -> EmailMessage {
    let number = quote.sap_document.as_deref().unwrap_or("-");
    let text = format!(
        "Hello {},\n\nyour quotation {} has been created. It is valid from {} to {}.\n\n{}\n",
        user.display_name,
        number,
        quote.valid_from,
        quote.valid_to,
        line_summary(&quote.lines)
    );

    EmailMessage {
        to: user.email.clone(),
        subject: format!("Quotation {}", number),
        text,
    }
}
