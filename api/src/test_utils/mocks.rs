//! Mock implementations of port traits
//!
//! These are in-memory implementations that can be configured for testing.
//! They store data in memory and allow tests to verify behavior.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::domain::entities::{
    Address, Cart, CartId, CartItem, CartItemId, Company, CompanyId, CompanyUpdate, Delivery,
    DeliveryItem, Invoice, MessageSeverity, NewCartItem, NewCompany, NewOrder, NewProduct,
    NewQuote, NewSapConnection, NewUser, Order, OrderId, Partner, PortalUser, Product, ProductId,
    ProductUpdate, Quote, QuoteId, SalesDocumentRequest, SalesDocumentSummary, SapConnection,
    SapMessage, SapResult, SimulatedItem, Simulation, UserId,
};
use crate::domain::ports::{
    CartRepository, CompanyRepository, CompletionClient, EmailMessage, Mailer, OrderRepository,
    ProductRepository, QuoteRepository, SapConnectionRepository, SapGateway, SessionCache,
    UserRepository,
};
use crate::error::{CacheError, CompletionError, DomainError, MailError, SapError};

// ============================================================================
// In-Memory Company Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryCompanyRepository {
    companies: Arc<RwLock<HashMap<CompanyId, Company>>>,
}

impl InMemoryCompanyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with a company for testing
    pub fn with_company(self, company: Company) -> Self {
        self.companies.write().unwrap().insert(company.id, company);
        self
    }
}

#[async_trait]
impl CompanyRepository for InMemoryCompanyRepository {
    async fn find_by_id(&self, id: &CompanyId) -> Result<Option<Company>, DomainError> {
        Ok(self.companies.read().unwrap().get(id).cloned())
    }

    async fn find_by_sold_to(&self, sold_to: &str) -> Result<Option<Company>, DomainError> {
        Ok(self
            .companies
            .read()
            .unwrap()
            .values()
            .find(|c| c.sold_to == sold_to)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Company>, DomainError> {
        let mut companies: Vec<Company> = self.companies.read().unwrap().values().cloned().collect();
        companies.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(companies)
    }

    async fn create(&self, company: &NewCompany) -> Result<Company, DomainError> {
        let mut companies = self.companies.write().unwrap();
        let sold_to = company.sold_to.trim().to_string();
        if companies.values().any(|c| c.sold_to == sold_to) {
            return Err(DomainError::AlreadyExists(format!("company {}", sold_to)));
        }

        let created = Company {
            id: CompanyId::new(),
            name: company.name.trim().to_string(),
            sold_to,
            sales_area: company.sales_area.clone(),
            default_ship_to: company.default_ship_to.clone(),
            order_type: company.order_type(),
            quote_type: company.quote_type(),
            active: true,
            created_at: Utc::now(),
        };
        companies.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(&self, id: &CompanyId, update: &CompanyUpdate) -> Result<Company, DomainError> {
        let mut companies = self.companies.write().unwrap();
        let company = companies
            .get_mut(id)
            .ok_or_else(|| DomainError::NotFound(format!("Company {}", id)))?;

        if let Some(name) = &update.name {
            company.name = name.trim().to_string();
        }
        if let Some(area) = &update.sales_area {
            company.sales_area = area.clone();
        }
        if let Some(ship_to) = &update.default_ship_to {
            company.default_ship_to = Some(ship_to.clone()).filter(|s| !s.trim().is_empty());
        }
        if let Some(order_type) = &update.order_type {
            company.order_type = order_type.trim().to_uppercase();
        }
        if let Some(quote_type) = &update.quote_type {
            company.quote_type = quote_type.trim().to_uppercase();
        }
        if let Some(active) = update.active {
            company.active = active;
        }
        Ok(company.clone())
    }
}

// ============================================================================
// In-Memory SAP Connection Repository
// ============================================================================

#[derive(Default)]
pub struct InMemorySapConnectionRepository {
    connections: Arc<RwLock<HashMap<CompanyId, SapConnection>>>,
}

impl InMemorySapConnectionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_connection(self, connection: SapConnection) -> Self {
        self.connections
            .write()
            .unwrap()
            .insert(connection.company_id, connection);
        self
    }
}

#[async_trait]
impl SapConnectionRepository for InMemorySapConnectionRepository {
    async fn find_by_company(
        &self,
        company_id: &CompanyId,
    ) -> Result<Option<SapConnection>, DomainError> {
        Ok(self.connections.read().unwrap().get(company_id).cloned())
    }

    async fn upsert(
        &self,
        company_id: &CompanyId,
        connection: &NewSapConnection,
    ) -> Result<SapConnection, DomainError> {
        let stored = SapConnection {
            company_id: *company_id,
            base_url: connection.base_url.trim().trim_end_matches('/').to_string(),
            client: connection.client.clone(),
            username: connection.username.trim().to_string(),
            password: connection.password.clone(),
            order_channel: connection.order_channel,
            updated_at: Utc::now(),
        };
        self.connections
            .write()
            .unwrap()
            .insert(*company_id, stored.clone());
        Ok(stored)
    }
}

// ============================================================================
// In-Memory User Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<UserId, PortalUser>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with a user for testing
    pub fn with_user(self, user: PortalUser) -> Self {
        self.users.write().unwrap().insert(user.id, user);
        self
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_api_key_hash(&self, hash: &str) -> Result<Option<PortalUser>, DomainError> {
        Ok(self
            .users
            .read()
            .unwrap()
            .values()
            .find(|u| u.api_key_hash == hash)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<PortalUser>, DomainError> {
        let email = email.trim().to_lowercase();
        Ok(self
            .users
            .read()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn list(&self, company_id: Option<&CompanyId>) -> Result<Vec<PortalUser>, DomainError> {
        let mut users: Vec<PortalUser> = self
            .users
            .read()
            .unwrap()
            .values()
            .filter(|u| company_id.is_none() || u.company_id.as_ref() == company_id)
            .cloned()
            .collect();
        users.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(users)
    }

    async fn create(&self, user: &NewUser) -> Result<PortalUser, DomainError> {
        let mut users = self.users.write().unwrap();
        let email = user.email.trim().to_lowercase();
        if users.values().any(|u| u.email == email) {
            return Err(DomainError::AlreadyExists(format!("user {}", email)));
        }

        let created = PortalUser {
            id: UserId::new(),
            email,
            display_name: user.display_name.clone(),
            role: user.role,
            company_id: user.company_id,
            api_key_hash: user.api_key_hash.clone(),
            created_at: Utc::now(),
            last_seen_at: None,
        };
        users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_last_seen(&self, id: &UserId) -> Result<(), DomainError> {
        if let Some(user) = self.users.write().unwrap().get_mut(id) {
            user.last_seen_at = Some(Utc::now());
        }
        Ok(())
    }
}

// ============================================================================
// In-Memory Product Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<HashMap<ProductId, Product>>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with a product for testing
    pub fn with_product(self, product: Product) -> Self {
        self.products.write().unwrap().insert(product.id, product);
        self
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, DomainError> {
        Ok(self.products.read().unwrap().get(id).cloned())
    }

    async fn find_by_material(&self, material: &str) -> Result<Option<Product>, DomainError> {
        let material = material.trim().to_uppercase();
        Ok(self
            .products
            .read()
            .unwrap()
            .values()
            .find(|p| p.material == material)
            .cloned())
    }

    async fn search(&self, query: Option<&str>, limit: u64) -> Result<Vec<Product>, DomainError> {
        let term = query
            .map(|q| q.trim().to_lowercase())
            .filter(|q| !q.is_empty());
        let mut products: Vec<Product> = self
            .products
            .read()
            .unwrap()
            .values()
            .filter(|p| p.active)
            .filter(|p| match &term {
                Some(t) => {
                    p.material.to_lowercase().contains(t)
                        || p.description.to_lowercase().contains(t)
                }
                None => true,
            })
            .cloned()
            .collect();
        products.sort_by(|a, b| a.material.cmp(&b.material));
        products.truncate(limit as usize);
        Ok(products)
    }

    async fn create(&self, product: &NewProduct) -> Result<Product, DomainError> {
        let mut products = self.products.write().unwrap();
        let material = product.material.trim().to_uppercase();
        if products.values().any(|p| p.material == material) {
            return Err(DomainError::AlreadyExists(format!("product {}", material)));
        }

        let created = Product {
            id: ProductId(Uuid::new_v4()),
            material,
            description: product.description.trim().to_string(),
            unit: product.unit.trim().to_uppercase(),
            list_price: product.list_price,
            currency: product.currency.trim().to_uppercase(),
            configurable: product.configurable,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        products.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(&self, id: &ProductId, update: &ProductUpdate) -> Result<Product, DomainError> {
        let mut products = self.products.write().unwrap();
        let product = products
            .get_mut(id)
            .ok_or_else(|| DomainError::NotFound(format!("Product {}", id)))?;

        if let Some(description) = &update.description {
            product.description = description.trim().to_string();
        }
        if let Some(unit) = &update.unit {
            product.unit = unit.trim().to_uppercase();
        }
        if let Some(price) = update.list_price {
            product.list_price = price;
        }
        if let Some(currency) = &update.currency {
            product.currency = currency.trim().to_uppercase();
        }
        if let Some(configurable) = update.configurable {
            product.configurable = configurable;
        }
        if let Some(active) = update.active {
            product.active = active;
        }
        product.updated_at = Utc::now();
        Ok(product.clone())
    }

    async fn delete(&self, id: &ProductId) -> Result<bool, DomainError> {
        Ok(self.products.write().unwrap().remove(id).is_some())
    }
}

// ============================================================================
// In-Memory Cart Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryCartRepository {
    carts: Arc<RwLock<HashMap<CartId, Cart>>>,
}

impl InMemoryCartRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CartRepository for InMemoryCartRepository {
    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<Cart>, DomainError> {
        let carts = self.carts.read().unwrap();
        Ok(carts.values().find(|c| &c.user_id == user_id).map(|c| {
            let mut cart = c.clone();
            cart.items.sort_by_key(|i| (i.position, i.created_at));
            cart
        }))
    }

    async fn create(
        &self,
        user_id: &UserId,
        company_id: Option<&CompanyId>,
    ) -> Result<Cart, DomainError> {
        let mut carts = self.carts.write().unwrap();
        if carts.values().any(|c| &c.user_id == user_id) {
            return Err(DomainError::AlreadyExists(format!("cart for user {}", user_id)));
        }

        let cart = Cart {
            id: CartId(Uuid::new_v4()),
            user_id: *user_id,
            company_id: company_id.copied(),
            items: vec![],
            updated_at: Utc::now(),
        };
        carts.insert(cart.id, cart.clone());
        Ok(cart)
    }

    async fn add_item(
        &self,
        cart_id: &CartId,
        item: &NewCartItem,
        position: i32,
    ) -> Result<CartItem, DomainError> {
        let mut carts = self.carts.write().unwrap();
        let cart = carts
            .get_mut(cart_id)
            .ok_or_else(|| DomainError::NotFound(format!("Cart {}", cart_id)))?;

        let line = CartItem {
            id: CartItemId(Uuid::new_v4()),
            material: item.material.trim().to_uppercase(),
            quantity: item.quantity,
            unit: item.unit.as_ref().map(|u| u.trim().to_uppercase()),
            plant: item.plant.as_ref().map(|p| p.trim().to_uppercase()),
            configuration: item.configuration.clone(),
            position,
            created_at: Utc::now(),
        };
        cart.items.push(line.clone());
        cart.updated_at = Utc::now();
        Ok(line)
    }

    async fn update_quantity(
        &self,
        cart_id: &CartId,
        item_id: &CartItemId,
        quantity: Decimal,
    ) -> Result<Option<CartItem>, DomainError> {
        let mut carts = self.carts.write().unwrap();
        let Some(cart) = carts.get_mut(cart_id) else {
            return Ok(None);
        };
        let Some(line) = cart.items.iter_mut().find(|i| &i.id == item_id) else {
            return Ok(None);
        };
        line.quantity = quantity;
        Ok(Some(line.clone()))
    }

    async fn remove_item(&self, cart_id: &CartId, item_id: &CartItemId) -> Result<bool, DomainError> {
        let mut carts = self.carts.write().unwrap();
        let Some(cart) = carts.get_mut(cart_id) else {
            return Ok(false);
        };
        let before = cart.items.len();
        cart.items.retain(|i| &i.id != item_id);
        Ok(cart.items.len() < before)
    }

    async fn clear(&self, cart_id: &CartId) -> Result<(), DomainError> {
        if let Some(cart) = self.carts.write().unwrap().get_mut(cart_id) {
            cart.items.clear();
            cart.updated_at = Utc::now();
        }
        Ok(())
    }
}

// ============================================================================
// In-Memory Order / Quote Repositories
// ============================================================================

#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: Arc<RwLock<Vec<Order>>>,
    failing: bool,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every write fails with a database error
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create(&self, order: &NewOrder) -> Result<Order, DomainError> {
        if self.failing {
            return Err(DomainError::Database("connection reset".to_string()));
        }
        let created = Order {
            id: OrderId(Uuid::new_v4()),
            company_id: order.company_id,
            user_id: order.user_id,
            sap_document: order.sap_document.clone(),
            status: order.status,
            purchase_order: order.purchase_order.clone(),
            ship_to: order.ship_to.clone(),
            requested_date: order.requested_date,
            net_value: order.net_value,
            currency: order.currency.clone(),
            lines: order.lines.clone(),
            messages: order.messages.clone(),
            created_at: Utc::now(),
        };
        self.orders.write().unwrap().push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError> {
        Ok(self
            .orders
            .read()
            .unwrap()
            .iter()
            .find(|o| &o.id == id)
            .cloned())
    }

    async fn list_by_company(
        &self,
        company_id: &CompanyId,
        limit: u64,
    ) -> Result<Vec<Order>, DomainError> {
        Ok(self
            .orders
            .read()
            .unwrap()
            .iter()
            .rev()
            .filter(|o| &o.company_id == company_id)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryQuoteRepository {
    quotes: Arc<RwLock<Vec<Quote>>>,
    failing: bool,
}

impl InMemoryQuoteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every write fails with a database error
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl QuoteRepository for InMemoryQuoteRepository {
    async fn create(&self, quote: &NewQuote) -> Result<Quote, DomainError> {
        if self.failing {
            return Err(DomainError::Database("connection reset".to_string()));
        }
        let created = Quote {
            id: QuoteId(Uuid::new_v4()),
            company_id: quote.company_id,
            user_id: quote.user_id,
            sap_document: quote.sap_document.clone(),
            status: quote.status,
            purchase_order: quote.purchase_order.clone(),
            ship_to: quote.ship_to.clone(),
            valid_from: quote.valid_from,
            valid_to: quote.valid_to,
            lines: quote.lines.clone(),
            messages: quote.messages.clone(),
            created_at: Utc::now(),
        };
        self.quotes.write().unwrap().push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: &QuoteId) -> Result<Option<Quote>, DomainError> {
        Ok(self
            .quotes
            .read()
            .unwrap()
            .iter()
            .find(|q| &q.id == id)
            .cloned())
    }

    async fn list_by_company(
        &self,
        company_id: &CompanyId,
        limit: u64,
    ) -> Result<Vec<Quote>, DomainError> {
        Ok(self
            .quotes
            .read()
            .unwrap()
            .iter()
            .rev()
            .filter(|q| &q.company_id == company_id)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

// ============================================================================
// In-Memory Session Cache
// ============================================================================

/// Session cache honouring expiry times
#[derive(Default)]
pub struct InMemorySessionCache {
    entries: Arc<RwLock<HashMap<String, (String, Instant)>>>,
}

impl InMemorySessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .unwrap()
            .values()
            .filter(|(_, expires)| *expires > now)
            .count()
    }
}

#[async_trait]
impl SessionCache for InMemorySessionCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let entries = self.entries.read().unwrap();
        Ok(entries
            .get(key)
            .filter(|(_, expires)| *expires > Instant::now())
            .map(|(value, _)| value.clone()))
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), CacheError> {
        let expires = Instant::now() + Duration::from_secs(ttl_secs);
        self.entries
            .write()
            .unwrap()
            .insert(key.to_string(), (value.to_string(), expires));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.write().unwrap().remove(key);
        Ok(())
    }
}

// ============================================================================
// Mock SAP Gateway
// ============================================================================

/// Scripted SAP gateway
///
/// Creates succeed with a fixed document number unless `rejecting` is set.
/// Simulations price every unit at 10 EUR. `unreachable` makes every call
/// fail with a 503.
pub struct MockSapGateway {
    document: String,
    rejection: Option<Vec<SapMessage>>,
    unreachable: bool,
    ship_to: Vec<String>,
    created_orders: Arc<RwLock<Vec<SalesDocumentRequest>>>,
    created_quotes: Arc<RwLock<Vec<SalesDocumentRequest>>>,
    partner_reads: Arc<AtomicUsize>,
}

impl Default for MockSapGateway {
    fn default() -> Self {
        Self {
            document: "0000012345".to_string(),
            rejection: None,
            unreachable: false,
            ship_to: vec![],
            created_orders: Arc::default(),
            created_quotes: Arc::default(),
            partner_reads: Arc::default(),
        }
    }
}

impl MockSapGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Document number handed out on create
    pub fn with_document(mut self, number: &str) -> Self {
        self.document = number.to_string();
        self
    }

    /// Reject creates and simulations with these messages
    pub fn rejecting(mut self, messages: Vec<SapMessage>) -> Self {
        self.rejection = Some(messages);
        self
    }

    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    pub fn with_ship_to(mut self, numbers: Vec<String>) -> Self {
        self.ship_to = numbers;
        self
    }

    pub fn created_orders(&self) -> Vec<SalesDocumentRequest> {
        self.created_orders.read().unwrap().clone()
    }

    pub fn created_quotes(&self) -> Vec<SalesDocumentRequest> {
        self.created_quotes.read().unwrap().clone()
    }

    pub fn partner_reads(&self) -> usize {
        self.partner_reads.load(Ordering::SeqCst)
    }

    fn check_reachable(&self) -> Result<(), SapError> {
        if self.unreachable {
            return Err(SapError::Http {
                status: 503,
                message: "Service unavailable".to_string(),
            });
        }
        Ok(())
    }

    fn create(&self, request: &SalesDocumentRequest) -> Result<SapResult, SapError> {
        self.check_reachable()?;
        if request.items.is_empty() {
            return Err(SapError::InvalidRequest("no items".to_string()));
        }
        Ok(match &self.rejection {
            Some(messages) => SapResult::failed(messages.clone()),
            None => SapResult::from_messages(
                Some(self.document.clone()),
                vec![SapMessage::new(
                    MessageSeverity::Success,
                    Some("V1/311".to_string()),
                    format!("Document {} has been saved", self.document),
                )],
            ),
        })
    }
}

#[async_trait]
impl SapGateway for MockSapGateway {
    async fn create_order(
        &self,
        _connection: &SapConnection,
        request: &SalesDocumentRequest,
    ) -> Result<SapResult, SapError> {
        let result = self.create(request)?;
        self.created_orders.write().unwrap().push(request.clone());
        Ok(result)
    }

    async fn create_quote(
        &self,
        _connection: &SapConnection,
        request: &SalesDocumentRequest,
    ) -> Result<SapResult, SapError> {
        let result = self.create(request)?;
        self.created_quotes.write().unwrap().push(request.clone());
        Ok(result)
    }

    async fn simulate_order(
        &self,
        _connection: &SapConnection,
        request: &SalesDocumentRequest,
    ) -> Result<Simulation, SapError> {
        self.check_reachable()?;
        if let Some(messages) = &self.rejection {
            return Ok(Simulation {
                success: false,
                items: vec![],
                net_value: Decimal::ZERO,
                currency: None,
                messages: messages.clone(),
            });
        }

        let items: Vec<SimulatedItem> = request
            .items
            .iter()
            .enumerate()
            .map(|(index, item)| SimulatedItem {
                item_number: ((index + 1) * 10).to_string(),
                material: item.material.clone(),
                quantity: item.quantity,
                net_value: item.quantity * Decimal::new(10, 0),
                currency: Some("EUR".to_string()),
            })
            .collect();
        Ok(Simulation {
            success: true,
            net_value: items.iter().map(|i| i.net_value).sum(),
            items,
            currency: Some("EUR".to_string()),
            messages: vec![],
        })
    }

    async fn list_sales_orders(
        &self,
        _connection: &SapConnection,
        _sold_to: &str,
        _top: u32,
    ) -> Result<Vec<SalesDocumentSummary>, SapError> {
        self.check_reachable()?;
        Ok(vec![SalesDocumentSummary {
            number: "4711".to_string(),
            doc_type: Some("OR".to_string()),
            created_on: Some(Utc::now().date_naive()),
            purchase_order: Some("PO-1".to_string()),
            net_value: Some(Decimal::new(12_500, 2)),
            currency: Some("EUR".to_string()),
            status: Some("A".to_string()),
            due_on: None,
        }])
    }

    async fn list_quotations(
        &self,
        _connection: &SapConnection,
        _sold_to: &str,
        _top: u32,
    ) -> Result<Vec<SalesDocumentSummary>, SapError> {
        self.check_reachable()?;
        Ok(vec![SalesDocumentSummary {
            number: "20000001".to_string(),
            doc_type: Some("AG".to_string()),
            created_on: Some(Utc::now().date_naive()),
            purchase_order: None,
            net_value: Some(Decimal::new(9_900, 2)),
            currency: Some("EUR".to_string()),
            status: None,
            due_on: None,
        }])
    }

    async fn list_deliveries(
        &self,
        _connection: &SapConnection,
        sold_to: &str,
        _top: u32,
    ) -> Result<Vec<Delivery>, SapError> {
        self.check_reachable()?;
        Ok(vec![Delivery {
            number: "80001234".to_string(),
            delivery_date: Some(Utc::now().date_naive()),
            goods_issue_date: None,
            goods_movement_status: Some("A".to_string()),
            ship_to: Some(sold_to.to_string()),
            items: vec![DeliveryItem {
                item_number: "10".to_string(),
                material: "MAT-1".to_string(),
                quantity: Decimal::new(2, 0),
                unit: Some("EA".to_string()),
                reference_document: Some("4711".to_string()),
            }],
        }])
    }

    async fn list_invoices(
        &self,
        _connection: &SapConnection,
        _sold_to: &str,
        _top: u32,
    ) -> Result<Vec<Invoice>, SapError> {
        self.check_reachable()?;
        Ok(vec![Invoice {
            number: "90001234".to_string(),
            billing_date: Some(Utc::now().date_naive()),
            billing_type: Some("F2".to_string()),
            net_amount: Some(Decimal::new(12_500, 2)),
            tax_amount: Some(Decimal::new(2_375, 2)),
            currency: Some("EUR".to_string()),
            cancelled: false,
        }])
    }

    async fn get_partner(
        &self,
        _connection: &SapConnection,
        number: &str,
    ) -> Result<Partner, SapError> {
        self.check_reachable()?;
        self.partner_reads.fetch_add(1, Ordering::SeqCst);
        if number == "MISSING" {
            return Err(SapError::OData {
                status: 404,
                code: Some("/IWBEP/CM_MGW_RT/020".to_string()),
                message: "Resource not found".to_string(),
                details: vec![],
            });
        }

        Ok(Partner {
            number: number.to_string(),
            name: format!("Partner {}", number),
            category: Some("2".to_string()),
            addresses: vec![Address {
                id: "1".to_string(),
                street: Some("Industriestrasse".to_string()),
                house_number: Some("7".to_string()),
                postal_code: Some("10115".to_string()),
                city: Some("Berlin".to_string()),
                region: None,
                country: Some("DE".to_string()),
            }],
        })
    }

    async fn list_ship_to_parties(
        &self,
        _connection: &SapConnection,
        _sold_to: &str,
        _sales_org: &str,
        _distribution_channel: &str,
        _division: &str,
    ) -> Result<Vec<String>, SapError> {
        self.check_reachable()?;
        Ok(self.ship_to.clone())
    }

    async fn ping(&self, _connection: &SapConnection) -> Result<(), SapError> {
        self.check_reachable()
    }
}

// ============================================================================
// Mail and completion mocks
// ============================================================================

/// Mailer that records every message
#[derive(Default)]
pub struct RecordingMailer {
    sent: Arc<RwLock<Vec<EmailMessage>>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.read().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        self.sent.write().unwrap().push(message.clone());
        Ok(())
    }
}

/// Wait until the background mail task delivered `count` messages
pub async fn wait_for_mail(mailer: &RecordingMailer, count: usize) -> Vec<EmailMessage> {
    for _ in 0..100 {
        let sent = mailer.sent();
        if sent.len() >= count {
            return sent;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    mailer.sent()
}

#[derive(Clone)]
enum CompletionBehavior {
    Answer(String),
    Fail,
    Unconfigured,
}

/// Completion client with a canned answer
#[derive(Clone)]
pub struct MockCompletionClient {
    behavior: CompletionBehavior,
    prompts: Arc<RwLock<Vec<String>>>,
}

impl MockCompletionClient {
    fn with(behavior: CompletionBehavior) -> Self {
        Self {
            behavior,
            prompts: Arc::default(),
        }
    }

    pub fn answering(text: &str) -> Self {
        Self::with(CompletionBehavior::Answer(text.to_string()))
    }

    pub fn failing() -> Self {
        Self::with(CompletionBehavior::Fail)
    }

    pub fn unconfigured() -> Self {
        Self::with(CompletionBehavior::Unconfigured)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.read().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete(&self, _system: &str, prompt: &str) -> Result<String, CompletionError> {
        self.prompts.write().unwrap().push(prompt.to_string());
        match &self.behavior {
            CompletionBehavior::Answer(text) => Ok(text.clone()),
            CompletionBehavior::Fail => Err(CompletionError::Api {
                status: 500,
                message: "upstream error".to_string(),
            }),
            CompletionBehavior::Unconfigured => Err(CompletionError::NotConfigured),
        }
    }
}
