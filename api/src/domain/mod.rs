//! Domain layer
//!
//! Portal and SAP document types plus the ports they are persisted and
//! transmitted through. No I/O happens here.
//! - `entities`: companies, users, catalog, carts, orders/quotes, SAP shapes
//! - `ports`: repository, SAP gateway, cache, mail and completion traits

pub mod entities;
pub mod ports;
