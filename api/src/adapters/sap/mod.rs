//! SAP adapter
//!
//! - `session`: Basic auth, CSRF handshake and cached CSRF sessions
//! - `payload`: sales document requests to RFC / OData payloads
//! - `response`: OData, BAPI and XML answers to JSON, messages and errors
//! - `odata` / `rfc`: transports for the two SAP entry points
//! - `gateway`: the `SapGateway` port implementation

pub mod gateway;
pub mod odata;
pub mod payload;
pub mod response;
pub mod rfc;
pub mod session;

pub use gateway::SapGatewayImpl;
