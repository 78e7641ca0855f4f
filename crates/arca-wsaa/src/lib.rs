//! WSAA authentication subsystem.
//!
//! Exchanges a CMS-signed login ticket request for a time-limited access
//! ticket, and caches tickets per downstream service so the expensive
//! sign-and-exchange handshake runs only when a fresh ticket is missing.

mod cms;
mod error;
mod keys;
mod login;
mod service;
#[cfg(test)]
mod testutil;
mod ticket;
mod transport;

pub use error::WsaaError;
pub use keys::SigningMaterial;
pub use login::LoginTicketRequest;
pub use service::AuthService;
pub use ticket::{AccessTicket, TicketCache, TICKET_EXPIRY_SKEW, TICKET_VALIDITY};
pub use transport::{LoginCredentials, LoginTransport, SoapLoginTransport};

/// Result alias for authentication operations.
pub type Result<T> = std::result::Result<T, WsaaError>;
