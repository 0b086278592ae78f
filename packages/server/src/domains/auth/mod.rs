//! Auth domain - session tokens
//!
//! The identity provider issues signed tokens; this service only verifies
//! them per request. Authority to moderate is a separate concern handled by
//! the stewards domain.

pub mod jwt;

pub use jwt::{Claims, JwtService, SessionError, SessionIdentity};
