// Common types and utilities shared across the application

pub mod auth;
pub mod entity_ids;
pub mod error;
pub mod id;
pub mod pagination;
pub mod sql;

pub use auth::{authorize, Actor, AuthError, GrantScope, GrantSource, StewardCapability};
pub use entity_ids::*;
pub use error::GovernanceError;
pub use id::Id;
pub use pagination::Page;
