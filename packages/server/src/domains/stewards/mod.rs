//! Stewards domain - moderation authority and its grants

pub mod activities;
pub mod data;
pub mod models;

pub use data::StewardGrantData;
pub use models::StewardGrant;
