//! Contact domain - messages from the public contact form

pub mod activities;
pub mod data;
pub mod models;

pub use data::{ContactMessageData, SendContactMessageInput};
pub use models::ContactMessage;
