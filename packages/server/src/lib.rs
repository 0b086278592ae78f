// Journey Contribution Governance - API Core
//
// Moderation gate for contributions to historical journeys: intake, review
// queue, steward authority, the decision engine and its audit ledger.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
