//! Contribution activities - business logic functions
//!
//! GraphQL resolvers call these directly with an explicit `Actor`.

pub mod decisions;
pub mod intake;
pub mod queue;
pub mod responses;
pub mod visibility;

pub use decisions::*;
pub use intake::{submit_contribution, NewContribution};
pub use queue::*;
pub use responses::*;
pub use visibility::*;
