//! Contributions domain - intake, review queue and the decision engine

pub mod activities;
pub mod data;
pub mod machines;
pub mod models;
pub mod payload;

pub use data::{ContributionData, ReviewQueueData, ReviewQueueFilterInput, SubmitContributionInput};
pub use machines::{next_status, ReviewAction, Transition};
pub use models::{Contribution, ContributionStatus, ContributionType, Visibility};
pub use payload::IntakeLimits;
