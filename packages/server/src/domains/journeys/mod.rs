//! Journeys - the subjects that contributions document
//!
//! Only what governance needs lives here: who owns a journey and which
//! viewers the owner trusts with family/connections tiers.

pub mod models;

pub use models::{Journey, TrustedViewer, ViewerTier};
