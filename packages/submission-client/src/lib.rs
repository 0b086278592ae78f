//! Client side of journey contributions.
//!
//! Submissions that cannot reach the server are kept in a durable local queue
//! and replayed, in order, once connectivity returns. Moderation decisions are
//! shown optimistically and rolled back when the server refuses them.

pub mod config;
pub mod delivery;
pub mod error;
pub mod graphql;
pub mod queue;
pub mod review_cache;
pub mod submitter;

pub use config::ClientConfig;
pub use delivery::{
    ContactDraft, ContributionDraft, DeliveryReceipt, ItemView, ReviewDecision, ReviewTransport,
    SizeReducer, SubmissionKind, SubmissionTransport,
};
pub use error::ClientError;
pub use graphql::GraphQLClient;
pub use queue::{OfflineQueue, QueueError, QueuedSubmission, MAX_RETRIES};
pub use review_cache::{apply_decision, CacheError, DisplayedItem, ReviewCache};
pub use submitter::{DrainReport, SubmitOutcome, Submitter};
