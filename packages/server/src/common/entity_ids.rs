//! Typed ID definitions for the governance entities.
//!
//! ```rust
//! use server_core::common::{ContributionId, MemberId};
//!
//! let owner: MemberId = MemberId::new();
//! let item: ContributionId = ContributionId::new();
//! # let _ = (owner, item);
//! ```

pub use super::id::Id;

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for Member entities (contributors, stewards, viewers).
pub struct Member;

/// Marker type for Journey entities (the person, club or event being documented).
pub struct Journey;

/// Marker type for ContributionItem entities.
pub struct Contribution;

/// Marker type for StewardGrant entities.
pub struct StewardGrant;

/// Marker type for AuditEntry entities.
pub struct AuditEntry;

/// Marker type for ContactMessage entities.
pub struct ContactMessage;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

/// Typed ID for Member entities.
pub type MemberId = Id<Member>;

/// Typed ID for Journey entities.
pub type JourneyId = Id<Journey>;

/// Typed ID for ContributionItem entities.
pub type ContributionId = Id<Contribution>;

/// Typed ID for StewardGrant entities.
pub type GrantId = Id<StewardGrant>;

/// Typed ID for AuditEntry entities.
pub type AuditEntryId = Id<AuditEntry>;

/// Typed ID for ContactMessage entities.
pub type ContactMessageId = Id<ContactMessage>;
