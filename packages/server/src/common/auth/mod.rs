/// Moderation authority for the journeys archive
///
/// Authority is never read from a token or a previous response. Every
/// state-changing action re-derives the caller's grants from the grant store:
///
/// ```rust,ignore
/// use crate::common::auth::{Actor, StewardCapability};
///
/// let scope = actor
///     .can(StewardCapability::ModerateJourney(item.journey_id))
///     .check(&grants)
///     .await?;
/// ```

mod builder;
mod capability;
mod errors;

pub use builder::{authorize, Actor, CapabilityBuilder, GrantSource};
pub use capability::{GrantScope, StewardCapability};
pub use errors::AuthError;
