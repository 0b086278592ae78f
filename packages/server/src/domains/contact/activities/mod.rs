use tracing::info;

use crate::common::{GovernanceError, JourneyId};
use crate::domains::contact::models::ContactMessage;
use crate::domains::journeys::Journey;
use crate::kernel::ServerDeps;

const MAX_NAME_CHARS: usize = 200;
const MAX_MESSAGE_CHARS: usize = 5_000;

#[derive(Debug, Clone)]
pub struct NewContactMessage {
    pub journey_id: Option<JourneyId>,
    pub sender_name: String,
    pub sender_email: String,
    pub body: String,
}

/// Record a contact-form message. Open to anonymous senders.
pub async fn send_contact_message(
    input: NewContactMessage,
    deps: &ServerDeps,
) -> Result<ContactMessage, GovernanceError> {
    let name = input.sender_name.trim();
    let email = input.sender_email.trim();
    let body = input.body.trim();

    validate(name, email, body)?;
    if let Some(journey_id) = input.journey_id {
        if Journey::find_by_id(journey_id, &deps.db_pool).await?.is_none() {
            return Err(GovernanceError::validation(format!(
                "Journey {} does not exist",
                journey_id
            )));
        }
    }

    let message =
        ContactMessage::create(input.journey_id, name, email, body, &deps.db_pool).await?;

    info!(contact_message_id = %message.id, "Contact message received");

    Ok(message)
}

fn validate(name: &str, email: &str, body: &str) -> Result<(), GovernanceError> {
    if name.is_empty() || name.chars().count() > MAX_NAME_CHARS {
        return Err(GovernanceError::validation(format!(
            "sender_name must be 1 to {} characters",
            MAX_NAME_CHARS
        )));
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => {}
        _ => return Err(GovernanceError::validation("sender_email is not an email address")),
    }
    if body.is_empty() || body.chars().count() > MAX_MESSAGE_CHARS {
        return Err(GovernanceError::validation(format!(
            "message must be 1 to {} characters",
            MAX_MESSAGE_CHARS
        )));
    }
    Ok(())
}
