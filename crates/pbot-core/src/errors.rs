use crate::{domain::UserId, security::Action};

/// Core error type for the bot.
///
/// Adapter crates map their specific errors into this type so the router can
/// handle transport failures consistently.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Failure of a single call to the remote text-generation service.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("generation request failed: {0}")]
    Transport(String),

    #[error("generation request timed out")]
    Timeout,

    #[error("generation endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed generation response: {0}")]
    MalformedResponse(String),
}

/// Text supplied while a pending add/remove form was waiting for a numeric id.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid user id: {input:?}")]
pub struct InvalidIdentifierInput {
    pub input: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("user {requester:?} is not allowed to {action:?}")]
pub struct AuthorizationDenied {
    pub requester: UserId,
    pub action: Action,
}

/// Mirroring an inbound message to the owner's private chat failed.
#[derive(Debug, thiserror::Error)]
#[error("audit mirror to owner {owner:?} failed: {source}")]
pub struct AuditLogDeliveryFailure {
    pub owner: UserId,
    #[source]
    pub source: Error,
}
