//! Domain errors.

use parlor_shared::protocol::CodecError;
use thiserror::Error;

use super::value_object::ConnectionId;

/// Value object validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("user name must not be empty")]
    EmptyUserName,
}

/// User registry errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The name conflicts with a registered user under the active policy
    #[error("user with this username is already logged in")]
    UserNameTaken(String),

    /// The connection already has a registry entry
    #[error("connection {0} is already registered")]
    AlreadyRegistered(ConnectionId),
}

/// Broadcast errors
///
/// Per-recipient delivery failures are never reported here; only failures
/// that prevent the fan-out from starting at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BroadcastError {
    #[error("failed to build envelope: {0}")]
    Envelope(#[from] CodecError),
}
