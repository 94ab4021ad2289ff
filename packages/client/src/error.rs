//! Error types for the chat client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Another user holds this name, or a name it conflicts with
    #[error("User name '{0}' is already in use")]
    UserNameTaken(String),

    /// The server has no free slot
    #[error("Server is full: {0}")]
    ServerFull(String),

    /// Any other rejection sent by the server during login
    #[error("Rejected by server: {0}")]
    Rejected(String),

    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),
}
