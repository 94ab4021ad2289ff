//! Domain logic for client-side operations.
//!
//! This module contains pure functions that implement business logic
//! without side effects, making them easy to test.

use crate::error::ClientError;

pub const QUIT_COMMAND: &str = "/quit";
pub const USERS_COMMAND: &str = "/users";

const USER_NAME_TAKEN_TEXT: &str = "already logged in";
const SERVER_FULL_TEXT: &str = "maximum number of users";

/// One line of user input, interpreted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    ListUsers,
    Say(String),
}

/// Interpret a line typed by the user; blank lines yield `None`
pub fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    match line {
        "" => None,
        QUIT_COMMAND => Some(Command::Quit),
        USERS_COMMAND => Some(Command::ListUsers),
        text => Some(Command::Say(text.to_string())),
    }
}

/// Map an `Error` received while logging in to the matching client error
///
/// # Arguments
///
/// * `error_text` - The `error_text` sent by the server
/// * `user_name` - The name this client tried to log in with
pub fn classify_rejection(error_text: &str, user_name: &str) -> ClientError {
    if error_text.contains(USER_NAME_TAKEN_TEXT) {
        ClientError::UserNameTaken(user_name.to_string())
    } else if error_text.contains(SERVER_FULL_TEXT) {
        ClientError::ServerFull(error_text.to_string())
    } else {
        ClientError::Rejected(error_text.to_string())
    }
}

/// Check if the client should exit immediately based on the error type.
///
/// Anything the server rejected on purpose would be rejected again.
pub fn should_exit_immediately(error: &ClientError) -> bool {
    !matches!(error, ClientError::ConnectionError(_))
}

/// Check if the client should attempt to reconnect.
///
/// # Arguments
///
/// * `error` - The client error that occurred
/// * `current_attempt` - The current reconnection attempt count (0-indexed)
/// * `max_attempts` - The maximum number of reconnection attempts allowed
pub fn should_attempt_reconnect(
    error: &ClientError,
    current_attempt: u32,
    max_attempts: u32,
) -> bool {
    // Don't reconnect if the error requires immediate exit
    if should_exit_immediately(error) {
        return false;
    }

    // Don't reconnect if we've exhausted all attempts
    current_attempt < max_attempts
}
