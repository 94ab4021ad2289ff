//! Message formatting utilities for client display.

use parlor_shared::{protocol::OnlineUsersData, time::timestamp_to_local_clock};

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format the online user list, marking the current user
    ///
    /// # Arguments
    ///
    /// * `online_users` - The `OnlineUsers` payload from the server
    /// * `current_user_name` - The current user's name (to mark as "me")
    pub fn format_online_users(online_users: &OnlineUsersData, current_user_name: &str) -> String {
        let mut output = String::new();
        output.push_str("\n\n============================================================\n");
        output.push_str(&format!("Online users ({}):\n", online_users.count));

        if online_users.user_names.is_empty() {
            output.push_str("(No users)\n");
        } else {
            for user_name in &online_users.user_names {
                let me_suffix = if user_name == current_user_name {
                    " (me)"
                } else {
                    ""
                };
                output.push_str(&format!("{}{}\n", user_name, me_suffix));
            }
        }

        output.push_str("============================================================\n");
        output
    }

    /// Format a relayed chat message
    ///
    /// # Arguments
    ///
    /// * `from` - The user name stamped by the server
    /// * `text` - The message text
    /// * `received_at` - Unix timestamp when the message arrived (milliseconds)
    pub fn format_chat_message(from: &str, text: &str, received_at: i64) -> String {
        format!(
            "\n[{}] @{}: {}\n",
            timestamp_to_local_clock(received_at),
            from,
            text
        )
    }

    /// Format a server notification
    pub fn format_notification(notification_message: &str, received_at: i64) -> String {
        format!(
            "\n[{}] * {}\n",
            timestamp_to_local_clock(received_at),
            notification_message
        )
    }

    /// Format an error sent by the server
    pub fn format_error(error_text: &str) -> String {
        format!("\n! server error: {}\n", error_text)
    }

    /// Format an error raised by the client itself
    pub fn format_local_error(error_text: &str) -> String {
        format!("\n! message not sent: {}\n", error_text)
    }

    /// Format a confirmation message after sending
    pub fn format_sent_confirmation(sent_at: i64) -> String {
        format!("sent at {}\n", timestamp_to_local_clock(sent_at))
    }
}
