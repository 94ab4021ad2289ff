//! Broadcaster interface.

use async_trait::async_trait;
use parlor_shared::protocol::TextMessageData;

use super::{BroadcastError, ConnectionId};

/// Outcome of one fan-out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Recipients whose outbound queue accepted the envelope
    pub delivered: usize,
    /// Recipients skipped because their queue was full or closed
    pub failed: usize,
}

/// Delivers envelopes to the connections currently in the registry
///
/// Each operation builds its envelope once and observes one consistent view
/// of the registry for the whole fan-out. A recipient that cannot take the
/// envelope is logged and skipped; it never aborts delivery to the rest.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Broadcaster: Send + Sync {
    /// Send a `Notification` to every registered connection
    async fn notify_all(&self, text: &str) -> Result<DeliveryReport, BroadcastError>;

    /// Send a `SendMessage` to every registered connection except `sender`
    async fn relay_to_others(
        &self,
        sender: &ConnectionId,
        message: TextMessageData,
    ) -> Result<DeliveryReport, BroadcastError>;
}
