//! User registry interface.
//!
//! The registry is the single source of truth for "who is online". All
//! mutation and all traversal go through these operations; implementations
//! serialize them behind one lock.

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;

use super::{ConnectionId, RegistryError, UserName};

/// Outbound queue of a connection, drained by that connection's writer task
pub type OutboundChannel = mpsc::Sender<Bytes>;

/// A registry entry as seen by a traversal
#[derive(Debug, Clone)]
pub struct RegisteredConnection {
    pub connection_id: ConnectionId,
    pub user_name: UserName,
    pub outbound: OutboundChannel,
}

/// Point-in-time copy of the online users
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnlineUsers {
    pub count: usize,
    /// Sorted by name
    pub user_names: Vec<UserName>,
}

#[async_trait]
pub trait UserRegistry: Send + Sync {
    /// Register an authenticated connection
    ///
    /// Fails without mutating anything when the name conflicts with a
    /// registered one or when the connection is already registered.
    async fn try_register(
        &self,
        connection_id: ConnectionId,
        user_name: UserName,
        outbound: OutboundChannel,
    ) -> Result<(), RegistryError>;

    /// Remove a connection, returning its name. No-op when absent.
    async fn unregister(&self, connection_id: &ConnectionId) -> Option<UserName>;

    async fn snapshot(&self) -> OnlineUsers;

    /// Visit every registered connection while holding the registry lock
    async fn for_each_connection(
        &self,
        visitor: &mut (dyn for<'a> FnMut(&'a RegisteredConnection) + Send),
    );
}
