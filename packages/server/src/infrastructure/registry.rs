//! In-memory user registry.
//!
//! A `HashMap` keyed by `ConnectionId` behind a single `tokio::sync::Mutex`.
//! Every operation, traversals included, runs inside that one critical section.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ConnectionId, OnlineUsers, OutboundChannel, RegisteredConnection, RegistryError, UserName,
    UserRegistry, UsernamePolicy,
};

pub struct InMemoryUserRegistry {
    entries: Mutex<HashMap<ConnectionId, RegisteredConnection>>,
    policy: UsernamePolicy,
}

impl InMemoryUserRegistry {
    pub fn new(policy: UsernamePolicy) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            policy,
        }
    }
}

impl Default for InMemoryUserRegistry {
    fn default() -> Self {
        Self::new(UsernamePolicy::default())
    }
}

#[async_trait]
impl UserRegistry for InMemoryUserRegistry {
    async fn try_register(
        &self,
        connection_id: ConnectionId,
        user_name: UserName,
        outbound: OutboundChannel,
    ) -> Result<(), RegistryError> {
        let mut entries = self.entries.lock().await;

        if entries.contains_key(&connection_id) {
            return Err(RegistryError::AlreadyRegistered(connection_id));
        }
        if entries
            .values()
            .any(|entry| self.policy.conflicts(&entry.user_name, &user_name))
        {
            return Err(RegistryError::UserNameTaken(user_name.into_string()));
        }

        tracing::debug!(
            "Connection {} registered as '{}' ({} online)",
            connection_id,
            user_name,
            entries.len() + 1
        );
        entries.insert(
            connection_id,
            RegisteredConnection {
                connection_id,
                user_name,
                outbound,
            },
        );
        Ok(())
    }

    async fn unregister(&self, connection_id: &ConnectionId) -> Option<UserName> {
        let mut entries = self.entries.lock().await;
        let removed = entries.remove(connection_id).map(|entry| entry.user_name);
        if let Some(user_name) = &removed {
            tracing::debug!(
                "Connection {} ('{}') unregistered ({} online)",
                connection_id,
                user_name,
                entries.len()
            );
        }
        removed
    }

    async fn snapshot(&self) -> OnlineUsers {
        let entries = self.entries.lock().await;
        let mut user_names: Vec<UserName> =
            entries.values().map(|entry| entry.user_name.clone()).collect();
        user_names.sort();

        OnlineUsers {
            count: user_names.len(),
            user_names,
        }
    }

    async fn for_each_connection(
        &self,
        visitor: &mut (dyn for<'a> FnMut(&'a RegisteredConnection) + Send),
    ) {
        let entries = self.entries.lock().await;
        for entry in entries.values() {
            visitor(entry);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn name(value: &str) -> UserName {
        UserName::new(value.to_string()).unwrap()
    }

    fn outbound() -> OutboundChannel {
        let (tx, _rx) = mpsc::channel(1);
        tx
    }

    #[tokio::test]
    async fn test_try_register_success() {
        // テスト項目: 新しい接続をユーザー名付きで登録できる
        // given (前提条件):
        let registry = InMemoryUserRegistry::default();
        let connection_id = ConnectionId::generate();

        // when (操作):
        let result = registry
            .try_register(connection_id, name("alice"), outbound())
            .await;

        // then (期待する結果):
        assert!(result.is_ok());
        let snapshot = registry.snapshot().await;
        assert_eq!(snapshot.count, 1);
        assert_eq!(snapshot.user_names, vec![name("alice")]);
    }

    #[tokio::test]
    async fn test_try_register_duplicate_name_is_rejected() {
        // テスト項目: 同じユーザー名での登録は拒否され、レジストリは変化しない
        // given (前提条件):
        let registry = InMemoryUserRegistry::default();
        registry
            .try_register(ConnectionId::generate(), name("alice"), outbound())
            .await
            .unwrap();

        // when (操作):
        let result = registry
            .try_register(ConnectionId::generate(), name("alice"), outbound())
            .await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(RegistryError::UserNameTaken("alice".to_string()))
        );
        assert_eq!(registry.snapshot().await.count, 1);
    }

    #[tokio::test]
    async fn test_try_register_prefix_of_registered_name_is_rejected() {
        // テスト項目: 既定の Prefix ポリシーでは登録済みの名前の接頭辞は拒否される
        // given (前提条件):
        let registry = InMemoryUserRegistry::new(UsernamePolicy::Prefix);
        registry
            .try_register(ConnectionId::generate(), name("alice"), outbound())
            .await
            .unwrap();

        // when (操作):
        let result = registry
            .try_register(ConnectionId::generate(), name("al"), outbound())
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(RegistryError::UserNameTaken("al".to_string())));
    }

    #[tokio::test]
    async fn test_try_register_prefix_is_accepted_with_exact_policy() {
        // テスト項目: Exact ポリシーでは接頭辞の名前も登録できる
        // given (前提条件):
        let registry = InMemoryUserRegistry::new(UsernamePolicy::Exact);
        registry
            .try_register(ConnectionId::generate(), name("alice"), outbound())
            .await
            .unwrap();

        // when (操作):
        let result = registry
            .try_register(ConnectionId::generate(), name("al"), outbound())
            .await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(registry.snapshot().await.user_names, vec![name("al"), name("alice")]);
    }

    #[tokio::test]
    async fn test_try_register_same_connection_twice_is_rejected() {
        // テスト項目: 同じ接続を二重に登録することはできない
        // given (前提条件):
        let registry = InMemoryUserRegistry::default();
        let connection_id = ConnectionId::generate();
        registry
            .try_register(connection_id, name("alice"), outbound())
            .await
            .unwrap();

        // when (操作):
        let result = registry
            .try_register(connection_id, name("bob"), outbound())
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(RegistryError::AlreadyRegistered(connection_id)));
        assert_eq!(registry.snapshot().await.user_names, vec![name("alice")]);
    }

    #[tokio::test]
    async fn test_registered_names_stay_distinct() {
        // テスト項目: どの登録順でも同時に登録されている名前が重複しない
        // given (前提条件):
        let registry = InMemoryUserRegistry::default();
        let attempts = ["bob", "alice", "bob", "al", "alice", "alicia", "b", "carol"];

        // when (操作):
        for attempt in attempts {
            let _ = registry
                .try_register(ConnectionId::generate(), name(attempt), outbound())
                .await;
        }

        // then (期待する結果):
        let snapshot = registry.snapshot().await;
        let mut deduped = snapshot.user_names.clone();
        deduped.dedup();
        assert_eq!(deduped, snapshot.user_names);
        assert_eq!(
            snapshot.user_names,
            vec![name("alice"), name("alicia"), name("bob"), name("carol")]
        );
    }

    #[tokio::test]
    async fn test_unregister_is_idempotent() {
        // テスト項目: 登録解除は何度呼んでも安全で、2回目以降は何もしない
        // given (前提条件):
        let registry = InMemoryUserRegistry::default();
        let connection_id = ConnectionId::generate();
        registry
            .try_register(connection_id, name("alice"), outbound())
            .await
            .unwrap();

        // when (操作):
        let first = registry.unregister(&connection_id).await;
        let second = registry.unregister(&connection_id).await;

        // then (期待する結果):
        assert_eq!(first, Some(name("alice")));
        assert_eq!(second, None);
        assert_eq!(registry.snapshot().await.count, 0);
    }

    #[tokio::test]
    async fn test_unregister_frees_the_name() {
        // テスト項目: 登録解除後は同じ名前で再登録できる
        // given (前提条件):
        let registry = InMemoryUserRegistry::default();
        let connection_id = ConnectionId::generate();
        registry
            .try_register(connection_id, name("alice"), outbound())
            .await
            .unwrap();
        registry.unregister(&connection_id).await;

        // when (操作):
        let result = registry
            .try_register(ConnectionId::generate(), name("alice"), outbound())
            .await;

        // then (期待する結果):
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_for_each_connection_visits_every_entry() {
        // テスト項目: 走査で全ての登録済み接続が1回ずつ訪問される
        // given (前提条件):
        let registry = InMemoryUserRegistry::default();
        for user in ["alice", "bob", "carol"] {
            registry
                .try_register(ConnectionId::generate(), name(user), outbound())
                .await
                .unwrap();
        }

        // when (操作):
        let mut visited = Vec::new();
        registry
            .for_each_connection(&mut |entry| visited.push(entry.user_name.clone()))
            .await;

        // then (期待する結果):
        visited.sort();
        assert_eq!(visited, vec![name("alice"), name("bob"), name("carol")]);
    }
}
