//! Broadcaster backed by the user registry.
//!
//! The envelope is encoded once and pushed onto each recipient's outbound
//! queue with `try_send` from inside `for_each_connection`, so the fan-out
//! sees one consistent registry view and never waits on a slow peer.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parlor_shared::protocol::{Message, TextMessageData, encode};
use tokio::sync::mpsc::error::TrySendError;

use crate::domain::{
    BroadcastError, Broadcaster, ConnectionId, DeliveryReport, RegisteredConnection,
    UserRegistry,
};

pub struct RegistryBroadcaster {
    registry: Arc<dyn UserRegistry>,
}

impl RegistryBroadcaster {
    pub fn new(registry: Arc<dyn UserRegistry>) -> Self {
        Self { registry }
    }

    async fn fan_out(&self, frame: Bytes, exclude: Option<&ConnectionId>) -> DeliveryReport {
        let mut report = DeliveryReport::default();

        self.registry
            .for_each_connection(&mut |entry: &RegisteredConnection| {
                if exclude == Some(&entry.connection_id) {
                    return;
                }
                match entry.outbound.try_send(frame.clone()) {
                    Ok(()) => report.delivered += 1,
                    Err(TrySendError::Full(_)) => {
                        report.failed += 1;
                        tracing::warn!(
                            "Outbound queue of '{}' ({}) is full; message dropped",
                            entry.user_name,
                            entry.connection_id
                        );
                    }
                    Err(TrySendError::Closed(_)) => {
                        report.failed += 1;
                        tracing::warn!(
                            "Connection of '{}' ({}) is closed; message dropped",
                            entry.user_name,
                            entry.connection_id
                        );
                    }
                }
            })
            .await;

        report
    }
}

#[async_trait]
impl Broadcaster for RegistryBroadcaster {
    async fn notify_all(&self, text: &str) -> Result<DeliveryReport, BroadcastError> {
        let frame = encode(&Message::notification(text))?;
        let report = self.fan_out(frame, None).await;
        tracing::debug!(
            "Notification delivered to {} connection(s), {} failed",
            report.delivered,
            report.failed
        );
        Ok(report)
    }

    async fn relay_to_others(
        &self,
        sender: &ConnectionId,
        message: TextMessageData,
    ) -> Result<DeliveryReport, BroadcastError> {
        let frame = encode(&Message::SendMessage(message))?;
        let report = self.fan_out(frame, Some(sender)).await;
        tracing::debug!(
            "Message from {} relayed to {} connection(s), {} failed",
            sender,
            report.delivered,
            report.failed
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{OutboundChannel, UserName},
        infrastructure::InMemoryUserRegistry,
    };
    use parlor_shared::protocol::decode;
    use tokio::sync::mpsc;

    fn create_test_broadcaster() -> (RegistryBroadcaster, Arc<InMemoryUserRegistry>) {
        let registry = Arc::new(InMemoryUserRegistry::default());
        let broadcaster = RegistryBroadcaster::new(registry.clone());
        (broadcaster, registry)
    }

    async fn register(
        registry: &InMemoryUserRegistry,
        user: &str,
        outbound: OutboundChannel,
    ) -> ConnectionId {
        let connection_id = ConnectionId::generate();
        registry
            .try_register(
                connection_id,
                UserName::new(user.to_string()).unwrap(),
                outbound,
            )
            .await
            .unwrap();
        connection_id
    }

    #[tokio::test]
    async fn test_notify_all_reaches_every_connection() {
        // テスト項目: 通知は登録済みの全接続に届く
        // given (前提条件):
        let (broadcaster, registry) = create_test_broadcaster();
        let (tx1, mut rx1) = mpsc::channel(4);
        let (tx2, mut rx2) = mpsc::channel(4);
        register(&registry, "alice", tx1).await;
        register(&registry, "bob", tx2).await;

        // when (操作):
        let report = broadcaster.notify_all("server restarting").await.unwrap();

        // then (期待する結果):
        assert_eq!(report, DeliveryReport { delivered: 2, failed: 0 });
        let expected = Ok(Message::notification("server restarting"));
        assert_eq!(decode(&rx1.recv().await.unwrap()), expected);
        assert_eq!(decode(&rx2.recv().await.unwrap()), expected);
    }

    #[tokio::test]
    async fn test_relay_to_others_skips_sender() {
        // テスト項目: リレーは送信者自身には届かない
        // given (前提条件):
        let (broadcaster, registry) = create_test_broadcaster();
        let (tx_alice, mut rx_alice) = mpsc::channel(4);
        let (tx_bob, mut rx_bob) = mpsc::channel(4);
        let (tx_carol, mut rx_carol) = mpsc::channel(4);
        let alice = register(&registry, "alice", tx_alice).await;
        register(&registry, "bob", tx_bob).await;
        register(&registry, "carol", tx_carol).await;

        // when (操作):
        let message = TextMessageData {
            user_name: "alice".to_string(),
            text_data: "hi".to_string(),
        };
        let report = broadcaster.relay_to_others(&alice, message).await.unwrap();

        // then (期待する結果):
        assert_eq!(report.delivered, 2);
        let expected = Ok(Message::send_message("alice", "hi"));
        assert_eq!(decode(&rx_bob.recv().await.unwrap()), expected);
        assert_eq!(decode(&rx_carol.recv().await.unwrap()), expected);
        assert!(rx_alice.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_relay_with_only_sender_registered() {
        // テスト項目: 送信者しかいない場合は誰にも配信されない
        // given (前提条件):
        let (broadcaster, registry) = create_test_broadcaster();
        let (tx, mut rx) = mpsc::channel(4);
        let alice = register(&registry, "alice", tx).await;

        // when (操作):
        let report = broadcaster
            .relay_to_others(
                &alice,
                TextMessageData {
                    user_name: "alice".to_string(),
                    text_data: "anyone?".to_string(),
                },
            )
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(report, DeliveryReport::default());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unreachable_recipient_does_not_abort_fan_out() {
        // テスト項目: 送信できない相手がいても残りの相手には配信される
        // given (前提条件):
        let (broadcaster, registry) = create_test_broadcaster();
        let (tx_closed, rx_closed) = mpsc::channel(4);
        drop(rx_closed);
        let (tx_full, _rx_full) = mpsc::channel(1);
        tx_full.try_send(Bytes::from_static(b"pending")).unwrap();
        let (tx_ok, mut rx_ok) = mpsc::channel(4);
        register(&registry, "closed", tx_closed).await;
        register(&registry, "full", tx_full).await;
        register(&registry, "ok", tx_ok).await;

        // when (操作):
        let report = broadcaster.notify_all("hello").await.unwrap();

        // then (期待する結果):
        assert_eq!(report, DeliveryReport { delivered: 1, failed: 2 });
        assert_eq!(
            decode(&rx_ok.recv().await.unwrap()),
            Ok(Message::notification("hello"))
        );
    }
}
