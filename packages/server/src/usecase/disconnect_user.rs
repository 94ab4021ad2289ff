//! UseCase: ユーザー切断処理
//!
//! 切断時は `unregister` と `announce_departure` を分けて呼び出す。
//! その間に接続のクローズとスロットの返却が行われる。

use std::sync::Arc;

use crate::domain::{
    BroadcastError, Broadcaster, ConnectionId, DeliveryReport, UserName, UserRegistry,
};

/// ユーザー切断のユースケース
pub struct DisconnectUserUseCase {
    /// UserRegistry（接続中ユーザーの管理の抽象化）
    registry: Arc<dyn UserRegistry>,
    /// Broadcaster（メッセージ配信の抽象化）
    broadcaster: Arc<dyn Broadcaster>,
    /// 退出通知を送るかどうか
    notify_on_leave: bool,
}

impl DisconnectUserUseCase {
    /// 新しい DisconnectUserUseCase を作成
    pub fn new(
        registry: Arc<dyn UserRegistry>,
        broadcaster: Arc<dyn Broadcaster>,
        notify_on_leave: bool,
    ) -> Self {
        Self {
            registry,
            broadcaster,
            notify_on_leave,
        }
    }

    /// 接続をレジストリから削除（未登録の場合は何もしない）
    pub async fn unregister(&self, connection_id: &ConnectionId) -> Option<UserName> {
        self.registry.unregister(connection_id).await
    }

    /// 退出通知が有効な場合、残りのユーザーに通知する
    ///
    /// # Returns
    ///
    /// * `Ok(None)` - 退出通知が無効
    /// * `Ok(Some(DeliveryReport))` - 残りのユーザーへの配信結果
    pub async fn announce_departure(
        &self,
        user_name: &UserName,
    ) -> Result<Option<DeliveryReport>, BroadcastError> {
        if !self.notify_on_leave {
            return Ok(None);
        }

        let text = format!("user \"{}\" has left the chat", user_name);
        let report = self.broadcaster.notify_all(&text).await?;
        Ok(Some(report))
    }
}
