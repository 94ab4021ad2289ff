//! UseCase: メッセージリレー処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - 送信者名の上書きとブロードキャスターへの委譲
//!
//! ### なぜこのテストが必要か
//! - クライアントが申告した user_name でなりすましができないことを保証する
//! - リレーの失敗が呼び出し元にエラーとして返ることを確認する

use std::sync::Arc;

use parlor_shared::protocol::TextMessageData;

use crate::domain::{Broadcaster, ConnectionId, DeliveryReport, UserName};

use super::error::SendMessageError;

/// メッセージリレーのユースケース
pub struct SendMessageUseCase {
    /// Broadcaster（メッセージ配信の抽象化）
    broadcaster: Arc<dyn Broadcaster>,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(broadcaster: Arc<dyn Broadcaster>) -> Self {
        Self { broadcaster }
    }

    /// 送信者の認証済みの名前を付与して、他のユーザーへリレーを実行
    ///
    /// # Arguments
    ///
    /// * `sender` - メッセージを送信した接続（配信対象から除外）
    /// * `sender_name` - 送信者が認証したユーザー名
    /// * `message` - 受信したペイロード（`user_name` は上書きされる）
    pub async fn execute(
        &self,
        sender: &ConnectionId,
        sender_name: &UserName,
        mut message: TextMessageData,
    ) -> Result<DeliveryReport, SendMessageError> {
        message.user_name = sender_name.as_str().to_string();

        let report = self.broadcaster.relay_to_others(sender, message).await?;
        Ok(report)
    }
}
