//! UseCase: ユーザー認証処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - AuthenticateUserUseCase::execute() メソッド
//! - 最初のメッセージの種別チェックとレジストリへの登録
//!
//! ### どのような状況を想定しているか
//! - 正常系：OpenConnect による新規ユーザーの登録
//! - 異常系：OpenConnect 以外の最初のメッセージ、空のユーザー名
//! - 異常系：登録済みの名前と衝突するユーザー名

use std::sync::Arc;

use parlor_shared::protocol::Message;

use crate::domain::{ConnectionId, OutboundChannel, UserName, UserRegistry};

use super::error::AuthenticateError;

/// ユーザー認証のユースケース
pub struct AuthenticateUserUseCase {
    /// UserRegistry（接続中ユーザーの管理の抽象化）
    registry: Arc<dyn UserRegistry>,
}

impl AuthenticateUserUseCase {
    /// 新しい AuthenticateUserUseCase を作成
    pub fn new(registry: Arc<dyn UserRegistry>) -> Self {
        Self { registry }
    }

    /// 接続の最初のメッセージで認証を実行
    ///
    /// # Arguments
    ///
    /// * `connection_id` - accept 時に払い出した接続の ID
    /// * `first_message` - 接続から最初に読み取ったメッセージ
    /// * `outbound` - 接続の送信キュー（レジストリに保持される）
    ///
    /// # Returns
    ///
    /// * `Ok(UserName)` - 認証成功（登録されたユーザー名を返す）
    /// * `Err(AuthenticateError)` - 認証失敗（何も登録されない）
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        first_message: Message,
        outbound: OutboundChannel,
    ) -> Result<UserName, AuthenticateError> {
        let data = match first_message {
            Message::OpenConnect(data) => data,
            other => return Err(AuthenticateError::UnexpectedKind(other.kind())),
        };

        let user_name = UserName::new(data.user_name)?;
        self.registry
            .try_register(connection_id, user_name.clone(), outbound)
            .await?;

        Ok(user_name)
    }
}
