//! UseCase: オンラインユーザー取得処理

use std::sync::Arc;

use parlor_shared::protocol::OnlineUsersData;

use crate::domain::UserRegistry;

/// オンラインユーザー取得のユースケース
pub struct GetOnlineUsersUseCase {
    /// UserRegistry（接続中ユーザーの管理の抽象化）
    registry: Arc<dyn UserRegistry>,
}

impl GetOnlineUsersUseCase {
    /// 新しい GetOnlineUsersUseCase を作成
    pub fn new(registry: Arc<dyn UserRegistry>) -> Self {
        Self { registry }
    }

    /// レジストリのスナップショットから OnlineUsers のペイロードを作成
    pub async fn execute(&self) -> OnlineUsersData {
        let snapshot = self.registry.snapshot().await;

        OnlineUsersData {
            count: snapshot.count,
            user_names: snapshot
                .user_names
                .into_iter()
                .map(|name| name.into_string())
                .collect(),
        }
    }
}
