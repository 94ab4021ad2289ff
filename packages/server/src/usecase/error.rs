//! UseCase 層のエラー定義

use parlor_shared::protocol::MessageKind;
use thiserror::Error;

use crate::domain::{BroadcastError, RegistryError, ValueObjectError};

/// 認証のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthenticateError {
    /// 最初のメッセージが OpenConnect ではない
    #[error("invalid message format")]
    UnexpectedKind(MessageKind),

    #[error("{0}")]
    InvalidUserName(#[from] ValueObjectError),

    #[error("{0}")]
    Registry(#[from] RegistryError),
}

/// メッセージリレーのエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    #[error("failed to relay message: {0}")]
    BroadcastFailed(#[from] BroadcastError),
}
