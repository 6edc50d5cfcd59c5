//! ドメイン層のエラー定義

use thiserror::Error;

/// Value Object の検証エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    /// 必須フィールドが空（または未指定）
    #[error("{field} is required")]
    Empty { field: &'static str },

    /// 最大長を超えている
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
}

/// Repository 操作のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// 同じ ID の Meeting が既に登録されている
    #[error("Meeting '{0}' already exists")]
    MeetingAlreadyExists(String),

    /// Meeting が見つからない
    #[error("Meeting '{0}' not found")]
    MeetingNotFound(String),
}

/// メッセージ送信（通知）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    /// 送信先のクライアントが登録されていない
    #[error("Client '{0}' not found")]
    ClientNotFound(String),

    /// チャンネルへの送信に失敗（受信側が切断済み）
    #[error("Failed to push message: {0}")]
    PushFailed(String),

    /// イベントのエンコードに失敗
    #[error("Failed to encode event: {0}")]
    Encode(String),
}
