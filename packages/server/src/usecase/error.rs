//! UseCase 層のエラー定義
//!
//! 1 つの受信イベントの処理で発生したエラーは、そのイベントを送った接続にだけ
//! `error` イベントとして返される。他の接続や他のイベントには影響しない。

use thiserror::Error;

use crate::domain::{RepositoryError, ValueObjectError};

/// Meeting 操作のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeetingError {
    /// 必須フィールドの欠落・不正な値
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// 参照した Meeting が存在しない
    #[error("Meeting '{0}' not found")]
    NotFound(String),

    /// 明示的な作成で ID が既に使われている
    #[error("Meeting '{0}' already exists")]
    AlreadyExists(String),

    /// Meeting に参加していない接続からの操作
    #[error("Connection has not joined a meeting")]
    NoSession,

    /// 想定外の内部エラー
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MeetingError {
    /// クライアントに返すメッセージ（内部エラーの詳細は含めない）
    pub fn client_message(&self) -> String {
        match self {
            MeetingError::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        }
    }

    /// ログ用のエラー種別
    pub fn kind(&self) -> &'static str {
        match self {
            MeetingError::InvalidInput(_) => "invalid_input",
            MeetingError::NotFound(_) => "not_found",
            MeetingError::AlreadyExists(_) => "already_exists",
            MeetingError::NoSession => "no_session",
            MeetingError::Internal(_) => "internal",
        }
    }
}

impl From<ValueObjectError> for MeetingError {
    fn from(e: ValueObjectError) -> Self {
        MeetingError::InvalidInput(e.to_string())
    }
}

impl From<RepositoryError> for MeetingError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::MeetingAlreadyExists(id) => MeetingError::AlreadyExists(id),
            RepositoryError::MeetingNotFound(id) => MeetingError::NotFound(id),
        }
    }
}
