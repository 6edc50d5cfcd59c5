//! Value Object 定義
//!
//! 生成時に検証を行い、不正な値を持つインスタンスが存在しないことを保証します。
//! 文字列系の Value Object は前後の空白を取り除いた上で検証します。

use std::fmt;

use uuid::Uuid;

use super::error::ValueObjectError;

/// Meeting ID の最大長（文字数）
pub const MEETING_ID_MAX_LEN: usize = 128;
/// タイトルの最大長（文字数）
pub const MEETING_TITLE_MAX_LEN: usize = 256;
/// 表示名・ロール・ユーザー ID の最大長（文字数）
pub const PROFILE_FIELD_MAX_LEN: usize = 64;
/// メッセージ本文の最大長（文字数）
pub const MESSAGE_CONTENT_MAX_LEN: usize = 4000;

fn validate_text(
    field: &'static str,
    value: String,
    max_len: usize,
) -> Result<String, ValueObjectError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValueObjectError::Empty { field });
    }
    if trimmed.chars().count() > max_len {
        return Err(ValueObjectError::TooLong {
            field,
            max: max_len,
        });
    }
    if trimmed.len() == value.len() {
        Ok(value)
    } else {
        Ok(trimmed.to_string())
    }
}

/// 本文用の検証。空白だけの値は拒否するが、値そのものは変えない
fn validate_verbatim(
    field: &'static str,
    value: String,
    max_len: usize,
) -> Result<String, ValueObjectError> {
    if value.trim().is_empty() {
        return Err(ValueObjectError::Empty { field });
    }
    if value.chars().count() > max_len {
        return Err(ValueObjectError::TooLong {
            field,
            max: max_len,
        });
    }
    Ok(value)
}

macro_rules! text_value_object {
    ($(#[$meta:meta])* $name:ident, $field:literal, $max:expr) => {
        text_value_object!($(#[$meta])* $name, $field, $max, validate_text);
    };
    ($(#[$meta:meta])* $name:ident, $field:literal, $max:expr, $validate:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: String) -> Result<Self, ValueObjectError> {
                $validate($field, value, $max).map(Self)
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValueObjectError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

text_value_object!(
    /// Meeting を一意に識別する ID（クライアントが指定する）
    MeetingId,
    "meeting_id",
    MEETING_ID_MAX_LEN
);

text_value_object!(
    /// Meeting のタイトル
    MeetingTitle,
    "title",
    MEETING_TITLE_MAX_LEN
);

text_value_object!(
    /// 参加者の表示名
    DisplayName,
    "name",
    PROFILE_FIELD_MAX_LEN
);

text_value_object!(
    /// 参加者のロール（例: "teacher", "student"）
    Role,
    "role",
    PROFILE_FIELD_MAX_LEN
);

text_value_object!(
    /// 参加者のユーザー ID（省略時は接続 ID）
    UserId,
    "user_id",
    PROFILE_FIELD_MAX_LEN
);

text_value_object!(
    /// メッセージ本文
    MessageContent,
    "content",
    MESSAGE_CONTENT_MAX_LEN,
    validate_verbatim
);

impl MeetingTitle {
    /// タイトル未指定時のデフォルト（Meeting ID をそのまま使う）
    pub fn from_meeting_id(meeting_id: &MeetingId) -> Self {
        Self(meeting_id.as_str().to_string())
    }
}

/// 接続 ID
///
/// WebSocket 接続ごとにサーバーが採番する。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.is_empty() {
            return Err(ValueObjectError::Empty {
                field: "connection_id",
            });
        }
        Ok(Self(value))
    }

    /// 新しい接続 ID を採番（UUID v4）
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&ConnectionId> for UserId {
    fn from(connection_id: &ConnectionId) -> Self {
        Self(connection_id.as_str().to_string())
    }
}

/// メッセージ ID（サーバー全体で一意）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(Uuid);

impl MessageId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Unix タイムスタンプ（ミリ秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}
