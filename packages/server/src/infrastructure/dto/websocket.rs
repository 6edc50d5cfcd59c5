//! WebSocket message DTOs.
//!
//! Every frame is a JSON object tagged by `"type"` (camelCase tag, snake_case fields).

use serde::{Deserialize, Serialize};

/// Participant identity as sent to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantDto {
    pub connection_id: String,
    pub user_id: String,
    pub name: String,
    pub role: String,
    /// Unix timestamp (milliseconds)
    pub joined_at: i64,
}

/// Chat message as sent to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessageDto {
    pub id: String,
    pub meeting_id: String,
    pub sender_connection_id: String,
    pub sender_role: String,
    pub sender_name: String,
    pub content: String,
    /// Unix timestamp (milliseconds)
    pub created_at: i64,
}

/// Meeting metadata carried by `meetingInfo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingInfoDto {
    pub meeting_id: String,
    pub title: String,
    pub participants: Vec<ParticipantDto>,
    pub participant_count: usize,
    pub message_count: usize,
    /// Unix timestamp (milliseconds)
    pub created_at: i64,
}

/// Profile sent with `join`. Required fields are validated after decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfoDto {
    pub role: Option<String>,
    pub name: Option<String>,
    pub user_id: Option<String>,
}

/// Events sent from a client to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    Join {
        meeting_id: Option<String>,
        title: Option<String>,
        user_info: Option<UserInfoDto>,
    },
    SendMessage {
        content: Option<String>,
    },
    TypingStart,
    TypingStop,
    GetMeetingInfo {
        meeting_id: Option<String>,
    },
    Leave,
}

/// Events sent from the server to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    MeetingJoined {
        meeting_id: String,
        title: String,
        participants: Vec<ParticipantDto>,
        messages: Vec<ChatMessageDto>,
    },
    ParticipantJoined {
        participant: ParticipantDto,
    },
    ParticipantLeft {
        participant: ParticipantDto,
    },
    NewMessage(ChatMessageDto),
    UserTyping {
        participant: ParticipantDto,
    },
    UserStoppedTyping {
        participant: ParticipantDto,
    },
    MeetingInfo {
        meeting_id: String,
        found: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        meeting: Option<MeetingInfoDto>,
    },
    Error {
        message: String,
    },
}
