//! HTTP API request/response DTOs.

use serde::{Deserialize, Serialize};

/// `POST /api/meetings` request body
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CreateMeetingRequestDto {
    pub meeting_id: Option<String>,
    pub title: Option<String>,
}

/// Row of `GET /api/meetings`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingSummaryDto {
    pub meeting_id: String,
    pub title: String,
    pub participant_count: usize,
    pub message_count: usize,
    /// RFC 3339 (UTC)
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantDetailDto {
    pub connection_id: String,
    pub user_id: String,
    pub name: String,
    pub role: String,
    /// RFC 3339 (UTC)
    pub joined_at: String,
}

/// `GET /api/meetings/{meeting_id}` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingDetailDto {
    pub meeting_id: String,
    pub title: String,
    pub participants: Vec<ParticipantDetailDto>,
    pub participant_count: usize,
    pub message_count: usize,
    /// RFC 3339 (UTC)
    pub created_at: String,
}

/// `GET /api/health` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthDto {
    pub status: String,
    pub active_meetings: usize,
    pub active_connections: usize,
}

/// Error body for non-2xx responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponseDto {
    pub error: String,
}
