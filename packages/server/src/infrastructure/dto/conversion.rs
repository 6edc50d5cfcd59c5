//! Conversion logic from domain entities/events to DTOs.

use yoriai_shared::time::timestamp_to_rfc3339;

use crate::domain::{ChatMessage, MeetingEvent, MeetingSummary, Participant};
use crate::infrastructure::dto::{http, websocket as ws};

// ========================================
// Domain Entity → WebSocket DTO
// ========================================

impl From<&Participant> for ws::ParticipantDto {
    fn from(model: &Participant) -> Self {
        Self {
            connection_id: model.connection_id.as_str().to_string(),
            user_id: model.user_id.as_str().to_string(),
            name: model.display_name.as_str().to_string(),
            role: model.role.as_str().to_string(),
            joined_at: model.joined_at.value(),
        }
    }
}

impl From<&ChatMessage> for ws::ChatMessageDto {
    fn from(model: &ChatMessage) -> Self {
        Self {
            id: model.id.to_string(),
            meeting_id: model.meeting_id.as_str().to_string(),
            sender_connection_id: model.sender_connection_id.as_str().to_string(),
            sender_role: model.sender_role.as_str().to_string(),
            sender_name: model.sender_name.as_str().to_string(),
            content: model.content.as_str().to_string(),
            created_at: model.created_at.value(),
        }
    }
}

impl From<&MeetingSummary> for ws::MeetingInfoDto {
    fn from(model: &MeetingSummary) -> Self {
        Self {
            meeting_id: model.meeting_id.as_str().to_string(),
            title: model.title.as_str().to_string(),
            participants: model.participants.iter().map(Into::into).collect(),
            participant_count: model.participant_count(),
            message_count: model.message_count,
            created_at: model.created_at.value(),
        }
    }
}

impl From<&MeetingEvent> for ws::ServerMessage {
    fn from(event: &MeetingEvent) -> Self {
        match event {
            MeetingEvent::MeetingJoined {
                meeting_id,
                title,
                participants,
                messages,
            } => Self::MeetingJoined {
                meeting_id: meeting_id.as_str().to_string(),
                title: title.as_str().to_string(),
                participants: participants.iter().map(Into::into).collect(),
                messages: messages.iter().map(Into::into).collect(),
            },
            MeetingEvent::ParticipantJoined(p) => Self::ParticipantJoined {
                participant: p.into(),
            },
            MeetingEvent::ParticipantLeft(p) => Self::ParticipantLeft {
                participant: p.into(),
            },
            MeetingEvent::NewMessage(message) => Self::NewMessage(message.into()),
            MeetingEvent::UserTyping(p) => Self::UserTyping {
                participant: p.into(),
            },
            MeetingEvent::UserStoppedTyping(p) => Self::UserStoppedTyping {
                participant: p.into(),
            },
            MeetingEvent::MeetingInfo {
                meeting_id,
                meeting,
            } => Self::MeetingInfo {
                meeting_id: meeting_id.as_str().to_string(),
                found: meeting.is_some(),
                meeting: meeting.as_ref().map(Into::into),
            },
            MeetingEvent::Error { message } => Self::Error {
                message: message.clone(),
            },
        }
    }
}

// ========================================
// Domain Entity → HTTP DTO
// ========================================

impl From<&Participant> for http::ParticipantDetailDto {
    fn from(model: &Participant) -> Self {
        Self {
            connection_id: model.connection_id.as_str().to_string(),
            user_id: model.user_id.as_str().to_string(),
            name: model.display_name.as_str().to_string(),
            role: model.role.as_str().to_string(),
            joined_at: timestamp_to_rfc3339(model.joined_at.value()),
        }
    }
}

impl From<&MeetingSummary> for http::MeetingSummaryDto {
    fn from(model: &MeetingSummary) -> Self {
        Self {
            meeting_id: model.meeting_id.as_str().to_string(),
            title: model.title.as_str().to_string(),
            participant_count: model.participant_count(),
            message_count: model.message_count,
            created_at: timestamp_to_rfc3339(model.created_at.value()),
        }
    }
}

impl From<&MeetingSummary> for http::MeetingDetailDto {
    fn from(model: &MeetingSummary) -> Self {
        Self {
            meeting_id: model.meeting_id.as_str().to_string(),
            title: model.title.as_str().to_string(),
            participants: model.participants.iter().map(Into::into).collect(),
            participant_count: model.participant_count(),
            message_count: model.message_count,
            created_at: timestamp_to_rfc3339(model.created_at.value()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        ConnectionId, DisplayName, MeetingId, MeetingTitle, MessageContent, Role, Timestamp,
        UserId,
    };

    fn participant() -> Participant {
        Participant::new(
            ConnectionId::new("c1".to_string()).unwrap(),
            Some(UserId::new("user-42".to_string()).unwrap()),
            DisplayName::new("Bo".to_string()).unwrap(),
            Role::new("student".to_string()).unwrap(),
            Timestamp::new(1672531200000),
        )
    }

    #[test]
    fn test_domain_participant_to_ws_dto() {
        // テスト項目: 参加者が WebSocket DTO に変換される
        // given (前提条件):
        let model = participant();

        // when (操作):
        let dto: ws::ParticipantDto = (&model).into();

        // then (期待する結果):
        assert_eq!(dto.connection_id, "c1");
        assert_eq!(dto.user_id, "user-42");
        assert_eq!(dto.name, "Bo");
        assert_eq!(dto.role, "student");
        assert_eq!(dto.joined_at, 1672531200000);
    }

    #[test]
    fn test_domain_message_event_to_ws_dto() {
        // テスト項目: newMessage イベントが送信者情報付きの DTO に変換される
        // given (前提条件):
        let sender = participant();
        let message = ChatMessage::new(
            MeetingId::new("room1".to_string()).unwrap(),
            &sender,
            MessageContent::new("hi".to_string()).unwrap(),
            Timestamp::new(2000),
        );
        let event = MeetingEvent::NewMessage(message.clone());

        // when (操作):
        let dto = ws::ServerMessage::from(&event);

        // then (期待する結果):
        match dto {
            ws::ServerMessage::NewMessage(m) => {
                assert_eq!(m.id, message.id.to_string());
                assert_eq!(m.sender_name, "Bo");
                assert_eq!(m.sender_role, "student");
                assert_eq!(m.content, "hi");
                assert_eq!(m.created_at, 2000);
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_meeting_info_not_found_to_ws_dto() {
        // テスト項目: 見つからなかった meetingInfo は found=false になる
        // given (前提条件):
        let event = MeetingEvent::MeetingInfo {
            meeting_id: MeetingId::new("room1".to_string()).unwrap(),
            meeting: None,
        };

        // when (操作):
        let dto = ws::ServerMessage::from(&event);

        // then (期待する結果):
        assert_eq!(
            dto,
            ws::ServerMessage::MeetingInfo {
                meeting_id: "room1".to_string(),
                found: false,
                meeting: None,
            }
        );
    }

    #[test]
    fn test_meeting_summary_to_http_dto() {
        // テスト項目: Meeting のスナップショットが HTTP DTO に変換される（時刻は RFC 3339）
        // given (前提条件):
        let meeting_id = MeetingId::new("room1".to_string()).unwrap();
        let summary = MeetingSummary {
            title: MeetingTitle::from_meeting_id(&meeting_id),
            meeting_id,
            participants: vec![participant()],
            message_count: 3,
            created_at: Timestamp::new(1672531200000),
        };

        // when (操作):
        let dto = http::MeetingDetailDto::from(&summary);

        // then (期待する結果):
        assert_eq!(dto.meeting_id, "room1");
        assert_eq!(dto.participant_count, 1);
        assert_eq!(dto.message_count, 3);
        assert_eq!(dto.created_at, "2023-01-01T00:00:00.000Z");
        assert_eq!(dto.participants[0].joined_at, "2023-01-01T00:00:00.000Z");
    }
}
