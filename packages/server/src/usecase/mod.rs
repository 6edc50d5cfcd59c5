//! UseCase 層
//!
//! 受信イベントと管理 API の操作ごとに 1 つのユースケースを置く。
//! 各ユースケースは Repository / MessagePusher の trait にだけ依存する。

pub mod broadcast;
pub mod cleanup_meeting;
pub mod connect_client;
pub mod create_meeting;
pub mod disconnect_participant;
pub mod error;
pub mod get_meeting_info;
pub mod join_meeting;
pub mod list_meetings;
pub mod send_message;
pub mod typing;

#[cfg(test)]
pub(crate) mod test_support;

pub use broadcast::BroadcastRouter;
pub use cleanup_meeting::{CleanupScheduler, DEFAULT_GRACE_PERIOD};
pub use connect_client::ConnectClientUseCase;
pub use create_meeting::CreateMeetingUseCase;
pub use disconnect_participant::{DisconnectParticipantUseCase, LeftMeeting};
pub use error::MeetingError;
pub use get_meeting_info::GetMeetingInfoUseCase;
pub use join_meeting::{JoinMeetingInput, JoinMeetingUseCase, JoinedMeeting, ParticipantProfile};
pub use list_meetings::{HealthStatus, ListMeetingsUseCase};
pub use send_message::SendMessageUseCase;
pub use typing::TypingIndicatorUseCase;
