//! サーバーから接続へ送るイベント
//!
//! ワイヤーフォーマットへの変換は Infrastructure 層（DTO）が担う。

use super::{
    entity::{ChatMessage, MeetingSummary, Participant},
    value_object::{MeetingId, MeetingTitle},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeetingEvent {
    /// 参加した本人への応答（参加者一覧とメッセージ履歴）
    MeetingJoined {
        meeting_id: MeetingId,
        title: MeetingTitle,
        participants: Vec<Participant>,
        messages: Vec<ChatMessage>,
    },
    ParticipantJoined(Participant),
    ParticipantLeft(Participant),
    NewMessage(ChatMessage),
    UserTyping(Participant),
    UserStoppedTyping(Participant),
    /// Meeting 情報の問い合わせ結果（見つからなければ `meeting` は None）
    MeetingInfo {
        meeting_id: MeetingId,
        meeting: Option<MeetingSummary>,
    },
    Error {
        message: String,
    },
}

impl MeetingEvent {
    /// ログ出力用のイベント名
    pub fn name(&self) -> &'static str {
        match self {
            MeetingEvent::MeetingJoined { .. } => "meetingJoined",
            MeetingEvent::ParticipantJoined(_) => "participantJoined",
            MeetingEvent::ParticipantLeft(_) => "participantLeft",
            MeetingEvent::NewMessage(_) => "newMessage",
            MeetingEvent::UserTyping(_) => "userTyping",
            MeetingEvent::UserStoppedTyping(_) => "userStoppedTyping",
            MeetingEvent::MeetingInfo { .. } => "meetingInfo",
            MeetingEvent::Error { .. } => "error",
        }
    }
}
