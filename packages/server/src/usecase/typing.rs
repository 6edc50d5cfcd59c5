//! UseCase: 入力中インジケーター
//!
//! typingStart / typingStop を同じ Meeting の他の参加者に中継する。状態は持たない。
//! 参加していない接続からのイベントはエラーにせず無視する。

use std::sync::Arc;

use crate::domain::{ConnectionId, MeetingEvent, MeetingRepository, Participant, SessionRepository};

use super::broadcast::BroadcastRouter;

pub struct TypingIndicatorUseCase {
    repository: Arc<dyn MeetingRepository>,
    session_repository: Arc<dyn SessionRepository>,
    router: Arc<BroadcastRouter>,
}

impl TypingIndicatorUseCase {
    pub fn new(
        repository: Arc<dyn MeetingRepository>,
        session_repository: Arc<dyn SessionRepository>,
        router: Arc<BroadcastRouter>,
    ) -> Self {
        Self {
            repository,
            session_repository,
            router,
        }
    }

    /// 入力開始を中継。中継した場合は true
    pub async fn start(&self, connection_id: &ConnectionId) -> bool {
        self.relay(connection_id, MeetingEvent::UserTyping).await
    }

    /// 入力終了を中継。中継した場合は true
    pub async fn stop(&self, connection_id: &ConnectionId) -> bool {
        self.relay(connection_id, MeetingEvent::UserStoppedTyping)
            .await
    }

    async fn relay(
        &self,
        connection_id: &ConnectionId,
        event: fn(Participant) -> MeetingEvent,
    ) -> bool {
        let Some(binding) = self.session_repository.lookup(connection_id).await else {
            tracing::debug!("Typing event from unbound connection '{}' ignored", connection_id);
            return false;
        };
        let Some(handle) = self.repository.get(&binding.meeting_id).await else {
            return false;
        };

        let meeting = handle.lock().await;
        if meeting.is_retired() {
            return false;
        }
        let participant = meeting
            .participant(connection_id)
            .cloned()
            .unwrap_or(binding.participant);
        self.router
            .to_meeting_except(&meeting, connection_id, &event(participant))
            .await;
        true
    }
}
