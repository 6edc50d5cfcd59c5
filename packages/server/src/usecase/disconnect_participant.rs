//! UseCase: Meeting からの退出と接続の切断
//!
//! - `leave`: 明示的な退出、または別の Meeting への移動の前処理
//! - `execute`: ソケットが閉じたときの後始末（退出 + 送信チャンネルの登録解除）
//!
//! 最後の参加者が抜けた Meeting には Cleanup Scheduler のタイマーを仕掛ける。
//!
//! 途中で中断されても参加者一覧とバインディングが食い違わないよう、バインディングの
//! 解除と参加者の削除は同じ Meeting のロック内で続けて行う。

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::domain::{
    ConnectionId, Meeting, MeetingEvent, MeetingId, MeetingRepository, MessagePusher,
    Participant, SessionRepository,
};

use super::{broadcast::BroadcastRouter, cleanup_meeting::CleanupScheduler, error::MeetingError};

/// 退出結果
#[derive(Debug)]
pub struct LeftMeeting {
    pub meeting_id: MeetingId,
    pub participant: Participant,
    /// 退出後の参加者数
    pub remaining: usize,
    /// 空になった場合に仕掛けた削除タイマー
    pub cleanup: Option<JoinHandle<bool>>,
}

/// 退出・切断のユースケース
pub struct DisconnectParticipantUseCase {
    repository: Arc<dyn MeetingRepository>,
    session_repository: Arc<dyn SessionRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    router: Arc<BroadcastRouter>,
    cleanup_scheduler: Arc<CleanupScheduler>,
}

impl DisconnectParticipantUseCase {
    pub fn new(
        repository: Arc<dyn MeetingRepository>,
        session_repository: Arc<dyn SessionRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        router: Arc<BroadcastRouter>,
        cleanup_scheduler: Arc<CleanupScheduler>,
    ) -> Self {
        Self {
            repository,
            session_repository,
            message_pusher,
            router,
            cleanup_scheduler,
        }
    }

    /// バインドされている Meeting から退出する
    ///
    /// # Returns
    ///
    /// * `Ok(LeftMeeting)` - 退出した
    /// * `Err(MeetingError::NoSession)` - どの Meeting にも参加していない
    /// * `Err(MeetingError::NotFound)` - バインド先の Meeting が既に削除されている
    pub async fn leave(&self, connection_id: &ConnectionId) -> Result<LeftMeeting, MeetingError> {
        let binding = self
            .session_repository
            .lookup(connection_id)
            .await
            .ok_or(MeetingError::NoSession)?;

        let Some(handle) = self.repository.get(&binding.meeting_id).await else {
            self.session_repository.unbind(connection_id).await;
            return Err(MeetingError::NotFound(binding.meeting_id.to_string()));
        };

        let mut meeting = handle.lock().await;

        // 1. バインディングを外す（以降の sendMessage は NoSession になる）。
        //    解除の後、参加者の削除とタイマーの設定までは await を挟まない
        self.session_repository.unbind(connection_id).await;
        if meeting.is_retired() {
            return Err(MeetingError::NotFound(binding.meeting_id.to_string()));
        }

        // 2. 参加者を削除し、空になったら削除タイマーを仕掛ける
        let participant = meeting
            .remove_participant(connection_id)
            .unwrap_or(binding.participant);
        let left = self.vacate(&meeting, participant);

        // 3. 残りの参加者に通知
        self.router
            .to_meeting(
                &meeting,
                &MeetingEvent::ParticipantLeft(left.participant.clone()),
            )
            .await;

        tracing::info!(
            "Connection '{}' left meeting '{}' ({} remaining)",
            connection_id,
            left.meeting_id,
            left.remaining
        );
        Ok(left)
    }

    /// 接続の切断を処理する（冪等）
    ///
    /// 参加中であれば退出し、送信チャンネルを登録解除する。バインディングが
    /// なくても参加者一覧に残っている Meeting があれば、そこからも取り除く。
    pub async fn execute(&self, connection_id: &ConnectionId) -> Option<LeftMeeting> {
        let left = match self.leave(connection_id).await {
            Ok(left) => Some(left),
            Err(MeetingError::NoSession) => None,
            Err(e) => {
                tracing::debug!("Nothing to leave for '{}': {}", connection_id, e);
                None
            }
        };
        let left = match left {
            Some(left) => Some(left),
            None => self.evict_unbound(connection_id).await,
        };
        self.message_pusher.unregister_client(connection_id).await;
        tracing::info!("Connection '{}' disconnected", connection_id);
        left
    }

    /// バインディングのない参加者を、それを含む Meeting から取り除く
    async fn evict_unbound(&self, connection_id: &ConnectionId) -> Option<LeftMeeting> {
        for handle in self.repository.all().await {
            let mut meeting = handle.lock().await;
            if meeting.is_retired() {
                continue;
            }
            let Some(participant) = meeting.remove_participant(connection_id) else {
                continue;
            };
            let left = self.vacate(&meeting, participant);
            self.router
                .to_meeting(
                    &meeting,
                    &MeetingEvent::ParticipantLeft(left.participant.clone()),
                )
                .await;
            tracing::warn!(
                "Removed unbound participant '{}' from meeting '{}'",
                connection_id,
                left.meeting_id
            );
            return Some(left);
        }
        None
    }

    /// 参加者を取り除いた直後の Meeting から退出結果を作る。空ならタイマーを仕掛ける
    fn vacate(&self, meeting: &Meeting, participant: Participant) -> LeftMeeting {
        let remaining = meeting.participant_count();
        let cleanup = (remaining == 0).then(|| {
            self.cleanup_scheduler
                .arm(meeting.id.clone(), meeting.vacancy_epoch())
        });
        LeftMeeting {
            meeting_id: meeting.id.clone(),
            participant,
            remaining,
            cleanup,
        }
    }
}
