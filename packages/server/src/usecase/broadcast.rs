//! Broadcast Router
//!
//! Meeting の参加者へのイベント配送（ファンアウト）。
//!
//! `to_meeting` / `to_meeting_except` はロック済みの `&Meeting` を受け取る。
//! 呼び出し側は Meeting を変更したのと同じクリティカルセクション内で配送するので、
//! 各接続に届く順序はサーバー側でイベントが発生した順序と一致する。
//!
//! 配送はベストエフォート。失敗はログに残すだけで、呼び出し側の処理は中断しない。

use std::sync::Arc;

use crate::domain::{ConnectionId, Meeting, MeetingEvent, MessagePusher};

pub struct BroadcastRouter {
    message_pusher: Arc<dyn MessagePusher>,
}

impl BroadcastRouter {
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self { message_pusher }
    }

    /// Meeting の全参加者に配送
    pub async fn to_meeting(&self, meeting: &Meeting, event: &MeetingEvent) {
        self.fan_out(meeting, meeting.participant_ids(), event)
            .await;
    }

    /// Meeting の参加者のうち `exclude` 以外に配送
    pub async fn to_meeting_except(
        &self,
        meeting: &Meeting,
        exclude: &ConnectionId,
        event: &MeetingEvent,
    ) {
        let targets = meeting
            .participant_ids()
            .into_iter()
            .filter(|id| id != exclude)
            .collect();
        self.fan_out(meeting, targets, event).await;
    }

    /// 1 つの接続に配送（応答・エラー通知）
    pub async fn to_connection(&self, connection_id: &ConnectionId, event: &MeetingEvent) {
        if let Err(e) = self.message_pusher.push_to(connection_id, event).await {
            tracing::warn!(
                "Failed to deliver '{}' to connection '{}': {}",
                event.name(),
                connection_id,
                e
            );
        }
    }

    async fn fan_out(&self, meeting: &Meeting, targets: Vec<ConnectionId>, event: &MeetingEvent) {
        if targets.is_empty() {
            return;
        }
        let count = targets.len();
        match self.message_pusher.broadcast(targets, event).await {
            Ok(()) => tracing::debug!(
                "Broadcasted '{}' to {} connection(s) in meeting '{}'",
                event.name(),
                count,
                meeting.id
            ),
            Err(e) => tracing::warn!(
                "Failed to broadcast '{}' in meeting '{}': {}",
                event.name(),
                meeting.id,
                e
            ),
        }
    }
}
