//! UseCase: Meeting 情報の取得
//!
//! WebSocket の getMeetingInfo と HTTP の詳細取得で共有する。参加は不要。

use std::sync::Arc;

use crate::domain::{ConnectionId, MeetingEvent, MeetingId, MeetingRepository, MeetingSummary};

use super::broadcast::BroadcastRouter;

pub struct GetMeetingInfoUseCase {
    repository: Arc<dyn MeetingRepository>,
    router: Arc<BroadcastRouter>,
}

impl GetMeetingInfoUseCase {
    pub fn new(repository: Arc<dyn MeetingRepository>, router: Arc<BroadcastRouter>) -> Self {
        Self { repository, router }
    }

    /// Meeting のスナップショットを取得（削除済みなら None）
    pub async fn find(&self, meeting_id: &MeetingId) -> Option<MeetingSummary> {
        let handle = self.repository.get(meeting_id).await?;
        let meeting = handle.lock().await;
        if meeting.is_retired() {
            return None;
        }
        Some(meeting.summary())
    }

    /// 問い合わせた接続に `meetingInfo` を返す
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        meeting_id: MeetingId,
    ) -> Option<MeetingSummary> {
        let meeting = self.find(&meeting_id).await;
        self.router
            .to_connection(
                connection_id,
                &MeetingEvent::MeetingInfo {
                    meeting_id,
                    meeting: meeting.clone(),
                },
            )
            .await;
        meeting
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        infrastructure::dto::websocket::ServerMessage,
        usecase::test_support::{TestContext, drain, join_input},
    };

    fn info_usecase(ctx: &TestContext) -> GetMeetingInfoUseCase {
        GetMeetingInfoUseCase::new(ctx.repository.clone(), ctx.router.clone())
    }

    #[tokio::test]
    async fn test_meeting_info_for_existing_meeting() {
        // テスト項目: 参加していない接続でも Meeting 情報を取得できる
        // given (前提条件):
        let ctx = TestContext::new();
        let (ana, _ana_rx) = ctx.connect("ana").await;
        let (observer, mut observer_rx) = ctx.connect("observer").await;
        ctx.join_usecase()
            .execute(&ana, join_input("room1", "teacher", "Ana"))
            .await
            .unwrap();

        // when (操作):
        let summary = info_usecase(&ctx)
            .execute(&observer, MeetingId::new("room1".to_string()).unwrap())
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(summary.participant_count(), 1);
        assert_eq!(summary.title.as_str(), "room1");
        match &drain(&mut observer_rx)[..] {
            [ServerMessage::MeetingInfo {
                meeting_id,
                found,
                meeting: Some(meeting),
            }] => {
                assert_eq!(meeting_id, "room1");
                assert!(*found);
                assert_eq!(meeting.participant_count, 1);
                assert_eq!(meeting.participants[0].name, "Ana");
            }
            other => panic!("unexpected messages: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_meeting_info_not_found() {
        // テスト項目: 存在しない Meeting には found=false が返る
        // given (前提条件):
        let ctx = TestContext::new();
        let (observer, mut observer_rx) = ctx.connect("observer").await;

        // when (操作):
        let summary = info_usecase(&ctx)
            .execute(&observer, MeetingId::new("nope".to_string()).unwrap())
            .await;

        // then (期待する結果):
        assert!(summary.is_none());
        assert!(matches!(
            &drain(&mut observer_rx)[..],
            [ServerMessage::MeetingInfo { found: false, meeting: None, .. }]
        ));
    }
}
