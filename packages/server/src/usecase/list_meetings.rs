//! UseCase: Meeting 一覧とヘルスチェック（管理 API）

use std::sync::Arc;

use crate::domain::{MeetingRepository, MeetingSummary, MessagePusher};

/// ヘルスチェックの集計値
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthStatus {
    pub active_meetings: usize,
    /// 登録中の WebSocket 接続数（未参加の接続を含む）
    pub active_connections: usize,
}

pub struct ListMeetingsUseCase {
    repository: Arc<dyn MeetingRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl ListMeetingsUseCase {
    pub fn new(
        repository: Arc<dyn MeetingRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// 作成日時、ID の順に並べた一覧
    pub async fn execute(&self) -> Vec<MeetingSummary> {
        self.repository.list().await
    }

    pub async fn health(&self) -> HealthStatus {
        HealthStatus {
            active_meetings: self.repository.count().await,
            active_connections: self.message_pusher.count_clients().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{MeetingId, MeetingTitle, MockMessagePusher, Timestamp},
        infrastructure::repository::InMemoryMeetingRepository,
    };

    #[tokio::test]
    async fn test_health_counts() {
        // テスト項目: Meeting 数と接続数が集計される
        // given (前提条件):
        let repository = Arc::new(InMemoryMeetingRepository::default());
        for (id, ts) in [("b", 2), ("a", 1)] {
            let id = MeetingId::new(id.to_string()).unwrap();
            let title = MeetingTitle::from_meeting_id(&id);
            repository
                .create(id, title, Timestamp::new(ts))
                .await
                .unwrap();
        }
        let mut pusher = MockMessagePusher::new();
        pusher.expect_count_clients().return_const(3usize);
        let usecase = ListMeetingsUseCase::new(repository, Arc::new(pusher));

        // when (操作):
        let health = usecase.health().await;
        let meetings = usecase.execute().await;

        // then (期待する結果):
        assert_eq!(
            health,
            HealthStatus {
                active_meetings: 2,
                active_connections: 3,
            }
        );
        let ids: Vec<&str> = meetings.iter().map(|m| m.meeting_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
