//! UseCase: Meeting の明示的な作成（管理 API）

use std::sync::Arc;

use yoriai_shared::time::Clock;

use crate::domain::{MeetingId, MeetingRepository, MeetingSummary, MeetingTitle, Timestamp};

use super::error::MeetingError;

pub struct CreateMeetingUseCase {
    repository: Arc<dyn MeetingRepository>,
    clock: Arc<dyn Clock>,
}

impl CreateMeetingUseCase {
    pub fn new(repository: Arc<dyn MeetingRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// Meeting を作成する。タイトル省略時は ID をタイトルにする
    ///
    /// 作成直後の Meeting は空だが削除タイマーは仕掛けない。一度参加者が入り、
    /// 再び空になった時点から猶予期間が始まる。
    pub async fn execute(
        &self,
        meeting_id: MeetingId,
        title: Option<MeetingTitle>,
    ) -> Result<MeetingSummary, MeetingError> {
        let title = title.unwrap_or_else(|| MeetingTitle::from_meeting_id(&meeting_id));
        let now = Timestamp::new(self.clock.now_millis());
        let handle = self.repository.create(meeting_id, title, now).await?;
        let summary = handle.lock().await.summary();
        tracing::info!(
            "Meeting '{}' created ('{}')",
            summary.meeting_id,
            summary.title
        );
        Ok(summary)
    }
}
