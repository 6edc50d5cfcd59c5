//! InMemory Meeting Repository 実装
//!
//! ドメイン層が定義する MeetingRepository trait の具体的な実装。
//! `HashMap<MeetingId, SharedMeeting>` をインメモリ DB として使用します。
//!
//! ## ロックの粒度
//!
//! - マップ全体: `RwLock`（作成・取得・削除の間だけ保持）
//! - Meeting ごと: `Mutex`（参加者・履歴の変更）
//!
//! 異なる Meeting への操作は互いにブロックしない。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use crate::domain::{
    DEFAULT_HISTORY_CAPACITY, Meeting, MeetingId, MeetingRepository, MeetingSummary, MeetingTitle,
    RepositoryError, SharedMeeting, Timestamp,
};

/// インメモリ Meeting Repository 実装
pub struct InMemoryMeetingRepository {
    meetings: RwLock<HashMap<MeetingId, SharedMeeting>>,
    /// 新しく作る Meeting の履歴容量
    history_capacity: usize,
}

impl InMemoryMeetingRepository {
    /// 新しい InMemoryMeetingRepository を作成
    pub fn new(history_capacity: usize) -> Self {
        Self {
            meetings: RwLock::new(HashMap::new()),
            history_capacity,
        }
    }

    fn new_meeting(
        &self,
        meeting_id: MeetingId,
        title: MeetingTitle,
        created_at: Timestamp,
    ) -> SharedMeeting {
        Arc::new(Mutex::new(Meeting::with_capacity(
            meeting_id,
            title,
            created_at,
            self.history_capacity,
        )))
    }
}

impl Default for InMemoryMeetingRepository {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

#[async_trait]
impl MeetingRepository for InMemoryMeetingRepository {
    async fn get_or_create(
        &self,
        meeting_id: &MeetingId,
        title: Option<MeetingTitle>,
        created_at: Timestamp,
    ) -> SharedMeeting {
        // 既存の Meeting なら読み取りロックだけで済ませる
        if let Some(meeting) = self.meetings.read().await.get(meeting_id) {
            return meeting.clone();
        }

        let mut meetings = self.meetings.write().await;
        meetings
            .entry(meeting_id.clone())
            .or_insert_with(|| {
                let title = title.unwrap_or_else(|| MeetingTitle::from_meeting_id(meeting_id));
                tracing::info!("Meeting '{}' created", meeting_id);
                self.new_meeting(meeting_id.clone(), title, created_at)
            })
            .clone()
    }

    async fn get(&self, meeting_id: &MeetingId) -> Option<SharedMeeting> {
        self.meetings.read().await.get(meeting_id).cloned()
    }

    async fn create(
        &self,
        meeting_id: MeetingId,
        title: MeetingTitle,
        created_at: Timestamp,
    ) -> Result<SharedMeeting, RepositoryError> {
        let mut meetings = self.meetings.write().await;
        if meetings.contains_key(&meeting_id) {
            return Err(RepositoryError::MeetingAlreadyExists(
                meeting_id.into_string(),
            ));
        }

        let meeting = self.new_meeting(meeting_id.clone(), title, created_at);
        tracing::info!("Meeting '{}' created explicitly", meeting_id);
        meetings.insert(meeting_id, meeting.clone());
        Ok(meeting)
    }

    async fn remove(&self, meeting_id: &MeetingId) -> bool {
        let mut meetings = self.meetings.write().await;
        match meetings.remove(meeting_id) {
            Some(meeting) => {
                meeting.lock().await.retire();
                tracing::info!("Meeting '{}' removed", meeting_id);
                true
            }
            None => false,
        }
    }

    async fn remove_if_empty(&self, meeting_id: &MeetingId, vacancy_epoch: u64) -> bool {
        // マップの書き込みロックを持ったまま Meeting をロックして判定する。
        // 判定から削除までの間に、この Meeting を新たに取得できる者はいない。
        let mut meetings = self.meetings.write().await;
        let Some(meeting) = meetings.get(meeting_id).cloned() else {
            return false;
        };

        let mut guard = meeting.lock().await;
        // 一度埋まってから再び空になった場合は、その新しい空き期間のタイマーに任せる
        if !guard.is_empty() || guard.vacancy_epoch() != vacancy_epoch {
            return false;
        }
        guard.retire();
        meetings.remove(meeting_id);
        tracing::info!("Meeting '{}' removed (empty)", meeting_id);
        true
    }

    async fn all(&self) -> Vec<SharedMeeting> {
        self.meetings.read().await.values().cloned().collect()
    }

    async fn list(&self) -> Vec<MeetingSummary> {
        // マップのロックは Arc の複製にだけ使い、各 Meeting は個別にロックする
        let handles: Vec<SharedMeeting> = self.meetings.read().await.values().cloned().collect();

        let mut summaries = Vec::with_capacity(handles.len());
        for handle in handles {
            let meeting = handle.lock().await;
            if !meeting.is_retired() {
                summaries.push(meeting.summary());
            }
        }
        summaries.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.meeting_id.cmp(&b.meeting_id))
        });
        summaries
    }

    async fn count(&self) -> usize {
        self.meetings.read().await.len()
    }
}
