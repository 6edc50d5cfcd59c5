//! Cleanup Scheduler
//!
//! 参加者が 0 人になった Meeting を猶予期間の後に削除する。
//!
//! - 参加者数が 0 になるたびに 1 回だけ発火するタイマーを仕掛ける（`arm`）
//! - 発火時に *その時点の* 参加者数を確認し、0 のときだけ削除する
//! - 同じ Meeting に複数のタイマーが仕掛けられても、削除されるのは高々 1 回
//!
//! 再び参加者が入った Meeting は、発火時の確認に失敗することで暗黙にキャンセルされる。
//! タイマーは仕掛けた時点の `vacancy_epoch` を持ち、発火時にそれが変わっていれば
//! 何もしない。空になり、埋まり、また空になった Meeting は、最後に空になった時点から
//! 猶予期間いっぱい残る。

use std::{sync::Arc, time::Duration};

use tokio::task::JoinHandle;

use crate::domain::{MeetingId, MeetingRepository};

/// 削除までの猶予期間のデフォルト（5 分）
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(5 * 60);

pub struct CleanupScheduler {
    repository: Arc<dyn MeetingRepository>,
    grace_period: Duration,
}

impl CleanupScheduler {
    pub fn new(repository: Arc<dyn MeetingRepository>, grace_period: Duration) -> Self {
        Self {
            repository,
            grace_period,
        }
    }

    pub fn grace_period(&self) -> Duration {
        self.grace_period
    }

    /// 猶予期間の後に削除を試みるタスクを起動する
    ///
    /// `vacancy_epoch` は空になった時点の [`Meeting::vacancy_epoch`]。
    /// タスクは削除した場合に true を返す。
    ///
    /// [`Meeting::vacancy_epoch`]: crate::domain::Meeting::vacancy_epoch
    pub fn arm(&self, meeting_id: MeetingId, vacancy_epoch: u64) -> JoinHandle<bool> {
        let repository = self.repository.clone();
        let grace_period = self.grace_period;
        tracing::debug!(
            "Cleanup armed for meeting '{}' ({}s)",
            meeting_id,
            grace_period.as_secs()
        );

        tokio::spawn(async move {
            tokio::time::sleep(grace_period).await;
            sweep(repository.as_ref(), &meeting_id, vacancy_epoch).await
        })
    }
}

async fn sweep(
    repository: &dyn MeetingRepository,
    meeting_id: &MeetingId,
    vacancy_epoch: u64,
) -> bool {
    let removed = repository.remove_if_empty(meeting_id, vacancy_epoch).await;
    if removed {
        tracing::info!("Meeting '{}' deleted after grace period", meeting_id);
    } else {
        tracing::debug!(
            "Cleanup skipped for meeting '{}' (occupied, emptied again or already removed)",
            meeting_id
        );
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{ConnectionId, DisplayName, Participant, Role, Timestamp},
        infrastructure::repository::InMemoryMeetingRepository,
    };

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - 猶予期間後の削除と、発火時の再確認
    //
    // 【なぜこのテストが必要か】
    // - 仕掛けた時点ではなく発火した時点の参加者数で判定しないと、
    //   再び埋まった Meeting を削除してしまう
    //
    // 【どのようなシナリオをテストするか】
    // 1. 空のまま猶予期間が過ぎると削除される
    // 2. 猶予期間中に参加者が入ると削除されない
    // 3. 複数回仕掛けても削除は 1 回だけで、後続の発火はエラーにならない
    // 4. 空、参加、再び空と続いた場合は、最後に空になった時点から猶予期間を数える
    // ========================================

    fn meeting_id() -> MeetingId {
        MeetingId::new("room1".to_string()).unwrap()
    }

    fn participant() -> Participant {
        Participant::new(
            ConnectionId::new("c1".to_string()).unwrap(),
            None,
            DisplayName::new("Ana".to_string()).unwrap(),
            Role::new("teacher".to_string()).unwrap(),
            Timestamp::new(0),
        )
    }

    fn setup() -> (Arc<InMemoryMeetingRepository>, CleanupScheduler) {
        let repository = Arc::new(InMemoryMeetingRepository::default());
        let scheduler = CleanupScheduler::new(repository.clone(), DEFAULT_GRACE_PERIOD);
        (repository, scheduler)
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_meeting_is_deleted_after_grace_period() {
        // テスト項目: 空のまま猶予期間が過ぎた Meeting は削除される
        // given (前提条件):
        let (repository, scheduler) = setup();
        repository
            .get_or_create(&meeting_id(), None, Timestamp::new(0))
            .await;

        // when (操作):
        let handle = scheduler.arm(meeting_id(), 0);
        tokio::time::advance(DEFAULT_GRACE_PERIOD - Duration::from_secs(1)).await;
        let still_there = repository.get(&meeting_id()).await.is_some();
        let removed = handle.await.unwrap();

        // then (期待する結果):
        assert!(still_there);
        assert!(removed);
        assert!(repository.get(&meeting_id()).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_refilled_meeting_is_not_deleted() {
        // テスト項目: 猶予期間中に参加者が入った Meeting は発火しても削除されない
        // given (前提条件):
        let (repository, scheduler) = setup();
        let meeting = repository
            .get_or_create(&meeting_id(), None, Timestamp::new(0))
            .await;
        let handle = scheduler.arm(meeting_id(), 0);

        // when (操作):
        tokio::time::advance(Duration::from_secs(60)).await;
        meeting.lock().await.add_participant(participant());
        let removed = handle.await.unwrap();

        // then (期待する結果):
        assert!(!removed);
        assert!(repository.get(&meeting_id()).await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_multiple_arms_delete_at_most_once() {
        // テスト項目: 複数回仕掛けても削除は 1 回だけ
        // given (前提条件):
        let (repository, scheduler) = setup();
        repository
            .get_or_create(&meeting_id(), None, Timestamp::new(0))
            .await;

        // when (操作):
        let first = scheduler.arm(meeting_id(), 0);
        tokio::time::advance(Duration::from_secs(10)).await;
        let second = scheduler.arm(meeting_id(), 0);
        let results = [first.await.unwrap(), second.await.unwrap()];

        // then (期待する結果):
        assert_eq!(results.iter().filter(|removed| **removed).count(), 1);
        assert_eq!(repository.count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_emptied_again_waits_full_grace_period() {
        // テスト項目: 再び空になった Meeting は古いタイマーでは削除されず、最後の空きから猶予期間いっぱい残る
        // given (前提条件):
        let (repository, scheduler) = setup();
        let meeting = repository
            .get_or_create(&meeting_id(), None, Timestamp::new(0))
            .await;
        let ana = participant();
        let first_epoch = {
            let mut guard = meeting.lock().await;
            guard.add_participant(ana.clone());
            guard.remove_participant(&ana.connection_id);
            guard.vacancy_epoch()
        };
        let first = scheduler.arm(meeting_id(), first_epoch);

        // when (操作): 猶予期間の途中で参加して、また抜ける
        tokio::time::advance(DEFAULT_GRACE_PERIOD - Duration::from_secs(10)).await;
        let second_epoch = {
            let mut guard = meeting.lock().await;
            guard.add_participant(ana.clone());
            guard.remove_participant(&ana.connection_id);
            guard.vacancy_epoch()
        };
        let second = scheduler.arm(meeting_id(), second_epoch);
        let first_removed = first.await.unwrap();
        let kept_after_first = repository.get(&meeting_id()).await.is_some();
        let second_removed = second.await.unwrap();

        // then (期待する結果):
        assert!(!first_removed);
        assert!(kept_after_first);
        assert!(second_removed);
        assert!(repository.get(&meeting_id()).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_firing_for_unknown_meeting_is_noop() {
        // テスト項目: 存在しない Meeting への発火は何もしない
        // given (前提条件):
        let (_repository, scheduler) = setup();

        // when (操作):
        let removed = scheduler.arm(meeting_id(), 0).await.unwrap();

        // then (期待する結果):
        assert!(!removed);
    }
}
