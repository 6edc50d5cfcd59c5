//! UseCase: Meeting への参加
//!
//! ## 処理の流れ
//!
//! 1. 別の Meeting にバインドされていれば、先にその Meeting から退出する
//! 2. Meeting を取得（なければ作成）し、Meeting のロックを取る
//! 3. ロック内でセッションバインディングを作成し、参加者を追加
//! 4. 本人に `meetingJoined`（参加者一覧と履歴）、他の参加者に `participantJoined` を配送
//!
//! ロックを取った Meeting が既に Repository から取り除かれていた場合は、
//! 取得からやり直す（削除の後に参加したものとして新しい Meeting が作られる）。

use std::sync::Arc;

use yoriai_shared::time::Clock;

use crate::domain::{
    ChatMessage, ConnectionId, DisplayName, MeetingEvent, MeetingId, MeetingRepository,
    MeetingTitle, Participant, Role, SessionBinding, SessionRepository, Timestamp, UserId,
};

use super::{
    broadcast::BroadcastRouter, disconnect_participant::DisconnectParticipantUseCase,
    error::MeetingError,
};

/// 参加者のプロフィール（検証済み）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantProfile {
    pub role: Role,
    pub display_name: DisplayName,
    pub user_id: Option<UserId>,
}

/// 参加リクエスト（検証済み）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinMeetingInput {
    pub meeting_id: MeetingId,
    pub title: Option<MeetingTitle>,
    pub profile: ParticipantProfile,
}

/// 参加結果（本人に送ったものと同じ内容）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedMeeting {
    pub meeting_id: MeetingId,
    pub participant: Participant,
    pub participants: Vec<Participant>,
    pub messages: Vec<ChatMessage>,
}

/// Meeting 参加のユースケース
pub struct JoinMeetingUseCase {
    repository: Arc<dyn MeetingRepository>,
    session_repository: Arc<dyn SessionRepository>,
    router: Arc<BroadcastRouter>,
    /// 別の Meeting からの退出に使う
    disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
    clock: Arc<dyn Clock>,
}

impl JoinMeetingUseCase {
    pub fn new(
        repository: Arc<dyn MeetingRepository>,
        session_repository: Arc<dyn SessionRepository>,
        router: Arc<BroadcastRouter>,
        disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            session_repository,
            router,
            disconnect_participant_usecase,
            clock,
        }
    }

    /// 参加を実行
    ///
    /// # Arguments
    ///
    /// * `connection_id` - 参加する接続
    /// * `input` - 検証済みの参加リクエスト
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        input: JoinMeetingInput,
    ) -> Result<JoinedMeeting, MeetingError> {
        // 1. 1 つの接続が属する Meeting は高々 1 つ
        if let Some(binding) = self.session_repository.lookup(connection_id).await
            && binding.meeting_id != input.meeting_id
        {
            tracing::info!(
                "Connection '{}' switches from meeting '{}' to '{}'",
                connection_id,
                binding.meeting_id,
                input.meeting_id
            );
            if let Err(e) = self.disconnect_participant_usecase.leave(connection_id).await {
                tracing::debug!("Previous meeting already gone: {}", e);
            }
        }

        let now = Timestamp::new(self.clock.now_millis());
        let participant = Participant::new(
            connection_id.clone(),
            input.profile.user_id,
            input.profile.display_name,
            input.profile.role,
            now,
        );

        // 2. Meeting のロック内でバインド・参加者の追加・配送まで済ませる
        loop {
            let handle = self
                .repository
                .get_or_create(&input.meeting_id, input.title.clone(), now)
                .await;
            let mut meeting = handle.lock().await;
            if meeting.is_retired() {
                tracing::debug!(
                    "Meeting '{}' was removed while joining, retrying",
                    input.meeting_id
                );
                continue;
            }

            // 3. セッションバインディング（同じ接続の再参加は置き換え）。
            //    バインドの直後、await を挟まずに参加者を追加する
            self.session_repository
                .bind(SessionBinding {
                    connection_id: connection_id.clone(),
                    meeting_id: meeting.id.clone(),
                    participant: participant.clone(),
                })
                .await;
            meeting.add_participant(participant.clone());

            let joined = JoinedMeeting {
                meeting_id: meeting.id.clone(),
                participant: participant.clone(),
                participants: meeting.participants(),
                messages: meeting.messages(),
            };

            // 4. 本人への応答と、他の参加者への通知
            self.router
                .to_connection(
                    connection_id,
                    &MeetingEvent::MeetingJoined {
                        meeting_id: meeting.id.clone(),
                        title: meeting.title.clone(),
                        participants: joined.participants.clone(),
                        messages: joined.messages.clone(),
                    },
                )
                .await;
            self.router
                .to_meeting_except(
                    &meeting,
                    connection_id,
                    &MeetingEvent::ParticipantJoined(participant.clone()),
                )
                .await;

            tracing::info!(
                "Connection '{}' joined meeting '{}' as '{}' ({})",
                connection_id,
                meeting.id,
                participant.display_name,
                participant.role
            );
            return Ok(joined);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{MeetingRepository, SharedMeeting},
        infrastructure::{dto::websocket::ServerMessage, repository::InMemoryMeetingRepository},
        usecase::test_support::{TestContext, drain, join_input},
    };
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - JoinMeetingUseCase::execute()
    //
    // 【どのようなシナリオをテストするか】
    // 1. 最初の参加者は空の履歴と自分だけの参加者一覧を受け取る
    // 2. 2 人目の参加は 1 人目に通知され、本人には 2 人分の一覧が返る
    // 3. 同じ接続で別の Meeting に参加すると、元の Meeting から退出する
    // 4. 同じ ID に同時に参加しても Meeting は 1 つだけ
    // 5. 取得した Meeting が削除済みなら新しい Meeting で参加し直す
    // ========================================

    #[tokio::test]
    async fn test_first_participant_receives_meeting_joined() {
        // テスト項目: 最初の参加者に自分だけの参加者一覧と空の履歴が返る
        // given (前提条件):
        let ctx = TestContext::new();
        let (ana, mut ana_rx) = ctx.connect("ana").await;

        // when (操作):
        let joined = ctx
            .join_usecase()
            .execute(&ana, join_input("room1", "teacher", "Ana"))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(joined.participants.len(), 1);
        assert!(joined.messages.is_empty());
        let received = drain(&mut ana_rx);
        assert_eq!(received.len(), 1);
        match &received[0] {
            ServerMessage::MeetingJoined {
                meeting_id,
                participants,
                messages,
                ..
            } => {
                assert_eq!(meeting_id, "room1");
                assert_eq!(participants.len(), 1);
                assert_eq!(participants[0].name, "Ana");
                assert_eq!(participants[0].role, "teacher");
                assert!(messages.is_empty());
            }
            other => panic!("unexpected message: {:?}", other),
        }
        assert_eq!(ctx.sessions.count().await, 1);
    }

    #[tokio::test]
    async fn test_second_participant_is_announced_to_others_only() {
        // テスト項目: 2 人目の参加は既存の参加者に通知され、本人には 2 人分の一覧が返る
        // given (前提条件):
        let ctx = TestContext::new();
        let usecase = ctx.join_usecase();
        let (ana, mut ana_rx) = ctx.connect("ana").await;
        let (bo, mut bo_rx) = ctx.connect("bo").await;
        usecase
            .execute(&ana, join_input("room1", "teacher", "Ana"))
            .await
            .unwrap();
        drain(&mut ana_rx);

        // when (操作):
        usecase
            .execute(&bo, join_input("room1", "student", "Bo"))
            .await
            .unwrap();

        // then (期待する結果):
        let ana_received = drain(&mut ana_rx);
        assert_eq!(ana_received.len(), 1);
        assert!(matches!(
            &ana_received[0],
            ServerMessage::ParticipantJoined { participant } if participant.name == "Bo"
        ));

        let bo_received = drain(&mut bo_rx);
        assert_eq!(bo_received.len(), 1);
        match &bo_received[0] {
            ServerMessage::MeetingJoined { participants, .. } => {
                let names: Vec<&str> = participants.iter().map(|p| p.name.as_str()).collect();
                assert_eq!(names, vec!["Ana", "Bo"]);
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_joining_another_meeting_leaves_previous_one() {
        // テスト項目: 別の Meeting に参加すると元の Meeting から退出する
        // given (前提条件):
        let ctx = TestContext::new();
        let usecase = ctx.join_usecase();
        let (ana, _ana_rx) = ctx.connect("ana").await;
        let (bo, mut bo_rx) = ctx.connect("bo").await;
        usecase
            .execute(&ana, join_input("room1", "teacher", "Ana"))
            .await
            .unwrap();
        usecase
            .execute(&bo, join_input("room1", "student", "Bo"))
            .await
            .unwrap();
        drain(&mut bo_rx);

        // when (操作):
        usecase
            .execute(&ana, join_input("room2", "teacher", "Ana"))
            .await
            .unwrap();

        // then (期待する結果):
        let room1 = ctx.meeting("room1").await.unwrap();
        assert_eq!(room1.lock().await.participant_count(), 1);
        let room2 = ctx.meeting("room2").await.unwrap();
        assert_eq!(room2.lock().await.participant_count(), 1);
        let binding = ctx.sessions_lookup(&ana).await.unwrap();
        assert_eq!(binding.meeting_id.as_str(), "room2");
        assert!(matches!(
            &drain(&mut bo_rx)[..],
            [ServerMessage::ParticipantLeft { participant }] if participant.name == "Ana"
        ));
    }

    #[tokio::test]
    async fn test_rejoin_same_meeting_replaces_participant() {
        // テスト項目: 同じ接続で同じ Meeting に再参加すると参加者が置き換えられる
        // given (前提条件):
        let ctx = TestContext::new();
        let usecase = ctx.join_usecase();
        let (ana, _ana_rx) = ctx.connect("ana").await;
        usecase
            .execute(&ana, join_input("room1", "teacher", "Ana"))
            .await
            .unwrap();

        // when (操作):
        let joined = usecase
            .execute(&ana, join_input("room1", "teacher", "Ana Maria"))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(joined.participants.len(), 1);
        assert_eq!(joined.participants[0].display_name.as_str(), "Ana Maria");
        let binding = ctx.sessions_lookup(&ana).await.unwrap();
        assert_eq!(binding.participant.display_name.as_str(), "Ana Maria");
    }

    #[tokio::test]
    async fn test_concurrent_joins_create_single_meeting() {
        // テスト項目: 未知の ID に同時に参加しても Meeting は 1 つだけ作られ、全員が参加する
        // given (前提条件):
        let ctx = TestContext::new();
        let usecase = Arc::new(ctx.join_usecase());
        let mut connections = Vec::new();
        for i in 0..16 {
            connections.push(ctx.connect(&format!("c{}", i)).await);
        }

        // when (操作):
        let mut handles = Vec::new();
        for (i, (connection_id, _rx)) in connections.iter().enumerate() {
            let usecase = usecase.clone();
            let connection_id = connection_id.clone();
            handles.push(tokio::spawn(async move {
                usecase
                    .execute(&connection_id, join_input("room1", "student", &format!("S{}", i)))
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        // then (期待する結果):
        assert_eq!(ctx.repository.count().await, 1);
        let room1 = ctx.meeting("room1").await.unwrap();
        assert_eq!(room1.lock().await.participant_count(), 16);
    }

    /// 最初の get_or_create だけ削除済みの Meeting を返す Repository
    struct StaleOnceRepository {
        inner: InMemoryMeetingRepository,
        stale: Mutex<Option<SharedMeeting>>,
    }

    #[async_trait]
    impl MeetingRepository for StaleOnceRepository {
        async fn get_or_create(
            &self,
            meeting_id: &MeetingId,
            title: Option<MeetingTitle>,
            created_at: Timestamp,
        ) -> SharedMeeting {
            if let Some(stale) = self.stale.lock().await.take() {
                return stale;
            }
            self.inner.get_or_create(meeting_id, title, created_at).await
        }

        async fn get(&self, meeting_id: &MeetingId) -> Option<SharedMeeting> {
            self.inner.get(meeting_id).await
        }

        async fn create(
            &self,
            meeting_id: MeetingId,
            title: MeetingTitle,
            created_at: Timestamp,
        ) -> Result<SharedMeeting, crate::domain::RepositoryError> {
            self.inner.create(meeting_id, title, created_at).await
        }

        async fn remove(&self, meeting_id: &MeetingId) -> bool {
            self.inner.remove(meeting_id).await
        }

        async fn remove_if_empty(&self, meeting_id: &MeetingId, vacancy_epoch: u64) -> bool {
            self.inner.remove_if_empty(meeting_id, vacancy_epoch).await
        }

        async fn all(&self) -> Vec<SharedMeeting> {
            self.inner.all().await
        }

        async fn list(&self) -> Vec<crate::domain::MeetingSummary> {
            self.inner.list().await
        }

        async fn count(&self) -> usize {
            self.inner.count().await
        }
    }

    #[tokio::test]
    async fn test_join_retries_when_meeting_was_removed() {
        // テスト項目: 取得した Meeting が削除済みなら、新しい Meeting を作って参加する
        // given (前提条件):
        let inner = InMemoryMeetingRepository::default();
        let id = MeetingId::new("room1".to_string()).unwrap();
        let stale = inner.get_or_create(&id, None, Timestamp::new(0)).await;
        assert!(inner.remove_if_empty(&id, 0).await);
        let repository = Arc::new(StaleOnceRepository {
            inner,
            stale: Mutex::new(Some(stale.clone())),
        });
        let ctx = TestContext::with_repository(repository.clone());
        let (ana, _ana_rx) = ctx.connect("ana").await;

        // when (操作):
        ctx.join_usecase()
            .execute(&ana, join_input("room1", "teacher", "Ana"))
            .await
            .unwrap();

        // then (期待する結果):
        assert!(stale.lock().await.is_empty());
        let fresh = repository.get(&id).await.unwrap();
        assert!(!Arc::ptr_eq(&fresh, &stale));
        assert_eq!(fresh.lock().await.participant_count(), 1);
    }
}
