//! ユースケースのテスト用フィクスチャ

use std::{sync::Arc, time::Duration};

use tokio::sync::mpsc;
use yoriai_shared::time::FixedClock;

use crate::{
    domain::{
        ConnectionId, DisplayName, MeetingId, MeetingRepository, MessagePusher, Role,
        SessionBinding, SessionRepository, SharedMeeting,
    },
    infrastructure::{
        dto::websocket::ServerMessage,
        message_pusher::WebSocketMessagePusher,
        repository::{InMemoryMeetingRepository, InMemorySessionRepository},
    },
};

use super::{
    BroadcastRouter, CleanupScheduler, DisconnectParticipantUseCase, JoinMeetingInput,
    JoinMeetingUseCase, ParticipantProfile,
};

/// テストで使う固定時刻
pub const TEST_NOW: i64 = 1_700_000_000_000;

pub struct TestContext {
    pub repository: Arc<dyn MeetingRepository>,
    pub sessions: Arc<InMemorySessionRepository>,
    pub pusher: Arc<WebSocketMessagePusher>,
    pub router: Arc<BroadcastRouter>,
    pub clock: Arc<FixedClock>,
    pub disconnect_usecase: Arc<DisconnectParticipantUseCase>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_repository(Arc::new(InMemoryMeetingRepository::default()))
    }

    pub fn with_repository(repository: Arc<dyn MeetingRepository>) -> Self {
        let sessions = Arc::new(InMemorySessionRepository::new());
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let router = Arc::new(BroadcastRouter::new(pusher.clone()));
        let scheduler = Arc::new(CleanupScheduler::new(
            repository.clone(),
            Duration::from_secs(300),
        ));
        let disconnect_usecase = Arc::new(DisconnectParticipantUseCase::new(
            repository.clone(),
            sessions.clone(),
            pusher.clone(),
            router.clone(),
            scheduler,
        ));
        Self {
            repository,
            sessions,
            pusher,
            router,
            clock: Arc::new(FixedClock::new(TEST_NOW)),
            disconnect_usecase,
        }
    }

    /// 接続を登録し、その接続に届くフレームの受信側を返す
    pub async fn connect(&self, id: &str) -> (ConnectionId, mpsc::UnboundedReceiver<String>) {
        let connection_id = ConnectionId::new(id.to_string()).unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        self.pusher.register_client(connection_id.clone(), tx).await;
        (connection_id, rx)
    }

    pub fn join_usecase(&self) -> JoinMeetingUseCase {
        JoinMeetingUseCase::new(
            self.repository.clone(),
            self.sessions.clone(),
            self.router.clone(),
            self.disconnect_usecase.clone(),
            self.clock.clone(),
        )
    }

    pub async fn meeting(&self, id: &str) -> Option<SharedMeeting> {
        let meeting_id = MeetingId::new(id.to_string()).unwrap();
        self.repository.get(&meeting_id).await
    }

    pub async fn sessions_lookup(&self, connection_id: &ConnectionId) -> Option<SessionBinding> {
        self.sessions.lookup(connection_id).await
    }
}

pub fn join_input(meeting_id: &str, role: &str, name: &str) -> JoinMeetingInput {
    JoinMeetingInput {
        meeting_id: MeetingId::new(meeting_id.to_string()).unwrap(),
        title: None,
        profile: ParticipantProfile {
            role: Role::new(role.to_string()).unwrap(),
            display_name: DisplayName::new(name.to_string()).unwrap(),
            user_id: None,
        },
    }
}

/// 受信済みのフレームをすべて取り出してデコードする
pub fn drain(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<ServerMessage> {
    let mut messages = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        messages.push(serde_json::from_str(&frame).unwrap());
    }
    messages
}
