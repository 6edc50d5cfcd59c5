//! Shared application state.

use std::sync::Arc;

use yoriai_shared::time::{Clock, SystemClock};

use crate::{
    config::ServerConfig,
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        repository::{InMemoryMeetingRepository, InMemorySessionRepository},
    },
    usecase::{
        BroadcastRouter, CleanupScheduler, ConnectClientUseCase, CreateMeetingUseCase,
        DisconnectParticipantUseCase, GetMeetingInfoUseCase, JoinMeetingUseCase,
        ListMeetingsUseCase, SendMessageUseCase, TypingIndicatorUseCase,
    },
};

/// ハンドラーから使うユースケースの集合
pub struct AppState {
    pub connect_client_usecase: Arc<ConnectClientUseCase>,
    pub join_meeting_usecase: Arc<JoinMeetingUseCase>,
    pub send_message_usecase: Arc<SendMessageUseCase>,
    pub typing_indicator_usecase: Arc<TypingIndicatorUseCase>,
    pub get_meeting_info_usecase: Arc<GetMeetingInfoUseCase>,
    pub disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
    pub create_meeting_usecase: Arc<CreateMeetingUseCase>,
    pub list_meetings_usecase: Arc<ListMeetingsUseCase>,
}

impl AppState {
    /// インメモリの Repository で依存関係を組み立てる
    pub fn in_memory(config: &ServerConfig) -> Self {
        Self::in_memory_with_clock(config, Arc::new(SystemClock))
    }

    pub fn in_memory_with_clock(config: &ServerConfig, clock: Arc<dyn Clock>) -> Self {
        // Initialize dependencies in order:
        // 1. Repository
        // 2. MessagePusher
        // 3. Broadcast Router / Cleanup Scheduler
        // 4. UseCases

        // 1. Create Repositories (in-memory)
        let repository = Arc::new(InMemoryMeetingRepository::new(config.history_capacity));
        let session_repository = Arc::new(InMemorySessionRepository::new());

        // 2. Create MessagePusher (WebSocket implementation)
        let message_pusher = Arc::new(WebSocketMessagePusher::new());

        // 3. Create Broadcast Router and Cleanup Scheduler
        let router = Arc::new(BroadcastRouter::new(message_pusher.clone()));
        let cleanup_scheduler = Arc::new(CleanupScheduler::new(
            repository.clone(),
            config.grace_period,
        ));

        // 4. Create UseCases
        let disconnect_participant_usecase = Arc::new(DisconnectParticipantUseCase::new(
            repository.clone(),
            session_repository.clone(),
            message_pusher.clone(),
            router.clone(),
            cleanup_scheduler,
        ));
        let join_meeting_usecase = Arc::new(JoinMeetingUseCase::new(
            repository.clone(),
            session_repository.clone(),
            router.clone(),
            disconnect_participant_usecase.clone(),
            clock.clone(),
        ));

        Self {
            connect_client_usecase: Arc::new(ConnectClientUseCase::new(message_pusher.clone())),
            join_meeting_usecase,
            send_message_usecase: Arc::new(SendMessageUseCase::new(
                repository.clone(),
                session_repository.clone(),
                router.clone(),
                clock.clone(),
            )),
            typing_indicator_usecase: Arc::new(TypingIndicatorUseCase::new(
                repository.clone(),
                session_repository,
                router.clone(),
            )),
            get_meeting_info_usecase: Arc::new(GetMeetingInfoUseCase::new(
                repository.clone(),
                router,
            )),
            disconnect_participant_usecase,
            create_meeting_usecase: Arc::new(CreateMeetingUseCase::new(repository.clone(), clock)),
            list_meetings_usecase: Arc::new(ListMeetingsUseCase::new(repository, message_pusher)),
        }
    }
}
