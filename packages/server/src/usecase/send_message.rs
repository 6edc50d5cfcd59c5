//! UseCase: チャットメッセージ送信
//!
//! ## 処理の流れ
//!
//! 1. 送信者の接続からバインディングを引く（なければ NoSession）
//! 2. 本文を検証する（参加していない接続には本文の内容によらず NoSession を返す）
//! 3. Meeting のロック内でメッセージを作成し、履歴に追加
//! 4. 送信者を含む全参加者に `newMessage` を配送
//!
//! 送信者の名前とロールは Meeting 内の参加者情報から取る。クライアントが
//! メッセージに含めた値は使わない。

use std::sync::Arc;

use yoriai_shared::time::Clock;

use crate::domain::{
    ChatMessage, ConnectionId, MeetingEvent, MeetingRepository, MessageContent,
    SessionRepository, Timestamp,
};

use super::{broadcast::BroadcastRouter, error::MeetingError};

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    repository: Arc<dyn MeetingRepository>,
    session_repository: Arc<dyn SessionRepository>,
    router: Arc<BroadcastRouter>,
    clock: Arc<dyn Clock>,
}

impl SendMessageUseCase {
    pub fn new(
        repository: Arc<dyn MeetingRepository>,
        session_repository: Arc<dyn SessionRepository>,
        router: Arc<BroadcastRouter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            session_repository,
            router,
            clock,
        }
    }

    /// メッセージ送信を実行
    ///
    /// # Returns
    ///
    /// * `Ok(ChatMessage)` - 履歴に追加され、配送されたメッセージ
    /// * `Err(MeetingError)` - 未参加、本文が不正、または Meeting が削除済み
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        content: String,
    ) -> Result<ChatMessage, MeetingError> {
        // 1. バインディング
        let binding = self
            .session_repository
            .lookup(connection_id)
            .await
            .ok_or(MeetingError::NoSession)?;
        let content = MessageContent::new(content)?;
        let handle = self
            .repository
            .get(&binding.meeting_id)
            .await
            .ok_or_else(|| MeetingError::NotFound(binding.meeting_id.to_string()))?;

        // 履歴への追加と配送を同じロック内で行う
        let mut meeting = handle.lock().await;
        if meeting.is_retired() {
            return Err(MeetingError::NotFound(binding.meeting_id.to_string()));
        }
        let sender = meeting
            .participant(connection_id)
            .cloned()
            .ok_or(MeetingError::NoSession)?;

        let message = ChatMessage::new(
            meeting.id.clone(),
            &sender,
            content,
            Timestamp::new(self.clock.now_millis()),
        );
        meeting.add_message(message.clone());
        self.router
            .to_meeting(&meeting, &MeetingEvent::NewMessage(message.clone()))
            .await;

        tracing::debug!(
            "Message '{}' from '{}' stored in meeting '{}' ({} in history)",
            message.id,
            connection_id,
            meeting.id,
            meeting.message_count()
        );
        Ok(message)
    }
}
