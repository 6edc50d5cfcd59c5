//! Entity 定義
//!
//! `Meeting` は参加者とメッセージ履歴を集約する。Meeting 自体は同期を持たず、
//! 排他制御は Repository が Meeting ごとに用意するロック（[`SharedMeeting`]）が担う。
//!
//! [`SharedMeeting`]: super::repository::SharedMeeting

use std::collections::VecDeque;

use super::value_object::{
    ConnectionId, DisplayName, MeetingId, MeetingTitle, MessageContent, MessageId, Role, Timestamp,
    UserId,
};

/// メッセージ履歴のデフォルト容量
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// 参加者（1 接続 = 1 参加者）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub connection_id: ConnectionId,
    pub user_id: UserId,
    pub display_name: DisplayName,
    pub role: Role,
    pub joined_at: Timestamp,
}

impl Participant {
    pub fn new(
        connection_id: ConnectionId,
        user_id: Option<UserId>,
        display_name: DisplayName,
        role: Role,
        joined_at: Timestamp,
    ) -> Self {
        let user_id = user_id.unwrap_or_else(|| UserId::from(&connection_id));
        Self {
            connection_id,
            user_id,
            display_name,
            role,
            joined_at,
        }
    }
}

/// チャットメッセージ（生成後は不変）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub meeting_id: MeetingId,
    pub sender_connection_id: ConnectionId,
    pub sender_role: Role,
    pub sender_name: DisplayName,
    pub content: MessageContent,
    pub created_at: Timestamp,
}

impl ChatMessage {
    /// 送信者のスナップショットから新しいメッセージを生成（ID はここで採番）
    pub fn new(
        meeting_id: MeetingId,
        sender: &Participant,
        content: MessageContent,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id: MessageId::generate(),
            meeting_id,
            sender_connection_id: sender.connection_id.clone(),
            sender_role: sender.role.clone(),
            sender_name: sender.display_name.clone(),
            content,
            created_at,
        }
    }
}

/// Meeting エンティティ
#[derive(Debug, Clone)]
pub struct Meeting {
    pub id: MeetingId,
    pub title: MeetingTitle,
    pub created_at: Timestamp,
    /// 参加順を保持する（同じ接続 ID の再参加はその場で置き換え）
    participants: Vec<Participant>,
    history: VecDeque<ChatMessage>,
    history_capacity: usize,
    /// Repository から取り除かれた後は true
    retired: bool,
    /// 参加者が 0 人になった回数。削除タイマーはこの値が変わっていないときだけ削除する
    vacancy_epoch: u64,
}

impl Meeting {
    pub fn new(id: MeetingId, title: MeetingTitle, created_at: Timestamp) -> Self {
        Self::with_capacity(id, title, created_at, DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_capacity(
        id: MeetingId,
        title: MeetingTitle,
        created_at: Timestamp,
        history_capacity: usize,
    ) -> Self {
        Self {
            id,
            title,
            created_at,
            participants: Vec::new(),
            history: VecDeque::with_capacity(history_capacity),
            history_capacity,
            retired: false,
            vacancy_epoch: 0,
        }
    }

    /// 参加者を追加（同じ接続 ID が既にいれば上書き）
    pub fn add_participant(&mut self, participant: Participant) {
        match self
            .participants
            .iter_mut()
            .find(|p| p.connection_id == participant.connection_id)
        {
            Some(existing) => *existing = participant,
            None => self.participants.push(participant),
        }
    }

    /// 参加者を削除。存在しなければ何もしない（冪等）
    ///
    /// 最後の参加者が抜けたときは `vacancy_epoch` を進める。
    pub fn remove_participant(&mut self, connection_id: &ConnectionId) -> Option<Participant> {
        let index = self
            .participants
            .iter()
            .position(|p| &p.connection_id == connection_id)?;
        let removed = self.participants.remove(index);
        if self.participants.is_empty() {
            self.vacancy_epoch += 1;
        }
        Some(removed)
    }

    pub fn participant(&self, connection_id: &ConnectionId) -> Option<&Participant> {
        self.participants
            .iter()
            .find(|p| &p.connection_id == connection_id)
    }

    /// メッセージを履歴に追加。容量を超えた分は古い順に捨てる
    pub fn add_message(&mut self, message: ChatMessage) {
        self.history.push_back(message);
        while self.history.len() > self.history_capacity {
            self.history.pop_front();
        }
    }

    /// 参加者一覧（参加順）
    pub fn participants(&self) -> Vec<Participant> {
        self.participants.clone()
    }

    pub fn participant_ids(&self) -> Vec<ConnectionId> {
        self.participants
            .iter()
            .map(|p| p.connection_id.clone())
            .collect()
    }

    /// メッセージ履歴（到着順）
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.history.iter().cloned().collect()
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    pub fn message_count(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn retire(&mut self) {
        self.retired = true;
    }

    pub fn is_retired(&self) -> bool {
        self.retired
    }

    /// 現在の空き期間の番号（0 人になるたびに 1 増える）
    pub fn vacancy_epoch(&self) -> u64 {
        self.vacancy_epoch
    }

    /// ある時点のスナップショット
    pub fn summary(&self) -> MeetingSummary {
        MeetingSummary {
            meeting_id: self.id.clone(),
            title: self.title.clone(),
            participants: self.participants(),
            message_count: self.message_count(),
            created_at: self.created_at,
        }
    }
}

/// Meeting のメタデータ（一覧・詳細取得用のスナップショット）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetingSummary {
    pub meeting_id: MeetingId,
    pub title: MeetingTitle,
    pub participants: Vec<Participant>,
    pub message_count: usize,
    pub created_at: Timestamp,
}

impl MeetingSummary {
    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }
}

/// 接続と Meeting・参加者の対応（セッションバインディング）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionBinding {
    pub connection_id: ConnectionId,
    pub meeting_id: MeetingId,
    pub participant: Participant,
}
