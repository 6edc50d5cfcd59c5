//! MessagePusher trait 定義
//!
//! 接続へのイベント送信（通知）の抽象化。具体的な実装は Infrastructure 層が提供します。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ConnectionId, MeetingEvent, MessagePushError};

/// 接続ごとの送信チャンネル（エンコード済み JSON を流す）
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// MessagePusher trait
///
/// 送信はチャンネルへのキューイングのみで完了し、呼び出し側をブロックしない。
/// 同じ接続へのイベントはキューに入れた順に届く。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 接続の送信チャンネルを登録
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// 接続の送信チャンネルを登録解除
    async fn unregister_client(&self, connection_id: &ConnectionId);

    /// 特定の接続にイベントを送信
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        event: &MeetingEvent,
    ) -> Result<(), MessagePushError>;

    /// 複数の接続にイベントを送信（一部の送信失敗は許容）
    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        event: &MeetingEvent,
    ) -> Result<(), MessagePushError>;

    /// 登録中の接続数
    async fn count_clients(&self) -> usize;
}
