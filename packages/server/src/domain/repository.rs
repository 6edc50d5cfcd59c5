//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{
    ConnectionId, Meeting, MeetingId, MeetingSummary, MeetingTitle, RepositoryError,
    SessionBinding, Timestamp,
};

/// Meeting ごとのロック付きハンドル
///
/// 参加者・履歴の変更はこのロックの中で直列化される。ロックを取った後は
/// [`Meeting::is_retired`] を確認すること（Repository から取り除かれた Meeting は
/// もう誰からも参照されない）。
pub type SharedMeeting = Arc<Mutex<Meeting>>;

/// Meeting Repository trait
///
/// ## ロックの順序
///
/// マップのロック → Meeting のロックの順でのみ取得する。
/// Meeting のロックを持ったままマップのロックを取ってはならない。
#[async_trait]
pub trait MeetingRepository: Send + Sync {
    /// 既存の Meeting を返すか、なければ作成する。同じ ID に対して同時に呼ばれても
    /// 作成されるのは 1 つだけ
    async fn get_or_create(
        &self,
        meeting_id: &MeetingId,
        title: Option<MeetingTitle>,
        created_at: Timestamp,
    ) -> SharedMeeting;

    /// Meeting を取得
    async fn get(&self, meeting_id: &MeetingId) -> Option<SharedMeeting>;

    /// Meeting を明示的に作成。既に存在する場合は `MeetingAlreadyExists`
    async fn create(
        &self,
        meeting_id: MeetingId,
        title: MeetingTitle,
        created_at: Timestamp,
    ) -> Result<SharedMeeting, RepositoryError>;

    /// 無条件に削除。削除した場合は true
    async fn remove(&self, meeting_id: &MeetingId) -> bool;

    /// 参加者が 0 人で、かつ `vacancy_epoch` の空き期間が続いている場合に限り削除。
    /// 判定と削除は同じ Meeting への参加と排他的に行う
    async fn remove_if_empty(&self, meeting_id: &MeetingId, vacancy_epoch: u64) -> bool;

    /// 登録中の全 Meeting のハンドル
    async fn all(&self) -> Vec<SharedMeeting>;

    /// 全 Meeting のスナップショット（各行はそれぞれ 1 時点の状態）
    async fn list(&self) -> Vec<MeetingSummary>;

    /// 登録中の Meeting 数
    async fn count(&self) -> usize;
}

/// Session Repository trait（接続 → Meeting・参加者の対応）
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// バインディングを作成（既存のものは置き換え）
    async fn bind(&self, binding: SessionBinding);

    /// バインディングを取得
    async fn lookup(&self, connection_id: &ConnectionId) -> Option<SessionBinding>;

    /// バインディングを削除して返す（冪等）
    async fn unbind(&self, connection_id: &ConnectionId) -> Option<SessionBinding>;

    /// バインディング数
    async fn count(&self) -> usize;
}
