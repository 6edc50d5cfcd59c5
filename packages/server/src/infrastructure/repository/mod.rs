//! Repository 実装
//!
//! - `inmemory`: プロセス内の HashMap を使った実装（永続化しない）

pub mod inmemory;

pub use inmemory::{InMemoryMeetingRepository, InMemorySessionRepository};
