//! インメモリ Repository 実装

pub mod meeting;
pub mod session;

pub use meeting::InMemoryMeetingRepository;
pub use session::InMemorySessionRepository;
