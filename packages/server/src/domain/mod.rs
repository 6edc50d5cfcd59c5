//! Domain layer: value objects, entities, events and the interfaces
//! (repositories, message pusher) the use cases depend on.

pub mod entity;
pub mod error;
pub mod event;
pub mod message_pusher;
pub mod repository;
pub mod value_object;

pub use entity::{
    ChatMessage, DEFAULT_HISTORY_CAPACITY, Meeting, MeetingSummary, Participant, SessionBinding,
};
pub use error::{MessagePushError, RepositoryError, ValueObjectError};
pub use event::MeetingEvent;
pub use message_pusher::{MessagePusher, PusherChannel};
pub use repository::{MeetingRepository, SessionRepository, SharedMeeting};
pub use value_object::{
    ConnectionId, DisplayName, MeetingId, MeetingTitle, MessageContent, MessageId, Role,
    Timestamp, UserId,
};

#[cfg(test)]
pub use message_pusher::MockMessagePusher;
