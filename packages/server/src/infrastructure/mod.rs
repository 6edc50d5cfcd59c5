//! Infrastructure layer: concrete repositories, the WebSocket pusher and DTOs.

pub mod dto;
pub mod message_pusher;
pub mod repository;
