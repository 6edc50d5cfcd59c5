//! Data Transfer Objects (DTOs) for the meeting server.
//!
//! DTOs are organized by protocol:
//! - `websocket`: WebSocket message DTOs (inbound client events, outbound server events)
//! - `http`: HTTP API request/response DTOs

pub mod conversion;
pub mod http;
pub mod websocket;
