mod http;
mod websocket;

pub use http::{create_meeting, get_meeting_detail, health_check, list_meetings};
pub use websocket::websocket_handler;
