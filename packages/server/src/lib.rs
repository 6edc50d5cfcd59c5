//! yoriai meeting server.
//!
//! Ephemeral multi-party meetings over WebSocket: participants join a meeting by id,
//! exchange chat messages and typing indicators, and empty meetings are deleted
//! after a grace period.

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
