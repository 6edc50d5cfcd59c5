//! Shared utilities for the yoriai meeting server.

pub mod logger;
pub mod time;
