//! Server configuration resolved from the command line.

use std::time::Duration;

use crate::{domain::DEFAULT_HISTORY_CAPACITY, usecase::DEFAULT_GRACE_PERIOD};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 空になった Meeting を削除するまでの猶予期間
    pub grace_period: Duration,
    /// Meeting ごとに保持するメッセージ数
    pub history_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            grace_period: DEFAULT_GRACE_PERIOD,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}
