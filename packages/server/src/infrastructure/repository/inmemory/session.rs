//! InMemory Session Repository 実装
//!
//! 接続 ID → セッションバインディングの対応を保持します。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{ConnectionId, SessionBinding, SessionRepository};

/// インメモリ Session Repository 実装
#[derive(Default)]
pub struct InMemorySessionRepository {
    bindings: RwLock<HashMap<ConnectionId, SessionBinding>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn bind(&self, binding: SessionBinding) {
        let mut bindings = self.bindings.write().await;
        tracing::debug!(
            "Connection '{}' bound to meeting '{}'",
            binding.connection_id,
            binding.meeting_id
        );
        bindings.insert(binding.connection_id.clone(), binding);
    }

    async fn lookup(&self, connection_id: &ConnectionId) -> Option<SessionBinding> {
        self.bindings.read().await.get(connection_id).cloned()
    }

    async fn unbind(&self, connection_id: &ConnectionId) -> Option<SessionBinding> {
        let removed = self.bindings.write().await.remove(connection_id);
        if removed.is_some() {
            tracing::debug!("Connection '{}' unbound", connection_id);
        }
        removed
    }

    async fn count(&self) -> usize {
        self.bindings.read().await.len()
    }
}
