//! The seam between a listener and the code that answers its requests.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::web::{Request, Response};

/// Answers every request a listener accepts.
///
/// Listeners do no routing. The implementation decides whether a request is
/// an interaction, a plain route or something to reject.
#[async_trait]
pub trait InboundService: Send + Sync {
    async fn handle(&self, request: Request, connection: ConnectionInfo) -> Response;
}

pub type BoxedInboundService = Arc<dyn InboundService>;

/// Where a request came from.
///
/// Interactions replayed through a handler keep the `ConnectionInfo` of the
/// webhook call that carried them.
#[derive(Debug, Clone, Default)]
pub struct ConnectionInfo {
    /// `http`, or a label chosen by the caller in tests.
    pub protocol: String,
    pub remote_addr: Option<String>,
    pub local_addr: Option<String>,
}

impl ConnectionInfo {
    pub fn new(protocol: impl Into<String>) -> Self {
        Self {
            protocol: protocol.into(),
            remote_addr: None,
            local_addr: None,
        }
    }

    pub fn with_remote_addr(self, addr: impl Into<String>) -> Self {
        Self {
            remote_addr: Some(addr.into()),
            ..self
        }
    }

    pub fn with_local_addr(self, addr: impl Into<String>) -> Self {
        Self {
            local_addr: Some(addr.into()),
            ..self
        }
    }
}

/// Keeps a listener alive; stopping or dropping it begins graceful shutdown.
#[derive(Debug)]
pub struct ListenerHandle {
    /// Address actually bound, with the real port when `0` was requested.
    pub local_addr: String,
    shutdown: Option<oneshot::Sender<()>>,
}

impl ListenerHandle {
    pub fn new(local_addr: impl Into<String>, shutdown: oneshot::Sender<()>) -> Self {
        Self {
            local_addr: local_addr.into(),
            shutdown: Some(shutdown),
        }
    }

    pub fn stop(mut self) {
        self.signal();
    }

    fn signal(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            // The server task may already be gone.
            let _ = tx.send(());
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.signal();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_builders() {
        let conn = ConnectionInfo::new("http")
            .with_remote_addr("10.0.0.1:5000")
            .with_local_addr("0.0.0.0:8080");
        assert_eq!(conn.protocol, "http");
        assert_eq!(conn.remote_addr.as_deref(), Some("10.0.0.1:5000"));
        assert_eq!(conn.local_addr.as_deref(), Some("0.0.0.0:8080"));
    }

    #[test]
    fn test_stop_and_drop_signal_shutdown() {
        let (tx, mut rx) = oneshot::channel();
        ListenerHandle::new("127.0.0.1:1", tx).stop();
        assert!(rx.try_recv().is_ok());

        let (tx, mut rx) = oneshot::channel();
        drop(ListenerHandle::new("127.0.0.1:2", tx));
        assert!(rx.try_recv().is_ok());
    }
}
