//! Reconnecting WebSocket client for the gateway session.

use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::api::mcp::SessionHandler;
use crate::core::error::AgentError;
use crate::infra::config::redact_url;
use crate::infra::logging::log_metric;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsWrite = SplitSink<WsStream, Message>;

/// Write half of the current connection, or nothing while disconnected.
#[derive(Clone, Default)]
pub struct Outbound {
    sink: Arc<Mutex<Option<WsWrite>>>,
}

impl Outbound {
    pub async fn is_connected(&self) -> bool {
        self.sink.lock().await.is_some()
    }

    async fn attach(&self, write: WsWrite) {
        *self.sink.lock().await = Some(write);
    }

    async fn detach(&self) {
        if let Some(mut write) = self.sink.lock().await.take() {
            let _ = write.close().await;
        }
    }

    /// One attempt, no queue. Returns whether the frame was written.
    async fn send(&self, msg: Message) -> bool {
        let mut guard = self.sink.lock().await;
        let Some(write) = guard.as_mut() else {
            tracing::debug!("dropping outbound frame: not connected");
            return false;
        };
        match write.send(msg).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "outbound send failed");
                log_metric("ws", "send_error_total", 1.0);
                false
            }
        }
    }

    pub async fn send_text(&self, text: String) -> bool {
        tracing::trace!(frame = %text, "TX");
        self.send(Message::Text(text)).await
    }
}

pub struct ConnectionManager {
    url: String,
    handler: SessionHandler,
    ping_interval: Duration,
    reconnect_delay: Duration,
    outbound: Outbound,
}

impl ConnectionManager {
    pub fn new(url: impl Into<String>, handler: SessionHandler, ping_interval: Duration, reconnect_delay: Duration) -> Self {
        Self {
            url: url.into(),
            handler,
            ping_interval,
            reconnect_delay,
            outbound: Outbound::default(),
        }
    }

    /// Connect, serve, and reconnect after a fixed delay, until shutdown.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let target = redact_url(&self.url);
        loop {
            if *shutdown.borrow() {
                break;
            }
            log_metric("ws", "connect_attempt_total", 1.0);
            match tokio_tungstenite::connect_async(self.url.as_str()).await {
                Ok((stream, _)) => {
                    tracing::info!(url = %target, "gateway connected");
                    match self.serve(stream, &mut shutdown).await {
                        Ok(()) => tracing::info!(url = %target, "gateway connection closed"),
                        Err(e) => tracing::warn!(url = %target, error = %e, "gateway connection lost"),
                    }
                }
                Err(e) => tracing::warn!(url = %target, error = %e, "gateway connect failed"),
            }
            if *shutdown.borrow() {
                break;
            }
            tracing::info!(delay_ms = self.reconnect_delay.as_millis() as u64, "reconnecting");
            tokio::select! {
                _ = tokio::time::sleep(self.reconnect_delay) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        tracing::info!("connection manager stopped");
    }

    async fn serve(&self, stream: WsStream, shutdown: &mut watch::Receiver<bool>) -> Result<(), AgentError> {
        let (write, mut read) = stream.split();
        self.outbound.attach(write).await;
        let pinger = spawn_keepalive(self.outbound.clone(), self.ping_interval);

        let result = loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break Ok(());
                    }
                }
                msg = read.next() => match msg {
                    Some(Ok(Message::Text(text))) => self.dispatch(text),
                    Some(Ok(Message::Close(_))) | None => break Ok(()),
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => break Err(AgentError::from(e)),
                },
            }
        };

        pinger.abort();
        self.outbound.detach().await;
        result
    }

    /// Each frame is handled on its own task so slow tools never block reads.
    fn dispatch(&self, text: String) {
        tracing::debug!(frame = %text, "RX");
        let handler = self.handler.clone();
        let outbound = self.outbound.clone();
        tokio::spawn(async move {
            if let Some(reply) = handler.handle_text(&text).await {
                outbound.send_text(reply).await;
            }
        });
    }
}

fn spawn_keepalive(outbound: Outbound, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // First tick fires immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if !outbound.send(Message::Ping(Vec::new())).await {
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_while_disconnected_is_dropped() {
        let out = Outbound::default();
        assert!(!out.is_connected().await);
        assert!(!out.send_text("{}".into()).await);
    }
}
