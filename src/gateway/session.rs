//! Gateway session: one live websocket connection to the lookup endpoint
//!
//! The session owns the connection and its two tasks: a writer draining the
//! correlator's outbound channel and a reader posting every inbound frame
//! back into the correlator. Application logic never touches the socket.

use futures_util::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use super::correlator::Correlator;
use super::messages::IncomingMessage;
use crate::common::errors::{Result, SyncError};
use crate::config::types::GatewayConfig;

/// Outbound channel depth; lookups are few and small
const OUTBOUND_CHANNEL_SIZE: usize = 64;

/// A live connection to the gateway's contract lookup endpoint
pub struct GatewaySession {
    correlator: Arc<Correlator>,
    is_connected: Arc<AtomicBool>,
    shutdown: oneshot::Sender<()>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
    config: GatewayConfig,
}

impl GatewaySession {
    /// Connect to the gateway and start the reader/writer tasks.
    ///
    /// The returned session is usable immediately; callers block inside the
    /// correlator until the gateway's initial valid request id arrives.
    #[instrument(skip(config), fields(host = %config.host, port = config.port, client_id = config.client_id))]
    pub async fn connect(config: &GatewayConfig) -> Result<Self> {
        let url = Self::endpoint_url(config)?;
        info!("Connecting to gateway lookup endpoint: {url}");

        let (ws_stream, _response) = connect_async(url.as_str())
            .await
            .map_err(|e| SyncError::WebSocketConnection(e.to_string()))?;
        info!("Gateway connection established");

        let (mut write, mut read) = ws_stream.split();
        let (outbound_tx, mut outbound_rx) = mpsc::channel(OUTBOUND_CHANNEL_SIZE);
        let correlator = Arc::new(Correlator::new(outbound_tx, config.handshake_timeout()));
        let is_connected = Arc::new(AtomicBool::new(true));

        // Writer task: serialize outbound requests, send a Close on shutdown
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let writer = tokio::spawn(async move {
            loop {
                tokio::select! {
                    msg = outbound_rx.recv() => {
                        let Some(msg) = msg else { break };
                        let json = match serde_json::to_string(&msg) {
                            Ok(json) => json,
                            Err(e) => {
                                error!("Failed to serialize outbound message: {e}");
                                continue;
                            }
                        };
                        debug!("Sending: {json}");
                        if let Err(e) = write.send(Message::Text(json)).await {
                            error!("Gateway send failed: {e}");
                            break;
                        }
                    }
                    _ = &mut shutdown_rx => break,
                }
            }
            let _ = write.send(Message::Close(None)).await;
        });

        // Reader task: drain the inbound stream for the session's lifetime
        let reader_correlator = correlator.clone();
        let reader_connected = is_connected.clone();
        let reader = tokio::spawn(async move {
            while let Some(msg) = read.next().await {
                match msg {
                    Ok(Message::Text(text)) => match serde_json::from_str::<IncomingMessage>(&text) {
                        Ok(incoming) => reader_correlator.handle_message(incoming),
                        Err(e) => warn!("Failed to parse gateway message: {e} - {text}"),
                    },
                    Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                        debug!("Gateway keep-alive frame");
                    }
                    Ok(Message::Close(frame)) => {
                        info!("Gateway closed the connection: {frame:?}");
                        break;
                    }
                    Err(e) => {
                        error!("Gateway connection error: {e}");
                        break;
                    }
                    _ => {}
                }
            }
            reader_connected.store(false, Ordering::SeqCst);
        });

        Ok(Self {
            correlator,
            is_connected,
            shutdown: shutdown_tx,
            reader,
            writer,
            config: config.clone(),
        })
    }

    fn endpoint_url(config: &GatewayConfig) -> Result<Url> {
        let raw = format!(
            "ws://{}:{}/lookup?clientId={}",
            config.host, config.port, config.client_id
        );
        Url::parse(&raw).map_err(|e| SyncError::Configuration(format!("invalid gateway url {raw}: {e}")))
    }

    /// The resolver backed by this connection
    pub fn resolver(&self) -> Arc<Correlator> {
        self.correlator.clone()
    }

    /// Check if the inbound stream is still open
    pub fn is_connected(&self) -> bool {
        self.is_connected.load(Ordering::SeqCst)
    }

    /// Tear the connection down and wait out the client-id release grace.
    ///
    /// The gateway needs time to free the client identity server-side before
    /// the same id can connect again.
    #[instrument(skip(self))]
    pub async fn disconnect(self) {
        let Self {
            correlator,
            is_connected,
            shutdown,
            reader,
            writer,
            config,
        } = self;
        drop(correlator);
        // The writer sends the Close frame on shutdown; the reader then
        // drains the stream to its end.
        let _ = shutdown.send(());
        let _ = writer.await;
        // Bounded wait; a gateway that never acknowledges the Close frame
        // must not stall teardown.
        if tokio::time::timeout(std::time::Duration::from_secs(2), reader)
            .await
            .is_err()
        {
            warn!("Reader task did not finish within close window");
        }
        is_connected.store(false, Ordering::SeqCst);

        let grace = config.client_release_grace();
        info!(
            "Disconnected; waiting {}s for the gateway to release client id {}",
            grace.as_secs(),
            config.client_id
        );
        tokio::time::sleep(grace).await;
    }

    #[cfg(test)]
    fn endpoint_for_test(host: &str, port: u16, client_id: i64) -> String {
        let config = GatewayConfig {
            host: host.to_string(),
            port,
            client_id,
            ..Default::default()
        };
        Self::endpoint_url(&config).unwrap().to_string()
    }
}
