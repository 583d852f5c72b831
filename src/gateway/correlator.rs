//! Request/response correlation for the lookup endpoint
//!
//! The gateway pushes candidates from the session's reader task while callers
//! block on their own request. The correlator owns a lock-guarded table of
//! per-request buffers; the reader posts into it and each caller awaits a
//! oneshot completion keyed by its request id.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, warn};

use super::messages::{ContractPayload, IncomingMessage, OutgoingMessage};
use crate::common::errors::{Result, SyncError};
use crate::common::traits::ContractResolver;
use crate::common::types::{InstrumentDescriptor, ResolvedContract};
use crate::resolve::score::pick_best;

/// Broker error codes reported as "no security definition" warnings
const WARNING_CODES: [i64; 2] = [200, 201];

/// One in-flight lookup: buffered candidates plus its completion signal
struct PendingLookup {
    candidates: Vec<ResolvedContract>,
    done: oneshot::Sender<Vec<ResolvedContract>>,
}

/// State shared between caller tasks and the session's reader task
struct CorrelatorState {
    /// Next request id to hand out; None until the handshake arrives
    next_id: Option<i64>,
    /// In-flight lookups keyed by request id
    pending: HashMap<i64, PendingLookup>,
    /// Accumulated broker warnings, never raised
    warnings: Vec<String>,
}

/// Correlates streamed lookup responses with their originating requests
pub struct Correlator {
    state: Mutex<CorrelatorState>,
    /// Signals that the initial valid request id has arrived
    ready_tx: watch::Sender<bool>,
    ready_rx: watch::Receiver<bool>,
    /// Outbound requests, drained by the session's writer task
    outbound: mpsc::Sender<OutgoingMessage>,
    handshake_timeout: Duration,
}

impl Correlator {
    /// Create a correlator that sends requests through `outbound`
    pub fn new(outbound: mpsc::Sender<OutgoingMessage>, handshake_timeout: Duration) -> Self {
        let (ready_tx, ready_rx) = watch::channel(false);
        Self {
            state: Mutex::new(CorrelatorState {
                next_id: None,
                pending: HashMap::new(),
                warnings: Vec::new(),
            }),
            ready_tx,
            ready_rx,
            outbound,
            handshake_timeout,
        }
    }

    /// Feed one inbound gateway message. Called from the reader task.
    pub fn handle_message(&self, msg: IncomingMessage) {
        match msg {
            IncomingMessage::NextValidId { order_id } => {
                let mut state = self.state.lock().expect("correlator lock poisoned");
                if state.next_id.is_none() {
                    debug!(order_id, "received initial valid request id");
                    state.next_id = Some(order_id);
                }
                drop(state);
                let _ = self.ready_tx.send(true);
            }
            IncomingMessage::ContractDetails { req_id, contract } => {
                let mut state = self.state.lock().expect("correlator lock poisoned");
                match state.pending.get_mut(&req_id) {
                    Some(pending) => pending.candidates.push(ResolvedContract::from(contract)),
                    // Caller already gave up on this id or never owned it
                    None => debug!(req_id, "dropping candidate for unknown request id"),
                }
            }
            IncomingMessage::ContractDetailsEnd { req_id } => {
                let mut state = self.state.lock().expect("correlator lock poisoned");
                if let Some(pending) = state.pending.remove(&req_id) {
                    // Receiver may have timed out; the buffer is dropped then
                    let _ = pending.done.send(pending.candidates);
                }
            }
            IncomingMessage::Error {
                req_id,
                code,
                message,
            } => {
                if WARNING_CODES.contains(&code) {
                    let mut state = self.state.lock().expect("correlator lock poisoned");
                    state.warnings.push(format!("[{req_id}] {code} {message}"));
                } else {
                    warn!(req_id, code, %message, "gateway reported error");
                }
            }
            IncomingMessage::Unknown => {}
        }
    }

    /// Return the next request id, strictly increasing per session.
    ///
    /// Blocks until the gateway's initial valid id arrives, failing with
    /// `ConnectionNotReady` after the handshake timeout.
    pub async fn next_request_id(&self) -> Result<i64> {
        let mut ready = self.ready_rx.clone();
        let wait = async {
            while !*ready.borrow_and_update() {
                if ready.changed().await.is_err() {
                    break;
                }
            }
        };
        tokio::time::timeout(self.handshake_timeout, wait)
            .await
            .map_err(|_| SyncError::ConnectionNotReady(self.handshake_timeout.as_secs()))?;

        let mut state = self.state.lock().expect("correlator lock poisoned");
        let id = state
            .next_id
            .ok_or(SyncError::ConnectionNotReady(self.handshake_timeout.as_secs()))?;
        state.next_id = Some(id + 1);
        Ok(id)
    }

    /// Broker warnings accumulated so far
    pub fn warnings(&self) -> Vec<String> {
        self.state
            .lock()
            .expect("correlator lock poisoned")
            .warnings
            .clone()
    }

    async fn resolve_inner(
        &self,
        key: &str,
        wanted: &InstrumentDescriptor,
        timeout: Duration,
    ) -> Result<Option<ResolvedContract>> {
        let req_id = self.next_request_id().await?;
        let (done_tx, done_rx) = oneshot::channel();
        {
            let mut state = self.state.lock().expect("correlator lock poisoned");
            state.pending.insert(
                req_id,
                PendingLookup {
                    candidates: Vec::new(),
                    done: done_tx,
                },
            );
        }

        let request = OutgoingMessage::ReqContractDetails {
            req_id,
            contract: ContractPayload::from(wanted),
        };
        self.outbound
            .send(request)
            .await
            .map_err(|e| SyncError::ChannelSend(e.to_string()))?;

        match tokio::time::timeout(timeout, done_rx).await {
            Ok(Ok(candidates)) => {
                debug!(key, req_id, count = candidates.len(), "lookup complete");
                Ok(pick_best(wanted, candidates, Utc::now().date_naive()))
            }
            Ok(Err(_)) => {
                // Reader task went away before the terminator; treat like a miss
                debug!(key, req_id, "lookup stream closed before terminator");
                Ok(None)
            }
            Err(_) => {
                // Expected for unsubscribed/slow lookups. The buffer stays
                // orphaned until its terminator arrives and clears it.
                debug!(key, req_id, "lookup timed out after {:?}", timeout);
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl ContractResolver for Correlator {
    async fn resolve(
        &self,
        key: &str,
        wanted: &InstrumentDescriptor,
        timeout: Duration,
    ) -> Result<Option<ResolvedContract>> {
        self.resolve_inner(key, wanted, timeout).await
    }
}
