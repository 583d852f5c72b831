//! Common test utilities: a scripted in-process gateway stub
//!
//! The stub listens on a local port, speaks the lookup wire protocol and
//! answers requests from a per-test script, so integration tests run fully
//! offline and deterministically.

use futures_util::{SinkExt, StreamExt};
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::protocol::Message;

use conid_sync::gateway::messages::{ContractPayload, IncomingMessage, OutgoingMessage};

/// What the stub gateway should do, keyed by requested symbol
#[derive(Debug, Clone, Default)]
pub struct GatewayScript {
    /// Initial valid request id; `None` means the handshake never happens
    pub first_request_id: Option<i64>,
    /// Candidates to stream back per requested symbol
    pub answers: HashMap<String, Vec<ContractPayload>>,
    /// Symbols whose requests get no response at all (caller times out)
    pub silent: HashSet<String>,
}

impl GatewayScript {
    pub fn with_handshake(first_request_id: i64) -> Self {
        Self {
            first_request_id: Some(first_request_id),
            ..Default::default()
        }
    }

    pub fn answer(mut self, symbol: &str, candidates: Vec<ContractPayload>) -> Self {
        self.answers.insert(symbol.to_string(), candidates);
        self
    }

    pub fn silent_on(mut self, symbol: &str) -> Self {
        self.silent.insert(symbol.to_string());
        self
    }
}

/// A running stub gateway bound to an ephemeral local port
pub struct StubGateway {
    pub addr: SocketAddr,
}

impl StubGateway {
    /// Bind and start serving the script; accepts any number of connections
    pub async fn spawn(script: GatewayScript) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub");
        let addr = listener.local_addr().expect("stub addr");

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let script = script.clone();
                tokio::spawn(async move {
                    let ws = match tokio_tungstenite::accept_async(stream).await {
                        Ok(ws) => ws,
                        Err(_) => return,
                    };
                    let (mut write, mut read) = ws.split();

                    if let Some(first_id) = script.first_request_id {
                        let handshake = IncomingMessage::NextValidId { order_id: first_id };
                        if send_json(&mut write, &handshake).await.is_err() {
                            return;
                        }
                    }

                    while let Some(Ok(msg)) = read.next().await {
                        let Message::Text(text) = msg else {
                            if matches!(msg, Message::Close(_)) {
                                break;
                            }
                            continue;
                        };
                        let Ok(request) = serde_json::from_str::<OutgoingMessage>(&text) else {
                            continue;
                        };
                        let OutgoingMessage::ReqContractDetails { req_id, contract } = request;

                        if script.silent.contains(&contract.symbol) {
                            continue;
                        }

                        match script.answers.get(&contract.symbol) {
                            Some(candidates) => {
                                for candidate in candidates {
                                    let reply = IncomingMessage::ContractDetails {
                                        req_id,
                                        contract: candidate.clone(),
                                    };
                                    if send_json(&mut write, &reply).await.is_err() {
                                        return;
                                    }
                                }
                            }
                            None => {
                                let error = IncomingMessage::Error {
                                    req_id,
                                    code: 200,
                                    message: "No security definition has been found".to_string(),
                                };
                                if send_json(&mut write, &error).await.is_err() {
                                    return;
                                }
                            }
                        }

                        let end = IncomingMessage::ContractDetailsEnd { req_id };
                        if send_json(&mut write, &end).await.is_err() {
                            return;
                        }
                    }
                });
            }
        });

        Self { addr }
    }
}

async fn send_json<S>(write: &mut S, msg: &IncomingMessage) -> Result<(), ()>
where
    S: SinkExt<Message> + Unpin,
{
    let json = serde_json::to_string(msg).map_err(|_| ())?;
    write.send(Message::Text(json)).await.map_err(|_| ())
}

/// FX candidate payload as the broker would return it
pub fn fx_payload(con_id: i64) -> ContractPayload {
    ContractPayload {
        con_id: Some(con_id),
        sec_type: "CASH".to_string(),
        symbol: "USD".to_string(),
        exchange: "IDEALPRO".to_string(),
        currency: "JPY".to_string(),
        last_trade_date: None,
    }
}

/// Futures candidate payload with an expiry
pub fn fut_payload(con_id: i64, expiry: &str) -> ContractPayload {
    ContractPayload {
        con_id: Some(con_id),
        sec_type: "FUT".to_string(),
        symbol: "ES".to_string(),
        exchange: "CME".to_string(),
        currency: "USD".to_string(),
        last_trade_date: Some(expiry.to_string()),
    }
}
