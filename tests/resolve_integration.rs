//! End-to-end integration tests: registry file -> stub gateway -> write-back
//!
//! Each test spins up its own in-process gateway stub and a temp registry
//! document, then drives `ensure_con_ids` the way the binary does.

mod common;

use common::{fut_payload, fx_payload, GatewayScript, StubGateway};
use conid_sync::config::types::{AppConfig, GatewayConfig, SyncSettings};
use conid_sync::resolve::ensure_con_ids;
use conid_sync::SyncError;
use std::path::Path;

fn write_registry(dir: &Path, content: &str) -> String {
    let path = dir.join("symbols.toml");
    std::fs::write(&path, content).expect("write registry");
    path.to_string_lossy().to_string()
}

fn test_config(gateway_addr: std::net::SocketAddr, registry_path: String) -> AppConfig {
    AppConfig {
        gateway: GatewayConfig {
            host: gateway_addr.ip().to_string(),
            port: gateway_addr.port(),
            client_id: 123,
            handshake_timeout_secs: 2,
            // No reconnect in these tests, skip the release wait
            client_release_grace_secs: 0,
        },
        registry: conid_sync::config::types::RegistryConfig {
            path: registry_path,
        },
        sync: SyncSettings {
            verify_timeout_secs: 2,
            lookup_timeout_secs: 2,
            log_level: "debug".to_string(),
        },
        overrides: Default::default(),
    }
}

const FX_REGISTRY: &str = r#"# FX majors
[USDJPY]
sec_type = "CASH"
symbol = "USDJPY"
currency = "JPY"
"#;

#[tokio::test]
async fn test_fresh_lookup_fills_con_id_and_rewrites_file() {
    let gateway = StubGateway::spawn(
        GatewayScript::with_handshake(1).answer("USD", vec![fx_payload(15016059)]),
    )
    .await;
    let dir = tempfile::tempdir().unwrap();
    let registry_path = write_registry(dir.path(), FX_REGISTRY);
    let config = test_config(gateway.addr, registry_path.clone());

    let changed = ensure_con_ids(&config).await.expect("sync run");
    assert!(changed);

    let after = std::fs::read_to_string(&registry_path).unwrap();
    assert!(after.contains("# FX majors"), "comments preserved");
    assert!(after.contains("con_id = 15016059"));
    assert!(after.contains("symbol = \"USD\""), "split symbol written back");
    assert!(after.contains("exchange = \"IDEALPRO\""));
}

#[tokio::test]
async fn test_verified_registry_is_byte_identical_and_unchanged() {
    let gateway = StubGateway::spawn(
        GatewayScript::with_handshake(1).answer("USD", vec![fx_payload(111)]),
    )
    .await;
    let dir = tempfile::tempdir().unwrap();
    let registry_path = write_registry(
        dir.path(),
        r#"[USDJPY]
sec_type = "CASH"
symbol = "USD"
exchange = "IDEALPRO"
currency = "JPY"
con_id = 111
"#,
    );
    let before = std::fs::read_to_string(&registry_path).unwrap();
    let config = test_config(gateway.addr, registry_path.clone());

    let changed = ensure_con_ids(&config).await.expect("sync run");
    assert!(!changed, "matching conId must not mark the run changed");

    let after = std::fs::read_to_string(&registry_path).unwrap();
    assert_eq!(before, after, "unchanged run must not rewrite the file");
}

#[tokio::test]
async fn test_stale_con_id_is_overwritten() {
    let gateway = StubGateway::spawn(
        GatewayScript::with_handshake(1).answer("USD", vec![fx_payload(222)]),
    )
    .await;
    let dir = tempfile::tempdir().unwrap();
    let registry_path = write_registry(
        dir.path(),
        r#"[USDJPY]
sec_type = "CASH"
symbol = "USD"
exchange = "IDEALPRO"
currency = "JPY"
con_id = 111
"#,
    );
    let config = test_config(gateway.addr, registry_path.clone());

    let changed = ensure_con_ids(&config).await.expect("sync run");
    assert!(changed);

    let after = std::fs::read_to_string(&registry_path).unwrap();
    assert!(after.contains("con_id = 222"));
    assert!(!after.contains("con_id = 111"));
}

#[tokio::test]
async fn test_futures_lookup_picks_nearest_expiry_and_writes_it() {
    // Proximity scoring works against the real clock; build the chain
    // relative to today so the near contract sits inside the bonus horizon.
    let today = chrono::Utc::now().date_naive();
    let near = (today + chrono::Duration::days(10)).format("%Y%m%d").to_string();
    let far = (today + chrono::Duration::days(90)).format("%Y%m%d").to_string();
    let gateway = StubGateway::spawn(GatewayScript::with_handshake(1).answer(
        "ES",
        vec![
            // Chain arrives far-first; scoring must still pick the near one
            fut_payload(2, &far),
            fut_payload(1, &near),
        ],
    ))
    .await;
    let dir = tempfile::tempdir().unwrap();
    let registry_path = write_registry(
        dir.path(),
        "[ES]\nsec_type = \"FUT\"\nsymbol = \"ES\"\nexchange = \"CME\"\ncurrency = \"USD\"\n",
    );
    let config = test_config(gateway.addr, registry_path.clone());

    let changed = ensure_con_ids(&config).await.expect("sync run");
    assert!(changed);

    let after = std::fs::read_to_string(&registry_path).unwrap();
    assert!(after.contains("con_id = 1"), "nearest expiry wins: {after}");
    assert!(after.contains(&format!("last_trade_date = \"{near}\"")));
}

#[tokio::test]
async fn test_unknown_symbol_is_skipped_not_fatal() {
    let gateway = StubGateway::spawn(
        GatewayScript::with_handshake(1).answer("USD", vec![fx_payload(777)]),
    )
    .await;
    let dir = tempfile::tempdir().unwrap();
    let registry_path = write_registry(
        dir.path(),
        r#"[GHOST]
sec_type = "STK"
symbol = "GHOST"

[USDJPY]
sec_type = "CASH"
symbol = "USDJPY"
currency = "JPY"
"#,
    );
    let config = test_config(gateway.addr, registry_path.clone());

    let changed = ensure_con_ids(&config).await.expect("sync run");
    assert!(changed, "resolvable entries still update");

    let reloaded = conid_sync::SymbolRegistry::load(&registry_path).unwrap();
    let ghost = reloaded.descriptor("GHOST").unwrap();
    assert_eq!(ghost.con_id, None, "unresolved entry left unfilled");
    let fx = reloaded.descriptor("USDJPY").unwrap();
    assert_eq!(fx.con_id, Some(777));
}

#[tokio::test]
async fn test_silent_gateway_times_out_per_entry_not_per_run() {
    let gateway = StubGateway::spawn(
        GatewayScript::with_handshake(1)
            .silent_on("SLOW")
            .answer("USD", vec![fx_payload(888)]),
    )
    .await;
    let dir = tempfile::tempdir().unwrap();
    let registry_path = write_registry(
        dir.path(),
        r#"[SLOW]
sec_type = "STK"
symbol = "SLOW"

[USDJPY]
sec_type = "CASH"
symbol = "USDJPY"
currency = "JPY"
"#,
    );
    let mut config = test_config(gateway.addr, registry_path.clone());
    config.sync.lookup_timeout_secs = 1;

    let changed = ensure_con_ids(&config).await.expect("sync run");
    assert!(changed);
    let after = std::fs::read_to_string(&registry_path).unwrap();
    assert!(after.contains("con_id = 888"));
}

#[tokio::test]
async fn test_missing_handshake_is_fatal() {
    let gateway = StubGateway::spawn(GatewayScript::default()).await;
    let dir = tempfile::tempdir().unwrap();
    let registry_path = write_registry(dir.path(), FX_REGISTRY);
    let mut config = test_config(gateway.addr, registry_path);
    config.gateway.handshake_timeout_secs = 1;

    let err = ensure_con_ids(&config).await.unwrap_err();
    assert!(matches!(err, SyncError::ConnectionNotReady(_)), "got {err:?}");
}

#[tokio::test]
async fn test_dead_gateway_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let registry_path = write_registry(dir.path(), FX_REGISTRY);
    let mut config = test_config("127.0.0.1:1".parse().unwrap(), registry_path);
    config.gateway.port = 1;

    let err = ensure_con_ids(&config).await.unwrap_err();
    assert!(matches!(err, SyncError::WebSocketConnection(_)), "got {err:?}");
}
