//! LiveSource against a tiny in-process HTTP responder.

use std::collections::HashMap;
use std::io::Read;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use tiny_http::{Header, Method, Response, Server};

use botdash_core::domain::{OrderStatus, ParamValue};
use botdash_core::source::{DataSource, LiveSource, SourceError, SourceKind};

type Routes = HashMap<(&'static str, &'static str), (u16, String)>;

/// Serves canned responses; a PUT with no canned body echoes the request body.
struct Responder {
    base_url: String,
    requests: Arc<Mutex<Vec<(String, String, String)>>>,
}

fn json_header() -> Header {
    Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap()
}

fn start(routes: Routes) -> Responder {
    let server = Server::http("127.0.0.1:0").unwrap();
    let port = match server.server_addr().to_ip() {
        Some(SocketAddr::V4(v4)) => v4.port(),
        Some(SocketAddr::V6(v6)) => v6.port(),
        None => panic!("responder is not bound to an IP address"),
    };
    let base_url = format!("http://127.0.0.1:{port}");
    let requests = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&requests);
    thread::spawn(move || {
        for mut request in server.incoming_requests() {
            let method = request.method().clone();
            let verb = method.to_string();
            let path = request.url().to_string();
            let mut body = String::new();
            if request.as_reader().read_to_string(&mut body).is_err() {
                continue;
            }
            log.lock()
                .unwrap()
                .push((verb.clone(), path.clone(), body.clone()));
            let (status, payload) = routes
                .iter()
                .find(|((m, p), _)| *m == verb && *p == path)
                .map(|(_, r)| r.clone())
                .unwrap_or_else(|| match method {
                    Method::Put => (200, body),
                    _ => (404, "{}".to_string()),
                });
            let response = Response::from_string(payload)
                .with_status_code(status)
                .with_header(json_header());
            let _ = request.respond(response);
        }
    });
    Responder { base_url, requests }
}

fn source(r: &Responder) -> LiveSource {
    LiveSource::new(&r.base_url, Duration::from_secs(5)).unwrap()
}

const STRATEGY: &str = r#"{
    "id": "s-1",
    "name": "Breakout",
    "description": "Donchian breakout",
    "enabled": true,
    "parameters": {
        "period": {"type":"number","value":20,"min":5,"max":100,"description":"Channel length"}
    },
    "lastUpdated": "2024-05-01T10:00:00Z"
}"#;

#[test]
fn reads_every_endpoint() {
    let mut routes = Routes::new();
    routes.insert(
        ("GET", "/api/features"),
        (
            200,
            r#"{"CPU Usage":[{"name":"CPU Usage","value":41.5,"timestamp":"2024-05-01T10:00:00Z"}]}"#.into(),
        ),
    );
    routes.insert(("GET", "/api/position"), (200, "null".into()));
    routes.insert(
        ("GET", "/api/orders"),
        (
            200,
            r#"[{"id":"1","symbol":"BTC/USD","side":"buy","type":"market","quantity":0.5,
                 "price":42000,"status":"filled","timestamp":1714557600000}]"#
                .into(),
        ),
    );
    routes.insert(("GET", "/api/strategy-config"), (200, STRATEGY.into()));
    routes.insert(
        ("GET", "/api/wallet"),
        (
            200,
            r#"{"balance":1000,"available":250,"profitLoss":12,"profitLossPercentage":1.2,
                "lastUpdated":"2024-05-01T10:00:00Z"}"#
                .into(),
        ),
    );
    routes.insert(
        ("GET", "/api/market"),
        (200, r#"[{"timestamp":1714557600000,"value":42000.5,"volume":3.5}]"#.into()),
    );
    let server = start(routes);
    let src = source(&server);

    assert_eq!(src.kind(), SourceKind::Live);
    assert!(src.probe());

    let features = src.features().unwrap();
    assert_eq!(features.series("CPU Usage")[0].value, 41.5);
    assert!(src.position().unwrap().is_none());
    let orders = src.orders().unwrap();
    assert_eq!(orders[0].status, OrderStatus::Filled);
    assert_eq!(src.strategy().unwrap().name, "Breakout");
    assert_eq!(src.wallet().unwrap().available, 250.0);
    assert_eq!(src.market().unwrap()[0].volume, Some(3.5));
}

#[test]
fn non_success_status_is_http_error() {
    let mut routes = Routes::new();
    routes.insert(("GET", "/api/wallet"), (503, "{}".into()));
    let server = start(routes);
    let src = source(&server);

    match src.wallet() {
        Err(SourceError::Http { status, endpoint }) => {
            assert_eq!(status, 503);
            assert_eq!(endpoint, "/api/wallet");
        }
        other => panic!("expected HTTP error, got {other:?}"),
    }
    // Unrouted path → 404 → probe fails.
    assert!(!src.probe());
}

#[test]
fn malformed_json_is_decode_error() {
    let mut routes = Routes::new();
    routes.insert(("GET", "/api/orders"), (200, r#"[{"id": 1"#.into()));
    let server = start(routes);
    let src = source(&server);
    assert!(matches!(src.orders(), Err(SourceError::Decode { .. })));
}

#[test]
fn strategy_update_puts_json() {
    let server = start(Routes::new());
    let src = source(&server);

    let mut cfg: botdash_core::domain::StrategyConfig = serde_json::from_str(STRATEGY).unwrap();
    cfg.set_parameter("period", ParamValue::Number(30.0)).unwrap();
    let stored = src.update_strategy(&cfg).unwrap();
    assert_eq!(stored.parameters["period"].value, ParamValue::Number(30.0));

    let requests = server.requests.lock().unwrap();
    let (method, path, body) = requests.last().unwrap();
    assert_eq!(method, "PUT");
    assert_eq!(path, "/api/strategy");
    let sent: serde_json::Value = serde_json::from_str(body).unwrap();
    assert_eq!(sent["parameters"]["period"]["value"], 30.0);
    assert_eq!(sent["lastUpdated"].as_str().unwrap(), "2024-05-01T10:00:00.000Z");
}

#[test]
fn invalid_strategy_never_leaves_the_client() {
    let server = start(Routes::new());
    let src = source(&server);

    let mut cfg: botdash_core::domain::StrategyConfig = serde_json::from_str(STRATEGY).unwrap();
    cfg.parameters.get_mut("period").unwrap().value = ParamValue::Number(1_000.0);
    assert!(matches!(
        src.update_strategy(&cfg),
        Err(SourceError::InvalidStrategy(_))
    ));
    assert!(server.requests.lock().unwrap().is_empty());
}
