//! Shared utilities for integration tests.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing_subscriber::fmt::writer::MutexGuardWriter;
use tracing_subscriber::fmt::MakeWriter;

use traffic_logger::config::ProxyConfig;
use traffic_logger::{HttpServer, LogSink, LoggingObserver, ProxyObserver, Shutdown, TargetConfig};

/// In-memory log destination.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = MutexGuardWriter<'a, Vec<u8>>;

    fn make_writer(&'a self) -> Self::Writer {
        (*self.0).make_writer()
    }
}

impl CapturedLogs {
    pub fn lines(&self) -> Vec<String> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Every line parsed as a JSON record. Panics on a malformed line.
    pub fn records(&self) -> Vec<Value> {
        self.lines()
            .iter()
            .map(|line| serde_json::from_str(line).unwrap_or_else(|e| panic!("bad record {:?}: {}", line, e)))
            .collect()
    }

    pub fn records_with_message(&self, message: &str) -> Vec<Value> {
        self.records()
            .into_iter()
            .filter(|r| r["message"] == message)
            .collect()
    }
}

/// A running proxy plus handles to its captured logs.
pub struct TestProxy {
    pub addr: SocketAddr,
    pub file: CapturedLogs,
    pub console: CapturedLogs,
    shutdown: Shutdown,
}

impl TestProxy {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestProxy {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a proxy forwarding to `target`, logging into memory.
pub async fn start_proxy(target: &str) -> TestProxy {
    start_proxy_with(target, |_| {}).await
}

pub async fn start_proxy_with(target: &str, tune: impl FnOnce(&mut ProxyConfig)) -> TestProxy {
    let file = CapturedLogs::default();
    let console = CapturedLogs::default();
    let sink = LogSink::with_writers("info", false, file.clone(), console.clone()).unwrap();
    let observer = Arc::new(LoggingObserver::new(Arc::new(sink)));

    let (addr, shutdown) = spawn_proxy(target, tune, observer).await;
    TestProxy {
        addr,
        file,
        console,
        shutdown,
    }
}

/// Start a proxy reporting to an arbitrary observer.
#[allow(dead_code)]
pub async fn start_observed_proxy(
    target: &str,
    observer: Arc<dyn ProxyObserver>,
) -> (SocketAddr, Shutdown) {
    spawn_proxy(target, |_| {}, observer).await
}

async fn spawn_proxy(
    target: &str,
    tune: impl FnOnce(&mut ProxyConfig),
    observer: Arc<dyn ProxyObserver>,
) -> (SocketAddr, Shutdown) {
    let mut config = ProxyConfig {
        target: target.to_string(),
        ..Default::default()
    };
    config.transport.honor_env_proxy = false;
    tune(&mut config);

    let target = TargetConfig::parse(&config.target).unwrap();
    let server = HttpServer::new(&config, target, observer).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });
    (addr, shutdown)
}

/// Start a backend that answers every request with a JSON description of it.
pub async fn start_echo_backend() -> SocketAddr {
    async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Response {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let status = header("x-echo-status")
            .and_then(|s| s.parse::<u16>().ok())
            .and_then(|s| StatusCode::from_u16(s).ok())
            .unwrap_or(StatusCode::OK);
        let description = json!({
            "method": method.as_str(),
            "path": uri.path(),
            "query": uri.query(),
            "host": header("host"),
            "forwarded_for": header("x-forwarded-for"),
            "connection": header("connection"),
            "body": String::from_utf8_lossy(&body),
        });
        (status, [("x-backend", "echo")], description.to_string()).into_response()
    }

    start_backend(Router::new().fallback(echo)).await
}

/// Start a backend driven by `f`, returning status and body.
#[allow(dead_code)]
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let handler = move || {
        let f = f.clone();
        async move {
            let (status, body) = f().await;
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::OK);
            (status, Body::from(body)).into_response()
        }
    };
    start_backend(Router::new().fallback(handler)).await
}

/// Start a backend that accepts connections and never answers.
#[allow(dead_code)]
pub async fn start_silent_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    addr
}

/// An address nothing is listening on.
#[allow(dead_code)]
pub fn unused_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(30))
        .build()
        .unwrap()
}

/// Start a backend serving `router`.
pub async fn start_backend(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    addr
}
