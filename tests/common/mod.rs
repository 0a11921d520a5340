//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use resourceful::config::ServerConfig;
use resourceful::demo::NoteStore;
use resourceful::lifecycle::Shutdown;
use resourceful::routing::ControllerMap;
use resourceful::{HttpServer, RouteTable};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A server running on an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<(), std::io::Error>>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Trigger shutdown and wait for the server task to finish.
    pub async fn stop(self) {
        self.shutdown.trigger();
        let result = tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("server did not stop in time")
            .expect("server task panicked");
        result.expect("server returned an error");
    }
}

/// Start `controllers` on `127.0.0.1:0` with `config`.
pub async fn start_server(config: ServerConfig, controllers: &ControllerMap) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let table = RouteTable::build(controllers).unwrap();
    let server = HttpServer::new(config, table).with_extension(NoteStore::new());

    let shutdown = Shutdown::new();
    let signal = shutdown.clone();
    let handle = tokio::spawn(async move { server.run(listener, &signal).await });

    TestServer {
        addr,
        shutdown,
        handle,
    }
}

/// A client that never reuses connections, so shutdown is not held up.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .build()
        .unwrap()
}
