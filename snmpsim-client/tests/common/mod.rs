//! Shared test infrastructure: an in-process stub of the simulator REST API,
//! polling helpers and the live-simulator harness.

// Not every test file uses every helper
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod stub;

pub use stub::{SimulatorStub, ENDPOINT_BUSY, ENDPOINT_QUIET};

use axum::Router;
use std::future::Future;
use std::sync::Once;
use std::time::{Duration, Instant};

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub listener");
    let addr = listener.local_addr().expect("stub listener address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("stub server");
    });
    format!("http://{addr}")
}

/// Opt-in test logs: `RUST_LOG=snmpsim_client=debug cargo test`.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Call `attempt` every `interval` until it returns `Ok`, or return the last error
/// once `timeout` has elapsed.
pub async fn poll_until<T, E, F, Fut>(timeout: Duration, interval: Duration, mut attempt: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let deadline = Instant::now() + timeout;
    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(err) if Instant::now() + interval >= deadline => return Err(err),
            Err(_) => tokio::time::sleep(interval).await,
        }
    }
}
