//! Shutdown signal tests
//!
//! Signals the test process itself; the installed handler replaces the
//! default action, so the process keeps running.

use std::process::Command;
use std::time::Duration;
use tiercache_infrastructure::{ShutdownSignal, ShutdownSignals};

#[tokio::test]
async fn test_sigterm_requests_shutdown() {
    let mut signals = ShutdownSignals::install().unwrap();

    let status = Command::new("kill")
        .args(["-TERM", &std::process::id().to_string()])
        .status()
        .unwrap();
    assert!(status.success());

    let signal = tokio::time::timeout(Duration::from_secs(5), signals.recv())
        .await
        .expect("no shutdown signal within 5s")
        .unwrap();
    assert_eq!(signal, ShutdownSignal::Terminate);
    assert_eq!(signal.to_string(), "SIGTERM");
}
