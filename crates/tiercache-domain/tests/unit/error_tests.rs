//! Error taxonomy tests

use tiercache_domain::Error;

#[test]
fn test_error_classification() {
    assert!(Error::backend_unavailable("down").is_backend_unavailable());
    assert!(Error::invalid_argument("bad").is_invalid_argument());
    assert!(Error::queue_full(10).is_queue_full());
    assert!(!Error::internal("x").is_backend_unavailable());
}

#[test]
fn test_error_messages() {
    assert_eq!(
        Error::queue_full(3).to_string(),
        "Executor queue full: 3 tasks outstanding"
    );
    assert_eq!(
        Error::configuration("missing host").to_string(),
        "Configuration error: missing host"
    );
}

#[test]
fn test_error_keeps_source() {
    let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
    let err = Error::backend_unavailable_with_source("redis GET failed", io);
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn test_json_error_converts() {
    let parse: Result<u32, _> = serde_json::from_str("nope");
    let err: Error = parse.unwrap_err().into();
    assert!(matches!(err, Error::Json { .. }));
}
