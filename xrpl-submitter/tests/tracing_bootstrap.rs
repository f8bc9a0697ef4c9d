//! Installs the global subscriber, so it lives in its own test binary.

use xrpl_submitter::{Level, Style, TracingConfig};

#[test]
fn start_tracing_installs_the_subscriber_once() {
    let config = TracingConfig {
        fmt: Style::Json,
        level: Level::Debug,
    };
    config.start_tracing().unwrap();
    tracing::debug!("subscriber installed");

    // a second global subscriber is refused
    assert!(config.start_tracing().is_err());
}
