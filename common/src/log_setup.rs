use tracing_subscriber::EnvFilter;

/// Tracing subscriber for tests. Safe to call from every test.
///
/// `RUST_LOG` picks the level, `info` otherwise. Output goes through the test
/// harness so it is only shown for failing tests.
pub fn init_test_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
