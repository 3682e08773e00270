//! Tracing for test binaries, routed through libtest's captured writer.

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

static INITIALIZED: OnceCell<()> = OnceCell::new();

/// `TEST_LOG` wins over `RUST_LOG`; with neither set only warnings show.
fn filter_from_env() -> EnvFilter {
    ["TEST_LOG", "RUST_LOG"]
        .iter()
        .find_map(|key| std::env::var(key).ok())
        .map(EnvFilter::new)
        .unwrap_or_else(|| EnvFilter::new("warn"))
}

/// Install the subscriber once per process. Safe to call from every
/// test binary's constructor; `TEST_LOG=debug` shows each mutation.
pub fn init() {
    INITIALIZED.get_or_init(|| {
        fmt()
            .with_env_filter(filter_from_env())
            .with_test_writer()
            .without_time()
            .try_init()
            .ok();
    });
}
