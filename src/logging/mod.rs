use std::sync::atomic::{AtomicBool, Ordering};
use tracing_subscriber::EnvFilter;

static LOGGER_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initialize the tracing subscriber for a CLI invocation.
///
/// Level precedence: `METAMORPH_LOG` environment filter when set, otherwise
/// `debug` with `--verbose`, otherwise `info`. Calling twice in one process
/// is a no-op so tests and embedders cannot trip the global subscriber.
pub fn init(verbose: bool) {
    if LOGGER_INITIALIZED
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        return;
    }

    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_env("METAMORPH_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
