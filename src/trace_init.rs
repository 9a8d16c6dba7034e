//! JSON trace output for diagnosing the engine inside a running host.
//! A no-op unless the `trace` feature is enabled.

use std::path::Path;

/// File created inside the log directory.
pub const TRACE_FILE: &str = "jamo-trace.jsonl";

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "jamo_engine=debug,jamo_session=debug,jamo_core=debug";

/// Route engine spans and events to `<log_dir>/jamo-trace.jsonl`. Calls
/// after the first are ignored.
pub fn init_tracing(log_dir: &Path) {
    #[cfg(feature = "trace")]
    subscriber::install_once(log_dir);
    #[cfg(not(feature = "trace"))]
    let _ = log_dir;
}

#[cfg(feature = "trace")]
mod subscriber {
    use std::path::Path;
    use std::sync::OnceLock;

    use tracing_appender::non_blocking::WorkerGuard;
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::EnvFilter;

    // Lives until process exit so the background writer keeps flushing.
    static WRITER_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

    pub(super) fn install_once(log_dir: &Path) {
        WRITER_GUARD.get_or_init(|| {
            let appender = tracing_appender::rolling::never(log_dir, super::TRACE_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(super::DEFAULT_FILTER));
            // A host that already installed a global subscriber keeps it.
            let _ = tracing_subscriber::fmt()
                .json()
                .with_writer(writer)
                .with_target(true)
                .with_thread_names(true)
                .with_span_events(FmtSpan::CLOSE)
                .with_env_filter(filter)
                .try_init();
            guard
        });
    }
}
