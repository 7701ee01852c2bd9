//! Logging setup for applications embedding treenorm.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

/// Map a `-d` style repeat count to a level filter.
pub fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Install a stderr subscriber; 0 = warn, 1 = info, 2 = debug, 3+ = trace.
///
/// Returns false when a global subscriber was already set.
pub fn init_logging(verbosity: u8) -> bool {
    let filter = level_for(verbosity);

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE)
        .with_filter(filter);

    let installed = tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_ok();
    if installed {
        tracing::debug!("logging initialized at {}", filter);
    }
    installed
}
