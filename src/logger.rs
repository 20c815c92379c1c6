use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

/// Installs the global subscriber: stdout filtered by `RUST_LOG` (default
/// `info`) and, when `log_dir` is set, a daily rolling file.
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// whole of `main`.
pub fn init(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let console_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false)
        .with_filter(console_filter);

    let Some(dir) = log_dir else {
        tracing_subscriber::registry().with(console_layer).init();
        return None;
    };

    let appender = tracing_appender::rolling::daily(dir, "exam-tagger.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_file(true)
        .with_line_number(true)
        .with_filter(tracing::metadata::LevelFilter::DEBUG);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    Some(guard)
}
