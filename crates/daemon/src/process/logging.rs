use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::ServiceConfig;

const LOG_FILE_NAME: &str = "sealbox.log";

/// Flushes the non-blocking writers when dropped
#[must_use]
pub struct LogGuards {
    _writers: Vec<WorkerGuard>,
}

/// Install the global subscriber: compact stdout, plus a daily file
///  under `log_dir` when one is configured. `RUST_LOG` overrides the
///  configured level for both.
pub fn init(config: &ServiceConfig) -> LogGuards {
    let filter = || {
        EnvFilter::builder()
            .with_default_directive(config.log_level.into())
            .from_env_lossy()
    };
    let mut guards = Vec::new();

    let (stdout_writer, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());
    guards.push(stdout_guard);
    let stdout_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(stdout_writer)
        .with_filter(filter());

    let file_layer = config.log_dir.as_deref().map(|log_dir| {
        if let Err(e) = std::fs::create_dir_all(log_dir) {
            eprintln!("Warning: could not create log directory {:?}: {}", log_dir, e);
        }
        let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_NAME);
        let (file_writer, file_guard) = tracing_appender::non_blocking(appender);
        guards.push(file_guard);
        tracing_subscriber::fmt::layer()
            .with_writer(file_writer)
            .with_ansi(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(filter())
    });

    if tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .is_err()
    {
        tracing::debug!("global subscriber already installed, keeping it");
    }

    register_panic_logger();
    report_build_info();

    LogGuards { _writers: guards }
}

fn register_panic_logger() {
    std::panic::set_hook(Box::new(|panic| match panic.location() {
        Some(loc) => tracing::error!(
            message = %panic,
            panic.file = loc.file(),
            panic.line = loc.line(),
        ),
        None => tracing::error!(message = %panic),
    }));
}

fn report_build_info() {
    let build = common::build_info!();
    tracing::info!(
        version = %build.version,
        profile = %build.build_profile,
        features = %build.build_features,
        built = %build.build_timestamp,
        "sealbox starting"
    );
}
