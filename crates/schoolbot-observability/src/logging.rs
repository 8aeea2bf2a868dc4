use schoolbot_config::ObservabilityConfig;
use tracing::{info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::basic_logging::{console_filter, init_basic_console_logging};

pub fn init_tracing(config: &ObservabilityConfig) {
    if !config.file_logging {
        init_basic_console_logging(&config.log_level);
        return;
    }

    if let Err(e) = std::fs::create_dir_all(&config.log_dir) {
        init_basic_console_logging(&config.log_level);
        warn!(
            log_dir = %config.log_dir.display(),
            error = %e,
            "Could not create log directory, console logging only"
        );
        return;
    }

    let console_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(true)
        .with_line_number(true)
        .compact()
        .with_filter(console_filter(&config.log_level));

    // Errors only, human readable
    let file_appender = RollingFileAppender::new(Rotation::DAILY, &config.log_dir, "schoolbot.log");
    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_filter(EnvFilter::new("error"));

    let json_appender = RollingFileAppender::new(Rotation::DAILY, &config.log_dir, "schoolbot.json");
    let json_layer = fmt::layer()
        .json()
        .with_writer(json_appender)
        .with_current_span(true)
        .with_span_list(true)
        .with_filter(EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .with(json_layer)
        .try_init();

    info!(log_dir = %config.log_dir.display(), "Tracing initialized with file logging");
}
