use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Build the console filter: `RUST_LOG` wins, otherwise `schoolbot*` crates log
/// at `log_level` and noisy dependencies are held at warn.
pub(crate) fn console_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "schoolbot={lvl},schoolbot_db={lvl},schoolbot_cli={lvl},tower_http=warn,hyper=warn",
            lvl = log_level
        ))
    })
}

/// Initialize console-only logging.
///
/// Used by the CLI and whenever file logging is switched off. Safe to call
/// more than once; later calls are ignored.
pub fn init_basic_console_logging(log_level: &str) {
    let console_layer = fmt::layer()
        .compact()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(true)
        .with_line_number(true)
        .with_filter(console_filter(log_level));

    let _ = tracing_subscriber::registry().with(console_layer).try_init();
}
