use std::env;
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct ObservabilityConfig {
    pub log_level: String,
    /// Enables the rolling error log and JSON log under `log_dir`.
    pub file_logging: bool,
    pub log_dir: PathBuf,
}

impl ObservabilityConfig {
    pub fn from_env() -> Self {
        Self {
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            file_logging: env::var("FILE_LOGGING_ENABLED")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(false),
            log_dir: env::var("LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("storage/logs")),
        }
    }
}
