//! Log sink setup and timing helpers

use std::time::Instant;
use tracing::Level;

pub const ENV_TF_LOG: &str = "TF_LOG";
pub const ENV_TF_LOG_PROVIDER: &str = "TF_LOG_PROVIDER";

/// Parse a Terraform log level name
pub fn parse_level(value: &str) -> Option<Level> {
    match value.trim().to_ascii_uppercase().as_str() {
        "TRACE" | "JSON" => Some(Level::TRACE),
        "DEBUG" => Some(Level::DEBUG),
        "INFO" => Some(Level::INFO),
        "WARN" => Some(Level::WARN),
        "ERROR" => Some(Level::ERROR),
        _ => None,
    }
}

/// `TF_LOG_PROVIDER` first, then `TF_LOG`, else INFO
pub fn level_from_env() -> Level {
    [ENV_TF_LOG_PROVIDER, ENV_TF_LOG]
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find_map(|value| parse_level(&value))
        .unwrap_or(Level::INFO)
}

/// Install the fmt subscriber on stderr; stdout belongs to the plugin handshake.
///
/// Returns false when a global subscriber was already set.
pub fn init(level: Level) -> bool {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok()
}

pub fn init_from_env() -> bool {
    init(level_from_env())
}

/// Logs how long an operation took when dropped
#[must_use = "the duration is logged when the guard is dropped"]
pub struct Elapsed {
    operation: String,
    start: Instant,
}

impl Elapsed {
    pub fn elapsed_ms(&self) -> u128 {
        self.start.elapsed().as_millis()
    }
}

impl Drop for Elapsed {
    fn drop(&mut self) {
        tracing::info!(
            operation = %self.operation,
            elapsed_ms = self.elapsed_ms() as u64,
            "{} finished",
            self.operation
        );
    }
}

pub fn log_elapsed(operation: impl Into<String>) -> Elapsed {
    Elapsed {
        operation: operation.into(),
        start: Instant::now(),
    }
}
