//! Environment variable names used by this crate for convenient
//! configuration of the shipping layer from services.
//!
//! These are purely helpers; the encoder and layer types remain
//! decoupled from environment access.

use crate::init::LayerConfig;
use tokio::time::Duration;

/// Queue capacity of the layer channel.
pub const LOG_ENCODER_CHANNEL_BUFFER_ENV: &str = "LOG_ENCODER_CHANNEL_BUFFER";

/// Records per encoded batch.
pub const LOG_ENCODER_BATCH_SIZE_ENV: &str = "LOG_ENCODER_BATCH_SIZE";

/// Flush interval in milliseconds.
pub const LOG_ENCODER_FLUSH_INTERVAL_MS_ENV: &str = "LOG_ENCODER_FLUSH_INTERVAL_MS";

/// Set to `1`/`true` to also print events to the console.
pub const LOG_ENCODER_STDOUT_ENV: &str = "LOG_ENCODER_STDOUT";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Build a [`LayerConfig`] from environment variables, keeping the
/// built-in default for anything unset or unparsable.
pub fn layer_config_from_env() -> LayerConfig {
    let defaults = LayerConfig::default();
    LayerConfig {
        channel_buffer: env_or(LOG_ENCODER_CHANNEL_BUFFER_ENV, "")
            .parse()
            .unwrap_or(defaults.channel_buffer),
        batch_size: env_or(LOG_ENCODER_BATCH_SIZE_ENV, "")
            .parse()
            .unwrap_or(defaults.batch_size),
        flush_interval: env_or(LOG_ENCODER_FLUSH_INTERVAL_MS_ENV, "")
            .parse()
            .map(Duration::from_millis)
            .unwrap_or(defaults.flush_interval),
        enable_stdout: matches!(
            env_or(LOG_ENCODER_STDOUT_ENV, "true").as_str(),
            "1" | "true"
        ),
    }
}
