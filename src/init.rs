use crate::encoder::JsonRecordEncoder;
use crate::layer::JsonLogLayer;
use crate::sink::EncodedSink;
use std::sync::Arc;
use tokio::time::Duration;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Configuration of the shipping layer.
///
/// **Fields**
/// - `channel_buffer`: maximum number of queued [`crate::record::LogRecord`]s
///   before new records are dropped.
/// - `batch_size`: number of records encoded and shipped per batch.
/// - `flush_interval`: maximum interval between flushes even when a
///   batch is not full.
/// - `enable_stdout`: when `true`, a `tracing_subscriber::fmt` layer
///   is stacked on top so events also show up on the console.
#[derive(Clone, Debug)]
pub struct LayerConfig {
    pub channel_buffer: usize,
    pub batch_size: usize,
    pub flush_interval: Duration,
    pub enable_stdout: bool,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            channel_buffer: 1024,
            batch_size: 128,
            flush_interval: Duration::from_secs(1),
            enable_stdout: true,
        }
    }
}

/// Initialize the global `tracing` subscriber with the provided sink,
/// encoder and [`LayerConfig`].
///
/// **Parameters**
/// - `sink`: [`EncodedSink`] that receives encoded payloads.
/// - `encoder`: the [`JsonRecordEncoder`] the background task will
///   own; configure field selection, names and mutators on it first.
/// - `config`: buffering and batching behavior of the layer.
///
/// **Effects**
///
/// Installs a [`Registry`] combined with [`JsonLogLayer`] as the
/// global default subscriber, so all `tracing` events in the process
/// are observed by the layer.
pub fn init_tracing_with_config(
    sink: Arc<dyn EncodedSink>,
    encoder: JsonRecordEncoder,
    config: LayerConfig,
) {
    let (layer, _handle) = JsonLogLayer::new(
        sink,
        encoder,
        config.channel_buffer,
        config.batch_size,
        config.flush_interval,
    );

    if config.enable_stdout {
        let fmt_layer = tracing_subscriber::fmt::layer();
        let subscriber = Registry::default().with(layer).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber).expect("set global subscriber");
    } else {
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::set_global_default(subscriber).expect("set global subscriber");
    }
}

/// Initialize tracing with a default encoder and default layer
/// configuration. The recommended entrypoint for typical services.
pub fn init_tracing(sink: Arc<dyn EncodedSink>) {
    init_tracing_with_config(sink, JsonRecordEncoder::new(), LayerConfig::default());
}
