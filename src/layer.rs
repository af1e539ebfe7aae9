use crate::encoder::JsonRecordEncoder;
use crate::record::{EventId, ExceptionInfo, LogLevel, LogRecord};
use crate::sink::EncodedSink;
use crate::writer::VecWriter;
use chrono::Utc;
use std::error::Error;
use std::sync::{Arc, atomic::{AtomicU64, Ordering}};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// `tracing_subscriber` layer that turns events into [`LogRecord`]s
/// and forwards them to a background task via a bounded channel. The
/// task owns exactly one [`JsonRecordEncoder`], encodes records in
/// batches and ships the bytes to an [`EncodedSink`], so encoding and
/// I/O never touch application threads.
pub struct JsonLogLayer {
    sender: mpsc::Sender<LogRecord>,
    max_level: Level,
    /// Total events seen by the layer (before filtering by level).
    pub total_events: Arc<AtomicU64>,
    /// Successfully enqueued into channel.
    pub enqueued_events: Arc<AtomicU64>,
    /// Dropped because the channel was full.
    pub dropped_events: Arc<AtomicU64>,
}

impl JsonLogLayer {
    /// Create a new layer and spawn the background task that encodes
    /// queued [`LogRecord`]s and sends the resulting payloads to the
    /// provided [`EncodedSink`].
    ///
    /// Minimal thresholds are enforced for `buffer`, `batch_size` and
    /// `flush_interval` to avoid degenerate configurations.
    pub fn new(
        sink: Arc<dyn EncodedSink>,
        encoder: JsonRecordEncoder,
        buffer: usize,
        batch_size: usize,
        flush_interval: Duration,
    ) -> (Self, JoinHandle<()>) {
        // Enforce minimal thresholds to avoid degenerate configs.
        let buffer = buffer.max(16);
        let batch_size = batch_size.max(1);
        let flush_interval = if flush_interval < Duration::from_millis(10) {
            Duration::from_millis(10)
        } else {
            flush_interval
        };

        let (tx, mut rx) = mpsc::channel::<LogRecord>(buffer);

        let total_events = Arc::new(AtomicU64::new(0));
        let enqueued_events = Arc::new(AtomicU64::new(0));
        let dropped_events = Arc::new(AtomicU64::new(0));

        let enqueued_events_bg = Arc::clone(&enqueued_events);

        let handle = tokio::spawn(async move {
            let mut encoder = encoder;
            let mut record_buf = VecWriter::new();
            let mut payload: Vec<u8> = Vec::new();
            let mut batch = Vec::with_capacity(batch_size);
            let backoff = Duration::from_millis(100);
            let max_backoff = Duration::from_secs(10);

            loop {
                tokio::select! {
                    Some(record) = rx.recv() => {
                        batch.push(record);
                        enqueued_events_bg.fetch_add(1, Ordering::Relaxed);
                        if batch.len() >= batch_size {
                            if let Err(e) = ship_batch(&*sink, &mut encoder, &mut record_buf, &mut payload, &mut batch, backoff, max_backoff).await {
                                eprintln!("error sending log batch: {}", e);
                            }
                        }
                    }
                    _ = sleep(flush_interval) => {
                        if !batch.is_empty() {
                            if let Err(e) = ship_batch(&*sink, &mut encoder, &mut record_buf, &mut payload, &mut batch, backoff, max_backoff).await {
                                eprintln!("error flushing log batch: {}", e);
                            }
                        }
                    }
                }
            }
        });

        (Self {
            sender: tx,
            max_level: Level::INFO,
            total_events,
            enqueued_events,
            dropped_events,
        }, handle)
    }

    /// Raise or lower the capture threshold. Events less severe than
    /// `level` are ignored by the layer.
    pub fn with_max_level(mut self, level: Level) -> Self {
        self.max_level = level;
        self
    }
}

/// Encodes the batch into one newline-delimited payload, then sends it
/// with unbounded retry and exponential backoff. Records that fail to
/// encode are dropped with a note; retrying cannot fix those.
async fn ship_batch(
    sink: &dyn EncodedSink,
    encoder: &mut JsonRecordEncoder,
    record_buf: &mut VecWriter,
    payload: &mut Vec<u8>,
    batch: &mut Vec<LogRecord>,
    mut backoff: Duration,
    max_backoff: Duration,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    payload.clear();
    for record in batch.iter() {
        record_buf.clear();
        match encoder.encode(record, record_buf) {
            Ok(_) => {
                payload.extend_from_slice(record_buf.as_bytes());
                payload.push(b'\n');
            }
            // partial bytes stay in record_buf and are cleared next round
            Err(e) => eprintln!("dropping unencodable log record: {}", e),
        }
    }

    if payload.is_empty() {
        batch.clear();
        return Ok(());
    }

    loop {
        match sink.send(payload).await {
            Ok(()) => {
                batch.clear();
                return Ok(());
            }
            Err(e) => {
                eprintln!("log sink send failed ({}), retrying in {:?}", e, backoff);
                sleep(backoff).await;
                backoff = std::cmp::min(backoff * 2, max_backoff);
            }
        }
    }
}

fn map_level(level: &Level) -> LogLevel {
    if *level == Level::ERROR {
        LogLevel::Error
    } else if *level == Level::WARN {
        LogLevel::Warning
    } else if *level == Level::INFO {
        LogLevel::Information
    } else if *level == Level::DEBUG {
        LogLevel::Debug
    } else {
        LogLevel::Trace
    }
}

impl<S> Layer<S> for JsonLogLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event, _ctx: Context<'_, S>) {
        self.total_events.fetch_add(1, Ordering::Relaxed);
        if *event.metadata().level() > self.max_level {
            return;
        }

        let mut params = Vec::new();
        let mut message: Option<String> = None;
        let mut exception: Option<ExceptionInfo> = None;

        let mut visitor = FieldVisitor {
            params: &mut params,
            message: &mut message,
            exception: &mut exception,
        };
        event.record(&mut visitor);

        let meta = event.metadata();
        let record = LogRecord {
            timestamp: Utc::now(),
            level: map_level(meta.level()),
            category: meta.target().to_string(),
            event_id: EventId::default(),
            message: message.unwrap_or_default(),
            exception,
            scope: Vec::new(),
            params,
        };

        if let Err(_e) = self.sender.try_send(record) {
            self.dropped_events.fetch_add(1, Ordering::Relaxed);
            eprintln!("log channel full, dropping log record");
        }
    }
}

use tracing::field::{Field, Visit};

/// Collects event fields: the `message` field becomes the record
/// message, an error value becomes the exception chain, everything
/// else lands in the parameter pairs in visit order.
pub struct FieldVisitor<'a> {
    pub params: &'a mut Vec<(String, Option<serde_json::Value>)>,
    pub message: &'a mut Option<String>,
    pub exception: &'a mut Option<ExceptionInfo>,
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.params.push((field.name().to_string(), Some(serde_json::Value::String(value.to_string()))));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.params.push((field.name().to_string(), Some(serde_json::Value::from(value))));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.params.push((field.name().to_string(), Some(serde_json::Value::from(value))));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.params.push((field.name().to_string(), Some(serde_json::Value::from(value))));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.params.push((field.name().to_string(), Some(serde_json::Value::from(value))));
    }

    fn record_error(&mut self, _field: &Field, value: &(dyn std::error::Error + 'static)) {
        *self.exception = Some(ExceptionInfo::from_error(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.params.push((field.name().to_string(), Some(serde_json::Value::String(format!("{:?}", value)))));
        }
    }
}
