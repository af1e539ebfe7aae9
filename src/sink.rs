use async_trait::async_trait;
use std::error::Error;
use std::io::Write;
use tokio::sync::Mutex;

/// Asynchronous destination for encoded log batches.
///
/// Implementations receive one payload per batch: newline-delimited
/// JSON objects already produced by the encoder. They only move bytes;
/// no JSON knowledge is required.
#[async_trait]
pub trait EncodedSink: Send + Sync {
    /// Send one batch of newline-delimited encoded records.
    ///
    /// **Returns**
    /// - `Ok(())` if the payload was accepted by the destination.
    /// - `Err(..)` on transport failure. The shipping task treats this
    ///   as transient and retries the batch with backoff.
    async fn send(&self, payload: &[u8]) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Flush any buffered output, if the destination buffers.
    ///
    /// Default implementation is a no-op.
    async fn flush(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}

/// [`EncodedSink`] that writes payloads to any `io::Write`, e.g.
/// stdout or a file. Payloads are already newline-delimited, so the
/// output is plain JSON lines.
pub struct WriteSink<W: Write + Send> {
    inner: Mutex<W>,
}

impl<W: Write + Send> WriteSink<W> {
    pub fn new(writer: W) -> Self {
        Self { inner: Mutex::new(writer) }
    }
}

#[async_trait]
impl<W: Write + Send> EncodedSink for WriteSink<W> {
    async fn send(&self, payload: &[u8]) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut writer = self.inner.lock().await;
        writer.write_all(payload)?;
        Ok(())
    }

    async fn flush(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut writer = self.inner.lock().await;
        writer.flush()?;
        Ok(())
    }
}
