use crate::sink::EncodedSink;
use async_trait::async_trait;
use std::error::Error;

/// A sink that simply drops every payload.
///
/// Useful for measuring the overhead of the layer and encoder without
/// any external I/O, and for unit tests that don't care about
/// persistence.
#[derive(Clone, Default)]
pub struct NoopSink;

#[async_trait]
impl EncodedSink for NoopSink {
    async fn send(&self, _payload: &[u8]) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}
