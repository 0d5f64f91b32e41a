use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;

use crate::Result;

pub mod mock_transport;
pub mod reqwest_transport;

/// The raw response body as an incremental byte stream.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Status plus the unconsumed body. The dispatcher owns status branching,
/// so the transport must not collapse non-200 responses into errors.
pub struct RawResponse {
    pub status: StatusCode,
    pub body: ByteStream,
}

/// Seam between the dispatch engine and the HTTP stack. Implementations
/// issue a single POST and hand back the status line and body stream;
/// they perform no serialization, no status interpretation, no retries.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn post(&self, url: &str, headers: HeaderMap, body: Bytes) -> Result<RawResponse>;
}
