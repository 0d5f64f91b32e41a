use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[cfg(feature = "tracing")]
use tracing::instrument;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;
use futures::StreamExt;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;

use crate::transport::{RawResponse, Transport};
use crate::{Error, Result};

/// A request observed by the mock, kept for assertions.
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub url: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

struct MockResponse {
    status: StatusCode,
    chunks: Vec<Bytes>,
    /// Keep the body stream pending after the chunks instead of ending it.
    hang: bool,
}

/// Canned-response transport for tests. Records every request and serves
/// queued responses in order; asking for more responses than were queued
/// is a test bug and surfaces as `Error::Client`.
#[derive(Clone, Default)]
pub struct MockTransport {
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response with a single body chunk.
    pub fn with_response(self, status: u16, body: impl Into<Bytes>) -> Self {
        self.push(status, vec![body.into()], false);
        self
    }

    /// Queue a response whose body arrives in the given chunks.
    pub fn with_chunked_response(self, status: u16, chunks: Vec<Bytes>) -> Self {
        self.push(status, chunks, false);
        self
    }

    /// Queue a response whose body never ends after the given chunks,
    /// simulating a stalled connection for cancellation tests.
    pub fn with_hanging_response(self, status: u16, chunks: Vec<Bytes>) -> Self {
        self.push(status, chunks, true);
        self
    }

    fn push(&self, status: u16, chunks: Vec<Bytes>, hang: bool) {
        self.responses.lock().unwrap().push_back(MockResponse {
            status: StatusCode::from_u16(status).unwrap(),
            chunks,
            hang,
        });
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    #[cfg_attr(feature = "tracing", instrument(skip(self, headers, body)))]
    async fn post(&self, url: &str, headers: HeaderMap, body: Bytes) -> Result<RawResponse> {
        self.requests.lock().unwrap().push(RecordedRequest {
            url: url.to_string(),
            headers,
            body,
        });

        let response = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::Client("MockTransport: no response queued".to_string()))?;

        let chunks = stream::iter(response.chunks.into_iter().map(Ok));
        let body = if response.hang {
            chunks.chain(stream::pending()).boxed()
        } else {
            chunks.boxed()
        };

        Ok(RawResponse {
            status: response.status,
            body,
        })
    }
}
