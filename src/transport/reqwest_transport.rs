#[cfg(feature = "tracing")]
use tracing::instrument;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use reqwest::header::HeaderMap;
use reqwest::Client;

use crate::transport::{RawResponse, Transport};
use crate::{Error, Result};

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| Error::Client(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[cfg_attr(feature = "tracing", instrument(skip(self, headers, body)))]
    async fn post(&self, url: &str, headers: HeaderMap, body: Bytes) -> Result<RawResponse> {
        let response = self
            .client
            .post(url)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = response.status();
        let body = response
            .bytes_stream()
            .map(|item| item.map_err(Error::Transport))
            .boxed();

        Ok(RawResponse { status, body })
    }
}
