//! Generic request/response engine shared by every operation.
//!
//! The three synchronous operations differ only in payload and response
//! types; the two streaming operations differ only in payload and chunk
//! types. Both paths serialize once, POST through the [`Transport`] seam,
//! and classify non-200 statuses into [`Error::Service`] the same way.

use bytes::Bytes;
use futures::{StreamExt, TryStreamExt};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::stream::parser::{SseFrame, SseParser};
use crate::transport::{ByteStream, Transport};
use crate::types::ErrorResponse;
use crate::{Error, Result};

/// Issue a POST and decode the single JSON response body.
///
/// A 200 body decodes into `T`; any other status decodes into the error
/// envelope and surfaces as [`Error::Service`]. A body that fails to
/// decode either way is [`Error::Decode`].
pub async fn post_json<S, T>(
    transport: &dyn Transport,
    url: &str,
    headers: HeaderMap,
    request: &S,
) -> Result<T>
where
    S: Serialize,
    T: DeserializeOwned,
{
    let body = serde_json::to_vec(request)?;
    let response = transport.post(url, headers, Bytes::from(body)).await?;

    let response_body = collect_body(response.body).await?;
    if response.status == StatusCode::OK {
        Ok(serde_json::from_slice(&response_body)?)
    } else {
        let envelope: ErrorResponse = serde_json::from_slice(&response_body)?;
        Err(Error::Service(envelope.error))
    }
}

/// Issue a POST and decode the body as a server-sent-event stream,
/// feeding each JSON chunk to `sink` in arrival order.
///
/// The loop re-checks `token` before every frame, so a stalled read is
/// interruptible at the next line boundary. End of stream without the
/// `[DONE]` terminator is a clean completion. Sink errors are returned
/// exactly as the sink produced them.
pub async fn post_json_stream<S, T, F>(
    transport: &dyn Transport,
    url: &str,
    headers: HeaderMap,
    request: &S,
    token: &CancellationToken,
    mut sink: F,
) -> Result<()>
where
    S: Serialize,
    T: DeserializeOwned,
    F: FnMut(T) -> Result<()>,
{
    let body = serde_json::to_vec(request)?;
    let response = transport.post(url, headers, Bytes::from(body)).await?;

    if response.status != StatusCode::OK {
        let response_body = collect_body(response.body).await?;
        let envelope: ErrorResponse = serde_json::from_slice(&response_body)?;
        return Err(Error::Service(envelope.error));
    }

    let mut frames = SseParser::new(response.body);
    loop {
        let frame = tokio::select! {
            biased;
            () = token.cancelled() => return Err(Error::Cancelled),
            frame = frames.next() => frame,
        };

        match frame {
            None | Some(Ok(SseFrame::Done)) => return Ok(()),
            Some(Ok(SseFrame::Data(line))) => {
                let chunk: T = serde_json::from_str(&line)?;
                sink(chunk)?;
            }
            Some(Err(e)) => return Err(e),
        }
    }
}

/// Drain a body stream into one buffer.
async fn collect_body(body: ByteStream) -> Result<Vec<u8>> {
    let chunks = body.try_collect::<Vec<Bytes>>().await?;
    Ok(chunks.into_iter().flatten().collect())
}
