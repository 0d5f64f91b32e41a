use thiserror::Error;

pub mod client;
pub mod dispatch;
pub mod stream;
pub mod transport;
pub mod types;

pub type Result<T> = std::result::Result<T, Error>;

/// Failure taxonomy shared by every operation. Exactly one of a response,
/// a service error envelope, or a transport-level failure occurs per call.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Client error: {0}")]
    Client(String),

    /// A streaming operation was invoked on a request whose `stream` flag
    /// is false. Detected before any network activity.
    #[error("streaming is not enabled on this request; use the non-streaming variant")]
    NotStreaming,

    /// A non-streaming operation was invoked on a request whose `stream`
    /// flag is true. Detected before any network activity.
    #[error("streaming is requested on this request; use the `_stream` variant")]
    StreamingRequested,

    /// Network-level failure before an HTTP status was obtained.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Malformed JSON in a response body, an error envelope, or a
    /// streamed chunk line.
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The service answered a non-200 status with a parseable error
    /// envelope; the envelope is surfaced unchanged.
    #[error("Service error: {0}")]
    Service(types::ServiceError),

    /// Carrier for foreign errors returned by a streaming sink. Sinks
    /// that already produce [`Error`] values are propagated verbatim
    /// without this wrapper.
    #[error("Sink error: {0}")]
    Sink(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The cancellation token fired between streamed chunks.
    #[error("Stream cancelled")]
    Cancelled,
}

impl Error {
    /// Wrap a foreign error produced by a streaming sink.
    pub fn sink<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Sink(Box::new(err))
    }
}
