use bytes::Bytes;
use futures::{stream, StreamExt};

use azure_openai_sdk::stream::parser::{SseFrame, SseParser};
use azure_openai_sdk::{Error, Result};

// Helper to build a byte stream from a vector of chunks
fn byte_stream(
    chunks: Vec<&str>,
) -> impl futures::Stream<Item = Result<Bytes>> + Send + Unpin + 'static {
    stream::iter(
        chunks
            .into_iter()
            .map(|s| Ok(Bytes::from(s.to_string())))
            .collect::<Vec<_>>(),
    )
}

#[tokio::test]
async fn parses_a_single_data_line() {
    let mut parser = SseParser::new(byte_stream(vec!["data: {\"id\":\"1\"}\n"]));

    let frame = parser.next().await.unwrap().unwrap();
    assert_eq!(frame, SseFrame::Data("{\"id\":\"1\"}".to_string()));
    assert!(parser.next().await.is_none());
}

#[tokio::test]
async fn skips_blank_separator_lines() {
    let body = "data: {\"id\":\"1\"}\n\ndata: {\"id\":\"2\"}\n\n";
    let mut parser = SseParser::new(byte_stream(vec![body]));

    assert_eq!(
        parser.next().await.unwrap().unwrap(),
        SseFrame::Data("{\"id\":\"1\"}".to_string())
    );
    assert_eq!(
        parser.next().await.unwrap().unwrap(),
        SseFrame::Data("{\"id\":\"2\"}".to_string())
    );
    assert!(parser.next().await.is_none());
}

#[tokio::test]
async fn done_token_ends_the_stream_and_discards_the_rest() {
    let body = "data: {\"id\":\"1\"}\n\ndata: [DONE]\n\ndata: {\"id\":\"never\"}\n";
    let mut parser = SseParser::new(byte_stream(vec![body]));

    assert_eq!(
        parser.next().await.unwrap().unwrap(),
        SseFrame::Data("{\"id\":\"1\"}".to_string())
    );
    assert_eq!(parser.next().await.unwrap().unwrap(), SseFrame::Done);
    assert!(parser.next().await.is_none());
    assert!(parser.next().await.is_none());
}

#[tokio::test]
async fn terminal_done_may_omit_the_trailing_newline() {
    let mut parser = SseParser::new(byte_stream(vec!["data: {\"id\":\"1\"}\n", "data: [DONE]"]));

    assert_eq!(
        parser.next().await.unwrap().unwrap(),
        SseFrame::Data("{\"id\":\"1\"}".to_string())
    );
    assert_eq!(parser.next().await.unwrap().unwrap(), SseFrame::Done);
    assert!(parser.next().await.is_none());
}

#[tokio::test]
async fn terminal_data_line_may_omit_the_trailing_newline() {
    let mut parser = SseParser::new(byte_stream(vec!["data: {\"id\":\"tail\"}"]));

    assert_eq!(
        parser.next().await.unwrap().unwrap(),
        SseFrame::Data("{\"id\":\"tail\"}".to_string())
    );
    assert!(parser.next().await.is_none());
}

#[tokio::test]
async fn reassembles_lines_split_across_chunks() {
    let mut parser = SseParser::new(byte_stream(vec![
        "data: {\"id\"",
        ":\"1\"}\ndata: {\"id\":\"2\"}",
        "\n",
    ]));

    assert_eq!(
        parser.next().await.unwrap().unwrap(),
        SseFrame::Data("{\"id\":\"1\"}".to_string())
    );
    assert_eq!(
        parser.next().await.unwrap().unwrap(),
        SseFrame::Data("{\"id\":\"2\"}".to_string())
    );
    assert!(parser.next().await.is_none());
}

#[tokio::test]
async fn tolerates_crlf_line_endings() {
    let mut parser = SseParser::new(byte_stream(vec![
        "data: {\"id\":\"1\"}\r\n\r\ndata: [DONE]\r\n",
    ]));

    assert_eq!(
        parser.next().await.unwrap().unwrap(),
        SseFrame::Data("{\"id\":\"1\"}".to_string())
    );
    assert_eq!(parser.next().await.unwrap().unwrap(), SseFrame::Done);
}

#[tokio::test]
async fn empty_stream_yields_nothing() {
    let mut parser = SseParser::new(byte_stream(vec![]));
    assert!(parser.next().await.is_none());
}

#[tokio::test]
async fn propagates_transport_errors_from_the_body_stream() {
    let items: Vec<Result<Bytes>> = vec![
        Ok(Bytes::from("data: {\"id\":\"1\"}\n")),
        Err(Error::Client("connection reset".to_string())),
    ];
    let mut parser = SseParser::new(stream::iter(items));

    assert_eq!(
        parser.next().await.unwrap().unwrap(),
        SseFrame::Data("{\"id\":\"1\"}".to_string())
    );
    let err = parser.next().await.unwrap().unwrap_err();
    assert!(matches!(err, Error::Client(_)));
}
