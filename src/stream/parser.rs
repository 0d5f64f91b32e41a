use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::Stream;

use crate::Result;

/// Termination token of the server-sent-event framing.
const DONE_TOKEN: &str = "[DONE]";

/// One framed element of the event stream: either the payload of a
/// `data:` line or the literal `[DONE]` terminator.
#[derive(Debug, PartialEq, Eq)]
pub enum SseFrame {
    Data(String),
    Done,
}

/// Line framer over a raw byte stream.
///
/// Buffers incoming chunks and splits on `\n` (a trailing `\r` is
/// tolerated), stripping the `data: ` prefix and skipping the blank
/// event-separator lines. A final line without a trailing newline is
/// still framed when the inner stream ends. Once `[DONE]` has been
/// yielded the parser is exhausted and any remaining bytes are dropped.
pub struct SseParser<S>
where
    S: Stream<Item = Result<Bytes>> + Send + Unpin,
{
    inner: S,
    buffer: Vec<u8>,
    done: bool,
}

impl<S> SseParser<S>
where
    S: Stream<Item = Result<Bytes>> + Send + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self {
            inner: stream,
            buffer: Vec::new(),
            done: false,
        }
    }

    /// Frame the next complete line in the buffer, if any.
    fn parse_lines(&mut self) -> Option<SseFrame> {
        while let Some(newline_pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line_bytes = self.buffer.drain(..=newline_pos).collect::<Vec<u8>>();
            let line = String::from_utf8_lossy(&line_bytes);
            if let Some(frame) = frame_line(&line) {
                return Some(frame);
            }
        }
        None
    }
}

/// Strip framing from one line; `None` for the blank separator lines.
fn frame_line(line: &str) -> Option<SseFrame> {
    let line = line.strip_suffix('\n').unwrap_or(line);
    let line = line.strip_suffix('\r').unwrap_or(line);
    let payload = line.strip_prefix("data: ").unwrap_or(line);

    if payload.is_empty() {
        None
    } else if payload == DONE_TOKEN {
        Some(SseFrame::Done)
    } else {
        Some(SseFrame::Data(payload.to_string()))
    }
}

impl<S> Stream for SseParser<S>
where
    S: Stream<Item = Result<Bytes>> + Send + Unpin,
{
    type Item = Result<SseFrame>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.done {
            return Poll::Ready(None);
        }

        loop {
            if let Some(frame) = self.parse_lines() {
                if frame == SseFrame::Done {
                    self.done = true;
                }
                return Poll::Ready(Some(Ok(frame)));
            }

            match Pin::new(&mut self.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => {
                    self.buffer.extend_from_slice(&bytes);
                }
                Poll::Ready(Some(Err(e))) => return Poll::Ready(Some(Err(e))),
                Poll::Ready(None) => {
                    // The terminal line may omit the trailing newline.
                    if self.buffer.is_empty() {
                        return Poll::Ready(None);
                    }
                    let leftover = String::from_utf8_lossy(&self.buffer).into_owned();
                    self.buffer.clear();
                    self.done = true;
                    return match frame_line(&leftover) {
                        Some(frame) => Poll::Ready(Some(Ok(frame))),
                        None => Poll::Ready(None),
                    };
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
