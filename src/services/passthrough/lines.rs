//! Line framing for streamed upstream responses.
//!
//! Each upstream line is decoded to text and re-emitted as `<line>\n\n`, so SSE
//! clients see one event per line. Blank lines are dropped. The stream is
//! single-pass and pulls the next upstream chunk only when a full line is not
//! already buffered.

use std::pin::Pin;

use bytes::Bytes;
use futures_util::{Stream, StreamExt, stream};

struct LineState<S> {
    upstream: Pin<Box<S>>,
    buf: Vec<u8>,
    done: bool,
}

impl<S> LineState<S> {
    // Next non-blank complete line already in the buffer.
    fn take_line(&mut self) -> Option<String> {
        while let Some(pos) = self.buf.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.buf.drain(..=pos).collect();
            let line = decode(&raw[..pos]);
            if !line.is_empty() {
                return Some(line);
            }
        }
        None
    }

    // Whatever is left once upstream has closed.
    fn take_rest(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buf);
        let line = decode(&rest);
        (!line.is_empty()).then_some(line)
    }
}

fn decode(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}

fn frame(line: &str) -> String {
    format!("{line}\n\n")
}

/// Re-frame an upstream byte stream as double-newline terminated lines.
///
/// An upstream error is yielded once and ends the stream.
pub fn sse_lines<S, E>(upstream: S) -> impl Stream<Item = Result<String, E>> + Send + 'static
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Send + 'static,
{
    let state = LineState {
        upstream: Box::pin(upstream),
        buf: Vec::new(),
        done: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(line) = state.take_line() {
                return Some((Ok(frame(&line)), state));
            }
            if state.done {
                let line = state.take_rest()?;
                return Some((Ok(frame(&line)), state));
            }
            match state.upstream.next().await {
                Some(Ok(chunk)) => state.buf.extend_from_slice(&chunk),
                Some(Err(err)) => {
                    state.done = true;
                    state.buf.clear();
                    return Some((Err(err), state));
                }
                None => state.done = true,
            }
        }
    })
}
