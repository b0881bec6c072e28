//! Minimal Server-Sent Events reader for provider streaming endpoints.
//!
//! Only `data:` fields matter to the providers we talk to; comments, event
//! names and ids are skipped. A `[DONE]` payload ends the stream.
use futures::{Stream, StreamExt};

use crate::error::{AppError, AppResult};

/// Split a byte stream into SSE `data:` payloads, in arrival order.
///
/// Lines may be split across network chunks, so bytes are buffered until a
/// full line is available before decoding.
pub fn data_events<S, B, E>(bytes: S) -> impl Stream<Item = AppResult<String>> + Send
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send,
    E: Into<AppError> + Send,
{
    let state = (Box::pin(bytes), Vec::<u8>::new(), false);
    futures::stream::unfold(state, |(mut bytes, mut buf, mut finished)| async move {
        loop {
            if let Some(pos) = buf.iter().position(|b| *b == b'\n') {
                let raw: Vec<u8> = buf.drain(..=pos).collect();
                let line = String::from_utf8_lossy(&raw);
                let line = line.trim_end_matches(|c: char| c == '\n' || c == '\r');
                if let Some(data) = line.strip_prefix("data:") {
                    let data = data.strip_prefix(' ').unwrap_or(data);
                    if data == "[DONE]" {
                        return None;
                    }
                    return Some((Ok(data.to_string()), (bytes, buf, finished)));
                }
                continue;
            }
            if finished {
                return None;
            }
            match bytes.next().await {
                Some(Ok(chunk)) => buf.extend_from_slice(chunk.as_ref()),
                Some(Err(e)) => return Some((Err(e.into()), (bytes, buf, true))),
                None => {
                    finished = true;
                    if !buf.is_empty() {
                        buf.push(b'\n');
                    }
                }
            }
        }
    })
}
