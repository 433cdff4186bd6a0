//! Server-sent progress events

use assay_core::dto::stream::StreamMessage;

use crate::error::{ClientError, Result};

/// An open progress stream for one job
///
/// Yields messages in server order and stops after the terminal one.
#[derive(Debug)]
pub struct ProgressSubscription {
    response: reqwest::Response,
    buffer: Vec<u8>,
    finished: bool,
}

impl ProgressSubscription {
    pub(crate) fn new(response: reqwest::Response) -> Self {
        Self {
            response,
            buffer: Vec::new(),
            finished: false,
        }
    }

    /// Waits for the next message
    ///
    /// Returns `Ok(None)` once the terminal message has been delivered, and
    /// `ClientError::StreamClosed` if the connection ends before that.
    pub async fn next(&mut self) -> Result<Option<StreamMessage>> {
        if self.finished {
            return Ok(None);
        }

        loop {
            while let Some(frame) = take_frame(&mut self.buffer) {
                if let Some(message) = parse_frame(&decode_frame(frame)?)? {
                    self.finished = message.is_terminal();
                    return Ok(Some(message));
                }
            }

            match self.response.chunk().await? {
                Some(bytes) => push_chunk(&mut self.buffer, &bytes),
                None => {
                    self.finished = true;
                    return Err(ClientError::StreamClosed);
                }
            }
        }
    }
}

/// Appends raw bytes, dropping carriage returns so CRLF framing reads as LF
///
/// Bytes are kept undecoded: a chunk may end inside a multi-byte character.
fn push_chunk(buffer: &mut Vec<u8>, chunk: &[u8]) {
    buffer.extend(chunk.iter().copied().filter(|byte| *byte != b'\r'));
}

/// Removes the first complete frame (terminated by a blank line) from `buffer`
fn take_frame(buffer: &mut Vec<u8>) -> Option<Vec<u8>> {
    let end = buffer.windows(2).position(|pair| pair == b"\n\n")?;
    let frame = buffer[..end].to_vec();
    buffer.drain(..end + 2);
    Some(frame)
}

fn decode_frame(frame: Vec<u8>) -> Result<String> {
    String::from_utf8(frame)
        .map_err(|e| ClientError::ParseError(format!("Progress event is not UTF-8: {}", e)))
}

/// Parses the `data` lines of one frame; comment-only frames yield nothing
fn parse_frame(frame: &str) -> Result<Option<StreamMessage>> {
    let data: Vec<&str> = frame
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|chunk| chunk.strip_prefix(' ').unwrap_or(chunk))
        .collect();

    if data.is_empty() {
        return Ok(None);
    }

    serde_json::from_str(&data.join("\n"))
        .map(Some)
        .map_err(|e| ClientError::ParseError(format!("Invalid progress event: {}", e)))
}
