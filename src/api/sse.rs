use std::io::Write;

use futures_util::StreamExt;
use memchr::memchr;
use tracing::warn;

use crate::core::provider::ProviderError;

/// What a vendor decoder made of one `data:` payload.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Step {
    Skip,
    Text(String),
    Done,
}

/// Splits a byte stream into trimmed lines.
#[derive(Default)]
pub(crate) struct LineBuffer {
    buffer: Vec<u8>,
}

impl LineBuffer {
    pub fn extend(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// The next complete line. Lines that are not UTF-8 are dropped.
    pub fn next_line(&mut self) -> Option<String> {
        loop {
            let newline_pos = memchr(b'\n', &self.buffer)?;
            let line = std::str::from_utf8(&self.buffer[..newline_pos])
                .map(|s| s.trim().to_string());
            self.buffer.drain(..=newline_pos);
            match line {
                Ok(line) => return Some(line),
                Err(e) => warn!("invalid UTF-8 in stream: {e}"),
            }
        }
    }

    /// Whatever is left once the stream ended without a final newline.
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buffer);
        let line = String::from_utf8(rest).ok()?;
        let line = line.trim();
        (!line.is_empty()).then(|| line.to_string())
    }
}

pub(crate) fn data_payload(line: &str) -> Option<&str> {
    line.strip_prefix("data:").map(str::trim_start)
}

pub(crate) fn write_fragment(
    sink: &mut (dyn Write + Send),
    text: &str,
) -> Result<(), ProviderError> {
    sink.write_all(text.as_bytes())
        .and_then(|_| sink.flush())
        .map_err(ProviderError::Write)
}

/// Feed every `data:` payload of `response` through `decode`, writing text
/// fragments to `sink` as they arrive. Finishes with a single `\n` once the
/// decoder signals the end or the body runs out.
pub(crate) async fn relay<F>(
    response: reqwest::Response,
    sink: &mut (dyn Write + Send),
    mut decode: F,
) -> Result<(), ProviderError>
where
    F: FnMut(&str) -> Result<Step, ProviderError> + Send,
{
    let mut stream = response.bytes_stream();
    let mut lines = LineBuffer::default();
    let mut done = false;

    'body: while let Some(chunk) = stream.next().await {
        lines.extend(&chunk?);
        while let Some(line) = lines.next_line() {
            if feed(&line, sink, &mut decode)? {
                done = true;
                break 'body;
            }
        }
    }
    if !done {
        if let Some(line) = lines.finish() {
            feed(&line, sink, &mut decode)?;
        }
    }

    write_fragment(sink, "\n")
}

fn feed<F>(
    line: &str,
    sink: &mut (dyn Write + Send),
    decode: &mut F,
) -> Result<bool, ProviderError>
where
    F: FnMut(&str) -> Result<Step, ProviderError>,
{
    let Some(payload) = data_payload(line) else {
        return Ok(false);
    };
    if payload.is_empty() {
        return Ok(false);
    }
    match decode(payload)? {
        Step::Skip => Ok(false),
        Step::Text(text) => {
            if !text.is_empty() {
                write_fragment(sink, &text)?;
            }
            Ok(false)
        }
        Step::Done => Ok(true),
    }
}
