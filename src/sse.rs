//! Line-buffered decoder for the `data: <json>\n` frames of the streaming
//! chat endpoint.

use serde::Deserialize;

/// One parsed frame of a streamed answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamFrame {
    /// Partial answer text to append
    Chunk(String),
    /// End of the answer; `answer` is the authoritative full text when present
    Final { answer: Option<String> },
    Error(String),
}

#[derive(Debug, Deserialize)]
struct RawFrame {
    #[serde(default)]
    chunk: Option<String>,
    #[serde(rename = "final", default)]
    is_final: bool,
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl RawFrame {
    /// A final frame may still carry a last chunk; it is emitted first.
    fn into_frames(self) -> Vec<StreamFrame> {
        if let Some(error) = self.error {
            return vec![StreamFrame::Error(error)];
        }
        let mut frames: Vec<StreamFrame> = self.chunk.map(StreamFrame::Chunk).into_iter().collect();
        if self.is_final || self.answer.is_some() {
            frames.push(StreamFrame::Final {
                answer: self.answer,
            });
        }
        frames
    }
}

/// Carries partial lines across read chunks. Bytes are only decoded once a
/// full line is available, so neither a JSON object nor a multi-byte UTF-8
/// sequence is ever split.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one read chunk and return every frame it completed.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<StreamFrame> {
        self.buffer.extend_from_slice(bytes);

        let mut frames = Vec::new();
        while let Some(line_end) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=line_end).collect();
            frames.extend(parse_line(&line[..line.len() - 1]));
        }
        frames
    }

    /// Parse whatever is left once the body has ended.
    pub fn finish(&mut self) -> Vec<StreamFrame> {
        if self.buffer.is_empty() {
            return Vec::new();
        }
        let rest = std::mem::take(&mut self.buffer);
        parse_line(&rest)
    }

    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

fn parse_line(line: &[u8]) -> Vec<StreamFrame> {
    let line = String::from_utf8_lossy(line);
    let line = line.trim();
    if line.is_empty() {
        return Vec::new();
    }

    let Some(data) = line.strip_prefix("data:") else {
        tracing::debug!("Ignoring non-data SSE line: {}", line);
        return Vec::new();
    };
    let data = data.trim_start();

    match serde_json::from_str::<RawFrame>(data) {
        Ok(raw) => {
            let frames = raw.into_frames();
            if frames.is_empty() {
                tracing::debug!("SSE frame carried no chunk, final or error: {}", data);
            }
            frames
        }
        Err(e) => {
            tracing::warn!("Skipping malformed SSE frame: {e}. Raw: {}", data);
            Vec::new()
        }
    }
}
