//! Incremental Server-Sent-Events wire decoder.
//!
//! Feed raw body chunks in, get completed events out. Handles `data:`,
//! `event:` and `id:` fields, multi-line data, CRLF line endings, and
//! comment lines (the backend's `: keepalive` heartbeats).

use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SseEvent {
    pub event: Option<String>,
    pub data: String,
    pub id: Option<String>,
}

#[derive(Default)]
pub(crate) struct SseDecoder {
    buffer: String,
    event: Option<String>,
    data: Vec<String>,
    last_id: Option<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume a chunk and return every event completed by it.
    pub fn feed(&mut self, chunk: &[u8]) -> VecDeque<SseEvent> {
        self.buffer.push_str(&String::from_utf8_lossy(chunk));
        let mut completed = VecDeque::new();

        while let Some(pos) = self.buffer.find('\n') {
            let line = self.buffer[..pos].trim_end_matches('\r').to_string();
            self.buffer.drain(..=pos);

            if line.is_empty() {
                // blank line terminates the event
                if !self.data.is_empty() {
                    completed.push_back(SseEvent {
                        event: self.event.take(),
                        data: self.data.join("\n"),
                        id: self.last_id.clone(),
                    });
                    self.data.clear();
                } else {
                    self.event = None;
                }
                continue;
            }

            if line.starts_with(':') {
                continue;
            }

            if let Some(value) = line.strip_prefix("data:") {
                self.data.push(value.strip_prefix(' ').unwrap_or(value).to_string());
            } else if let Some(value) = line.strip_prefix("event:") {
                self.event = Some(value.trim().to_string());
            } else if let Some(value) = line.strip_prefix("id:") {
                self.last_id = Some(value.trim().to_string());
            }
            // unknown field names are ignored
        }

        completed
    }
}
