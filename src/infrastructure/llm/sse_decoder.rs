/// Incremental decoder for `text/event-stream` bodies.
///
/// Network chunks may split a line, or even a UTF-8 sequence, anywhere; bytes
/// are buffered until a full line is available.
#[derive(Debug, Default)]
pub struct SseLineDecoder {
    buffer: Vec<u8>,
    done: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseData {
    Payload(String),
    Done,
}

impl SseLineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the `data:` payloads completed by `bytes`, in order. Input after
    /// the `[DONE]` sentinel is ignored.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<SseData> {
        if self.done {
            return Vec::new();
        }
        self.buffer.extend_from_slice(bytes);

        let mut out = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(data) = self.decode_line(&line) {
                let finished = data == SseData::Done;
                out.push(data);
                if finished {
                    self.done = true;
                    self.buffer.clear();
                    break;
                }
            }
        }
        out
    }

    /// Flushes a trailing line that was not newline-terminated.
    pub fn finish(&mut self) -> Option<SseData> {
        if self.done || self.buffer.is_empty() {
            return None;
        }
        let line = std::mem::take(&mut self.buffer);
        self.decode_line(&line)
    }

    fn decode_line(&self, line: &[u8]) -> Option<SseData> {
        let line = String::from_utf8_lossy(line);
        let line = line.trim_end_matches(['\r', '\n']);
        let data = line.strip_prefix("data:")?;
        let data = data.strip_prefix(' ').unwrap_or(data);
        if data == "[DONE]" {
            Some(SseData::Done)
        } else if data.is_empty() {
            None
        } else {
            Some(SseData::Payload(data.to_string()))
        }
    }
}
