//! Incremental decoder for `text/event-stream` bodies.

/// Splits a server-sent-events byte stream into message payloads.
///
/// Bytes are buffered until a full line is available, so chunks may split
/// lines (and multi-byte characters) anywhere. `data:` lines accumulate into
/// the current message and a blank line dispatches it. Comments and the
/// `event`, `id` and `retry` fields are ignored.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    data: Vec<String>,
}

impl SseDecoder {
    /// Creates a new decoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a chunk and returns every message completed by it, in order.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut messages = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            let line = String::from_utf8_lossy(&line);
            if let Some(message) = self.process_line(&line) {
                messages.push(message);
            }
        }
        messages
    }

    /// Returns true if a partial line or message is buffered.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.buffer.is_empty() || !self.data.is_empty()
    }

    fn process_line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            if self.data.is_empty() {
                return None;
            }
            let message = self.data.join("\n");
            self.data.clear();
            return Some(message);
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        if field == "data" {
            self.data.push(value.to_string());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_single_message() {
        let mut decoder = SseDecoder::new();
        let messages = decoder.feed(b"data: {\"type\":\"keepalive\"}\n\n");
        assert_eq!(messages, vec![r#"{"type":"keepalive"}"#.to_string()]);
        assert!(!decoder.has_pending());
    }

    #[test]
    fn test_message_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"data: {\"type\":").is_empty());
        assert!(decoder.feed(b"\"keepalive\"}\n").is_empty());
        assert!(decoder.has_pending());
        let messages = decoder.feed(b"\n");
        assert_eq!(messages, vec![r#"{"type":"keepalive"}"#.to_string()]);
    }

    #[test]
    fn test_multibyte_character_split() {
        let payload = "data: OCR Tamamlandı\n\n".as_bytes();
        let split = payload.iter().position(|&b| b == 0xc4).unwrap() + 1;

        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(&payload[..split]).is_empty());
        assert_eq!(decoder.feed(&payload[split..]), vec!["OCR Tamamlandı".to_string()]);
    }

    #[test]
    fn test_crlf_and_multiline_data() {
        let mut decoder = SseDecoder::new();
        let messages = decoder.feed(b"data: first\r\ndata: second\r\n\r\n");
        assert_eq!(messages, vec!["first\nsecond".to_string()]);
    }

    #[test]
    fn test_comments_and_other_fields_ignored() {
        let mut decoder = SseDecoder::new();
        let messages = decoder.feed(b": ping\nevent: update\nid: 4\nretry: 100\ndata:x\n\n\n");
        assert_eq!(messages, vec!["x".to_string()]);
    }

    #[test]
    fn test_several_messages_in_one_chunk() {
        let mut decoder = SseDecoder::new();
        let messages = decoder.feed(b"data: a\n\ndata: b\n\ndata: c");
        assert_eq!(messages, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(decoder.feed(b"\n\n"), vec!["c".to_string()]);
    }
}
