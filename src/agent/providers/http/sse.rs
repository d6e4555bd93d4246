//! 最小化的 Server-Sent Events 解碼器。
//!
//! 只處理 `data:` 欄位；`event:`、`id:`、`retry:` 與註解行會被略過。
//! 位元組可以任意切分後餵入，跨區塊的行與多位元組字元都會正確拼接。

#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 餵入一段位元組，回傳其中已完整的事件資料。
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);
        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|byte| *byte == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches(['\n', '\r']);
            if let Some(event) = self.process_line(line) {
                events.push(event);
            }
        }
        events
    }

    /// 串流結束時取出尚未以空行結尾的最後一個事件。
    pub fn finish(&mut self) -> Option<String> {
        if !self.buffer.is_empty() {
            let rest = std::mem::take(&mut self.buffer);
            let rest = String::from_utf8_lossy(&rest).into_owned();
            if let Some(event) = self.process_line(rest.trim_end_matches('\r')) {
                return Some(event);
            }
        }
        self.flush()
    }

    fn process_line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            return self.flush();
        }
        if line.starts_with(':') {
            return None;
        }
        if let Some(value) = line.strip_prefix("data:") {
            self.data
                .push(value.strip_prefix(' ').unwrap_or(value).to_string());
        }
        None
    }

    fn flush(&mut self) -> Option<String> {
        if self.data.is_empty() {
            return None;
        }
        Some(std::mem::take(&mut self.data).join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_events_on_blank_lines() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(b"data: {\"a\":1}\n\ndata: {\"b\":2}\n\n");
        assert_eq!(events, vec!["{\"a\":1}", "{\"b\":2}"]);
    }

    #[test]
    fn handles_crlf_comments_and_other_fields() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(b": keep-alive\r\nevent: message\r\nid: 7\r\ndata: x\r\n\r\n");
        assert_eq!(events, vec!["x"]);
    }

    #[test]
    fn joins_lines_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"data: {\"delta\":\"caf").is_empty());
        let snowman = "☃".as_bytes();
        assert!(decoder.feed(&snowman[..1]).is_empty());
        assert!(decoder.feed(&snowman[1..]).is_empty());
        let events = decoder.feed(b"\"}\n\n");
        assert_eq!(events, vec!["{\"delta\":\"caf☃\"}"]);
    }

    #[test]
    fn multi_line_data_is_joined_with_newlines() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(b"data: line one\ndata: line two\n\n");
        assert_eq!(events, vec!["line one\nline two"]);
    }

    #[test]
    fn finish_returns_trailing_event_without_blank_line() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"data: tail").is_empty());
        assert_eq!(decoder.finish().as_deref(), Some("tail"));
        assert_eq!(decoder.finish(), None);
    }
}
