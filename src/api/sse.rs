use bytes::BytesMut;
use futures::Stream;
use futures_util::TryStreamExt;
use tokio_util::codec::{Decoder, FramedRead};
use tokio_util::io::StreamReader;

/// 一个完整的 text/event-stream 事件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseEvent {
    /// event: 字段, 缺省事件为 None
    pub event: Option<String>,
    /// data: 行, 多行按 \n 拼接
    pub data: String,
}

/// text/event-stream 帧解码器
///
/// 按行累积 `data:` / `event:` 字段, 空行触发分发。
/// `id:` / `retry:` 与注释行直接忽略, 客户端不做断线重连。
#[derive(Debug, Default)]
pub struct SseDecoder {
    event: Option<String>,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        let event = self.event.take();
        let data = std::mem::take(&mut self.data);

        // 没有任何 data 行的事件块按规范丢弃
        if data.is_empty() {
            return None;
        }

        Some(SseEvent {
            event,
            data: data.join("\n"),
        })
    }

    fn consume_line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            return self.dispatch();
        }

        // 注释行
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "data" => self.data.push(value.to_string()),
            "event" => self.event = Some(value.to_string()),
            // id / retry 不关心
            _ => {}
        }

        None
    }
}

impl Decoder for SseDecoder {
    type Item = SseEvent;
    type Error = std::io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> std::io::Result<Option<SseEvent>> {
        loop {
            let Some(position) = src.iter().position(|byte| *byte == b'\n') else {
                return Ok(None);
            };

            let raw = src.split_to(position + 1);
            let line = raw
                .strip_suffix(b"\r\n")
                .or_else(|| raw.strip_suffix(b"\n"))
                .unwrap_or(&raw);
            let line = std::str::from_utf8(line).map_err(|err| {
                std::io::Error::new(std::io::ErrorKind::InvalidData, err)
            })?;

            if let Some(event) = self.consume_line(line) {
                return Ok(Some(event));
            }
        }
    }
}

/// 把 HTTP 响应体包装成事件流
pub fn event_stream(
    response: reqwest::Response,
) -> impl Stream<Item = std::io::Result<SseEvent>> + Send {
    let bytes = response.bytes_stream().map_err(std::io::Error::other);
    FramedRead::new(StreamReader::new(bytes), SseDecoder::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BufMut;

    fn feed(decoder: &mut SseDecoder, buffer: &mut BytesMut, input: &str) -> Vec<SseEvent> {
        buffer.put_slice(input.as_bytes());
        let mut events = Vec::new();
        while let Some(event) = decoder.decode(buffer).unwrap() {
            events.push(event);
        }
        events
    }

    #[test]
    fn decodes_single_data_event() {
        let mut decoder = SseDecoder::new();
        let mut buffer = BytesMut::new();

        let events = feed(&mut decoder, &mut buffer, "data: {\"x\":1}\n\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "{\"x\":1}");
        assert_eq!(events[0].event, None);
    }

    #[test]
    fn accumulates_multiline_data() {
        let mut decoder = SseDecoder::new();
        let mut buffer = BytesMut::new();

        let events = feed(&mut decoder, &mut buffer, "data: a\ndata: b\n\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "a\nb");
    }

    #[test]
    fn handles_event_field_and_crlf() {
        let mut decoder = SseDecoder::new();
        let mut buffer = BytesMut::new();

        let events = feed(&mut decoder, &mut buffer, "event: progress\r\ndata: 42\r\n\r\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event.as_deref(), Some("progress"));
        assert_eq!(events[0].data, "42");
    }

    #[test]
    fn skips_comments_and_unknown_fields() {
        let mut decoder = SseDecoder::new();
        let mut buffer = BytesMut::new();

        let events = feed(
            &mut decoder,
            &mut buffer,
            ": keep-alive\nid: 7\nretry: 1000\ndata: x\n\n",
        );
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "x");
    }

    #[test]
    fn empty_block_is_not_dispatched() {
        let mut decoder = SseDecoder::new();
        let mut buffer = BytesMut::new();

        let events = feed(&mut decoder, &mut buffer, "\n\n: ping\n\ndata: y\n\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "y");
    }

    #[test]
    fn resumes_across_chunk_boundaries() {
        let mut decoder = SseDecoder::new();
        let mut buffer = BytesMut::new();

        assert!(feed(&mut decoder, &mut buffer, "data: par").is_empty());
        assert!(feed(&mut decoder, &mut buffer, "tial\n").is_empty());
        let events = feed(&mut decoder, &mut buffer, "\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "partial");
    }
}
