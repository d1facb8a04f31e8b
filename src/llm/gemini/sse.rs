//! Server-Sent Events (SSE) parser for Gemini responses

use bytes::Bytes;
use futures::stream::Stream;
use futures::StreamExt;
use std::pin::Pin;

use crate::llm::core::error::LlmError;

use super::types::GenerateContentResponse;

/// Parse a stream of bytes as Gemini SSE events
///
/// Gemini's SSE format uses `data: <json>` lines. Bytes are buffered until a
/// full line is available, so JSON payloads and multi-byte characters may be
/// split across network chunks. A last line without a trailing newline is
/// parsed when the body ends.
pub fn parse_sse_stream(
    byte_stream: Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>,
) -> Pin<Box<dyn Stream<Item = Result<GenerateContentResponse, LlmError>> + Send>> {
    let mut buffer: Vec<u8> = Vec::new();

    let event_stream = byte_stream
        .map(Some)
        .chain(futures::stream::once(async { None }))
        .flat_map(move |item| {
            let chunk = match item {
                Some(Ok(bytes)) => bytes,
                Some(Err(e)) => {
                    return futures::stream::iter(vec![Err(LlmError::StreamError(e.to_string()))]);
                }
                None => {
                    let rest = std::mem::take(&mut buffer);
                    return futures::stream::iter(decode_line(&rest).into_iter().collect::<Vec<_>>());
                }
            };

            buffer.extend_from_slice(&chunk);

            let mut events = Vec::new();
            while let Some(newline_pos) = buffer.iter().position(|b| *b == b'\n') {
                let line_bytes: Vec<u8> = buffer.drain(..=newline_pos).collect();
                if let Some(event) = decode_line(&line_bytes) {
                    events.push(event);
                }
            }

            futures::stream::iter(events)
        });

    Box::pin(event_stream)
}

fn decode_line(bytes: &[u8]) -> Option<Result<GenerateContentResponse, LlmError>> {
    match std::str::from_utf8(bytes) {
        Ok(line) => parse_line(line.trim()),
        Err(e) => Some(Err(LlmError::StreamError(format!(
            "Invalid UTF-8 in stream: {}",
            e
        )))),
    }
}

/// Parse one trimmed SSE line; non-data lines yield nothing
fn parse_line(line: &str) -> Option<Result<GenerateContentResponse, LlmError>> {
    let data = line.strip_prefix("data:")?.trim_start();
    if data.is_empty() {
        return None;
    }

    Some(
        serde_json::from_str::<GenerateContentResponse>(data).map_err(|e| {
            LlmError::SerializationError(format!(
                "Failed to parse SSE data: {}. Data: {}",
                e, data
            ))
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::gemini::types::Part;
    use futures::stream;

    fn byte_stream(
        chunks: Vec<&'static [u8]>,
    ) -> Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>> {
        Box::pin(stream::iter(
            chunks.into_iter().map(|c| Ok(Bytes::from_static(c))),
        ))
    }

    fn first_text(response: &GenerateContentResponse) -> &str {
        match &response.candidates[0].content.parts[0] {
            Part::Text { text } => text,
            _ => panic!("Expected text part"),
        }
    }

    #[tokio::test]
    async fn test_parse_crlf_events() {
        let data: &'static [u8] = b"data: {\"candidates\":[{\"content\":{\"role\":\"model\",\"parts\":[{\"text\":\"Hello\"}]}}]}\r\n\r\ndata: {\"candidates\":[{\"content\":{\"role\":\"model\",\"parts\":[{\"text\":\" World\"}]}}]}\r\n\r\n";
        let mut sse_stream = parse_sse_stream(byte_stream(vec![data]));

        let first = sse_stream.next().await.unwrap().unwrap();
        assert_eq!(first_text(&first), "Hello");
        let second = sse_stream.next().await.unwrap().unwrap();
        assert_eq!(first_text(&second), " World");
        assert!(sse_stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_parse_chunked_data() {
        let chunk1: &'static [u8] = b"data: {\"candidates\":[{\"content\":{\"role\":\"mo";
        let chunk2: &'static [u8] = b"del\",\"parts\":[{\"text\":\"Hello\"}]}}]}\n";

        let mut sse_stream = parse_sse_stream(byte_stream(vec![chunk1, chunk2]));
        let response = sse_stream.next().await.unwrap().unwrap();
        assert_eq!(response.candidates[0].content.role, "model");
    }

    #[tokio::test]
    async fn test_multibyte_character_split_across_chunks() {
        // "é" is 0xC3 0xA9; split it between chunks
        let chunk1: &'static [u8] =
            b"data: {\"candidates\":[{\"content\":{\"role\":\"model\",\"parts\":[{\"text\":\"caf\xC3";
        let chunk2: &'static [u8] = b"\xA9\"}]}}]}\n";

        let mut sse_stream = parse_sse_stream(byte_stream(vec![chunk1, chunk2]));
        let response = sse_stream.next().await.unwrap().unwrap();
        assert_eq!(first_text(&response), "café");
    }

    #[tokio::test]
    async fn test_last_line_without_newline() {
        let chunk1: &'static [u8] = b"data: {\"candidates\":[{\"content\":{\"role\":\"model\",\"parts\":[{\"text\":\"Hello\"}]}}]}\n\n";
        let chunk2: &'static [u8] = b"data: {\"candidates\":[{\"content\":{\"role\":\"model\",\"parts\":[{\"text\":\"Bye\"}]}}]}";

        let mut sse_stream = parse_sse_stream(byte_stream(vec![chunk1, chunk2]));
        let first = sse_stream.next().await.unwrap().unwrap();
        assert_eq!(first_text(&first), "Hello");
        let last = sse_stream.next().await.unwrap().unwrap();
        assert_eq!(first_text(&last), "Bye");
        assert!(sse_stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_parse_invalid_json() {
        let mut sse_stream = parse_sse_stream(byte_stream(vec![&b"data: {invalid json}\n"[..]]));
        let result = sse_stream.next().await.unwrap();
        assert!(matches!(result, Err(LlmError::SerializationError(_))));
    }

    #[test]
    fn test_non_data_lines_ignored() {
        assert!(parse_line("event: message").is_none());
        assert!(parse_line(": keep-alive").is_none());
        assert!(parse_line("data:").is_none());
    }

    #[tokio::test]
    async fn test_parse_function_call() {
        let data: &'static [u8] = b"data: {\"candidates\":[{\"content\":{\"role\":\"model\",\"parts\":[{\"functionCall\":{\"name\":\"web_search\",\"args\":{\"query\":\"rust\"}}}]}}]}\n";
        let mut sse_stream = parse_sse_stream(byte_stream(vec![data]));
        let response = sse_stream.next().await.unwrap().unwrap();
        match &response.candidates[0].content.parts[0] {
            Part::FunctionCall { function_call } => {
                assert_eq!(function_call.name, "web_search");
                assert_eq!(function_call.args["query"], "rust");
            }
            _ => panic!("Expected function call part"),
        }
    }
}
