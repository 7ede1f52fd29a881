//! Live audit log stream (server-sent events)

use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use voketag_core::{AuditLogEntry, Error, Result};

use crate::admin::AdminApi;
use crate::http::ApiRequest;

pub const AUDIT_STREAM_PATH: &str = "/v1/admin/audit/logs/stream";

/// Only events of this type carry audit entries
const LOG_EVENT: &str = "log";

/// Incremental decoder for `event:`/`data:` blocks separated by blank lines.
///
/// Bytes are buffered until a full block arrives, so multi-byte characters
/// split across chunks decode correctly. Undecodable data lines are skipped.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk and return the audit entries completed by it
    pub fn push(&mut self, chunk: &[u8]) -> Vec<AuditLogEntry> {
        self.buffer.extend_from_slice(chunk);
        let mut entries = Vec::new();
        while let Some(end) = find_block_end(&self.buffer) {
            let block: Vec<u8> = self.buffer.drain(..end + 2).collect();
            entries.extend(parse_block(&String::from_utf8_lossy(&block[..end])));
        }
        entries
    }
}

fn find_block_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(2).position(|w| w == b"\n\n")
}

fn parse_block(block: &str) -> Vec<AuditLogEntry> {
    let mut event = "";
    let mut entries = Vec::new();
    for line in block.split('\n') {
        if let Some(kind) = line.strip_prefix("event: ") {
            event = kind.trim();
        } else if let Some(data) = line.strip_prefix("data: ") {
            if event != LOG_EVENT {
                continue;
            }
            match serde_json::from_str(data) {
                Ok(entry) => entries.push(entry),
                Err(e) => tracing::debug!(error = %e, "skipping undecodable audit event"),
            }
        }
    }
    entries
}

impl AdminApi {
    /// Follow the audit log until the server closes the stream or `cancel`
    /// fires. Each decoded entry is handed to `on_log`.
    pub async fn follow_audit_logs<F>(
        &self,
        entity_type: Option<&str>,
        action: Option<&str>,
        cancel: CancellationToken,
        mut on_log: F,
    ) -> Result<()>
    where
        F: FnMut(AuditLogEntry),
    {
        let request = ApiRequest::get(AUDIT_STREAM_PATH)
            .query_opt("entity_type", entity_type)
            .query_opt("action", action)
            .streaming();
        let url = self.client().url(AUDIT_STREAM_PATH);

        let response = tokio::select! {
            biased;
            () = cancel.cancelled() => return Ok(()),
            response = self.client().send(&request) => response?,
        };
        tracing::info!("audit stream connected");

        let mut body = response.bytes_stream();
        let mut decoder = SseDecoder::new();
        loop {
            let chunk = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    tracing::info!("audit stream closed");
                    return Ok(());
                }
                chunk = body.next() => chunk,
            };
            match chunk {
                Some(Ok(bytes)) => decoder.push(&bytes).into_iter().for_each(&mut on_log),
                Some(Err(e)) => return Err(Error::network(&url, e.to_string())),
                None => {
                    tracing::info!("audit stream ended by server");
                    return Ok(());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_log_events_are_delivered() {
        let mut decoder = SseDecoder::new();
        let entries = decoder.push(
            b"event: ping\ndata: {\"id\": \"x\"}\n\nevent: log\ndata: {\"id\": \"a1\", \"action\": \"login\"}\n\n",
        );
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id.as_deref(), Some("a1"));
        assert_eq!(entries[0].action.as_deref(), Some("login"));
    }

    #[test]
    fn test_blocks_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"event: log\ndata: {\"id\": \"a").is_empty());
        assert!(decoder.push(b"2\", \"entity_type\": \"batch\"}\n").is_empty());
        let entries = decoder.push(b"\n");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].entity_type.as_deref(), Some("batch"));
    }

    #[test]
    fn test_utf8_split_inside_character() {
        let payload = "event: log\ndata: {\"id\": \"ç1\"}\n\n".as_bytes();
        let split = payload.iter().position(|b| *b == 0xC3).unwrap() + 1;
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(&payload[..split]).is_empty());
        let entries = decoder.push(&payload[split..]);
        assert_eq!(entries[0].id.as_deref(), Some("ç1"));
    }

    #[test]
    fn test_bad_json_is_skipped() {
        let mut decoder = SseDecoder::new();
        let entries = decoder.push(b"event: log\ndata: {not json\ndata: {\"id\": \"ok\"}\n\n");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id.as_deref(), Some("ok"));
    }
}
