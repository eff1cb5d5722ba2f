//! The popup side's view of the request/response boundary.
//!
//! A send is a single synchronous round trip. Anything short of a
//! well-formed response line is a `TransportError`; there are no retries.

use std::io::{BufRead, Write};

use thiserror::Error;
use tracing::{debug, warn};

use crate::ipc::{self, AppState, Request, Response};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("no response from the form page")]
    NoResponse,
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("channel i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

pub trait Channel {
    fn send(&mut self, req: Request) -> Result<Response, TransportError>;
}

fn decode(value: serde_json::Value) -> Result<Response, TransportError> {
    serde_json::from_value(value).map_err(|e| TransportError::Malformed(e.to_string()))
}

/// Dispatches straight into the router, in process.
#[derive(Debug, Default)]
pub struct LocalChannel {
    pub state: AppState,
}

impl LocalChannel {
    pub fn new(state: AppState) -> Self {
        LocalChannel { state }
    }
}

impl Channel for LocalChannel {
    fn send(&mut self, req: Request) -> Result<Response, TransportError> {
        decode(ipc::handle_request(&mut self.state, req))
    }
}

/// One JSON line out, one JSON line back, e.g. over a sidecar's pipes.
pub struct StdioChannel<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> StdioChannel<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        StdioChannel { reader, writer }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

impl<R: BufRead, W: Write> Channel for StdioChannel<R, W> {
    fn send(&mut self, req: Request) -> Result<Response, TransportError> {
        let line = serde_json::to_string(&req).map_err(|e| TransportError::Malformed(e.to_string()))?;
        writeln!(self.writer, "{line}")?;
        self.writer.flush()?;

        let mut buf = String::new();
        if self.reader.read_line(&mut buf)? == 0 || buf.trim().is_empty() {
            warn!(action = %req.action, "channel closed before a response arrived");
            return Err(TransportError::NoResponse);
        }
        let value: serde_json::Value =
            serde_json::from_str(buf.trim()).map_err(|e| TransportError::Malformed(e.to_string()))?;
        let resp = decode(value)?;
        if !req.id.is_empty() && resp.id != req.id {
            return Err(TransportError::Malformed(format!(
                "response id {} does not match request {}",
                resp.id, req.id
            )));
        }
        debug!(id = %resp.id, status = ?resp.status, "response");
        Ok(resp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Cursor;

    #[test]
    fn local_channel_answers_unknown_actions_with_error() {
        let mut ch = LocalChannel::default();
        let resp = ch
            .send(Request::new("1", "nope", json!({})))
            .expect("response");
        assert!(!resp.is_success());
        assert_eq!(resp.code.as_deref(), Some("not_implemented"));
    }

    #[test]
    fn stdio_channel_reads_one_response_line() {
        let reply = "{\"id\":\"7\",\"status\":\"success\",\"message\":\"AV1, AV2\"}\n";
        let mut ch = StdioChannel::new(Cursor::new(reply.as_bytes().to_vec()), Vec::new());
        let resp = ch
            .send(Request::new("7", "get_av_headers", json!(null)))
            .expect("response");
        assert_eq!(resp.message, "AV1, AV2");

        let (_, written) = ch.into_inner();
        let sent: serde_json::Value =
            serde_json::from_slice(&written).expect("request line is json");
        assert_eq!(sent["action"], "get_av_headers");
    }

    #[test]
    fn stdio_channel_eof_is_no_response() {
        let mut ch = StdioChannel::new(Cursor::new(Vec::new()), Vec::new());
        let err = ch
            .send(Request::new("1", "get_av_headers", json!(null)))
            .unwrap_err();
        assert!(matches!(err, TransportError::NoResponse));
    }

    #[test]
    fn stdio_channel_rejects_garbage() {
        let mut ch = StdioChannel::new(Cursor::new(b"<html>\n".to_vec()), Vec::new());
        let err = ch
            .send(Request::new("1", "get_av_headers", json!(null)))
            .unwrap_err();
        assert!(matches!(err, TransportError::Malformed(_)));
    }
}
