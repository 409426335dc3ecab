//! Newline-delimited JSON-RPC transport over a pair of byte streams

use std::sync::Arc;

use odoo_mcp_json_rpc::frame::MAX_MESSAGE_BYTES;
use odoo_mcp_json_rpc::{IncomingMessage, JsonRpcDispatcher, JsonRpcError, JsonRpcMessage, parse_line};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::protocol::{McpError, McpResult};

/// Reads requests line by line and answers each from its own task.
///
/// Responses go through a single writer task, so lines never interleave
/// and a slow remote call never holds up reading the next request.
pub struct StdioTransport {
    dispatcher: Arc<JsonRpcDispatcher<McpError>>,
}

impl StdioTransport {
    pub fn new(dispatcher: Arc<JsonRpcDispatcher<McpError>>) -> Self {
        Self { dispatcher }
    }

    /// Serve until `reader` reaches end of input, then drain in-flight requests
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> McpResult<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel::<String>();
        let writer_task = tokio::spawn(write_loop(writer, rx));

        let mut reader = BufReader::new(reader);
        let mut buffer = Vec::new();
        let mut in_flight = JoinSet::new();

        loop {
            buffer.clear();
            let message = match read_line_bounded(&mut reader, &mut buffer, MAX_MESSAGE_BYTES).await? {
                LineRead::Eof => break,
                LineRead::Oversized => Err(JsonRpcError::invalid_request(None)),
                LineRead::Line => match std::str::from_utf8(&buffer) {
                    Ok(line) => parse_line(line),
                    Err(_) => Err(JsonRpcError::parse_error()),
                },
            };

            match message {
                Ok(None) => {}
                Ok(Some(IncomingMessage::Request(request))) => {
                    debug!(method = %request.method, id = %request.id, "Request received");
                    let dispatcher = Arc::clone(&self.dispatcher);
                    let tx = tx.clone();
                    in_flight.spawn(async move {
                        let response = dispatcher.handle_request(request).await;
                        send(&tx, &response);
                    });
                }
                Ok(Some(IncomingMessage::Notification(notification))) => {
                    if let Err(e) = self.dispatcher.handle_notification(notification).await {
                        warn!(error = %e, "Notification handler failed");
                    }
                }
                Err(error) => {
                    warn!(code = error.error.code, "Rejected inbound line: {}", error.error.message);
                    send(&tx, &JsonRpcMessage::Error(error));
                }
            }

            // Reap finished tasks so the set does not grow without bound
            while let Some(joined) = in_flight.try_join_next() {
                log_join(joined);
            }
        }

        info!("Input closed, waiting for {} in-flight requests", in_flight.len());
        while let Some(joined) = in_flight.join_next().await {
            log_join(joined);
        }

        drop(tx);
        match writer_task.await {
            Ok(result) => result.map_err(McpError::from),
            Err(e) => Err(McpError::IoError(std::io::Error::other(e))),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum LineRead {
    Eof,
    Line,
    /// Longer than the limit; the bytes were discarded up to the newline
    Oversized,
}

/// Read one newline-terminated line into `buffer`, holding at most `limit`
/// bytes of it (the newline excluded) in memory.
async fn read_line_bounded<R>(reader: &mut R, buffer: &mut Vec<u8>, limit: usize) -> std::io::Result<LineRead>
where
    R: AsyncBufRead + Unpin,
{
    let mut seen_any = false;
    let mut oversized = false;

    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(match (seen_any, oversized) {
                (false, _) => LineRead::Eof,
                (true, true) => LineRead::Oversized,
                (true, false) => LineRead::Line,
            });
        }
        seen_any = true;

        let (chunk, complete) = match available.iter().position(|&b| b == b'\n') {
            Some(end) => (&available[..end], true),
            None => (available, false),
        };
        if !oversized && buffer.len() + chunk.len() > limit {
            oversized = true;
            buffer.clear();
        }
        if !oversized {
            buffer.extend_from_slice(chunk);
        }

        let consumed = chunk.len() + usize::from(complete);
        reader.consume(consumed);
        if complete {
            return Ok(if oversized { LineRead::Oversized } else { LineRead::Line });
        }
    }
}

fn send(tx: &mpsc::UnboundedSender<String>, message: &JsonRpcMessage) {
    match serde_json::to_string(message) {
        Ok(line) => {
            if tx.send(line).is_err() {
                warn!("Output closed, dropping response");
            }
        }
        Err(e) => error!(error = %e, "Failed to serialize response"),
    }
}

fn log_join(joined: Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        error!(error = %e, "Request task failed");
    }
}

async fn write_loop<W>(mut writer: W, mut rx: mpsc::UnboundedReceiver<String>) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(line) = rx.recv().await {
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }
    Ok(())
}
