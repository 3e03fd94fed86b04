//! Call channel — NDJSON request/response loop over any async byte stream.
//!
//! Reads one request per line, hands each to its own task, and writes
//! responses from a single writer task as they complete. Responses can
//! therefore arrive out of order; callers correlate them by `id`.
//!
//! EOF (or a read error) stops reading. In-flight requests are allowed to
//! finish, then all engines are released.

pub mod types;

use crate::dispatch::OperationDispatcher;
use std::sync::Arc;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter,
};
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};
use types::{ChannelRequest, ChannelResponse};

/// Characters of an unreadable line echoed to the debug log.
const PREVIEW_CHARS: usize = 100;

enum ReadOutcome {
    Eof,
    /// A complete line is in the buffer.
    Line,
    /// The line exceeded the limit and was discarded. Carries its length.
    Oversized(usize),
}

/// Serve calls until `reader` reaches EOF.
pub async fn serve<R, W>(
    dispatcher: Arc<OperationDispatcher>,
    mut reader: R,
    writer: W,
    max_request_bytes: usize,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel::<ChannelResponse>();
    let writer_task = tokio::spawn(write_responses(writer, rx));

    let mut in_flight = JoinSet::new();
    let mut buf = Vec::new();
    let mut served = 0u64;
    let mut read_error = None;

    loop {
        reap_finished(&mut in_flight);

        match read_request(&mut reader, &mut buf, max_request_bytes).await {
            Ok(ReadOutcome::Eof) => break,
            Ok(ReadOutcome::Line) => {}
            Ok(ReadOutcome::Oversized(len)) => {
                log::warn!(
                    "[CHANNEL] Rejecting {} byte request (limit {})",
                    len,
                    max_request_bytes
                );
                let _ = tx.send(ChannelResponse::invalid_request(
                    None,
                    format!("request exceeds {} bytes", max_request_bytes),
                ));
                continue;
            }
            Err(e) => {
                log::error!("[CHANNEL] Read failed, draining in-flight requests: {}", e);
                read_error = Some(e);
                break;
            }
        }

        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line,
            Err(e) => {
                let lossy = String::from_utf8_lossy(&buf);
                reject_unreadable(&tx, &lossy, format!("request is not valid UTF-8: {}", e));
                continue;
            }
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let request = match serde_json::from_str::<ChannelRequest>(trimmed) {
            Ok(req) => req,
            Err(e) => {
                reject_unreadable(&tx, trimmed, e.to_string());
                continue;
            }
        };

        served += 1;
        let (id, call) = request.into_call();
        let dispatcher = Arc::clone(&dispatcher);
        let tx = tx.clone();
        in_flight.spawn(async move {
            let outcome = dispatcher.handle(&call).await;
            let _ = tx.send(ChannelResponse::new(Some(id), outcome));
        });
    }

    while let Some(result) = in_flight.join_next().await {
        log_join_failure(result);
    }
    drop(tx);

    let write_result = writer_task
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    dispatcher.shutdown();
    log::info!("[CHANNEL] Input closed after {} requests", served);
    match read_error {
        Some(e) => Err(e),
        None => write_result,
    }
}

/// Serve on the process's stdin/stdout.
pub async fn serve_stdio(
    dispatcher: Arc<OperationDispatcher>,
    max_request_bytes: usize,
) -> std::io::Result<()> {
    let reader = BufReader::new(tokio::io::stdin());
    serve(dispatcher, reader, tokio::io::stdout(), max_request_bytes).await
}

/// Read the next line into `buf`, never buffering more than `limit + 1` bytes.
async fn read_request<R>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    limit: usize,
) -> std::io::Result<ReadOutcome>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    let n = (&mut *reader).take(limit as u64 + 1).read_until(b'\n', buf).await?;
    if n == 0 {
        return Ok(ReadOutcome::Eof);
    }
    if buf.len() <= limit {
        return Ok(ReadOutcome::Line);
    }

    let mut len = buf.len();
    if buf.last() != Some(&b'\n') {
        len += discard_line(reader).await?;
    }
    buf.clear();
    Ok(ReadOutcome::Oversized(len))
}

/// Skip the rest of the current line without keeping it.
async fn discard_line<R>(reader: &mut R) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut discarded = 0;
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(discarded);
        }
        let (used, done) = match available.iter().position(|&b| b == b'\n') {
            Some(i) => (i + 1, true),
            None => (available.len(), false),
        };
        reader.consume(used);
        discarded += used;
        if done {
            return Ok(discarded);
        }
    }
}

/// Answer an unreadable line if an id can be recovered; otherwise only log it.
fn reject_unreadable(tx: &mpsc::UnboundedSender<ChannelResponse>, line: &str, reason: String) {
    let id = serde_json::from_str::<serde_json::Value>(line)
        .ok()
        .and_then(|v| v.get("id").and_then(serde_json::Value::as_u64));
    match id {
        Some(id) => {
            let _ = tx.send(ChannelResponse::invalid_request(Some(id), reason));
        }
        None => log::debug!("[CHANNEL] Ignoring unreadable line: {}", preview(line)),
    }
}

fn preview(line: &str) -> String {
    line.chars().take(PREVIEW_CHARS).collect()
}

/// Collect tasks that already finished. Returns how many were collected.
fn reap_finished(in_flight: &mut JoinSet<()>) -> usize {
    let mut reaped = 0;
    while let Some(result) = in_flight.try_join_next() {
        log_join_failure(result);
        reaped += 1;
    }
    reaped
}

fn log_join_failure(result: Result<(), JoinError>) {
    if let Err(e) = result {
        log::error!("[CHANNEL] Request task failed: {}", e);
    }
}

async fn write_responses<W>(
    writer: W,
    mut rx: mpsc::UnboundedReceiver<ChannelResponse>,
) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut writer = BufWriter::new(writer);
    while let Some(response) = rx.recv().await {
        let mut out = serde_json::to_string(&response.to_value())?;
        out.push('\n');
        writer.write_all(out.as_bytes()).await?;
        writer.flush().await?;
    }
    writer.shutdown().await
}
