// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Newline-delimited JSON framing (§6b): one `Request`/`Response` per line.

use crate::types::{Request, Response};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("i/o error on control socket")]
    Io(#[from] std::io::Error),
    #[error("malformed control frame")]
    Json(#[from] serde_json::Error),
}

/// Read one `Request` line. `Ok(None)` means the peer closed the connection.
pub async fn read_request<R: AsyncBufRead + Unpin>(
    reader: &mut R,
) -> Result<Option<Request>, WireError> {
    let mut line = String::new();
    let n = reader.read_line(&mut line).await?;
    if n == 0 {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(line.trim_end())?))
}

/// Write one `Response` line, newline-terminated.
pub async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &Response,
) -> Result<(), WireError> {
    write_line(writer, response).await
}

/// Write one `Request` line, newline-terminated (client side of §6b).
pub async fn write_request<W: AsyncWrite + Unpin>(
    writer: &mut W,
    request: &Request,
) -> Result<(), WireError> {
    write_line(writer, request).await
}

/// Read one `Response` line (client side of §6b). `Ok(None)` means the
/// daemon closed the connection without answering.
pub async fn read_response<R: AsyncBufRead + Unpin>(
    reader: &mut R,
) -> Result<Option<Response>, WireError> {
    let mut line = String::new();
    let n = reader.read_line(&mut line).await?;
    if n == 0 {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(line.trim_end())?))
}

async fn write_line<W: AsyncWrite + Unpin, T: serde::Serialize>(
    writer: &mut W,
    value: &T,
) -> Result<(), WireError> {
    let mut line = serde_json::to_string(value)?;
    line.push('\n');
    writer.write_all(line.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
#[path = "wire_tests.rs"]
mod tests;
