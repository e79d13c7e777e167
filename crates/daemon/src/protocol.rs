// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Control-socket wire protocol (spec.md §4.8, §6, C9).
//!
//! Wire format: 4-byte length prefix (big-endian) + UTF-8 JSON payload.

use serde::{Deserialize, Serialize};
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Request from a client: `{"request": "<name>", "data": <object>}` (spec.md §6).
#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    pub request: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Reply: always includes `status`; the remaining fields are populated per
/// handler (spec.md §6).
#[derive(Debug, Clone, Default, Serialize)]
pub struct Response {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub errors: Vec<(usize, String)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflows: Option<Vec<serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jobs: Option<Vec<serde_json::Value>>,
}

impl Response {
    pub fn status(status: impl Into<String>) -> Self {
        Self { status: status.into(), ..Default::default() }
    }

    pub fn scheduled(id: impl Into<String>) -> Self {
        Self { status: "Scheduled".into(), id: Some(id.into()), ..Default::default() }
    }

    pub fn rejected(errors: Vec<(usize, String)>) -> Self {
        Self { status: "Error".into(), errors, ..Default::default() }
    }

    /// The request loop's catch-all reply for an undecodable request, a
    /// handler error, or an unserializable response (spec.md §4.8, §7).
    pub fn failed(cause: impl std::fmt::Display) -> Self {
        Self { status: "Failed".into(), error: Some(cause.to_string()), ..Default::default() }
    }

    pub fn with_workflows(status: impl Into<String>, workflows: Vec<serde_json::Value>) -> Self {
        Self { status: status.into(), workflows: Some(workflows), ..Default::default() }
    }

    /// `get_status` reply: workflow status plus a per-task state projection
    /// (spec.md §6 reply shape, §4.8 `get_status`).
    pub fn with_jobs(status: impl Into<String>, jobs: Vec<serde_json::Value>) -> Self {
        Self { status: status.into(), jobs: Some(jobs), ..Default::default() }
    }
}

/// Read one length-prefixed JSON message, decoding it into a [`Request`].
pub async fn read_request(stream: &mut (impl AsyncRead + Unpin)) -> io::Result<Request> {
    let payload = read_message(stream).await?;
    serde_json::from_slice(&payload).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Encode `response` as JSON and write it length-prefixed.
pub async fn write_response(
    stream: &mut (impl AsyncWrite + Unpin),
    response: &Response,
) -> io::Result<()> {
    let payload = serde_json::to_vec(response)?;
    write_message(stream, &payload).await
}

async fn read_message(stream: &mut (impl AsyncRead + Unpin)) -> io::Result<Vec<u8>> {
    let mut len_bytes = [0u8; 4];
    stream.read_exact(&mut len_bytes).await?;
    let len = u32::from_be_bytes(len_bytes) as usize;
    let mut buf = vec![0u8; len];
    stream.read_exact(&mut buf).await?;
    Ok(buf)
}

async fn write_message(stream: &mut (impl AsyncWrite + Unpin), payload: &[u8]) -> io::Result<()> {
    let len = u32::try_from(payload.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "message too large"))?;
    stream.write_all(&len.to_be_bytes()).await?;
    stream.write_all(payload).await?;
    Ok(())
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
