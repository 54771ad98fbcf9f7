use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use super::{Action, WireSnapshot};
use crate::error::BackendError;

/// One line sent to a backend daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum RpcRequest {
    GetState,
    Tick,
    Action {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<String>,
    },
}

impl RpcRequest {
    pub fn action(action: Action) -> Self {
        RpcRequest::Action {
            name: action.name().to_string(),
            payload: action.payload(),
        }
    }
}

/// One line sent back by a backend daemon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RpcResponse {
    Ok { state: Box<WireSnapshot> },
    Error { message: String },
}

impl RpcResponse {
    pub fn into_result(self) -> Result<WireSnapshot, BackendError> {
        match self {
            RpcResponse::Ok { state } => Ok(*state),
            RpcResponse::Error { message } => Err(BackendError::Remote(message)),
        }
    }
}

/// Write `msg` as one JSON line and flush.
pub async fn write_message<W, T>(writer: &mut W, msg: &T) -> Result<(), BackendError>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let mut line = serde_json::to_vec(msg)?;
    line.push(b'\n');
    writer.write_all(&line).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one JSON line. `Ok(None)` means the peer closed the stream.
pub async fn read_message<R, T>(reader: &mut R) -> Result<Option<T>, BackendError>
where
    R: AsyncBufRead + Unpin,
    T: for<'de> Deserialize<'de>,
{
    let mut line = String::new();
    if reader.read_line(&mut line).await? == 0 {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(line.trim_end())?))
}
