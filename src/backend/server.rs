use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::BufReader;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Mutex;

use super::Engine;
use super::local::SharedEngine;
use crate::error::BackendError;
use crate::protocol::{RpcRequest, RpcResponse, read_message, write_message};

/// Serve a fresh engine on `path` until the process is stopped.
pub async fn serve(path: &Path) -> Result<()> {
    // Clean up stale socket
    if path.exists() {
        std::fs::remove_file(path)
            .with_context(|| format!("failed to remove stale socket {}", path.display()))?;
    }

    let listener = UnixListener::bind(path)
        .with_context(|| format!("failed to bind backend socket at {}", path.display()))?;

    tracing::info!("backend listening on {}", path.display());

    serve_listener(listener, Arc::new(Mutex::new(Engine::new()))).await
}

/// Accept loop over an already bound listener.
pub async fn serve_listener(listener: UnixListener, engine: SharedEngine) -> Result<()> {
    loop {
        match listener.accept().await {
            Ok((stream, _)) => {
                let engine = Arc::clone(&engine);
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, engine).await {
                        tracing::error!("backend connection error: {e}");
                    }
                });
            }
            Err(e) => {
                tracing::error!("backend accept error: {e}");
            }
        }
    }
}

/// Answer requests on one connection until the client hangs up.
async fn handle_connection(stream: UnixStream, engine: SharedEngine) -> Result<(), BackendError> {
    let (read, mut write) = stream.into_split();
    let mut reader = BufReader::new(read);

    loop {
        let response = match read_message::<_, RpcRequest>(&mut reader).await {
            Ok(None) => return Ok(()),
            Ok(Some(request)) => {
                tracing::debug!(?request, "backend request");
                let now_ms = chrono::Utc::now().timestamp_millis();
                let state = engine.lock().await.handle(&request, now_ms);
                RpcResponse::Ok {
                    state: Box::new(state),
                }
            }
            Err(BackendError::Protocol(e)) => {
                tracing::warn!("malformed request: {e}");
                RpcResponse::Error {
                    message: format!("malformed request: {e}"),
                }
            }
            Err(e) => return Err(e),
        };
        write_message(&mut write, &response).await?;
    }
}
