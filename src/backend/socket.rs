use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::BufReader;
use tokio::net::UnixStream;

use super::Backend;
use crate::error::BackendError;
use crate::protocol::{RpcRequest, RpcResponse, WireSnapshot, read_message, write_message};

/// Talks to `one-good-hour serve` over a Unix domain socket.
///
/// Each request opens its own connection, so concurrent round-trips never
/// share a stream and a dead daemon only costs the requests made while it
/// was down.
#[derive(Debug, Clone)]
pub struct SocketBackend {
    path: PathBuf,
}

impl SocketBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SocketBackend { path: path.into() }
    }
}

#[async_trait]
impl Backend for SocketBackend {
    async fn call(&self, request: RpcRequest) -> Result<WireSnapshot, BackendError> {
        let stream = UnixStream::connect(&self.path).await?;
        let (read, mut write) = stream.into_split();
        write_message(&mut write, &request).await?;

        let mut reader = BufReader::new(read);
        let response: RpcResponse = read_message(&mut reader).await?.ok_or(BackendError::Closed)?;
        response.into_result()
    }
}
