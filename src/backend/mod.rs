//! The single boundary between the client and whoever owns the state.
//!
//! Every call returns a full wire snapshot; the client never sees partial
//! updates. Two transports ship: `LocalBackend` runs the reference engine
//! in-process, `SocketBackend` talks to `one-good-hour serve`.

pub mod engine;
mod local;
mod server;
mod socket;

use async_trait::async_trait;

pub use engine::Engine;
pub use local::LocalBackend;
pub use server::{serve, serve_listener};
pub use socket::SocketBackend;

use crate::error::BackendError;
use crate::protocol::{Action, RpcRequest, WireSnapshot};

#[async_trait]
pub trait Backend: Send + Sync {
    async fn call(&self, request: RpcRequest) -> Result<WireSnapshot, BackendError>;

    async fn get_state(&self) -> Result<WireSnapshot, BackendError> {
        self.call(RpcRequest::GetState).await
    }

    async fn tick(&self) -> Result<WireSnapshot, BackendError> {
        self.call(RpcRequest::Tick).await
    }

    async fn action(&self, action: Action) -> Result<WireSnapshot, BackendError> {
        self.call(RpcRequest::action(action)).await
    }
}
