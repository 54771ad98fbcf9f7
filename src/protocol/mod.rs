//! Wire vocabulary shared by the client and every backend transport.

mod action;
mod rpc;
mod snapshot;

pub use action::Action;
pub use rpc::{RpcRequest, RpcResponse, read_message, write_message};
pub use snapshot::{WireNote, WireSnapshot, WireTodo};
