use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{Backend, Engine};
use crate::error::BackendError;
use crate::protocol::{RpcRequest, WireSnapshot};

/// Engine shared between the client and any server connections.
pub type SharedEngine = Arc<Mutex<Engine>>;

/// Runs the reference engine inside the client process.
#[derive(Clone)]
pub struct LocalBackend {
    engine: SharedEngine,
}

impl LocalBackend {
    pub fn new(engine: Engine) -> Self {
        Self::shared(Arc::new(Mutex::new(engine)))
    }

    pub fn shared(engine: SharedEngine) -> Self {
        LocalBackend { engine }
    }
}

#[async_trait]
impl Backend for LocalBackend {
    async fn call(&self, request: RpcRequest) -> Result<WireSnapshot, BackendError> {
        let now_ms = chrono::Utc::now().timestamp_millis();
        let mut engine = self.engine.lock().await;
        Ok(engine.handle(&request, now_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Action;

    #[tokio::test]
    async fn actions_reach_the_engine() {
        let backend = LocalBackend::new(Engine::with_clipboard(Box::new(|_: &str| {
            Ok::<(), String>(())
        })));
        backend.action(Action::MoveDown).await.unwrap();
        backend.action(Action::MoveDown).await.unwrap();
        let state = backend.get_state().await.unwrap();
        assert_eq!(state.selected_todo, 2);

        let state = backend.tick().await.unwrap();
        assert_eq!(state.time_left, 3600);
    }
}
