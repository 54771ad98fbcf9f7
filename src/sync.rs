//! Round-trips to the backend and the one cached snapshot they produce.
//!
//! Every request is spawned onto the runtime and reports back through a
//! channel, so the UI loop never waits on the backend. Requests carry a
//! sequence number; a completion only replaces the snapshot when it is
//! newer than the last one applied.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::backend::Backend;
use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::protocol::{Action, RpcRequest, WireSnapshot};
use crate::state::StateSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    Initial,
    Poll,
    Send(Action),
}

impl Request {
    fn to_rpc(self) -> RpcRequest {
        match self {
            Request::Initial => RpcRequest::GetState,
            Request::Poll => RpcRequest::Tick,
            Request::Send(action) => RpcRequest::action(action),
        }
    }
}

/// A finished round-trip, tagged with the sequence number it was sent with.
#[derive(Debug)]
pub struct Completion {
    pub seq: u64,
    pub request: Request,
    pub result: Result<WireSnapshot, SyncError>,
}

/// The client's view of whether the backend is reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    /// Nothing has come back yet.
    Connecting,
    Connected,
    Disconnected { failures: u32 },
}

#[derive(Debug)]
pub enum Outcome {
    /// The snapshot was replaced.
    Applied,
    /// An older response arrived after a newer one was applied.
    Stale,
    /// Transport failure, timeout, or a snapshot that failed validation.
    Failed(SyncError),
}

pub struct StateSync {
    backend: Arc<dyn Backend>,
    timeout: Duration,
    disconnect_after: u32,
    next_seq: u64,
    last_applied: u64,
    failures: u32,
    link: LinkStatus,
    snapshot: Option<StateSnapshot>,
    tx: mpsc::UnboundedSender<Completion>,
}

impl StateSync {
    pub fn new(
        backend: Arc<dyn Backend>,
        config: &SyncConfig,
    ) -> (Self, mpsc::UnboundedReceiver<Completion>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sync = StateSync {
            backend,
            timeout: config.timeout(),
            disconnect_after: config.disconnect_after.max(1),
            next_seq: 0,
            last_applied: 0,
            failures: 0,
            link: LinkStatus::Connecting,
            snapshot: None,
            tx,
        };
        (sync, rx)
    }

    pub fn initial(&mut self) -> u64 {
        self.spawn(Request::Initial)
    }

    pub fn poll(&mut self) -> u64 {
        self.spawn(Request::Poll)
    }

    pub fn send(&mut self, action: Action) -> u64 {
        self.spawn(Request::Send(action))
    }

    pub fn snapshot(&self) -> Option<&StateSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn link(&self) -> LinkStatus {
        self.link
    }

    /// Sequence number of the most recently issued request.
    pub fn last_issued(&self) -> u64 {
        self.next_seq
    }

    fn spawn(&mut self, request: Request) -> u64 {
        self.next_seq += 1;
        let seq = self.next_seq;
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        let timeout = self.timeout;

        tokio::spawn(async move {
            let result = match tokio::time::timeout(timeout, backend.call(request.to_rpc())).await {
                Ok(Ok(wire)) => Ok(wire),
                Ok(Err(e)) => Err(SyncError::Backend(e)),
                Err(_) => Err(SyncError::Timeout(timeout)),
            };
            // The receiver only goes away on shutdown.
            let _ = tx.send(Completion {
                seq,
                request,
                result,
            });
        });
        seq
    }

    /// Fold one completion into the cached state.
    pub fn apply(&mut self, completion: Completion) -> Outcome {
        let Completion {
            seq,
            request,
            result,
        } = completion;

        self.observe_link(&result);

        if seq <= self.last_applied {
            tracing::debug!(
                seq,
                last_applied = self.last_applied,
                ?request,
                "discarding stale response"
            );
            return Outcome::Stale;
        }

        let decoded =
            result.and_then(|wire| StateSnapshot::try_from(wire).map_err(SyncError::from));
        match decoded {
            Ok(snapshot) => {
                self.last_applied = seq;
                self.snapshot = Some(snapshot);
                Outcome::Applied
            }
            Err(e) => {
                tracing::warn!(seq, ?request, "round-trip failed: {e}");
                Outcome::Failed(e)
            }
        }
    }

    fn observe_link(&mut self, result: &Result<WireSnapshot, SyncError>) {
        match result {
            Ok(_) => {
                self.failures = 0;
                self.link = LinkStatus::Connected;
            }
            Err(e) if e.is_transport() => {
                self.failures = self.failures.saturating_add(1);
                if self.failures >= self.disconnect_after {
                    if !matches!(self.link, LinkStatus::Disconnected { .. }) {
                        tracing::warn!(failures = self.failures, "backend unreachable");
                    }
                    self.link = LinkStatus::Disconnected {
                        failures: self.failures,
                    };
                }
            }
            Err(_) => {}
        }
    }
}
