//! Drag-and-drop coordination
//!
//! A drop on the same container is a [`ReorderCoordinator::reorder`]: applied
//! locally first, confirmed remotely, rolled back on failure. A drop on a
//! different container is a [`TransferCoordinator::transfer`]: confirmed
//! remotely first, applied locally only on success.
//!
//! Both paths take a per-container lease from [`ContainerLocks`], so a second
//! operation on a container with an unconfirmed change fails fast with
//! [`OrderingError::ContainerBusy`] instead of interleaving renumbering.

use crate::error::{OrderingError, Result};
use std::{
    collections::HashSet,
    future::Future,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

pub mod reorder;
pub mod transfer;

pub use reorder::{ReorderCoordinator, ReorderOutcome};
pub use transfer::{TransferCoordinator, TransferOutcome};

/// Busy flags for containers with an operation in flight
#[derive(Debug, Clone, Default)]
pub struct ContainerLocks {
    busy: Arc<Mutex<HashSet<String>>>,
}

impl ContainerLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks every given container busy, or none of them
    pub fn try_acquire(&self, container_ids: &[&str]) -> Result<ContainerLease> {
        let mut busy = self.busy.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(taken) = container_ids.iter().find(|id| busy.contains(**id)) {
            return Err(OrderingError::ContainerBusy(taken.to_string()));
        }

        let mut ids: Vec<String> = Vec::with_capacity(container_ids.len());
        for id in container_ids {
            if busy.insert(id.to_string()) {
                ids.push(id.to_string());
            }
        }

        Ok(ContainerLease {
            busy: Arc::clone(&self.busy),
            ids,
        })
    }

    pub fn is_busy(&self, container_id: &str) -> bool {
        self.busy
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(container_id)
    }
}

/// Releases its containers when dropped, including when the owning future
/// is cancelled
#[derive(Debug)]
pub struct ContainerLease {
    busy: Arc<Mutex<HashSet<String>>>,
    ids: Vec<String>,
}

impl Drop for ContainerLease {
    fn drop(&mut self) {
        let mut busy = self.busy.lock().unwrap_or_else(PoisonError::into_inner);
        for id in &self.ids {
            busy.remove(id);
        }
    }
}

/// Runs a gateway call under `timeout`; expiry is reported as a gateway failure
pub(crate) async fn with_timeout<F, R>(timeout: Duration, operation: &str, call: F) -> Result<R>
where
    F: Future<Output = Result<R>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(OrderingError::GatewayFailure(format!(
            "{} timed out after {}ms",
            operation,
            timeout.as_millis()
        ))),
    }
}
