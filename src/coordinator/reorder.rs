use crate::{
    config::OrderingConfig,
    coordinator::{with_timeout, ContainerLocks},
    domain::{OrderedCollection, OrderedItem},
    error::{OrderingError, Result},
    gateway::RemoteOrderingGateway,
};
use std::{sync::Arc, time::Duration};
use tracing::{debug, warn};

/// How a reorder request ended when it did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderOutcome {
    /// Source and destination were the same slot; nothing was sent
    Unchanged,
    /// The new order was applied locally and accepted by the backend
    Confirmed,
}

/// Same-container reorder: optimistic local update, remote confirmation,
/// rollback to the pre-drag snapshot on failure
pub struct ReorderCoordinator<G: ?Sized> {
    gateway: Arc<G>,
    locks: ContainerLocks,
    timeout: Duration,
}

impl<G: ?Sized> Clone for ReorderCoordinator<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            locks: self.locks.clone(),
            timeout: self.timeout,
        }
    }
}

impl<G: ?Sized> ReorderCoordinator<G> {
    pub fn new(gateway: Arc<G>, config: &OrderingConfig) -> Self {
        Self {
            gateway,
            locks: ContainerLocks::new(),
            timeout: config.request_timeout,
        }
    }

    /// Shares busy flags with other coordinators
    pub fn with_locks(mut self, locks: ContainerLocks) -> Self {
        self.locks = locks;
        self
    }

    pub fn locks(&self) -> &ContainerLocks {
        &self.locks
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub(crate) fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Moves the item at `from` to `to` and persists the new order
    ///
    /// Index errors and a busy container abort before anything changes. If
    /// the backend rejects the batch, or does not answer within the timeout,
    /// the collection is restored to exactly what it was before the call and
    /// the gateway failure is returned; callers usually re-fetch afterwards.
    pub async fn reorder<T>(
        &self,
        collection: &mut OrderedCollection<T>,
        from: usize,
        to: usize,
    ) -> Result<ReorderOutcome>
    where
        T: OrderedItem,
        G: RemoteOrderingGateway<T>,
    {
        let len = collection.len();
        for index in [from, to] {
            if index >= len {
                return Err(OrderingError::IndexOutOfRange { index, len });
            }
        }
        if from == to {
            return Ok(ReorderOutcome::Unchanged);
        }

        let container_id = collection.container_id().to_string();
        let _lease = self.locks.try_acquire(&[container_id.as_str()])?;

        let snapshot = collection.snapshot();
        collection.reorder(from, to)?;
        let updates = collection.position_updates();
        debug!(%container_id, from, to, items = updates.len(), "Persisting reorder");

        let call = self.gateway.persist_order(&container_id, &updates);
        match with_timeout(self.timeout, "persist_order", call).await {
            Ok(()) => Ok(ReorderOutcome::Confirmed),
            Err(err) => {
                warn!(%container_id, from, to, error = %err, "Reorder rejected, rolling back");
                collection.restore(snapshot);
                Err(err)
            }
        }
    }
}
