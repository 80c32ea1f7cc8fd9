use crate::{
    config::OrderingConfig,
    coordinator::{with_timeout, ContainerLocks, ReorderCoordinator, ReorderOutcome},
    domain::{OrderedCollection, OrderedItem},
    error::{OrderingError, Result},
    gateway::TransferGateway,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// How a transfer request ended when it did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    /// Both collections belong to the same container, so the request was
    /// handled as a reorder
    Reordered(ReorderOutcome),
    /// The item now lives in the target collection at `target_index`
    Transferred {
        item_id: String,
        target_index: usize,
    },
}

/// Cross-container move: the backend confirms first, local collections are
/// only touched once it has
///
/// Undoing a two-collection splice is easy to get wrong, so unlike
/// [`ReorderCoordinator`] nothing is applied optimistically.
pub struct TransferCoordinator<G: ?Sized> {
    reorder: ReorderCoordinator<G>,
}

impl<G: ?Sized> Clone for TransferCoordinator<G> {
    fn clone(&self) -> Self {
        Self {
            reorder: self.reorder.clone(),
        }
    }
}

impl<G: ?Sized> TransferCoordinator<G> {
    pub fn new(gateway: Arc<G>, config: &OrderingConfig) -> Self {
        Self {
            reorder: ReorderCoordinator::new(gateway, config),
        }
    }

    /// Builds on an existing reorder coordinator, sharing its gateway and locks
    pub fn from_reorder(reorder: ReorderCoordinator<G>) -> Self {
        Self { reorder }
    }

    pub fn with_locks(mut self, locks: ContainerLocks) -> Self {
        self.reorder = self.reorder.with_locks(locks);
        self
    }

    pub fn locks(&self) -> &ContainerLocks {
        self.reorder.locks()
    }

    pub fn reorder_coordinator(&self) -> &ReorderCoordinator<G> {
        &self.reorder
    }

    /// Moves the item at `source_index` of `source` to `target_index` of `target`
    ///
    /// `target_index` is clamped to `[0, target.len()]` before it is sent.
    /// On failure both collections are left exactly as they were; the backend
    /// may still have applied part of the move, so callers should reload
    /// both containers when that matters.
    pub async fn transfer<T>(
        &self,
        source: &mut OrderedCollection<T>,
        target: &mut OrderedCollection<T>,
        source_index: usize,
        target_index: usize,
    ) -> Result<TransferOutcome>
    where
        T: OrderedItem,
        G: TransferGateway<T>,
    {
        if source.container_id() == target.container_id() {
            debug!(
                container_id = source.container_id(),
                "Transfer within one container, delegating to reorder"
            );
            let outcome = self
                .reorder
                .reorder(source, source_index, target_index)
                .await?;
            return Ok(TransferOutcome::Reordered(outcome));
        }

        let item_id = source
            .get(source_index)
            .map(|item| item.id().to_string())
            .ok_or_else(|| {
                OrderingError::NotFound(format!(
                    "index {} in {}",
                    source_index,
                    source.container_id()
                ))
            })?;
        let target_index = target_index.min(target.len());

        let _lease = self
            .reorder
            .locks()
            .try_acquire(&[source.container_id(), target.container_id()])?;

        debug!(
            %item_id,
            source_container = source.container_id(),
            target_container = target.container_id(),
            target_index,
            "Requesting transfer"
        );
        let call = self
            .reorder
            .gateway()
            .move_item(&item_id, target.container_id(), target_index);
        if let Err(err) = with_timeout(self.reorder.timeout(), "move_item", call).await {
            warn!(
                %item_id,
                source_container = source.container_id(),
                target_container = target.container_id(),
                error = %err,
                "Transfer rejected"
            );
            return Err(err);
        }

        let item = source.remove_at(source_index)?;
        let target_index = target.insert_at(item, target_index);

        Ok(TransferOutcome::Transferred {
            item_id,
            target_index,
        })
    }
}
