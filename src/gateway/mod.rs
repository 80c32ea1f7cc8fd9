use crate::{
    domain::{OrderedItem, PositionUpdate},
    error::Result,
};
use async_trait::async_trait;

pub mod http;
pub mod memory;

pub use http::HttpGateway;
pub use memory::{MemoryBoardGateway, MemoryGateway};

/// Remote authority for the order of items inside a container
#[async_trait]
pub trait RemoteOrderingGateway<T: OrderedItem>: Send + Sync {
    /// Loads the items of a container, in whatever order the backend keeps them
    async fn fetch_items(&self, container_id: &str) -> Result<Vec<T>>;

    /// Persists the full order of a container as one batch
    async fn persist_order(&self, container_id: &str, updates: &[PositionUpdate]) -> Result<()>;
}

/// Remote authority that can also move an item into another container
#[async_trait]
pub trait TransferGateway<T: OrderedItem>: RemoteOrderingGateway<T> {
    /// Moves an item to `target_index` of another container and returns the
    /// item as the backend now stores it
    async fn move_item(
        &self,
        item_id: &str,
        target_container_id: &str,
        target_index: usize,
    ) -> Result<T>;
}
