use crate::{
    domain::{
        sorting::{renumber, sort_by_position},
        Card, List, OrderedItem, PositionUpdate,
    },
    error::{OrderingError, Result},
    gateway::{RemoteOrderingGateway, TransferGateway},
};
use async_trait::async_trait;
use std::{
    collections::{HashMap, VecDeque},
    time::Duration,
};
use tokio::sync::Mutex;

/// A call received by [`MemoryGateway`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    Fetch {
        container_id: String,
    },
    PersistOrder {
        container_id: String,
        updates: Vec<PositionUpdate>,
    },
    MoveItem {
        item_id: String,
        target_container_id: String,
        target_index: usize,
    },
}

struct State<T> {
    containers: HashMap<String, Vec<T>>,
    calls: Vec<GatewayCall>,
    pending_failures: VecDeque<String>,
    latency: Duration,
}

/// In-memory backend that behaves like the board server
///
/// Useful for offline demos and for exercising rollback paths: failures can
/// be queued with [`MemoryGateway::fail_next`] and every call is recorded.
pub struct MemoryGateway<T> {
    state: Mutex<State<T>>,
}

impl<T: OrderedItem> MemoryGateway<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                containers: HashMap::new(),
                calls: Vec::new(),
                pending_failures: VecDeque::new(),
                latency: Duration::ZERO,
            }),
        }
    }

    /// Stores items for a container exactly as given (no sorting)
    pub async fn seed(&self, container_id: impl Into<String>, items: Vec<T>) {
        let mut state = self.state.lock().await;
        state.containers.insert(container_id.into(), items);
    }

    /// Current server-side items of a container, sorted by position
    pub async fn items(&self, container_id: &str) -> Vec<T> {
        let state = self.state.lock().await;
        let mut items = state
            .containers
            .get(container_id)
            .cloned()
            .unwrap_or_default();
        sort_by_position(&mut items);
        items
    }

    /// Makes the next call fail with the given reason
    pub async fn fail_next(&self, reason: impl Into<String>) {
        self.state
            .lock()
            .await
            .pending_failures
            .push_back(reason.into());
    }

    /// Delays every call by `latency` before it is handled
    pub async fn set_latency(&self, latency: Duration) {
        self.state.lock().await.latency = latency;
    }

    pub async fn calls(&self) -> Vec<GatewayCall> {
        self.state.lock().await.calls.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.state.lock().await.calls.len()
    }

    /// Records the call, waits out the latency and pops a queued failure
    async fn begin(&self, call: GatewayCall) -> Result<()> {
        let latency = {
            let mut state = self.state.lock().await;
            state.calls.push(call);
            state.latency
        };

        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        match self.state.lock().await.pending_failures.pop_front() {
            Some(reason) => Err(OrderingError::GatewayFailure(reason)),
            None => Ok(()),
        }
    }
}

impl<T: OrderedItem> Default for MemoryGateway<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: OrderedItem> RemoteOrderingGateway<T> for MemoryGateway<T> {
    async fn fetch_items(&self, container_id: &str) -> Result<Vec<T>> {
        self.begin(GatewayCall::Fetch {
            container_id: container_id.to_string(),
        })
        .await?;

        let state = self.state.lock().await;
        Ok(state
            .containers
            .get(container_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn persist_order(&self, container_id: &str, updates: &[PositionUpdate]) -> Result<()> {
        self.begin(GatewayCall::PersistOrder {
            container_id: container_id.to_string(),
            updates: updates.to_vec(),
        })
        .await?;

        let mut state = self.state.lock().await;
        let items = state.containers.get_mut(container_id).ok_or_else(|| {
            OrderingError::GatewayFailure(format!("Unknown container {}", container_id))
        })?;

        // Validate the whole batch before touching anything
        if let Some(unknown) = updates
            .iter()
            .find(|update| !items.iter().any(|item| item.id() == update.id))
        {
            return Err(OrderingError::GatewayFailure(format!(
                "Item {} does not belong to {}",
                unknown.id, container_id
            )));
        }

        for update in updates {
            if let Some(item) = items.iter_mut().find(|item| item.id() == update.id) {
                item.set_position(update.new_position);
            }
        }
        sort_by_position(items);
        Ok(())
    }
}

#[async_trait]
impl<T: OrderedItem> TransferGateway<T> for MemoryGateway<T> {
    async fn move_item(
        &self,
        item_id: &str,
        target_container_id: &str,
        target_index: usize,
    ) -> Result<T> {
        self.begin(GatewayCall::MoveItem {
            item_id: item_id.to_string(),
            target_container_id: target_container_id.to_string(),
            target_index,
        })
        .await?;

        let mut state = self.state.lock().await;

        let mut moved = None;
        for items in state.containers.values_mut() {
            sort_by_position(items);
            if let Some(index) = items.iter().position(|item| item.id() == item_id) {
                moved = Some(items.remove(index));
                renumber(items);
                break;
            }
        }
        let mut item = moved
            .ok_or_else(|| OrderingError::GatewayFailure(format!("Unknown item {}", item_id)))?;

        item.set_container_id(target_container_id);
        let target = state
            .containers
            .entry(target_container_id.to_string())
            .or_default();
        sort_by_position(target);
        let index = target_index.min(target.len());
        target.insert(index, item.clone());
        renumber(target);

        item.set_position(index as u32);
        Ok(item)
    }
}

/// In-memory backend for a whole board: lists per board, cards per list
#[derive(Default)]
pub struct MemoryBoardGateway {
    pub lists: MemoryGateway<List>,
    pub cards: MemoryGateway<Card>,
}

impl MemoryBoardGateway {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RemoteOrderingGateway<List> for MemoryBoardGateway {
    async fn fetch_items(&self, board_id: &str) -> Result<Vec<List>> {
        self.lists.fetch_items(board_id).await
    }

    async fn persist_order(&self, board_id: &str, updates: &[PositionUpdate]) -> Result<()> {
        self.lists.persist_order(board_id, updates).await
    }
}

#[async_trait]
impl RemoteOrderingGateway<Card> for MemoryBoardGateway {
    async fn fetch_items(&self, list_id: &str) -> Result<Vec<Card>> {
        self.cards.fetch_items(list_id).await
    }

    async fn persist_order(&self, list_id: &str, updates: &[PositionUpdate]) -> Result<()> {
        self.cards.persist_order(list_id, updates).await
    }
}

#[async_trait]
impl TransferGateway<Card> for MemoryBoardGateway {
    async fn move_item(
        &self,
        card_id: &str,
        target_list_id: &str,
        target_index: usize,
    ) -> Result<Card> {
        self.cards
            .move_item(card_id, target_list_id, target_index)
            .await
    }
}
