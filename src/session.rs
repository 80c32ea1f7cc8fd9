//! Board-level drag-and-drop handling
//!
//! [`BoardSession`] holds what a board view shows: the board's lists and the
//! cards of every list. Drops are routed to the reorder or transfer
//! coordinator depending on whether the card stays in its list. When the
//! backend rejects a change the affected containers are fetched again, since
//! a local rollback cannot see changes made by other sessions.

use crate::{
    config::OrderingConfig,
    coordinator::{
        with_timeout, ContainerLocks, ReorderCoordinator, ReorderOutcome, TransferCoordinator,
        TransferOutcome,
    },
    domain::{Card, List, OrderedCollection},
    error::{OrderingError, Result},
    gateway::{RemoteOrderingGateway, TransferGateway},
};
use std::{collections::HashMap, sync::Arc};
use tracing::{debug, warn};

/// A card dropped at `current_index` of `target_list_id`, picked up at
/// `previous_index` of `source_list_id`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardDrop {
    pub source_list_id: String,
    pub previous_index: usize,
    pub target_list_id: String,
    pub current_index: usize,
}

impl CardDrop {
    pub fn within(list_id: impl Into<String>, previous_index: usize, current_index: usize) -> Self {
        let list_id = list_id.into();
        Self {
            source_list_id: list_id.clone(),
            previous_index,
            target_list_id: list_id,
            current_index,
        }
    }

    pub fn between(
        source_list_id: impl Into<String>,
        previous_index: usize,
        target_list_id: impl Into<String>,
        current_index: usize,
    ) -> Self {
        Self {
            source_list_id: source_list_id.into(),
            previous_index,
            target_list_id: target_list_id.into(),
            current_index,
        }
    }
}

/// Result of a confirmed drop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    Unchanged,
    Reordered,
    Transferred { card_id: String, target_index: usize },
}

impl From<ReorderOutcome> for DropOutcome {
    fn from(outcome: ReorderOutcome) -> Self {
        match outcome {
            ReorderOutcome::Unchanged => Self::Unchanged,
            ReorderOutcome::Confirmed => Self::Reordered,
        }
    }
}

impl From<TransferOutcome> for DropOutcome {
    fn from(outcome: TransferOutcome) -> Self {
        match outcome {
            TransferOutcome::Reordered(outcome) => outcome.into(),
            TransferOutcome::Transferred {
                item_id,
                target_index,
            } => Self::Transferred {
                card_id: item_id,
                target_index,
            },
        }
    }
}

/// Lists and cards of one board, kept in sync with the backend
pub struct BoardSession<G: ?Sized> {
    board_id: String,
    gateway: Arc<G>,
    lists: OrderedCollection<List>,
    cards: HashMap<String, OrderedCollection<Card>>,
    list_coordinator: ReorderCoordinator<G>,
    card_coordinator: TransferCoordinator<G>,
}

impl<G> BoardSession<G>
where
    G: RemoteOrderingGateway<List> + TransferGateway<Card> + ?Sized,
{
    pub fn new(board_id: impl Into<String>, gateway: Arc<G>, config: &OrderingConfig) -> Self {
        let board_id = board_id.into();
        // Board ids and list ids are separate namespaces, so each coordinator
        // keeps its own busy flags
        Self {
            lists: OrderedCollection::new(board_id.clone()),
            board_id,
            cards: HashMap::new(),
            list_coordinator: ReorderCoordinator::new(Arc::clone(&gateway), config)
                .with_locks(ContainerLocks::new()),
            card_coordinator: TransferCoordinator::new(Arc::clone(&gateway), config)
                .with_locks(ContainerLocks::new()),
            gateway,
        }
    }

    pub fn board_id(&self) -> &str {
        &self.board_id
    }

    pub fn lists(&self) -> &OrderedCollection<List> {
        &self.lists
    }

    pub fn cards(&self, list_id: &str) -> Option<&OrderedCollection<Card>> {
        self.cards.get(list_id)
    }

    /// Busy flags of the board, held while a list reorder is in flight
    pub fn list_locks(&self) -> &ContainerLocks {
        self.list_coordinator.locks()
    }

    /// Busy flags of the lists, held while a card reorder or transfer is in flight
    pub fn card_locks(&self) -> &ContainerLocks {
        self.card_coordinator.locks()
    }

    /// Fetches the board's lists, then the cards of each list
    pub async fn load(&mut self) -> Result<()> {
        self.cards.clear();
        self.reload_lists().await
    }

    /// Replaces the lists with the backend's
    ///
    /// Cards of lists that are gone are dropped; lists seen for the first
    /// time get their cards fetched.
    pub async fn reload_lists(&mut self) -> Result<()> {
        let call = RemoteOrderingGateway::<List>::fetch_items(&*self.gateway, &self.board_id);
        let lists = with_timeout(self.list_coordinator.timeout(), "fetch lists", call).await?;
        debug!(board_id = %self.board_id, count = lists.len(), "Loaded lists");

        self.lists.replace_all(lists);
        let lists = &self.lists;
        self.cards.retain(|list_id, _| lists.find(list_id).is_some());

        let new_list_ids: Vec<String> = self
            .lists
            .iter()
            .filter(|list| !self.cards.contains_key(&list.id))
            .map(|list| list.id.clone())
            .collect();
        for list_id in new_list_ids {
            self.reload_cards(&list_id).await?;
        }
        Ok(())
    }

    pub async fn reload_cards(&mut self, list_id: &str) -> Result<()> {
        if self.lists.find(list_id).is_none() {
            return Err(OrderingError::NotFound(format!(
                "list {} on board {}",
                list_id, self.board_id
            )));
        }

        let call = RemoteOrderingGateway::<Card>::fetch_items(&*self.gateway, list_id);
        let cards = with_timeout(self.list_coordinator.timeout(), "fetch cards", call).await?;
        debug!(%list_id, count = cards.len(), "Loaded cards");

        self.cards
            .entry(list_id.to_string())
            .or_insert_with(|| OrderedCollection::new(list_id))
            .replace_all(cards);
        Ok(())
    }

    /// Handles a list dropped at a new slot on the board
    pub async fn drop_list(
        &mut self,
        previous_index: usize,
        current_index: usize,
    ) -> Result<DropOutcome> {
        let result = self
            .list_coordinator
            .reorder(&mut self.lists, previous_index, current_index)
            .await;

        match result {
            Ok(outcome) => Ok(outcome.into()),
            Err(err) if err.is_gateway_failure() => {
                if let Err(reload_err) = self.reload_lists().await {
                    warn!(
                        board_id = %self.board_id,
                        error = %reload_err,
                        "Reload after failed list reorder failed"
                    );
                }
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Handles a card dropped in the same or another list
    pub async fn drop_card(&mut self, card_drop: CardDrop) -> Result<DropOutcome> {
        let CardDrop {
            source_list_id,
            previous_index,
            target_list_id,
            current_index,
        } = card_drop;

        let result = if source_list_id == target_list_id {
            let cards = self
                .cards
                .get_mut(&source_list_id)
                .ok_or_else(|| missing_list(&source_list_id))?;
            self.card_coordinator
                .reorder_coordinator()
                .reorder(cards, previous_index, current_index)
                .await
                .map(DropOutcome::from)
        } else {
            let (source, target) = card_pair(&mut self.cards, &source_list_id, &target_list_id)?;
            self.card_coordinator
                .transfer(source, target, previous_index, current_index)
                .await
                .map(DropOutcome::from)
        };

        match result {
            Err(err) if err.is_gateway_failure() => {
                self.recover_lists(&[source_list_id.as_str(), target_list_id.as_str()])
                    .await;
                Err(err)
            }
            other => other,
        }
    }

    /// Replaces a list in place after it was edited elsewhere
    pub fn list_updated(&mut self, list: List) -> Result<()> {
        self.lists.update(list)
    }

    /// Position a new list on this board should be created with
    pub fn next_list_position(&self) -> u32 {
        self.lists.next_position()
    }

    /// Replaces a card in its list after it was edited elsewhere
    pub fn card_updated(&mut self, card: Card) -> Result<()> {
        self.cards
            .get_mut(&card.list_id)
            .ok_or_else(|| missing_list(&card.list_id))?
            .update(card)
    }

    /// Appends a card the backend just created; returns its index
    pub fn add_card(&mut self, card: Card) -> Result<usize> {
        let cards = self
            .cards
            .get_mut(&card.list_id)
            .ok_or_else(|| missing_list(&card.list_id))?;
        Ok(cards.push(card))
    }

    /// Position a new card in `list_id` should be created with
    pub fn next_card_position(&self, list_id: &str) -> Option<u32> {
        self.cards.get(list_id).map(|cards| cards.next_position())
    }

    async fn recover_lists(&mut self, list_ids: &[&str]) {
        let mut seen: Vec<&str> = Vec::with_capacity(list_ids.len());
        for &list_id in list_ids {
            if seen.contains(&list_id) {
                continue;
            }
            seen.push(list_id);

            if let Err(err) = self.reload_cards(list_id).await {
                warn!(%list_id, error = %err, "Reload after failed card drop failed");
            }
        }
    }
}

/// Borrows two different lists' cards mutably at once
fn card_pair<'a>(
    cards: &'a mut HashMap<String, OrderedCollection<Card>>,
    source_list_id: &str,
    target_list_id: &str,
) -> Result<(
    &'a mut OrderedCollection<Card>,
    &'a mut OrderedCollection<Card>,
)> {
    let mut source = None;
    let mut target = None;
    for (list_id, collection) in cards.iter_mut() {
        if list_id == source_list_id {
            source = Some(collection);
        } else if list_id == target_list_id {
            target = Some(collection);
        }
    }

    match (source, target) {
        (Some(source), Some(target)) => Ok((source, target)),
        (None, _) => Err(missing_list(source_list_id)),
        (_, None) => Err(missing_list(target_list_id)),
    }
}

fn missing_list(list_id: &str) -> OrderingError {
    OrderingError::NotFound(format!("cards of list {}", list_id))
}
