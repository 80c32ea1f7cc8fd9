//! # Hlavi Ordering
//!
//! Drag-and-drop ordering for Hlavi kanban boards.
//!
//! Lists are ordered within a board and cards within a list, each through an
//! [`OrderedCollection`] whose positions stay `0..len` after every local
//! change. Reordering inside one container is applied optimistically and
//! rolled back if the backend rejects it; moving a card to another list
//! waits for the backend before anything changes locally.
//!
//! The backend is reached through the [`RemoteOrderingGateway`] and
//! [`TransferGateway`] traits, with a REST implementation in
//! [`HttpGateway`] and an in-memory one in [`MemoryGateway`].

pub mod config;
pub mod coordinator;
pub mod domain;
pub mod error;
pub mod gateway;
pub mod session;

// Re-export commonly used types
pub use config::OrderingConfig;
pub use coordinator::{
    ContainerLocks, ReorderCoordinator, ReorderOutcome, TransferCoordinator, TransferOutcome,
};
pub use domain::{Card, List, OrderedCollection, OrderedItem, PositionUpdate};
pub use error::{OrderingError, Result};
pub use gateway::{
    HttpGateway, MemoryBoardGateway, MemoryGateway, RemoteOrderingGateway, TransferGateway,
};
pub use session::{BoardSession, CardDrop, DropOutcome};
