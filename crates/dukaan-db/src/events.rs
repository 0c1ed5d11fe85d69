//! # Collection Change Events
//!
//! Broadcast channel carrying "this collection changed" notifications.
//!
//! ## Why a Change Bus?
//! List screens (inventory, sale history, claims) refetch when the
//! underlying collection mutates. Rather than having every screen poll,
//! repositories publish a [`ChangeEvent`] after each successful write and
//! interested parties subscribe:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Change Event Flow                                  │
//! │                                                                         │
//! │  SaleRepository::insert(...)                                           │
//! │       │ success                                                         │
//! │       ▼                                                                 │
//! │  ChangeBus::publish(ChangeEvent { Sales, Created, id })                │
//! │       │                                                                 │
//! │       ├──► subscriber 1 (sale history view)  → refetch list            │
//! │       ├──► subscriber 2 (dashboard totals)   → recompute               │
//! │       └──► (no subscribers? event is dropped - publishing never fails) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Events carry identity only (collection, kind, document id), never the
//! document body. Subscribers refetch what they need, so a lagged receiver
//! loses freshness but never correctness.

use tokio::sync::broadcast;
use tracing::debug;

/// Buffered events per subscriber before the oldest is dropped.
const BUS_CAPACITY: usize = 256;

// =============================================================================
// Event Types
// =============================================================================

/// A mutable collection in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Items,
    Sales,
    Prizes,
    Claims,
    Users,
}

/// What happened to the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

/// A single collection mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub collection: Collection,
    pub kind: ChangeKind,
    /// Document id of the affected record.
    pub id: String,
}

// =============================================================================
// Change Bus
// =============================================================================

/// Fan-out channel for collection change events.
///
/// Cloning is cheap; all clones publish into the same channel.
#[derive(Debug, Clone)]
pub struct ChangeBus {
    tx: broadcast::Sender<ChangeEvent>,
}

impl ChangeBus {
    /// Creates a new bus with the default capacity.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BUS_CAPACITY);
        ChangeBus { tx }
    }

    /// Publishes a change event.
    ///
    /// A send error only means there are no subscribers right now, which
    /// is normal (e.g. during seeding), so it is ignored.
    pub fn publish(&self, collection: Collection, kind: ChangeKind, id: &str) {
        let event = ChangeEvent {
            collection,
            kind,
            id: id.to_string(),
        };
        debug!(?event, "Publishing change event");
        let _ = self.tx.send(event);
    }

    /// Subscribes to all future change events.
    ///
    /// Receivers that fall more than the bus capacity behind see a
    /// `Lagged` error and should refetch instead of replaying.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        ChangeBus::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
