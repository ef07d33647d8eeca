//! Pub/sub for the persistent multi-table harness, parallel to
//! [`crate::events::EventBus`] but keyed by table id instead of practice
//! session id and typed to [`TableEvent`] instead of [`crate::events::GameEvent`].
//!
//! Kept as a separate bus rather than generalizing `EventBus<T>` because the
//! existing bus is already wired through `session.rs`/`sse.rs`/`server.rs`
//! with `GameEvent` baked into its type; duplicating the (small) pattern
//! here is cheaper and safer than threading a generic through code that
//! already works.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use holdem_engine::cards::Card;
use holdem_engine::game::Phase;
use holdem_engine::logger::Street;
use holdem_engine::player::{PlayerAction, PlayerId};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

const TABLE_EVENT_CHANNEL_BUFFER: usize = 1000;

pub type TableEventSender = mpsc::Sender<TableEvent>;
pub type TableEventReceiver = mpsc::Receiver<TableEvent>;

pub struct TableEventSubscription {
    bus: TableEventBus,
    table_id: u64,
    subscriber_id: usize,
    pub receiver: TableEventReceiver,
}

impl TableEventSubscription {
    pub fn receiver(&mut self) -> &mut TableEventReceiver {
        &mut self.receiver
    }
}

impl Drop for TableEventSubscription {
    fn drop(&mut self) {
        self.bus.unsubscribe(self.table_id, self.subscriber_id);
    }
}

#[derive(Debug, Clone, Default)]
pub struct TableEventBus {
    inner: Arc<TableEventBusInner>,
}

#[derive(Debug, Default)]
struct TableEventBusInner {
    subscribers: RwLock<HashMap<u64, Vec<(usize, TableEventSender)>>>,
    next_id: AtomicUsize,
}

impl TableEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, table_id: u64) -> TableEventSubscription {
        let (tx, rx) = mpsc::channel(TABLE_EVENT_CHANNEL_BUFFER);
        let subscriber_id = self.inner.next_id.fetch_add(1, Ordering::AcqRel);
        {
            let mut guard = self
                .inner
                .subscribers
                .write()
                .expect("table event subscriber lock poisoned");
            guard.entry(table_id).or_default().push((subscriber_id, tx));
        }
        tracing::info!(table_id, subscriber_id, "client subscribed to table events");
        TableEventSubscription {
            bus: self.clone(),
            table_id,
            subscriber_id,
            receiver: rx,
        }
    }

    pub fn broadcast(&self, table_id: u64, event: TableEvent) {
        tracing::debug!(table_id, event = ?event, "broadcasting table event");
        let subscribers = {
            let guard = self
                .inner
                .subscribers
                .read()
                .expect("table event subscriber lock poisoned");
            guard.get(&table_id).cloned()
        };
        let Some(list) = subscribers else {
            return;
        };
        let mut failed = Vec::new();
        for (id, sender) in list {
            if sender.try_send(event.clone()).is_err() {
                failed.push(id);
            }
        }
        if !failed.is_empty() {
            self.remove_subscribers(table_id, &failed);
        }
    }

    pub fn unsubscribe(&self, table_id: u64, subscriber_id: usize) {
        self.remove_subscribers(table_id, &[subscriber_id]);
    }

    pub fn drop_table(&self, table_id: u64) {
        let mut guard = self
            .inner
            .subscribers
            .write()
            .expect("table event subscriber lock poisoned");
        guard.remove(&table_id);
    }

    pub fn subscriber_count(&self, table_id: u64) -> usize {
        let guard = self
            .inner
            .subscribers
            .read()
            .expect("table event subscriber lock poisoned");
        guard.get(&table_id).map(|l| l.len()).unwrap_or(0)
    }

    fn remove_subscribers(&self, table_id: u64, ids: &[usize]) {
        let mut guard = self
            .inner
            .subscribers
            .write()
            .expect("table event subscriber lock poisoned");
        if let Some(list) = guard.get_mut(&table_id) {
            list.retain(|(id, _)| !ids.contains(id));
            if list.is_empty() {
                guard.remove(&table_id);
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TableEvent {
    PlayerJoined {
        table_id: u64,
        player_id: PlayerId,
        seat: usize,
    },
    PlayerLeft {
        table_id: u64,
        player_id: PlayerId,
        seat: usize,
    },
    HandStarted {
        table_id: u64,
        hand_id: String,
        dealer_seat: usize,
    },
    CardsDealt {
        table_id: u64,
        player_id: PlayerId,
        cards: Option<[Card; 2]>,
    },
    PhaseChanged {
        table_id: u64,
        phase: Phase,
        board: Vec<Card>,
    },
    PlayerAction {
        table_id: u64,
        player_id: PlayerId,
        street: Street,
        action: PlayerAction,
        is_timeout: bool,
    },
    HandComplete {
        table_id: u64,
        hand_id: String,
        winners: Vec<PlayerId>,
    },
    TableReset {
        table_id: u64,
    },
}
