//! Append-only event log.
//!
//! The log is a cheaply cloneable handle. Exactly one writer (the scheduler)
//! appends; any number of readers poll with [`EventLog::events_since`] or
//! wait on [`EventLog::subscribe`]. The lock is held only while copying, so
//! readers never wait on a turn in progress.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::info;

use crate::event::{Event, EventId, PendingEvent};

/// Shared, append-only event log.
#[derive(Clone, Debug)]
pub struct EventLog {
    events: Arc<RwLock<Vec<Event>>>,
    latest: Arc<watch::Sender<EventId>>,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        let (latest, _) = watch::channel(0);
        Self {
            events: Arc::new(RwLock::new(Vec::new())),
            latest: Arc::new(latest),
        }
    }

    /// Appends an event, assigning the next id.
    pub fn publish(&self, pending: PendingEvent) -> Event {
        let event = {
            let mut events = self.events.write();
            let id = events.len() as EventId + 1;
            let event = Event::publish(id, pending);
            events.push(event.clone());
            event
        };
        self.latest.send_replace(event.id);
        event
    }

    /// Returns every event with an id greater than `after`, in order.
    ///
    /// `events_since(0)` returns the whole log.
    #[must_use]
    pub fn events_since(&self, after: EventId) -> Vec<Event> {
        let events = self.events.read();
        let start = usize::try_from(after).map_or(events.len(), |a| a.min(events.len()));
        events[start..].to_vec()
    }

    /// Returns one event.
    #[must_use]
    pub fn get(&self, id: EventId) -> Option<Event> {
        let index = usize::try_from(id.checked_sub(1)?).ok()?;
        self.events.read().get(index).cloned()
    }

    /// Returns the most recent event id, or 0 if the log is empty.
    #[must_use]
    pub fn latest_id(&self) -> EventId {
        self.events.read().len() as EventId
    }

    /// Returns the number of events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if no events have been published.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Clears the log. The next event published has id 1.
    pub fn reset(&self) {
        let dropped = {
            let mut events = self.events.write();
            let n = events.len();
            events.clear();
            n
        };
        self.latest.send_replace(0);
        info!(dropped, "event log reset");
    }

    /// Subscribes to the latest event id. The receiver wakes on every
    /// publish and on reset (when the id drops to 0).
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<EventId> {
        self.latest.subscribe()
    }
}
