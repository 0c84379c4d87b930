//! Authoritative fleet state
//!
//! The store keeps the current `FleetSnapshot` and hands every committed
//! snapshot to its subscribers. Snapshots are copy-on-write: a commit builds a
//! new map, so anyone holding an older snapshot keeps a consistent view.

use futures::Stream;
use log::{debug, warn};
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockWriteGuard};
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::mpsc;

use super::types::{clamp_battery, VehicleId};
use super::vehicle::VehicleRecord;

/// Errors raised by the fleet store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("duplicate vehicle identifier: {0}")]
    DuplicateIdentifier(VehicleId),
}

/// Immutable point-in-time view of the fleet
///
/// Cloning only copies a reference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FleetSnapshot {
    vehicles: Arc<BTreeMap<VehicleId, VehicleRecord>>,
}

impl FleetSnapshot {
    pub fn get(&self, id: VehicleId) -> Option<&VehicleRecord> {
        self.vehicles.get(&id)
    }

    pub fn contains(&self, id: VehicleId) -> bool {
        self.vehicles.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    /// Records in ascending id order
    pub fn iter(&self) -> btree_map::Values<'_, VehicleId, VehicleRecord> {
        self.vehicles.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = VehicleId> + '_ {
        self.vehicles.keys().copied()
    }

    /// Whether both snapshots share the same underlying map
    pub fn ptr_eq(&self, other: &FleetSnapshot) -> bool {
        Arc::ptr_eq(&self.vehicles, &other.vehicles)
    }
}

impl<'a> IntoIterator for &'a FleetSnapshot {
    type Item = &'a VehicleRecord;
    type IntoIter = btree_map::Values<'a, VehicleId, VehicleRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl serde::Serialize for FleetSnapshot {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.vehicles.values())
    }
}

/// Ordered stream of committed snapshots
///
/// Each subscription gets its own unbounded queue, so a slow reader never holds
/// up the store or other subscribers.
#[derive(Debug)]
pub struct Subscription {
    receiver: mpsc::UnboundedReceiver<FleetSnapshot>,
    closed: bool,
}

impl Subscription {
    /// Wait for the next committed snapshot
    ///
    /// Returns `None` once the subscription is closed or the store is gone.
    pub async fn recv(&mut self) -> Option<FleetSnapshot> {
        if self.closed {
            return None;
        }
        self.receiver.recv().await
    }

    /// Next snapshot if one is already queued
    pub fn try_recv(&mut self) -> Option<FleetSnapshot> {
        if self.closed {
            return None;
        }
        self.receiver.try_recv().ok()
    }

    /// Stop delivery to this subscription
    ///
    /// Anything still queued is dropped. Closing again is a no-op.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.receiver.close();
        while self.receiver.try_recv().is_ok() {}
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Stream for Subscription {
    type Item = FleetSnapshot;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.closed {
            return Poll::Ready(None);
        }
        self.receiver.poll_recv(cx)
    }
}

/// Holds the canonical fleet snapshot
#[derive(Debug, Default)]
pub struct FleetStore {
    current: RwLock<FleetSnapshot>,
    /// Held for the whole of a commit, which serializes writers and keeps
    /// notifications in commit order.
    subscribers: Mutex<Vec<mpsc::UnboundedSender<FleetSnapshot>>>,
}

impl FleetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole fleet with `records`
    ///
    /// Fails without touching the current snapshot if two records share an id.
    pub fn initialize(&self, records: Vec<VehicleRecord>) -> Result<(), StoreError> {
        let mut vehicles = BTreeMap::new();
        for record in records {
            let id = record.id;
            if vehicles.insert(id, record).is_some() {
                warn!("Rejected fleet initialization: vehicle {} appears twice", id);
                return Err(StoreError::DuplicateIdentifier(id));
            }
        }

        let mut subscribers = self.lock_subscribers();
        let snapshot = FleetSnapshot {
            vehicles: Arc::new(vehicles),
        };
        *self.write_current() = snapshot.clone();
        debug!("Fleet initialized with {} vehicles", snapshot.len());
        Self::publish(&mut subscribers, snapshot);
        Ok(())
    }

    /// Merge one record into the fleet
    ///
    /// An unknown id is stored as given. A known id takes the incoming record
    /// with its battery clamped to the valid range.
    pub fn apply_update(&self, record: VehicleRecord) {
        let mut subscribers = self.lock_subscribers();

        // Readers only wait for the pointer swap, never for the map copy
        let mut next = self.snapshot();
        let vehicles = Arc::make_mut(&mut next.vehicles);
        let merged = if vehicles.contains_key(&record.id) {
            VehicleRecord {
                battery: clamp_battery(record.battery),
                ..record
            }
        } else {
            record
        };
        vehicles.insert(merged.id, merged);

        *self.write_current() = next.clone();
        Self::publish(&mut subscribers, next);
    }

    /// The current snapshot
    pub fn snapshot(&self) -> FleetSnapshot {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Receive every snapshot committed from now on
    pub fn subscribe(&self) -> Subscription {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.lock_subscribers().push(sender);
        Subscription {
            receiver,
            closed: false,
        }
    }

    /// Number of subscriptions still accepting snapshots
    pub fn subscriber_count(&self) -> usize {
        let mut subscribers = self.lock_subscribers();
        subscribers.retain(|sender| !sender.is_closed());
        subscribers.len()
    }

    fn publish(subscribers: &mut Vec<mpsc::UnboundedSender<FleetSnapshot>>, snapshot: FleetSnapshot) {
        subscribers.retain(|sender| sender.send(snapshot.clone()).is_ok());
    }

    fn lock_subscribers(&self) -> MutexGuard<'_, Vec<mpsc::UnboundedSender<FleetSnapshot>>> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_current(&self) -> RwLockWriteGuard<'_, FleetSnapshot> {
        self.current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
