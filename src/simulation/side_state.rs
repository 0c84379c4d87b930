//! Process-local simulation state that never reaches the store
//!
//! The clock owns one `SideState`. The engine only reads it and describes its
//! changes as a `SideDelta`, which the clock applies after each transition.

use std::collections::{BTreeMap, BTreeSet};

use super::types::{Location, VehicleId};

/// Change to the charging set produced by one transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargingChange {
    Unchanged,
    /// The vehicle started a charging cycle
    Enter,
    /// The vehicle finished charging and left the station
    Leave,
}

/// Side-state changes for a single vehicle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SideDelta {
    pub position: Location,
    pub charging: ChargingChange,
}

/// Last-known coordinates and charging membership for the fleet
#[derive(Debug, Clone, Default)]
pub struct SideState {
    positions: BTreeMap<VehicleId, Location>,
    charging: BTreeSet<VehicleId>,
}

impl SideState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self, id: VehicleId) -> Option<Location> {
        self.positions.get(&id).copied()
    }

    pub fn set_position(&mut self, id: VehicleId, position: Location) {
        self.positions.insert(id, position);
    }

    pub fn is_charging(&self, id: VehicleId) -> bool {
        self.charging.contains(&id)
    }

    /// Ids currently in a charging cycle, ascending
    pub fn charging_vehicles(&self) -> impl Iterator<Item = VehicleId> + '_ {
        self.charging.iter().copied()
    }

    pub fn charging_count(&self) -> usize {
        self.charging.len()
    }

    /// Record `id` as part of a charging cycle
    pub fn start_charging(&mut self, id: VehicleId) {
        self.charging.insert(id);
    }

    pub fn stop_charging(&mut self, id: VehicleId) {
        self.charging.remove(&id);
    }

    pub fn apply(&mut self, id: VehicleId, delta: SideDelta) {
        self.set_position(id, delta.position);
        match delta.charging {
            ChargingChange::Unchanged => {}
            ChargingChange::Enter => self.start_charging(id),
            ChargingChange::Leave => self.stop_charging(id),
        }
    }
}
