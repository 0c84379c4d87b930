//! Core types for the fleet simulation
//!
//! Identifiers, coordinates, operating states and the fixed simulation constants.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// A unique identifier for a fleet vehicle
/// Identifiers run from 1 to `FLEET_SIZE` and never change after creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VehicleId(pub u32);

impl VehicleId {
    /// Iterate over every id in the fleet, in ascending order
    pub fn fleet() -> impl Iterator<Item = VehicleId> {
        (1..=FLEET_SIZE).map(VehicleId)
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The simulation state of a vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperatingStatus {
    /// Driving around normally
    Moving,
    /// Low on battery, driving to the charging station
    HeadingToStation,
    /// Parked at the station and recharging
    Charging,
    /// Just finished charging, waiting for the next tick
    Idle,
}

impl OperatingStatus {
    pub const ALL: [OperatingStatus; 4] = [
        OperatingStatus::Moving,
        OperatingStatus::HeadingToStation,
        OperatingStatus::Charging,
        OperatingStatus::Idle,
    ];
}

/// A GPS coordinate in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Planar distance in coordinate degrees
    pub fn distance(&self, other: &Location) -> f64 {
        let dlat = self.lat - other.lat;
        let dlng = self.lng - other.lng;
        (dlat * dlat + dlng * dlng).sqrt()
    }

    pub fn lerp(&self, other: &Location, t: f64) -> Location {
        Location {
            lat: self.lat + (other.lat - self.lat) * t,
            lng: self.lng + (other.lng - self.lng) * t,
        }
    }

    pub fn offset(&self, dlat: f64, dlng: f64) -> Location {
        Location {
            lat: self.lat + dlat,
            lng: self.lng + dlng,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.5}, {:.5})", self.lat, self.lng)
    }
}

/// Number of vehicles in the fleet
pub const FLEET_SIZE: u32 = 10;

/// Default period between ticks, in milliseconds
pub const TICK_PERIOD_MS: u64 = 2000;

/// Battery bounds in percent
pub const MIN_BATTERY: f64 = 0.0;
pub const MAX_BATTERY: f64 = 100.0;

/// At or below this level a vehicle heads for the charging station
pub const LOW_BATTERY_THRESHOLD: f64 = 10.0;

/// The single charging station every vehicle uses
pub const CHARGING_STATION: Location = Location::new(48.857, 2.351);

/// Distance in degrees under which a vehicle counts as arrived at the station
pub const ARRIVAL_THRESHOLD: f64 = 0.001;

/// Fraction of the remaining distance to the station covered each tick
pub const APPROACH_STEP: f64 = 0.25;

/// Latitude spacing between queued vehicles at the station lineup
pub const LINEUP_SPACING: f64 = 0.00005;

/// Battery gained per tick while charging
pub const CHARGE_RATE: f64 = 20.0;

/// Battery lost per tick while driving to the station
pub const EN_ROUTE_DRAIN: f64 = 0.5;

/// Speed while driving to the station, km/h
pub const EN_ROUTE_SPEED: f64 = 10.0;

/// Upper bound (exclusive) of the random drain during normal movement
pub const MAX_DRAIN_PER_TICK: f64 = 5.0;

/// Full width of the random position jitter during normal movement, in degrees
pub const MOVEMENT_JITTER: f64 = 0.0005;

/// Speed range during normal movement, km/h
pub const SPEED_RANGE: Range<f64> = 0.0..100.0;

/// Speed range assigned at bootstrap, km/h
pub const INITIAL_SPEED_RANGE: Range<f64> = 20.0..70.0;

/// Corner of the square area new vehicles spawn in
pub const SPAWN_ORIGIN: Location = Location::new(48.8566, 2.3522);

/// Side length of the spawn area, in degrees
pub const SPAWN_SPREAD: f64 = 0.01;

/// Deterministic parking slot for a vehicle queueing at the station
pub fn lineup_position(id: VehicleId) -> Location {
    let slot = id.0.saturating_sub(1) as f64;
    CHARGING_STATION.offset(LINEUP_SPACING * slot, 0.0)
}

pub fn clamp_battery(battery: f64) -> f64 {
    battery.clamp(MIN_BATTERY, MAX_BATTERY)
}
