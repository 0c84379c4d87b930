//! Standalone fleet simulation module
//!
//! The fleet store, the per-vehicle engine and the clock that drives it. None
//! of it knows how the fleet is displayed; consumers read snapshots from the
//! store or subscribe to its change notifications.

mod bootstrap;
mod clock;
mod config;
mod engine;
mod side_state;
mod store;
mod summary;
mod types;
mod vehicle;

pub use bootstrap::bootstrap_fleet;
pub use clock::{SimulationClock, TickReport};
pub use config::SimConfig;
pub use engine::{has_reached_station, transition};
pub use side_state::{ChargingChange, SideDelta, SideState};
pub use store::{FleetSnapshot, FleetStore, StoreError, Subscription};
pub use summary::{BatteryBand, FleetSummary};
pub use types::{
    clamp_battery, lineup_position, Location, OperatingStatus, VehicleId, APPROACH_STEP,
    ARRIVAL_THRESHOLD, CHARGE_RATE, CHARGING_STATION, EN_ROUTE_DRAIN, EN_ROUTE_SPEED, FLEET_SIZE,
    INITIAL_SPEED_RANGE, LINEUP_SPACING, LOW_BATTERY_THRESHOLD, MAX_BATTERY, MAX_DRAIN_PER_TICK,
    MIN_BATTERY, MOVEMENT_JITTER, SPAWN_ORIGIN, SPAWN_SPREAD, SPEED_RANGE, TICK_PERIOD_MS,
};
pub use vehicle::{random_spawn_position, Telemetry, VehicleRecord};
