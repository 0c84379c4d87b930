//! Vehicle records and their telemetry generators

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::types::{
    Location, OperatingStatus, VehicleId, INITIAL_SPEED_RANGE, MAX_BATTERY, SPAWN_ORIGIN,
    SPAWN_SPREAD,
};

/// Cosmetic telemetry carried by every vehicle
///
/// These fields are regenerated every tick and never drive the state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    /// Battery temperature in °C
    pub temperature: u32,
    /// Tire pressure in PSI
    pub tire_pressure: u32,
    /// Motor efficiency in %
    pub motor_efficiency: u32,
    pub regen_braking: bool,
    /// Brake wear level in %
    pub brake_wear: u32,
    /// Energy consumption in kWh
    pub energy_consumption: u32,
    /// Total mileage in km
    pub mileage: u32,
    pub lidar_active: bool,
    pub radar_active: bool,
    pub camera_active: bool,
    pub autopilot: bool,
}

impl Telemetry {
    /// Draw a fresh set of readings, each within its documented range
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            temperature: rng.random_range(20..=89),
            tire_pressure: rng.random_range(30..=39),
            motor_efficiency: rng.random_range(70..=100),
            regen_braking: rng.random_bool(0.5),
            brake_wear: rng.random_range(0..=99),
            energy_consumption: rng.random_range(5..=20),
            mileage: rng.random_range(0..=99_999),
            lidar_active: rng.random_bool(0.9),
            radar_active: rng.random_bool(0.9),
            camera_active: rng.random_bool(0.9),
            autopilot: rng.random_bool(0.5),
        }
    }
}

impl Default for Telemetry {
    fn default() -> Self {
        Self {
            temperature: 20,
            tire_pressure: 30,
            motor_efficiency: 100,
            regen_braking: false,
            brake_wear: 0,
            energy_consumption: 5,
            mileage: 0,
            lidar_active: true,
            radar_active: true,
            camera_active: true,
            autopilot: false,
        }
    }
}

/// A vehicle in the fleet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleRecord {
    pub id: VehicleId,
    /// Speed in km/h
    pub speed: f64,
    /// Battery level in %
    pub battery: f64,
    pub location: Location,
    pub status: OperatingStatus,
    pub telemetry: Telemetry,
}

impl VehicleRecord {
    pub fn new(
        id: VehicleId,
        speed: f64,
        battery: f64,
        location: Location,
        status: OperatingStatus,
        telemetry: Telemetry,
    ) -> Self {
        Self {
            id,
            speed,
            battery,
            location,
            status,
            telemetry,
        }
    }

    /// Fresh vehicle at full charge somewhere in the spawn area
    pub fn spawn<R: Rng + ?Sized>(id: VehicleId, rng: &mut R) -> Self {
        Self {
            id,
            speed: rng.random_range(INITIAL_SPEED_RANGE),
            battery: MAX_BATTERY,
            location: random_spawn_position(rng),
            status: OperatingStatus::Moving,
            telemetry: Telemetry::random(rng),
        }
    }

    /// Stand-in used by the clock when the snapshot has no record for an id
    pub fn placeholder(id: VehicleId) -> Self {
        Self {
            id,
            speed: 30.0,
            battery: MAX_BATTERY,
            location: SPAWN_ORIGIN,
            status: OperatingStatus::Moving,
            telemetry: Telemetry::default(),
        }
    }
}

/// Uniform position inside the square spawn area
pub fn random_spawn_position<R: Rng + ?Sized>(rng: &mut R) -> Location {
    SPAWN_ORIGIN.offset(
        rng.random_range(0.0..SPAWN_SPREAD),
        rng.random_range(0.0..SPAWN_SPREAD),
    )
}
