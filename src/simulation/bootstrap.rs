//! Initial fleet population

use log::info;
use rand::Rng;

use super::side_state::SideState;
use super::store::{FleetStore, StoreError};
use super::types::VehicleId;
use super::vehicle::VehicleRecord;

/// Spawn the fleet at full charge and load it into the store
///
/// Returns the side state seeded with every vehicle's starting position, ready
/// to hand to the clock.
pub fn bootstrap_fleet<R: Rng + ?Sized>(
    store: &FleetStore,
    rng: &mut R,
) -> Result<SideState, StoreError> {
    let mut side = SideState::new();
    let vehicles: Vec<VehicleRecord> = VehicleId::fleet()
        .map(|id| {
            let vehicle = VehicleRecord::spawn(id, &mut *rng);
            side.set_position(id, vehicle.location);
            vehicle
        })
        .collect();

    let count = vehicles.len();
    store.initialize(vehicles)?;
    info!("Bootstrapped fleet of {} vehicles", count);
    Ok(side)
}
