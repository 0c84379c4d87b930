//! Per-vehicle state machine
//!
//! `transition` computes a vehicle's next record from its current one. It never
//! touches the store or the side state directly; everything it wants to change
//! comes back as a new record plus a `SideDelta`.

use log::debug;
use rand::Rng;

use super::side_state::{ChargingChange, SideDelta, SideState};
use super::types::{
    clamp_battery, lineup_position, Location, OperatingStatus, APPROACH_STEP, ARRIVAL_THRESHOLD,
    CHARGE_RATE, CHARGING_STATION, EN_ROUTE_DRAIN, EN_ROUTE_SPEED, LOW_BATTERY_THRESHOLD,
    MAX_BATTERY, MAX_DRAIN_PER_TICK, MOVEMENT_JITTER, SPEED_RANGE,
};
use super::vehicle::{random_spawn_position, Telemetry, VehicleRecord};

/// Whether `position` is close enough to the station to charge
pub fn has_reached_station(position: &Location) -> bool {
    position.distance(&CHARGING_STATION) <= ARRIVAL_THRESHOLD
}

/// Compute the next record for one vehicle
///
/// Rules are checked in order and the first match wins:
/// 1. depleted battery: teleport to the station lineup and start charging
/// 2. low battery: join the charging set and head for the station
/// 3. charging set, still away: step toward the station
/// 4. charging set, at the station: charge, leave once full
/// 5. otherwise: random drive
pub fn transition<R: Rng + ?Sized>(
    current: &VehicleRecord,
    side: &SideState,
    rng: &mut R,
) -> (VehicleRecord, SideDelta) {
    let id = current.id;
    let position = side.position(id).unwrap_or(current.location);
    let battery = clamp_battery(current.battery);
    let is_charging = side.is_charging(id);
    let telemetry = Telemetry::random(rng);

    if battery <= 0.0 {
        debug!("Vehicle {} depleted, towing to the charging lineup", id);
        let lineup = lineup_position(id);
        let next = VehicleRecord::new(
            id,
            0.0,
            clamp_battery(battery + CHARGE_RATE),
            lineup,
            OperatingStatus::Charging,
            telemetry,
        );
        let charging = if is_charging {
            ChargingChange::Unchanged
        } else {
            ChargingChange::Enter
        };
        return (
            next,
            SideDelta {
                position: lineup,
                charging,
            },
        );
    }

    if battery <= LOW_BATTERY_THRESHOLD && !is_charging {
        debug!("Vehicle {} low on battery ({:.1}%), heading to station", id, battery);
        let next = VehicleRecord::new(
            id,
            EN_ROUTE_SPEED,
            battery,
            position,
            OperatingStatus::HeadingToStation,
            telemetry,
        );
        return (
            next,
            SideDelta {
                position,
                charging: ChargingChange::Enter,
            },
        );
    }

    if is_charging && !has_reached_station(&position) {
        let stepped = position.lerp(&CHARGING_STATION, APPROACH_STEP);
        let next = VehicleRecord::new(
            id,
            EN_ROUTE_SPEED,
            clamp_battery(battery - EN_ROUTE_DRAIN),
            stepped,
            OperatingStatus::HeadingToStation,
            telemetry,
        );
        return (
            next,
            SideDelta {
                position: stepped,
                charging: ChargingChange::Unchanged,
            },
        );
    }

    if is_charging {
        let charged = clamp_battery(battery + CHARGE_RATE);
        if charged >= MAX_BATTERY {
            let departure = random_spawn_position(rng);
            debug!("Vehicle {} fully charged, leaving for {}", id, departure);
            let next = VehicleRecord::new(
                id,
                0.0,
                MAX_BATTERY,
                departure,
                OperatingStatus::Idle,
                telemetry,
            );
            return (
                next,
                SideDelta {
                    position: departure,
                    charging: ChargingChange::Leave,
                },
            );
        }

        let next = VehicleRecord::new(
            id,
            0.0,
            charged,
            position,
            OperatingStatus::Charging,
            telemetry,
        );
        return (
            next,
            SideDelta {
                position,
                charging: ChargingChange::Unchanged,
            },
        );
    }

    let jittered = position.offset(
        (rng.random::<f64>() - 0.5) * MOVEMENT_JITTER,
        (rng.random::<f64>() - 0.5) * MOVEMENT_JITTER,
    );
    let drained = clamp_battery(battery - rng.random_range(0.0..MAX_DRAIN_PER_TICK));
    let next = VehicleRecord::new(
        id,
        rng.random_range(SPEED_RANGE),
        drained,
        jittered,
        OperatingStatus::Moving,
        telemetry,
    );
    (
        next,
        SideDelta {
            position: jittered,
            charging: ChargingChange::Unchanged,
        },
    )
}
