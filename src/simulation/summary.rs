//! Fleet-wide aggregates for consumers of the store
//!
//! Computed from a single snapshot, so every figure describes the same instant.

use std::collections::HashMap;
use std::fmt;

use super::store::FleetSnapshot;
use super::types::{Location, OperatingStatus};

/// Coarse battery level used for at-a-glance fleet health
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatteryBand {
    /// Above 70%
    High,
    /// Above 30%
    Medium,
    Low,
}

impl BatteryBand {
    pub fn of(battery: f64) -> Self {
        if battery > 70.0 {
            BatteryBand::High
        } else if battery > 30.0 {
            BatteryBand::Medium
        } else {
            BatteryBand::Low
        }
    }
}

/// Aggregate view of one fleet snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FleetSummary {
    pub vehicles: usize,
    pub by_status: HashMap<OperatingStatus, usize>,
    pub by_band: HashMap<BatteryBand, usize>,
    pub average_battery: f64,
    /// Mean position of the fleet, `None` when the fleet is empty
    pub centroid: Option<Location>,
}

impl FleetSummary {
    pub fn from_snapshot(snapshot: &FleetSnapshot) -> Self {
        let mut summary = FleetSummary {
            vehicles: snapshot.len(),
            ..FleetSummary::default()
        };
        if snapshot.is_empty() {
            return summary;
        }

        let mut battery_total = 0.0;
        let mut lat_total = 0.0;
        let mut lng_total = 0.0;
        for vehicle in snapshot {
            *summary.by_status.entry(vehicle.status).or_insert(0) += 1;
            *summary.by_band.entry(BatteryBand::of(vehicle.battery)).or_insert(0) += 1;
            battery_total += vehicle.battery;
            lat_total += vehicle.location.lat;
            lng_total += vehicle.location.lng;
        }

        let count = summary.vehicles as f64;
        summary.average_battery = battery_total / count;
        summary.centroid = Some(Location::new(lat_total / count, lng_total / count));
        summary
    }

    pub fn count(&self, status: OperatingStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }

    pub fn band_count(&self, band: BatteryBand) -> usize {
        self.by_band.get(&band).copied().unwrap_or(0)
    }
}

impl fmt::Display for FleetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Vehicles: {} | Moving: {} | To station: {} | Charging: {} | Idle: {} | Avg battery: {:.1}%",
            self.vehicles,
            self.count(OperatingStatus::Moving),
            self.count(OperatingStatus::HeadingToStation),
            self.count(OperatingStatus::Charging),
            self.count(OperatingStatus::Idle),
            self.average_battery
        )?;
        if let Some(centroid) = self.centroid {
            write!(f, " | Center: {}", centroid)?;
        }
        Ok(())
    }
}
