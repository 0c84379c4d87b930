//! Periodic driver for the simulation
//!
//! Each tick reads one snapshot, runs the engine over the whole fleet and
//! pushes every result back into the store.

use log::{debug, info};
use rand::rngs::StdRng;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::engine::transition;
use super::side_state::{ChargingChange, SideState};
use super::store::FleetStore;
use super::types::{OperatingStatus, VehicleId};
use super::vehicle::VehicleRecord;

/// What happened during one tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub tick: u64,
    pub vehicles_updated: usize,
    /// Vehicles that joined the charging set this tick
    pub started_charging: usize,
    /// Vehicles that began charging at the station this tick
    pub arrived_at_station: usize,
    /// Vehicles that finished charging and left the station this tick
    pub departed_station: usize,
}

impl fmt::Display for TickReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tick {}: {} updated, {} started charging, {} arrived, {} departed",
            self.tick,
            self.vehicles_updated,
            self.started_charging,
            self.arrived_at_station,
            self.departed_station
        )
    }
}

/// Drives the engine over the fleet at a fixed period
pub struct SimulationClock {
    store: Arc<FleetStore>,
    side: SideState,
    rng: StdRng,
    period: Duration,
    ticks: u64,
}

impl SimulationClock {
    /// A zero period is raised to one millisecond
    pub fn new(store: Arc<FleetStore>, side: SideState, rng: StdRng, period: Duration) -> Self {
        Self {
            store,
            side,
            rng,
            period: period.max(Duration::from_millis(1)),
            ticks: 0,
        }
    }

    pub fn store(&self) -> &Arc<FleetStore> {
        &self.store
    }

    pub fn side_state(&self) -> &SideState {
        &self.side
    }

    pub fn ticks_elapsed(&self) -> u64 {
        self.ticks
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Run a single tick over every vehicle, in ascending id order
    pub fn tick(&mut self) -> TickReport {
        self.ticks += 1;
        let snapshot = self.store.snapshot();
        let mut report = TickReport {
            tick: self.ticks,
            ..TickReport::default()
        };

        for id in VehicleId::fleet() {
            let current = snapshot
                .get(id)
                .cloned()
                .unwrap_or_else(|| VehicleRecord::placeholder(id));
            let (next, delta) = transition(&current, &self.side, &mut self.rng);

            match delta.charging {
                ChargingChange::Enter => report.started_charging += 1,
                ChargingChange::Leave => report.departed_station += 1,
                ChargingChange::Unchanged => {}
            }
            if next.status == OperatingStatus::Charging && current.status != OperatingStatus::Charging
            {
                report.arrived_at_station += 1;
            }

            self.side.apply(id, delta);
            self.store.apply_update(next);
            report.vehicles_updated += 1;
        }

        debug!("{}", report);
        report
    }

    /// Tick every period until `max_ticks` ticks have run, or forever
    ///
    /// The first tick fires one period after the call. A tick that overruns
    /// pushes the schedule back instead of letting ticks pile up.
    pub async fn run(&mut self, max_ticks: Option<u64>) {
        let mut interval = interval_at(Instant::now() + self.period, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            "Simulation clock started (period {}ms, {})",
            self.period.as_millis(),
            match max_ticks {
                Some(limit) => format!("{} ticks", limit),
                None => "unbounded".to_string(),
            }
        );

        let mut remaining = max_ticks;
        while remaining != Some(0) {
            interval.tick().await;
            self.tick();
            if let Some(left) = remaining.as_mut() {
                *left -= 1;
            }
        }

        info!("Simulation clock stopped after {} ticks", self.ticks);
    }
}
