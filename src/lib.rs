//! Fleet Simulation Library
//!
//! Simulates a fleet of electric vehicles and keeps an observable snapshot of
//! their telemetry.

pub mod simulation;
