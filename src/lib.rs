// Vessel model
pub mod vessel;

// Port authority model
pub mod port;

// Fleet generation and lookup
pub mod fleet;

// Simulation engine and tick loop
pub mod sim;

// Published fleet snapshots
pub mod snapshot;

// Metric families and text exposition
pub mod metrics;

// HTTP surface
pub mod api;

// Configuration loading and validation
pub mod config;
