use crate::fleet::Fleet;
use crate::port::Port;
use crate::vessel::{AnomalyCounts, Vessel};
use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;


/// Immutable view of the fleet as of one tick.
///
/// Published by the simulation engine and shared with every reader through
/// [`FleetStore`]. Once published a snapshot is never mutated, apart from the
/// `terminal_observed` flag readers raise when they have seen decommissioned
/// vessels in it.
#[derive(Debug, Serialize)]
pub struct FleetSnapshot {
    /// Tick that produced this snapshot (0 = initial fleet)
    pub tick: u64,

    /// Simulated seconds since start
    pub sim_elapsed_secs: f64,

    /// Wall-clock publish time
    pub published_at: DateTime<Utc>,

    /// Vessels in id order
    pub vessels: Vec<Vessel>,

    /// Port table, in table order
    pub ports: Vec<Port>,

    /// Fleet-wide anomaly totals. Unlike per-vessel counts these survive
    /// vessel removal.
    pub anomaly_totals: AnomalyCounts,

    #[serde(skip)]
    terminal_observed: AtomicBool,
}

impl FleetSnapshot {
    /// Capture the current fleet state.
    pub fn capture(
        fleet: &Fleet,
        ports: &[Port],
        tick: u64,
        sim_elapsed_secs: f64,
        anomaly_totals: AnomalyCounts,
        published_at: DateTime<Utc>,
    ) -> Self {
        Self {
            tick,
            sim_elapsed_secs,
            published_at,
            vessels: fleet.vessels().to_vec(),
            ports: ports.to_vec(),
            anomaly_totals,
            terminal_observed: AtomicBool::new(false),
        }
    }

    pub fn vessel_count(&self) -> usize {
        self.vessels.len()
    }

    pub fn get(&self, id: &str) -> Option<&Vessel> {
        self.vessels
            .binary_search_by(|v| v.id.as_str().cmp(id))
            .ok()
            .map(|i| &self.vessels[i])
    }

    /// Whether any vessel in this snapshot is in the terminal state.
    pub fn has_terminal(&self) -> bool {
        self.vessels.iter().any(|v| !v.is_active())
    }

    /// Record that a consumer has seen this snapshot's terminal vessels.
    pub fn mark_terminal_observed(&self) {
        self.terminal_observed.store(true, Ordering::Release);
    }

    pub fn terminal_observed(&self) -> bool {
        self.terminal_observed.load(Ordering::Acquire)
    }
}

/// Single publication point for fleet snapshots.
///
/// The engine swaps in a whole new `Arc<FleetSnapshot>`; readers load the
/// current pointer without locking, so a scrape never waits on a tick and
/// never sees a half-updated fleet.
#[derive(Clone, Debug, Default)]
pub struct FleetStore {
    current: Arc<ArcSwapOption<FleetSnapshot>>,
}

impl FleetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the published snapshot.
    pub fn publish(&self, snapshot: FleetSnapshot) {
        self.current.store(Some(Arc::new(snapshot)));
    }

    /// Latest published snapshot, or `None` before the first publish.
    pub fn load(&self) -> Option<Arc<FleetSnapshot>> {
        self.current.load_full()
    }

    pub fn is_ready(&self) -> bool {
        self.current.load().is_some()
    }
}
