use crate::config::ExporterConfig;
use crate::fleet::{Fleet, FleetError};
use crate::port::Port;
use crate::sim::config::{AnomalyConfig, SimulationConfig};
use crate::sim::step::step_vessel;
use crate::snapshot::{FleetSnapshot, FleetStore};
use crate::vessel::{AnomalyCounts, UpdateStamp};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Errors returned to callers of engine commands
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    Fleet(FleetError),
    /// The engine task has stopped
    Unavailable,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Fleet(e) => write!(f, "{}", e),
            EngineError::Unavailable => write!(f, "simulation engine is not running"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<FleetError> for EngineError {
    fn from(e: FleetError) -> Self {
        EngineError::Fleet(e)
    }
}

/// Requests serviced by the engine task between ticks
#[derive(Debug)]
pub enum EngineCommand {
    Decommission {
        vessel_id: String,
        reply: oneshot::Sender<Result<(), EngineError>>,
    },
}

/// Cloneable sender side of the engine's command channel
#[derive(Clone, Debug)]
pub struct EngineHandle {
    tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    /// Decommission a vessel. Resolves once the change has been published.
    pub async fn decommission(&self, vessel_id: &str) -> Result<(), EngineError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(EngineCommand::Decommission {
                vessel_id: vessel_id.to_string(),
                reply,
            })
            .await
            .map_err(|_| EngineError::Unavailable)?;
        rx.await.map_err(|_| EngineError::Unavailable)?
    }
}

/// Create the command channel connecting [`EngineHandle`]s to a running engine.
pub fn command_channel(capacity: usize) -> (EngineHandle, mpsc::Receiver<EngineCommand>) {
    let (tx, rx) = mpsc::channel(capacity);
    (EngineHandle { tx }, rx)
}

/// Summary of one tick, for logging and tests
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    /// Vessels advanced this tick
    pub updated: usize,
    /// Vessels left unchanged because their step failed
    pub failed: usize,
    /// Vessels with at least one clamped field
    pub clamped: usize,
    pub anomalies: usize,
    /// Decommissioned vessels removed before stepping
    pub pruned: usize,
}

/// Simulation engine: sole owner and writer of the fleet and port table.
///
/// Mutates a private working copy and publishes an immutable
/// [`FleetSnapshot`] to its [`FleetStore`] after every tick and every command.
pub struct SimulationEngine {
    sim: SimulationConfig,
    anomalies: AnomalyConfig,
    prune_decommissioned: bool,
    rng: StdRng,
    fleet: Fleet,
    ports: Vec<Port>,
    store: FleetStore,
    tick: u64,
    sim_elapsed_secs: f64,
    anomaly_totals: AnomalyCounts,
}

impl SimulationEngine {
    /// Generate the fleet from `config.fleet` and prepare the engine.
    ///
    /// Nothing is published until the first tick.
    pub fn new(config: &ExporterConfig, store: FleetStore) -> Result<Self, FleetError> {
        let mut rng = StdRng::seed_from_u64(config.fleet.seed);
        let fleet = Fleet::generate(&config.fleet, &mut rng, Utc::now())?;
        Ok(Self::from_parts(fleet, rng, config, store))
    }

    /// Build an engine around an existing fleet and PRNG. The port table is
    /// drawn from `rng` next.
    pub fn from_parts(
        fleet: Fleet,
        mut rng: StdRng,
        config: &ExporterConfig,
        store: FleetStore,
    ) -> Self {
        let ports = Port::table(&mut rng);
        Self {
            sim: config.simulation.clone(),
            anomalies: config.anomalies.clone(),
            prune_decommissioned: config.fleet.prune_decommissioned,
            rng,
            fleet,
            ports,
            store,
            tick: 0,
            sim_elapsed_secs: 0.0,
            anomaly_totals: AnomalyCounts::default(),
        }
    }

    pub fn fleet(&self) -> &Fleet {
        &self.fleet
    }

    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    pub fn store(&self) -> &FleetStore {
        &self.store
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Advance every active vessel and every port by one tick and publish.
    pub fn tick(&mut self) -> TickReport {
        self.tick_at(Utc::now())
    }

    /// Same as [`tick`](Self::tick) with an explicit wall-clock stamp.
    pub fn tick_at(&mut self, wall: DateTime<Utc>) -> TickReport {
        let mut report = TickReport::default();

        // Decommissioned vessels leave only after a reader has seen them
        if self.prune_decommissioned {
            let observed = self
                .store
                .load()
                .map(|s| s.terminal_observed())
                .unwrap_or(false);
            if observed {
                report.pruned = self.fleet.prune_decommissioned();
                if report.pruned > 0 {
                    info!(removed = report.pruned, "Pruned decommissioned vessels");
                }
            }
        }

        self.tick += 1;
        self.sim_elapsed_secs += self.sim.tick_duration_secs;
        report.tick = self.tick;

        let stamp = UpdateStamp {
            tick: self.tick,
            sim_elapsed_secs: self.sim_elapsed_secs,
            wall,
        };

        for vessel in self.fleet.vessels_mut() {
            if !vessel.is_active() {
                continue;
            }

            match step_vessel(vessel, &mut self.rng, &self.sim, &self.anomalies) {
                Ok(outcome) => {
                    if !outcome.clamped.is_empty() {
                        warn!(
                            vessel_id = %vessel.id,
                            fields = ?outcome.clamped,
                            "Vessel state out of range, clamped"
                        );
                        report.clamped += 1;
                    }
                    for kind in &outcome.anomalies {
                        debug!(vessel_id = %vessel.id, anomaly = kind.as_str(), "Anomaly injected");
                        self.anomaly_totals.record(*kind);
                    }
                    report.anomalies += outcome.anomalies.len();

                    *vessel = outcome.vessel;
                    vessel.last_update = stamp;
                    report.updated += 1;
                }
                Err(e) => {
                    warn!(
                        vessel_id = %vessel.id,
                        error = %e,
                        "Vessel step failed, state left unchanged"
                    );
                    report.failed += 1;
                }
            }
        }

        for port in &mut self.ports {
            port.step(&mut self.rng);
        }

        self.publish_at(wall);

        debug!(
            tick = report.tick,
            updated = report.updated,
            failed = report.failed,
            anomalies = report.anomalies,
            "Tick complete"
        );

        report
    }

    /// Decommission a vessel and publish the change immediately.
    pub fn decommission(&mut self, vessel_id: &str) -> Result<(), EngineError> {
        let stamp = UpdateStamp {
            tick: self.tick,
            sim_elapsed_secs: self.sim_elapsed_secs,
            wall: Utc::now(),
        };
        self.fleet.decommission(vessel_id, stamp)?;
        info!(vessel_id = %vessel_id, tick = self.tick, "Vessel decommissioned");

        self.publish_at(stamp.wall);
        Ok(())
    }

    /// Publish the current working fleet.
    fn publish_at(&self, wall: DateTime<Utc>) {
        self.store.publish(FleetSnapshot::capture(
            &self.fleet,
            &self.ports,
            self.tick,
            self.sim_elapsed_secs,
            self.anomaly_totals,
            wall,
        ));
    }

    fn handle_command(&mut self, command: EngineCommand) {
        match command {
            EngineCommand::Decommission { vessel_id, reply } => {
                let result = self.decommission(&vessel_id);
                if let Err(e) = &result {
                    debug!(vessel_id = %vessel_id, error = %e, "Decommission rejected");
                }
                // Caller may have given up waiting
                let _ = reply.send(result);
            }
        }
    }

    /// Run the tick loop until `shutdown` flips to true or its sender drops.
    ///
    /// The first tick fires immediately so readers become ready without
    /// waiting a full interval. Missed ticks are skipped, not replayed.
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<EngineCommand>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut ticker = interval(Duration::from_secs(self.sim.tick_interval_secs));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            vessels = self.fleet.len(),
            interval_secs = self.sim.tick_interval_secs,
            tick_duration_secs = self.sim.tick_duration_secs,
            "Starting simulation engine"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick();
                }
                Some(command) = commands.recv() => {
                    self.handle_command(command);
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!(ticks = self.tick, "Simulation engine stopped");
    }
}
