// Fleet simulation: per-vessel stepping and the tick loop

pub mod config;
mod engine;
pub mod kinematics;
pub mod step;

pub use config::{AnomalyConfig, AnomalyToggle, SimulationConfig, TransitionConfig};
pub use engine::{
    command_channel, EngineCommand, EngineError, EngineHandle, SimulationEngine, TickReport,
};
pub use step::{step_vessel, StepError, StepOutcome};

#[cfg(test)]
mod tests;
