//! Hand-off to an external simulation engine.
//!
//! The engine itself lives outside this workspace; it is reached through the
//! `SimulationEngine` trait.

use indexmap::IndexMap;
use sl_graph::{HighLevelSystem, LowLevelStructure};
use sl_plugins::PluginRegistry;
use sl_project::SimulationOptions;
use tracing::info;

use crate::compile::{CompileOptions, compile_system_with};
use crate::error::AppResult;

/// One logged signal: sample times and values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    pub times: Vec<f64>,
    pub values: Vec<f64>,
}

impl TimeSeries {
    pub fn push(&mut self, time: f64, value: f64) {
        self.times.push(time);
        self.values.push(value);
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

/// Engine output: group → signal → series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationOutput {
    groups: IndexMap<String, IndexMap<String, TimeSeries>>,
}

impl SimulationOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, group: impl Into<String>, signal: impl Into<String>, series: TimeSeries) {
        self.groups
            .entry(group.into())
            .or_default()
            .insert(signal.into(), series);
    }

    pub fn get(&self, group: &str, signal: &str) -> Option<&TimeSeries> {
        self.groups.get(group).and_then(|signals| signals.get(signal))
    }

    pub fn groups(&self) -> impl Iterator<Item = (&str, &IndexMap<String, TimeSeries>)> {
        self.groups.iter().map(|(name, signals)| (name.as_str(), signals))
    }

    pub fn signal_count(&self) -> usize {
        self.groups.values().map(IndexMap::len).sum()
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Engine rejected the system: {0}")]
    Rejected(String),

    #[error("Simulation failed: {0}")]
    Failed(String),
}

/// A simulation engine able to run a compiled structure.
pub trait SimulationEngine {
    fn simulate(
        &self,
        structure: &LowLevelStructure,
        options: &SimulationOptions,
    ) -> Result<SimulationOutput, EngineError>;
}

/// Compile `system` and hand the result to `engine`.
pub fn compile_and_simulate(
    system: &HighLevelSystem,
    registry: &PluginRegistry,
    compile_options: CompileOptions,
    engine: &dyn SimulationEngine,
    simulation_options: &SimulationOptions,
) -> AppResult<SimulationOutput> {
    let structure = compile_system_with(system, registry, compile_options)?;
    let output = engine.simulate(&structure, simulation_options)?;
    info!(
        groups = output.groups.len(),
        signals = output.signal_count(),
        "Simulation finished"
    );
    Ok(output)
}
