use std::{fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};
use sokofess_engine::MoveGenerator;
use sokofess_evaluator::{DeadlockMode, room::DEFAULT_MIN_ROOM_SIZE};

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum ConfigError {
    #[display("failed to read solver config: {_0}")]
    Io(std::io::Error),
    #[display("failed to parse solver config: {_0}")]
    Json(serde_json::Error),
}

/// Search budgets and tuning knobs. Every field may be omitted in the JSON
/// form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SolverConfig {
    /// Wall-clock budget in seconds.
    pub max_time_secs: f64,
    /// Budget on the number of nodes in the search tree.
    pub max_nodes: usize,
    /// Pushes a single macro move may chain (1 to 3).
    pub max_chain_pushes: usize,
    pub deadlock_mode: DeadlockMode,
    pub min_room_size: usize,
    /// Outer iterations between progress callbacks; 0 disables them.
    pub progress_interval: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_time_secs: 60.0,
            max_nodes: 1_000_000,
            max_chain_pushes: 2,
            deadlock_mode: DeadlockMode::default(),
            min_room_size: DEFAULT_MIN_ROOM_SIZE,
            progress_interval: 1000,
        }
    }
}

impl SolverConfig {
    pub fn from_json_file<P>(path: P) -> Result<Self, ConfigError>
    where
        P: AsRef<Path>,
    {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Time budget; negative or non-finite values mean no time budget at all.
    #[must_use]
    pub fn time_limit(&self) -> Option<Duration> {
        Duration::try_from_secs_f64(self.max_time_secs).ok()
    }

    #[must_use]
    pub fn move_generator(&self) -> MoveGenerator {
        MoveGenerator::new(self.max_chain_pushes)
    }
}
