//! Engine configuration and the predefined fleet layout.

use crate::error::FleetError;
use crate::machine::{FailureMode, MachineId, Status};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One predefined machine slot
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MachineSlot {
    pub id: MachineId,
    pub status: Status,
    pub failure_mode: FailureMode,
}

impl MachineSlot {
    pub fn new(index: usize, status: Status, failure_mode: FailureMode) -> Self {
        Self {
            id: format!("Machine_{}", index),
            status,
            failure_mode,
        }
    }
}

/// Fixed assignment of status and failure mode per machine slot
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FleetLayout {
    pub slots: Vec<MachineSlot>,
}

impl Default for FleetLayout {
    /// Three machines, one per status.
    fn default() -> Self {
        Self {
            slots: vec![
                MachineSlot::new(1, Status::Ok, FailureMode::Thermal),
                MachineSlot::new(2, Status::Warning, FailureMode::Mechanical),
                MachineSlot::new(3, Status::Critical, FailureMode::Hydraulic),
            ],
        }
    }
}

impl FleetLayout {
    /// Five machines: three OK, one Warning, one Critical.
    pub fn extended() -> Self {
        let statuses = [
            Status::Ok,
            Status::Ok,
            Status::Ok,
            Status::Warning,
            Status::Critical,
        ];
        let modes = [
            FailureMode::Thermal,
            FailureMode::Mechanical,
            FailureMode::Hydraulic,
        ];

        let slots = statuses
            .iter()
            .enumerate()
            .map(|(i, &status)| MachineSlot::new(i + 1, status, modes[i % modes.len()]))
            .collect();

        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn validate(&self) -> Result<(), FleetError> {
        if self.slots.is_empty() {
            return Err(FleetError::Initialization(
                "fleet layout has no machine slots".to_string(),
            ));
        }

        let mut seen = HashSet::with_capacity(self.slots.len());
        for slot in &self.slots {
            if slot.id.trim().is_empty() {
                return Err(FleetError::Initialization(
                    "machine slot with empty id".to_string(),
                ));
            }
            if !seen.insert(slot.id.as_str()) {
                return Err(FleetError::Initialization(format!(
                    "duplicate machine id {}",
                    slot.id
                )));
            }
        }

        Ok(())
    }
}

/// RUL trend fit settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PredictorConfig {
    /// Number of most recent RUL samples fed to the fit
    pub window: usize,
    /// Time index (from window start) at which the line is evaluated
    pub horizon: f64,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            window: 10,
            horizon: 10.0,
        }
    }
}

/// Isolation detector settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Number of most recent (temperature, vibration) pairs
    pub window: usize,
    /// Expected outlier fraction within a window
    pub contamination: f64,
    pub num_trees: usize,
    /// Subsample size per tree (capped by window size)
    pub max_samples: usize,
    /// Seed for tree construction; the forest is rebuilt from it on every fit
    pub seed: u64,
    /// Minimum deviation per feature (temperature, vibration) from the rest
    /// of the window before an isolated sample counts as anomalous
    pub noise_floor: [f64; 2],
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            window: 10,
            contamination: 0.1,
            num_trees: 100,
            max_samples: 256,
            seed: 42,
            noise_floor: [1.5, 0.05],
        }
    }
}

/// Top-level engine configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Seed for the simulation random source. `None` draws from the OS.
    pub seed: Option<u64>,
    pub layout: FleetLayout,
    pub predictor: PredictorConfig,
    pub detector: DetectorConfig,
}

impl EngineConfig {
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Default::default()
        }
    }

    pub fn with_layout(mut self, layout: FleetLayout) -> Self {
        self.layout = layout;
        self
    }
}
