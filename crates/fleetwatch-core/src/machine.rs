//! Per-machine simulation state.

use crate::error::FleetError;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type MachineId = String;

/// Lower bound for any health sample
pub const HEALTH_FLOOR: f64 = 5.0;
/// Upper bound for any health sample
pub const HEALTH_CEILING: f64 = 100.0;

/// Operating status assigned when the fleet is created. Never changes.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    #[serde(rename = "OK")]
    Ok,
    Warning,
    Critical,
}

impl Status {
    pub fn base_health(self) -> f64 {
        match self {
            Status::Ok => 100.0,
            Status::Warning => 70.0,
            Status::Critical => 40.0,
        }
    }

    pub fn base_rul(self) -> f64 {
        match self {
            Status::Ok => 250.0,
            Status::Warning => 150.0,
            Status::Critical => 80.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::Warning => "Warning",
            Status::Critical => "Critical",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Dominant failure mechanism of a machine. Shapes injected fault excursions.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FailureMode {
    Thermal,
    Mechanical,
    Hydraulic,
}

impl FailureMode {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureMode::Thermal => "thermal",
            FailureMode::Mechanical => "mechanical",
            FailureMode::Hydraulic => "hydraulic",
        }
    }
}

impl fmt::Display for FailureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Persistent state of one machine.
///
/// The four histories are append-only and grow together, one entry per tick
/// plus the initial sample. Only the simulator appends to them.
#[derive(Debug, Clone, PartialEq)]
pub struct MachineState {
    status: Status,
    failure_mode: FailureMode,
    pub(crate) health: Vec<f64>,
    pub(crate) rul: Vec<f64>,
    pub(crate) temperature: Vec<f64>,
    pub(crate) vibration: Vec<f64>,
}

impl MachineState {
    pub(crate) fn new(
        status: Status,
        failure_mode: FailureMode,
        health: f64,
        rul: f64,
        temperature: f64,
        vibration: f64,
    ) -> Self {
        Self {
            status,
            failure_mode,
            health: vec![health],
            rul: vec![rul],
            temperature: vec![temperature],
            vibration: vec![vibration],
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn failure_mode(&self) -> FailureMode {
        self.failure_mode
    }

    pub fn health_history(&self) -> &[f64] {
        &self.health
    }

    pub fn rul_history(&self) -> &[f64] {
        &self.rul
    }

    pub fn temperature_history(&self) -> &[f64] {
        &self.temperature
    }

    pub fn vibration_history(&self) -> &[f64] {
        &self.vibration
    }

    /// Number of samples in every history.
    pub fn len(&self) -> usize {
        self.health.len()
    }

    pub fn is_empty(&self) -> bool {
        self.health.is_empty()
    }

    /// Checks that all histories are non-empty and of equal length.
    pub fn verify(&self, machine: &str) -> Result<(), FleetError> {
        let lengths = [
            self.health.len(),
            self.rul.len(),
            self.temperature.len(),
            self.vibration.len(),
        ];

        if lengths[0] == 0 {
            return Err(FleetError::InvariantViolation {
                machine: machine.to_string(),
                detail: "empty history".to_string(),
            });
        }

        if lengths.iter().any(|&len| len != lengths[0]) {
            return Err(FleetError::InvariantViolation {
                machine: machine.to_string(),
                detail: format!(
                    "history lengths differ (health={}, rul={}, temperature={}, vibration={})",
                    lengths[0], lengths[1], lengths[2], lengths[3]
                ),
            });
        }

        Ok(())
    }
}
