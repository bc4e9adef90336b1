//! Output records handed to dashboards, reports and the HTTP layer.
//!
//! Field names are a compatibility contract with existing consumers.

use crate::machine::{FailureMode, MachineId, MachineState, Status};
use serde::{Deserialize, Serialize};

/// Full sensor history of one machine, unrounded
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HistoryRecord {
    pub health: Vec<f64>,
    pub rul: Vec<f64>,
    pub temperature: Vec<f64>,
    pub vibration: Vec<f64>,
}

/// Per-machine result of one tick
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MachineRecord {
    pub status: Status,
    pub mode: FailureMode,
    pub health: f64,
    pub rul: f64,
    pub predicted_rul: f64,
    pub temperature: f64,
    pub vibration: f64,
    pub anomaly: bool,
    pub history: HistoryRecord,
}

/// Rounds to a fixed number of decimal digits.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn last(values: &[f64]) -> f64 {
    values.last().copied().unwrap_or(0.0)
}

/// Packages current values, history and analytics of one machine.
pub fn assemble(
    machine_id: &str,
    state: &MachineState,
    predicted_rul: f64,
    anomaly: bool,
) -> (MachineId, MachineRecord) {
    let record = MachineRecord {
        status: state.status(),
        mode: state.failure_mode(),
        health: round_to(last(state.health_history()), 1),
        rul: round_to(last(state.rul_history()), 2),
        predicted_rul: round_to(predicted_rul, 2),
        temperature: round_to(last(state.temperature_history()), 1),
        vibration: round_to(last(state.vibration_history()), 2),
        anomaly,
        history: HistoryRecord {
            health: state.health_history().to_vec(),
            rul: state.rul_history().to_vec(),
            temperature: state.temperature_history().to_vec(),
            vibration: state.vibration_history().to_vec(),
        },
    };

    (machine_id.to_string(), record)
}
