//! # fleetwatch-core - Fleet Telemetry Simulation & Predictive Maintenance
//!
//! Simulates streaming telemetry for a small fleet of industrial machines and
//! runs per-tick analytics on the recent history of each one: remaining
//! useful life extrapolation and sensor anomaly classification.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        FleetEngine                            │
//! │                                                              │
//! │  ┌────────────┐   ┌──────────────────────┐                   │
//! │  │ FleetStore │──►│ DegradationSimulator │                   │
//! │  │ (state)    │   │ (advance one tick)   │                   │
//! │  └────────────┘   └──────────┬───────────┘                   │
//! │                              │                               │
//! │               ┌──────────────┴──────────────┐                │
//! │               ▼                             ▼                │
//! │   ┌──────────────────────┐    ┌───────────────────────────┐  │
//! │   │ LinearTrendPredictor │    │ IsolationDetector         │  │
//! │   │ (RUL, last 10)       │    │ (temp/vibration, last 10) │  │
//! │   └──────────┬───────────┘    └─────────────┬─────────────┘  │
//! │              └──────────────┬───────────────┘                │
//! │                             ▼                                │
//! │                  record::assemble ──► FleetSnapshot          │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use fleetwatch_core::{EngineConfig, FleetEngine};
//!
//! let mut engine = FleetEngine::new(EngineConfig::seeded(42)).unwrap();
//!
//! for _ in 0..15 {
//!     let snapshot = engine.tick().unwrap();
//!     for (id, record) in &snapshot {
//!         assert!(record.predicted_rul >= 0.0, "{} predicted below zero", id);
//!     }
//! }
//! ```
//!
//! The engine never schedules itself: callers tick it on their own cadence.

pub mod algo;
pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod machine;
pub mod random;
pub mod record;
pub mod report;
pub mod simulator;
pub mod store;

pub use algo::{Detector, IsolationDetector, IsolationForest, LinearTrendPredictor, Predictor};
pub use config::{DetectorConfig, EngineConfig, FleetLayout, MachineSlot, PredictorConfig};
pub use engine::{EngineStats, FleetEngine, FleetSnapshot};
pub use error::{FitError, FleetError};
pub use machine::{FailureMode, MachineId, MachineState, Status};
pub use random::RandomSource;
pub use record::{HistoryRecord, MachineRecord, assemble};
pub use simulator::{DegradationRates, DegradationSimulator};
pub use store::FleetStore;
