pub mod isolation;
pub mod trend;

pub use isolation::{IsolationDetector, IsolationForest};
pub use trend::{LinearFit, LinearTrendPredictor};

/// Fits a window of RUL samples and returns a forecast.
pub trait Predictor: Send + Sync {
    fn name(&self) -> &str;
    /// Never fails: degenerate windows fall back to the last known value.
    fn predict(&self, rul_history: &[f64]) -> f64;
}

/// Fits a window of (temperature, vibration) pairs and classifies the most
/// recent pair.
pub trait Detector: Send + Sync {
    fn name(&self) -> &str;
    /// Never fails: any fit problem yields `false`.
    fn is_anomalous(&self, temperature: &[f64], vibration: &[f64]) -> bool;
}

/// The last `window` entries of `values` (all of them if shorter).
pub(crate) fn tail(values: &[f64], window: usize) -> &[f64] {
    &values[values.len().saturating_sub(window)..]
}
