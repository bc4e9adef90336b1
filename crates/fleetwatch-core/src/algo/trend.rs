//! Short-window linear trend extrapolation for remaining useful life.

use super::{Predictor, tail};
use crate::config::PredictorConfig;
use crate::error::FitError;

/// Ordinary least-squares line `y = slope * t + intercept`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    /// Fits `values[i]` against `t = i`.
    pub fn fit(values: &[f64]) -> Result<Self, FitError> {
        if values.len() < 2 {
            return Err(FitError::DegenerateWindow {
                samples: values.len(),
            });
        }

        let n = values.len() as f64;
        let mean_t = (n - 1.0) / 2.0;
        let mean_y = values.iter().sum::<f64>() / n;

        let mut cov = 0.0;
        let mut var = 0.0;
        for (i, &y) in values.iter().enumerate() {
            let dt = i as f64 - mean_t;
            cov += dt * (y - mean_y);
            var += dt * dt;
        }

        let slope = cov / var;
        Ok(Self {
            slope,
            intercept: mean_y - slope * mean_t,
        })
    }

    pub fn at(&self, t: f64) -> f64 {
        self.slope * t + self.intercept
    }
}

/// Refits a line to the most recent RUL samples on every call.
#[derive(Debug, Clone, Default)]
pub struct LinearTrendPredictor {
    config: PredictorConfig,
}

impl LinearTrendPredictor {
    pub fn new(config: PredictorConfig) -> Self {
        Self { config }
    }
}

impl Predictor for LinearTrendPredictor {
    fn name(&self) -> &str {
        "LinearTrend/RUL"
    }

    fn predict(&self, rul_history: &[f64]) -> f64 {
        let window = tail(rul_history, self.config.window);

        let predicted = match LinearFit::fit(window) {
            Ok(line) => line.at(self.config.horizon),
            Err(_) => window.last().copied().unwrap_or(0.0),
        };

        predicted.max(0.0)
    }
}
