//! Isolation Forest for Windowed Multivariate Outlier Detection
//!
//! Builds random axis-aligned partitions over a small sample set and scores
//! each point by how quickly it becomes isolated. Points that separate from
//! the bulk after few cuts get scores close to 1.
//!
//! The forest is rebuilt from a fixed seed on every fit, so the same window
//! always yields the same classification.
//!
//! Reference: "Isolation Forest" (Liu, Ting, Zhou, ICDM 2008)

use super::{Detector, tail};
use crate::config::DetectorConfig;
use crate::error::FitError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// A node in an isolation tree
#[derive(Clone, Debug)]
enum IsoNode {
    /// Internal node with split dimension and value
    Internal {
        split_dim: usize,
        split_value: f64,
        left: Box<IsoNode>,
        right: Box<IsoNode>,
    },
    /// External node holding the number of training points that reached it
    Leaf { size: usize },
}

/// A single isolation tree
#[derive(Clone, Debug)]
struct IsoTree {
    root: IsoNode,
}

impl IsoTree {
    fn build(points: &[Vec<f64>], height_limit: usize, rng: &mut StdRng) -> Self {
        let refs: Vec<&[f64]> = points.iter().map(|p| p.as_slice()).collect();
        Self {
            root: build_recursive(&refs, 0, height_limit, rng),
        }
    }

    fn path_length(&self, point: &[f64]) -> f64 {
        path_length_recursive(&self.root, point, 0.0)
    }
}

/// Recursive construction
fn build_recursive(
    points: &[&[f64]],
    depth: usize,
    height_limit: usize,
    rng: &mut StdRng,
) -> IsoNode {
    if depth >= height_limit || points.len() <= 1 {
        return IsoNode::Leaf { size: points.len() };
    }

    // Only dimensions with spread can be cut
    let dims = points[0].len();
    let ranges: Vec<(usize, f64, f64)> = (0..dims)
        .filter_map(|d| {
            let (lo, hi) = points
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                    (lo.min(p[d]), hi.max(p[d]))
                });
            (hi > lo).then_some((d, lo, hi))
        })
        .collect();

    if ranges.is_empty() {
        return IsoNode::Leaf { size: points.len() };
    }

    let (split_dim, lo, hi) = ranges[rng.random_range(0..ranges.len())];
    let split_value = rng.random_range(lo..hi);

    let (left, right): (Vec<&[f64]>, Vec<&[f64]>) = points
        .iter()
        .copied()
        .partition(|p| p[split_dim] < split_value);

    IsoNode::Internal {
        split_dim,
        split_value,
        left: Box::new(build_recursive(&left, depth + 1, height_limit, rng)),
        right: Box::new(build_recursive(&right, depth + 1, height_limit, rng)),
    }
}

/// Depth at which `point` lands, plus the expected remaining depth of the
/// unexpanded subtree at that leaf
fn path_length_recursive(node: &IsoNode, point: &[f64], depth: f64) -> f64 {
    match node {
        IsoNode::Leaf { size } => depth + average_path_length(*size),
        IsoNode::Internal {
            split_dim,
            split_value,
            left,
            right,
        } => {
            if point[*split_dim] < *split_value {
                path_length_recursive(left, point, depth + 1.0)
            } else {
                path_length_recursive(right, point, depth + 1.0)
            }
        }
    }
}

/// Average path length of an unsuccessful BST search over `n` points
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            let harmonic = (n - 1.0).ln() + EULER_GAMMA;
            2.0 * harmonic - 2.0 * (n - 1.0) / n
        }
    }
}

/// Fitted isolation forest
#[derive(Clone, Debug)]
pub struct IsolationForest {
    trees: Vec<IsoTree>,
    /// Points used per tree
    subsample: usize,
    /// Score above which a point is an outlier
    threshold: f64,
    /// Scores of the training points, in input order
    training_scores: Vec<f64>,
}

impl IsolationForest {
    /// Fits a forest on `points` (rows of equal dimension).
    ///
    /// The decision threshold is the `1 - contamination` quantile of the
    /// training scores, so roughly `contamination` of the window sits above it.
    pub fn fit(points: &[Vec<f64>], config: &DetectorConfig) -> Result<Self, FitError> {
        let n = points.len();
        if n < 2 {
            return Err(FitError::DegenerateWindow { samples: n });
        }
        if points.iter().all(|p| p == &points[0]) {
            return Err(FitError::ZeroVariance);
        }

        let mut rng = StdRng::seed_from_u64(config.seed);
        let subsample = config.max_samples.clamp(2, n);
        let height_limit = (subsample as f64).log2().ceil() as usize;
        let num_trees = config.num_trees.max(1);

        let trees: Vec<IsoTree> = (0..num_trees)
            .map(|_| {
                let sample: Vec<Vec<f64>> = rand::seq::index::sample(&mut rng, n, subsample)
                    .into_iter()
                    .map(|i| points[i].clone())
                    .collect();
                IsoTree::build(&sample, height_limit, &mut rng)
            })
            .collect();

        let mut forest = Self {
            trees,
            subsample,
            threshold: f64::INFINITY,
            training_scores: Vec::new(),
        };

        let scores: Vec<f64> = points.iter().map(|p| forest.score(p)).collect();
        let contamination = config.contamination.clamp(0.0, 0.5);
        forest.threshold = quantile(&scores, 1.0 - contamination);
        forest.training_scores = scores;

        Ok(forest)
    }

    /// Anomaly score in (0, 1]; higher means easier to isolate.
    pub fn score(&self, point: &[f64]) -> f64 {
        let mean_path = self
            .trees
            .iter()
            .map(|tree| tree.path_length(point))
            .sum::<f64>()
            / self.trees.len() as f64;

        2f64.powf(-mean_path / average_path_length(self.subsample))
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn training_scores(&self) -> &[f64] {
        &self.training_scores
    }

    /// Whether the `index`-th training point lies above the threshold.
    pub fn is_outlier(&self, index: usize) -> bool {
        self.training_scores
            .get(index)
            .is_some_and(|&score| score > self.threshold)
    }
}

/// Linearly interpolated quantile, `q` in [0, 1]
fn quantile(values: &[f64], q: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;

    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// Window detector over paired (temperature, vibration) samples
#[derive(Debug, Clone, Default)]
pub struct IsolationDetector {
    config: DetectorConfig,
}

impl IsolationDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Pairs `temperature[len-W+t]` with `vibration[len-W+t]`.
    fn window(&self, temperature: &[f64], vibration: &[f64]) -> Vec<Vec<f64>> {
        tail(temperature, self.config.window)
            .iter()
            .zip(tail(vibration, self.config.window))
            .map(|(&t, &v)| vec![t, v])
            .collect()
    }

    /// Whether the last point clears the noise floor against the mean of the
    /// others in at least one feature
    fn exceeds_noise_floor(&self, points: &[Vec<f64>]) -> bool {
        let Some((last, rest)) = points.split_last() else {
            return false;
        };
        if rest.is_empty() {
            return false;
        }

        (0..last.len()).any(|d| {
            let mean = rest.iter().map(|p| p[d]).sum::<f64>() / rest.len() as f64;
            let floor = self.config.noise_floor.get(d).copied().unwrap_or(0.0);
            (last[d] - mean).abs() > floor
        })
    }
}

impl Detector for IsolationDetector {
    fn name(&self) -> &str {
        "IsolationForest/Sensors"
    }

    fn is_anomalous(&self, temperature: &[f64], vibration: &[f64]) -> bool {
        if temperature.len() != vibration.len() {
            return false;
        }

        let points = self.window(temperature, vibration);
        match IsolationForest::fit(&points, &self.config) {
            Ok(forest) => {
                forest.is_outlier(points.len() - 1) && self.exceeds_noise_floor(&points)
            }
            Err(_) => false,
        }
    }
}
