//! Fleet engine: one `tick` advances every machine and analyzes the result.
//!
//! ```text
//! FleetStore ──► DegradationSimulator ──┬──► Predictor ──┐
//!  (get/init)        (advance)          └──► Detector  ──┴──► assemble ──► FleetSnapshot
//! ```
//!
//! The engine is a plain owned value. Callers that share it between threads
//! wrap it in a mutex so that advance, analysis and assembly stay atomic.

use crate::algo::{Detector, IsolationDetector, LinearTrendPredictor, Predictor};
use crate::config::EngineConfig;
use crate::error::FleetError;
use crate::machine::MachineId;
use crate::random::RandomSource;
use crate::record::{self, MachineRecord};
use crate::simulator::DegradationSimulator;
use crate::store::{Fleet, FleetStore};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, error, info, warn};

/// Records for the whole fleet, keyed by machine id
pub type FleetSnapshot = BTreeMap<MachineId, MachineRecord>;

/// Engine statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineStats {
    pub tick_count: u64,
    pub anomalies_flagged: u64,
    pub faults_injected: u64,
}

pub struct FleetEngine {
    config: EngineConfig,
    store: FleetStore,
    simulator: DegradationSimulator,
    predictor: Box<dyn Predictor>,
    detector: Box<dyn Detector>,
    rng: RandomSource,
    /// Machines whose next advance carries a fault excursion
    pending_faults: HashSet<MachineId>,
    stats: EngineStats,
}

impl FleetEngine {
    /// Engine with the linear trend predictor and the isolation detector.
    pub fn new(config: EngineConfig) -> Result<Self, FleetError> {
        let predictor = Box::new(LinearTrendPredictor::new(config.predictor.clone()));
        let detector = Box::new(IsolationDetector::new(config.detector.clone()));
        Self::with_components(config, predictor, detector)
    }

    /// Engine with caller-supplied analytics.
    pub fn with_components(
        config: EngineConfig,
        predictor: Box<dyn Predictor>,
        detector: Box<dyn Detector>,
    ) -> Result<Self, FleetError> {
        let store = FleetStore::new(config.layout.clone())?;
        let rng = RandomSource::new(config.seed);

        info!(
            machines = config.layout.len(),
            seeded = config.seed.is_some(),
            predictor = predictor.name(),
            detector = detector.name(),
            "Fleet engine configured."
        );

        Ok(Self {
            config,
            store,
            simulator: DegradationSimulator::default(),
            predictor,
            detector,
            rng,
            pending_faults: HashSet::new(),
            stats: EngineStats::default(),
        })
    }

    /// Advances every machine by one tick and returns the analyzed fleet.
    ///
    /// Either every machine is reported or the tick fails as a whole.
    pub fn tick(&mut self) -> Result<FleetSnapshot, FleetError> {
        let fleet = self.store.get_or_init(&mut self.rng);

        for (id, state) in fleet.iter_mut() {
            if self.pending_faults.remove(id) {
                debug!(machine = %id, mode = %state.failure_mode(), "Applying injected fault.");
                self.simulator.advance_with_fault(state, &mut self.rng);
            } else {
                self.simulator.advance(state, &mut self.rng);
            }
        }

        self.stats.tick_count += 1;
        let snapshot = analyze(fleet, self.predictor.as_ref(), self.detector.as_ref())?;

        let anomalies = snapshot.values().filter(|r| r.anomaly).count() as u64;
        self.stats.anomalies_flagged += anomalies;
        debug!(tick = self.stats.tick_count, anomalies, "Tick complete.");

        Ok(snapshot)
    }

    /// Analyzes the current state without advancing it.
    pub fn observe(&mut self) -> Result<FleetSnapshot, FleetError> {
        let fleet = self.store.get_or_init(&mut self.rng);
        analyze(fleet, self.predictor.as_ref(), self.detector.as_ref())
    }

    /// Discards the fleet and restarts the random source from the configured
    /// seed. The next tick builds a fresh fleet.
    pub fn reset(&mut self) {
        self.store.reset();
        self.rng = RandomSource::new(self.config.seed);
        self.pending_faults.clear();
        self.stats = EngineStats::default();
    }

    /// Schedules a one-tick sensor excursion on the machine's next advance.
    pub fn inject_fault(&mut self, machine_id: &str) -> Result<(), FleetError> {
        if !self.store.contains(machine_id) {
            return Err(FleetError::UnknownMachine(machine_id.to_string()));
        }

        if self.pending_faults.insert(machine_id.to_string()) {
            self.stats.faults_injected += 1;
            info!(machine = machine_id, "Fault scheduled for next tick.");
        }
        Ok(())
    }

    pub fn machine_ids(&self) -> Vec<MachineId> {
        self.store
            .layout()
            .slots
            .iter()
            .map(|slot| slot.id.clone())
            .collect()
    }

    pub fn tick_count(&self) -> u64 {
        self.stats.tick_count
    }

    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Raw fleet state, `None` before the first tick or observation.
    pub fn fleet(&self) -> Option<&Fleet> {
        self.store.fleet()
    }
}

fn analyze(
    fleet: &Fleet,
    predictor: &dyn Predictor,
    detector: &dyn Detector,
) -> Result<FleetSnapshot, FleetError> {
    let mut snapshot = FleetSnapshot::new();

    for (id, state) in fleet {
        if let Err(e) = state.verify(id) {
            error!(machine = %id, error = %e, "Machine state corrupted; aborting tick.");
            return Err(e);
        }

        let predicted_rul = predictor.predict(state.rul_history());
        let anomaly =
            detector.is_anomalous(state.temperature_history(), state.vibration_history());

        if anomaly {
            warn!(
                machine = %id,
                status = %state.status(),
                mode = %state.failure_mode(),
                temperature = state.temperature_history().last().copied().unwrap_or_default(),
                vibration = state.vibration_history().last().copied().unwrap_or_default(),
                "Sensor anomaly detected."
            );
        }

        let (id, record) = record::assemble(id, state, predicted_rul, anomaly);
        snapshot.insert(id, record);
    }

    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FleetLayout;
    use crate::machine::Status;

    struct ConstantPredictor(f64);

    impl Predictor for ConstantPredictor {
        fn name(&self) -> &str {
            "Constant"
        }

        fn predict(&self, _rul_history: &[f64]) -> f64 {
            self.0
        }
    }

    struct AlwaysAnomalous;

    impl Detector for AlwaysAnomalous {
        fn name(&self) -> &str {
            "Always"
        }

        fn is_anomalous(&self, _temperature: &[f64], _vibration: &[f64]) -> bool {
            true
        }
    }

    #[test]
    fn test_tick_reports_whole_fleet() {
        let mut engine = FleetEngine::new(EngineConfig::seeded(1)).unwrap();

        let snapshot = engine.tick().unwrap();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot["Machine_1"].status, Status::Ok);
        assert_eq!(snapshot["Machine_1"].history.health.len(), 2);
        assert_eq!(engine.tick_count(), 1);
    }

    #[test]
    fn test_observe_does_not_advance() {
        let mut engine = FleetEngine::new(EngineConfig::seeded(1)).unwrap();

        let first = engine.observe().unwrap();
        let second = engine.observe().unwrap();
        assert_eq!(first, second);
        assert_eq!(first["Machine_2"].history.rul.len(), 1);
        assert_eq!(engine.tick_count(), 0);
    }

    #[test]
    fn test_substituted_components() {
        let mut engine = FleetEngine::with_components(
            EngineConfig::seeded(1),
            Box::new(ConstantPredictor(12.3)),
            Box::new(AlwaysAnomalous),
        )
        .unwrap();

        let snapshot = engine.tick().unwrap();
        assert!(snapshot.values().all(|r| r.anomaly));
        assert!(snapshot.values().all(|r| r.predicted_rul == 12.3));
        assert_eq!(engine.stats().anomalies_flagged, 3);
    }

    #[test]
    fn test_reset_replays_seeded_run() {
        let mut engine = FleetEngine::new(EngineConfig::seeded(5)).unwrap();
        let first: Vec<FleetSnapshot> = (0..5).map(|_| engine.tick().unwrap()).collect();

        engine.reset();
        assert_eq!(engine.tick_count(), 0);
        assert!(engine.fleet().is_none());

        let second: Vec<FleetSnapshot> = (0..5).map(|_| engine.tick().unwrap()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_inject_fault() {
        let mut engine = FleetEngine::new(EngineConfig::seeded(9)).unwrap();
        engine.tick().unwrap();

        engine.inject_fault("Machine_1").unwrap();
        let snapshot = engine.tick().unwrap();

        let history = &snapshot["Machine_1"].history.temperature;
        let jump = history[2] - history[1];
        assert!(jump > 6.0, "thermal fault should raise temperature: {}", jump);

        // Excursion lasts a single sample
        let after = engine.tick().unwrap();
        let history = &after["Machine_1"].history.temperature;
        assert!(history[3] < history[2] - 6.0);
    }

    #[test]
    fn test_inject_fault_unknown_machine() {
        let mut engine = FleetEngine::new(EngineConfig::seeded(9)).unwrap();
        assert_eq!(
            engine.inject_fault("Machine_42"),
            Err(FleetError::UnknownMachine("Machine_42".to_string()))
        );
    }

    #[test]
    fn test_invalid_layout_is_fatal() {
        let config = EngineConfig::seeded(1).with_layout(FleetLayout { slots: Vec::new() });
        assert!(matches!(
            FleetEngine::new(config),
            Err(FleetError::Initialization(_))
        ));
    }
}
