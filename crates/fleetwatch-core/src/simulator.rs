//! Degradation model: advances one machine by one tick.
//!
//! Health and RUL count down with bounded noise; temperature and vibration
//! are coupled to the current health so they rise as the machine wears.

use crate::machine::{FailureMode, HEALTH_FLOOR, MachineState};
use crate::random::RandomSource;

/// Base temperature of a machine in perfect health
pub const BASE_TEMPERATURE: f64 = 70.0;
/// Base vibration of a machine in perfect health
pub const BASE_VIBRATION: f64 = 0.2;

const TEMPERATURE_COUPLING: f64 = 0.25;
const VIBRATION_COUPLING: f64 = 0.01;
pub(crate) const TEMPERATURE_NOISE: f64 = 0.5;
pub(crate) const VIBRATION_NOISE: f64 = 0.01;

/// Temperature implied by a health value, before noise.
pub fn temperature_for(health: f64) -> f64 {
    BASE_TEMPERATURE + (100.0 - health) * TEMPERATURE_COUPLING
}

/// Vibration implied by a health value, before noise.
pub fn vibration_for(health: f64) -> f64 {
    BASE_VIBRATION + (100.0 - health) * VIBRATION_COUPLING
}

/// Per-tick decrement ranges
#[derive(Debug, Clone, PartialEq)]
pub struct DegradationRates {
    pub health_loss: (f64, f64),
    pub rul_loss: (f64, f64),
}

impl Default for DegradationRates {
    fn default() -> Self {
        Self {
            health_loss: (0.05, 0.30),
            rul_loss: (0.5, 1.0),
        }
    }
}

/// Sensor excursion added to a single sample
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Excursion {
    pub temperature: f64,
    pub vibration: f64,
}

impl Excursion {
    /// Draws an excursion shaped by the failure mode.
    pub fn for_mode(mode: FailureMode, rng: &mut RandomSource) -> Self {
        match mode {
            FailureMode::Thermal => Self {
                temperature: rng.uniform(8.0, 12.0),
                vibration: 0.0,
            },
            FailureMode::Mechanical => Self {
                temperature: 0.0,
                vibration: rng.uniform(0.3, 0.5),
            },
            FailureMode::Hydraulic => Self {
                temperature: rng.uniform(4.0, 6.0),
                vibration: rng.uniform(0.15, 0.25),
            },
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DegradationSimulator {
    rates: DegradationRates,
}

impl DegradationSimulator {
    pub fn new(rates: DegradationRates) -> Self {
        Self { rates }
    }

    pub fn rates(&self) -> &DegradationRates {
        &self.rates
    }

    /// Appends one sample to every history of `state`.
    pub fn advance(&self, state: &mut MachineState, rng: &mut RandomSource) {
        self.step(state, rng, Excursion::default());
    }

    /// Like [`advance`](Self::advance), with a one-sample excursion shaped
    /// by the machine's failure mode.
    pub fn advance_with_fault(&self, state: &mut MachineState, rng: &mut RandomSource) {
        let excursion = Excursion::for_mode(state.failure_mode(), rng);
        self.step(state, rng, excursion);
    }

    fn step(&self, state: &mut MachineState, rng: &mut RandomSource, excursion: Excursion) {
        let last_health = state.health.last().copied().unwrap_or(HEALTH_FLOOR);
        let last_rul = state.rul.last().copied().unwrap_or(0.0);

        let (h_lo, h_hi) = self.rates.health_loss;
        let (r_lo, r_hi) = self.rates.rul_loss;

        let health = (last_health - rng.uniform(h_lo, h_hi)).max(HEALTH_FLOOR);
        let rul = (last_rul - rng.uniform(r_lo, r_hi)).max(0.0);
        let temperature =
            temperature_for(health) + rng.jitter(TEMPERATURE_NOISE) + excursion.temperature;
        let vibration = vibration_for(health) + rng.jitter(VIBRATION_NOISE) + excursion.vibration;

        state.health.push(health);
        state.rul.push(rul);
        state.temperature.push(temperature);
        state.vibration.push(vibration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::Status;

    fn machine(health: f64, rul: f64) -> MachineState {
        MachineState::new(
            Status::Critical,
            FailureMode::Hydraulic,
            health,
            rul,
            temperature_for(health),
            vibration_for(health),
        )
    }

    #[test]
    fn test_advance_appends_one_sample_everywhere() {
        let sim = DegradationSimulator::default();
        let mut rng = RandomSource::seeded(1);
        let mut state = machine(40.0, 80.0);

        sim.advance(&mut state, &mut rng);

        assert_eq!(state.len(), 2);
        assert!(state.verify("Machine_3").is_ok());
        let drop = 40.0 - state.health_history()[1];
        assert!((0.05..0.30).contains(&drop), "health drop {}", drop);
        let rul_drop = 80.0 - state.rul_history()[1];
        assert!((0.5..1.0).contains(&rul_drop), "rul drop {}", rul_drop);
    }

    #[test]
    fn test_floors_hold() {
        let sim = DegradationSimulator::default();
        let mut rng = RandomSource::seeded(2);
        let mut state = machine(5.1, 0.4);

        for _ in 0..50 {
            sim.advance(&mut state, &mut rng);
        }

        assert!(state.health_history().iter().all(|&h| h >= HEALTH_FLOOR));
        assert!(state.rul_history().iter().all(|&r| r >= 0.0));
        assert_eq!(*state.health_history().last().unwrap(), HEALTH_FLOOR);
        assert_eq!(*state.rul_history().last().unwrap(), 0.0);
    }

    #[test]
    fn test_temperature_tracks_health() {
        let sim = DegradationSimulator::default();
        let mut rng = RandomSource::seeded(3);
        let mut state = machine(40.0, 80.0);

        sim.advance(&mut state, &mut rng);

        let health = state.health_history()[1];
        let temperature = state.temperature_history()[1];
        let vibration = state.vibration_history()[1];
        assert!((temperature - temperature_for(health)).abs() <= TEMPERATURE_NOISE);
        assert!((vibration - vibration_for(health)).abs() <= VIBRATION_NOISE);
    }

    #[test]
    fn test_fault_excursion_follows_mode() {
        let sim = DegradationSimulator::default();
        let mut rng = RandomSource::seeded(4);
        let mut state = MachineState::new(
            Status::Ok,
            FailureMode::Thermal,
            100.0,
            250.0,
            temperature_for(100.0),
            vibration_for(100.0),
        );

        sim.advance_with_fault(&mut state, &mut rng);

        let health = state.health_history()[1];
        let excess = state.temperature_history()[1] - temperature_for(health);
        assert!(excess > 7.0, "thermal fault should heat the sample: {}", excess);
        assert!((state.vibration_history()[1] - vibration_for(health)).abs() <= VIBRATION_NOISE);
    }
}
