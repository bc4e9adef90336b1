//! Owner of the per-machine simulation state.
//!
//! The fleet is built lazily from the layout on first use and kept until an
//! explicit `reset`. Machines cannot be added or removed individually.

use crate::config::{FleetLayout, MachineSlot};
use crate::error::FleetError;
use crate::machine::{MachineId, MachineState};
use crate::random::RandomSource;
use crate::simulator::{self, TEMPERATURE_NOISE, VIBRATION_NOISE};
use std::collections::BTreeMap;
use tracing::info;

pub type Fleet = BTreeMap<MachineId, MachineState>;

pub struct FleetStore {
    layout: FleetLayout,
    fleet: Option<Fleet>,
}

impl FleetStore {
    /// Validates the layout up front; an invalid table is fatal.
    pub fn new(layout: FleetLayout) -> Result<Self, FleetError> {
        layout.validate()?;
        Ok(Self {
            layout,
            fleet: None,
        })
    }

    pub fn layout(&self) -> &FleetLayout {
        &self.layout
    }

    pub fn is_initialized(&self) -> bool {
        self.fleet.is_some()
    }

    /// Returns the fleet, creating it on the first call.
    pub fn get_or_init(&mut self, rng: &mut RandomSource) -> &mut Fleet {
        let layout = &self.layout;
        self.fleet.get_or_insert_with(|| {
            let fleet: Fleet = layout
                .slots
                .iter()
                .map(|slot| (slot.id.clone(), initial_state(slot, rng)))
                .collect();
            info!(machines = fleet.len(), "Fleet initialized.");
            fleet
        })
    }

    /// Read-only view, `None` before initialization.
    pub fn fleet(&self) -> Option<&Fleet> {
        self.fleet.as_ref()
    }

    /// Drops the fleet; the next `get_or_init` builds a fresh one.
    pub fn reset(&mut self) {
        if self.fleet.take().is_some() {
            info!("Fleet reset.");
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.layout.slots.iter().any(|slot| slot.id == id)
    }
}

fn initial_state(slot: &MachineSlot, rng: &mut RandomSource) -> MachineState {
    let health = slot.status.base_health();
    let temperature = simulator::temperature_for(health) + rng.jitter(TEMPERATURE_NOISE);
    let vibration = simulator::vibration_for(health) + rng.jitter(VIBRATION_NOISE);

    MachineState::new(
        slot.status,
        slot.failure_mode,
        health,
        slot.status.base_rul(),
        temperature,
        vibration,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::Status;

    #[test]
    fn test_lazy_init_creates_layout() {
        let mut store = FleetStore::new(FleetLayout::default()).unwrap();
        let mut rng = RandomSource::seeded(11);
        assert!(!store.is_initialized());

        let fleet = store.get_or_init(&mut rng);
        assert_eq!(fleet.len(), 3);

        let critical = &fleet["Machine_3"];
        assert_eq!(critical.status(), Status::Critical);
        assert_eq!(critical.health_history(), &[40.0]);
        assert_eq!(critical.rul_history(), &[80.0]);
        assert_eq!(critical.len(), 1);
    }

    #[test]
    fn test_second_call_returns_same_fleet() {
        let mut store = FleetStore::new(FleetLayout::default()).unwrap();
        let mut rng = RandomSource::seeded(11);

        let first = store.get_or_init(&mut rng).clone();
        let second = store.get_or_init(&mut rng).clone();
        assert_eq!(first, second);
    }

    #[test]
    fn test_reset_rebuilds() {
        let mut store = FleetStore::new(FleetLayout::default()).unwrap();
        let mut rng = RandomSource::seeded(11);
        store.get_or_init(&mut rng);

        store.reset();
        assert!(!store.is_initialized());
        assert_eq!(store.get_or_init(&mut rng).len(), 3);
    }

    #[test]
    fn test_invalid_layout_rejected() {
        let result = FleetStore::new(FleetLayout { slots: Vec::new() });
        assert!(matches!(result, Err(FleetError::Initialization(_))));
    }
}
