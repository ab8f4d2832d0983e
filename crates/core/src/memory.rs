// Copyright (C) 2026 Coachline Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::CoreError;
use crate::store::FleetStore;
use coachline_domain::{BusAvailability, BusTypeTemplate, Driver, ScheduleSlot};
use std::collections::{BTreeMap, HashMap};

/// A [`FleetStore`] backed by in-process collections.
///
/// Used to exercise the validation rules without a database.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFleetStore {
    templates: HashMap<i64, BusTypeTemplate>,
    buses: HashMap<i64, BusAvailability>,
    drivers: HashMap<i64, Driver>,
    schedules: BTreeMap<i64, ScheduleSlot>,
    settlements: HashMap<i64, i64>,
}

impl InMemoryFleetStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_template(&mut self, template: BusTypeTemplate) {
        self.templates.insert(template.template_id, template);
    }

    pub fn insert_bus(&mut self, bus: BusAvailability) {
        self.buses.insert(bus.bus_id, bus);
    }

    pub fn insert_driver(&mut self, driver: Driver) {
        self.drivers.insert(driver.driver_id, driver);
    }

    /// Inserts or replaces a trip.
    pub fn insert_schedule(&mut self, slot: ScheduleSlot) {
        self.schedules.insert(slot.schedule_id, slot);
    }

    /// Records that a trip has a settlement.
    pub fn insert_settlement(&mut self, schedule_id: i64, settlement_id: i64) {
        self.settlements.insert(schedule_id, settlement_id);
    }

    fn active_schedules<F>(&self, exclude_schedule_id: Option<i64>, matches: F) -> Vec<ScheduleSlot>
    where
        F: Fn(&ScheduleSlot) -> bool,
    {
        self.schedules
            .values()
            .filter(|slot| slot.status.occupies_resources())
            .filter(|slot| exclude_schedule_id != Some(slot.schedule_id))
            .filter(|slot| matches(slot))
            .copied()
            .collect()
    }
}

impl FleetStore for InMemoryFleetStore {
    fn find_template(&mut self, template_id: i64) -> Result<Option<BusTypeTemplate>, CoreError> {
        Ok(self.templates.get(&template_id).cloned())
    }

    fn find_bus_availability(
        &mut self,
        bus_id: i64,
    ) -> Result<Option<BusAvailability>, CoreError> {
        Ok(self.buses.get(&bus_id).copied())
    }

    fn find_driver(&mut self, driver_id: i64) -> Result<Option<Driver>, CoreError> {
        Ok(self.drivers.get(&driver_id).cloned())
    }

    fn active_schedules_for_bus(
        &mut self,
        bus_id: i64,
        exclude_schedule_id: Option<i64>,
    ) -> Result<Vec<ScheduleSlot>, CoreError> {
        Ok(self.active_schedules(exclude_schedule_id, |slot| slot.bus_id == bus_id))
    }

    fn active_schedules_for_driver(
        &mut self,
        driver_id: i64,
        exclude_schedule_id: Option<i64>,
    ) -> Result<Vec<ScheduleSlot>, CoreError> {
        Ok(self.active_schedules(exclude_schedule_id, |slot| {
            slot.involves_driver(driver_id)
        }))
    }

    fn schedule_exists(&mut self, schedule_id: i64) -> Result<bool, CoreError> {
        Ok(self.schedules.contains_key(&schedule_id))
    }

    fn find_settlement_for_schedule(
        &mut self,
        schedule_id: i64,
    ) -> Result<Option<i64>, CoreError> {
        Ok(self.settlements.get(&schedule_id).copied())
    }
}
