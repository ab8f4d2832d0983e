// Copyright (C) 2026 Coachline Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::CoreError;
use coachline_domain::{BusAvailability, BusTypeTemplate, Driver, ScheduleSlot};

/// Read access to fleet records needed by the validation rules.
///
/// Implementations report a missing record as `Ok(None)`; the rules decide
/// which missing record is an error. Lookups take `&mut self` so that an
/// implementation can run them on a live database connection.
pub trait FleetStore {
    /// Loads a bus type template.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Storage` if the lookup fails.
    fn find_template(&mut self, template_id: i64) -> Result<Option<BusTypeTemplate>, CoreError>;

    /// Loads the assignment-relevant fields of a bus.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Storage` if the lookup fails.
    fn find_bus_availability(&mut self, bus_id: i64)
    -> Result<Option<BusAvailability>, CoreError>;

    /// Loads a driver.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Storage` if the lookup fails.
    fn find_driver(&mut self, driver_id: i64) -> Result<Option<Driver>, CoreError>;

    /// Lists scheduled and in-progress trips using a bus.
    ///
    /// # Arguments
    ///
    /// * `bus_id` - The bus
    /// * `exclude_schedule_id` - A trip to leave out (the one being updated)
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Storage` if the lookup fails.
    fn active_schedules_for_bus(
        &mut self,
        bus_id: i64,
        exclude_schedule_id: Option<i64>,
    ) -> Result<Vec<ScheduleSlot>, CoreError>;

    /// Lists scheduled and in-progress trips on which a driver is primary or
    /// secondary.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Storage` if the lookup fails.
    fn active_schedules_for_driver(
        &mut self,
        driver_id: i64,
        exclude_schedule_id: Option<i64>,
    ) -> Result<Vec<ScheduleSlot>, CoreError>;

    /// Returns whether a trip exists.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Storage` if the lookup fails.
    fn schedule_exists(&mut self, schedule_id: i64) -> Result<bool, CoreError>;

    /// Returns the settlement id recorded for a trip, if any.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Storage` if the lookup fails.
    fn find_settlement_for_schedule(&mut self, schedule_id: i64)
    -> Result<Option<i64>, CoreError>;
}
