// Copyright (C) 2026 Coachline Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! `FleetStore` over a live connection.
//!
//! Mutations build a `ConnectionStore` on the connection of their open
//! transaction, so the rule checks see the same snapshot the write lands in.

use coachline::{CoreError, FleetStore};
use coachline_domain::{BusAvailability, BusTypeTemplate, Driver, ScheduleSlot};
use diesel::SqliteConnection;

use crate::error::PersistenceError;
use crate::queries::{fleet, schedules, settlements};

/// Rule-check lookups bound to one connection.
pub struct ConnectionStore<'a> {
    conn: &'a mut SqliteConnection,
}

impl<'a> ConnectionStore<'a> {
    pub const fn new(conn: &'a mut SqliteConnection) -> Self {
        Self { conn }
    }
}

fn storage(err: PersistenceError) -> CoreError {
    CoreError::Storage(err.to_string())
}

impl FleetStore for ConnectionStore<'_> {
    fn find_template(&mut self, template_id: i64) -> Result<Option<BusTypeTemplate>, CoreError> {
        fleet::get_template(self.conn, template_id).map_err(storage)
    }

    fn find_bus_availability(
        &mut self,
        bus_id: i64,
    ) -> Result<Option<BusAvailability>, CoreError> {
        fleet::get_bus_availability(self.conn, bus_id).map_err(storage)
    }

    fn find_driver(&mut self, driver_id: i64) -> Result<Option<Driver>, CoreError> {
        fleet::get_driver(self.conn, driver_id).map_err(storage)
    }

    fn active_schedules_for_bus(
        &mut self,
        bus_id: i64,
        exclude_schedule_id: Option<i64>,
    ) -> Result<Vec<ScheduleSlot>, CoreError> {
        schedules::active_slots_for_bus(self.conn, bus_id, exclude_schedule_id).map_err(storage)
    }

    fn active_schedules_for_driver(
        &mut self,
        driver_id: i64,
        exclude_schedule_id: Option<i64>,
    ) -> Result<Vec<ScheduleSlot>, CoreError> {
        schedules::active_slots_for_driver(self.conn, driver_id, exclude_schedule_id)
            .map_err(storage)
    }

    fn schedule_exists(&mut self, schedule_id: i64) -> Result<bool, CoreError> {
        schedules::schedule_exists(self.conn, schedule_id).map_err(storage)
    }

    fn find_settlement_for_schedule(
        &mut self,
        schedule_id: i64,
    ) -> Result<Option<i64>, CoreError> {
        settlements::find_settlement_for_schedule(self.conn, schedule_id).map_err(storage)
    }
}
