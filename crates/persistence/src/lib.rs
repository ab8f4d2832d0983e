// Copyright (C) 2026 Coachline Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! `SQLite` persistence for the Coachline fleet backend.
//!
//! Built on Diesel with embedded migrations. The adapter owns one connection
//! and exposes the fleet, seating, scheduling and settlement operations.
//!
//! ## Transactions
//!
//! Operations that check a rule before writing run the check and the write
//! inside one `BEGIN IMMEDIATE` transaction, so the writer lock is held from
//! the first read. A rule violation is returned as
//! [`PersistenceError::Rejected`] and leaves the database untouched.
//!
//! ## Storage formats
//!
//! - Seat matrices are stored as camelCase JSON text
//! - Timestamps are RFC 3339 text in UTC
//! - Money is decimal text
//!
//! ## Testing
//!
//! [`Persistence::new_in_memory`] gives every caller its own named shared
//! in-memory database, so tests never see each other's rows.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use coachline_domain::{
    BusTypeTemplate, Driver, Schedule, ScheduleStatus, SeatMatrix, SeatStatus, SettlementRecord,
    SettlementStatus,
};
use diesel::SqliteConnection;
use rust_decimal::Decimal;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

mod backend;
mod data_models;
mod diesel_schema;
mod encoding;
mod error;
mod mutations;
mod queries;
mod store;

#[cfg(test)]
mod tests;

pub use data_models::{
    BusLayout, BusStatusUpdate, NewBus, NewExpense, NewSchedule, ScheduleAssignment,
    SettlementSummary,
};
pub use error::PersistenceError;

/// Atomic counter for generating unique in-memory database names.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Persistence adapter over a single `SQLite` connection.
pub struct Persistence {
    conn: SqliteConnection,
}

impl Persistence {
    /// Creates a persistence adapter over a fresh in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        // A named shared-cache database per call keeps tests isolated.
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:memdb_test_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a persistence adapter over a database file, creating it if needed.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::configure_file_database(&mut conn)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        info!(path = path_str, "Opened database file");
        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        backend::sqlite::verify_foreign_key_enforcement(&mut self.conn)
    }

    // ========================================================================
    // Companies, Routes & Drivers
    // ========================================================================

    /// Creates a company.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank or the insert fails.
    pub fn create_company(&mut self, name: &str) -> Result<i64, PersistenceError> {
        mutations::fleet::insert_company(&mut self.conn, name)
    }

    /// Creates a route between two places.
    ///
    /// # Errors
    ///
    /// Returns an error if an endpoint is blank or the insert fails.
    pub fn create_route(&mut self, origin: &str, destination: &str) -> Result<i64, PersistenceError> {
        mutations::fleet::insert_route(&mut self.conn, origin, destination)
    }

    /// Creates a recurring `HH:MM` departure slot of a route.
    ///
    /// # Errors
    ///
    /// Returns an error if the route does not exist, the time is malformed or
    /// the insert fails.
    pub fn create_route_schedule(
        &mut self,
        route_id: i64,
        departure_time: &str,
    ) -> Result<i64, PersistenceError> {
        mutations::fleet::insert_route_schedule(&mut self.conn, route_id, departure_time)
    }

    /// Creates an active driver.
    ///
    /// # Errors
    ///
    /// Returns an error if a field is blank, the license number is taken or
    /// the insert fails.
    pub fn create_driver(
        &mut self,
        full_name: &str,
        license_number: &str,
    ) -> Result<i64, PersistenceError> {
        mutations::fleet::insert_driver(&mut self.conn, full_name, license_number)
    }

    /// Retrieves a driver.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_driver(&mut self, driver_id: i64) -> Result<Option<Driver>, PersistenceError> {
        queries::fleet::get_driver(&mut self.conn, driver_id)
    }

    /// Activates or deactivates a driver.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver does not exist or the update fails.
    pub fn set_driver_active(
        &mut self,
        driver_id: i64,
        is_active: bool,
    ) -> Result<(), PersistenceError> {
        mutations::fleet::set_driver_active(&mut self.conn, driver_id, is_active)
    }

    // ========================================================================
    // Templates & Buses
    // ========================================================================

    /// Creates a bus type template from a validated seat matrix.
    ///
    /// # Errors
    ///
    /// Returns an error if the matrix is malformed or the insert fails.
    pub fn create_template(
        &mut self,
        name: &str,
        seat_matrix: &SeatMatrix,
    ) -> Result<i64, PersistenceError> {
        mutations::fleet::insert_template(&mut self.conn, name, seat_matrix)
    }

    /// Retrieves a bus type template.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_template(
        &mut self,
        template_id: i64,
    ) -> Result<Option<BusTypeTemplate>, PersistenceError> {
        queries::fleet::get_template(&mut self.conn, template_id)
    }

    /// Registers a bus, copying the template's seating onto it.
    ///
    /// # Errors
    ///
    /// Returns an error if the template or company is missing, the plate is
    /// invalid or taken, or a write fails.
    pub fn create_bus(&mut self, new_bus: &NewBus) -> Result<i64, PersistenceError> {
        mutations::fleet::create_bus(&mut self.conn, new_bus)
    }

    /// Retrieves a bus with its seat records overlaid on its layout.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_bus_layout(&mut self, bus_id: i64) -> Result<Option<BusLayout>, PersistenceError> {
        queries::fleet::get_bus_layout(&mut self.conn, bus_id)
    }

    /// Updates a bus's active flag and maintenance status.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus does not exist or the update fails.
    pub fn update_bus_status(
        &mut self,
        bus_id: i64,
        update: BusStatusUpdate,
    ) -> Result<(), PersistenceError> {
        mutations::fleet::update_bus_status(&mut self.conn, bus_id, update)
    }

    // ========================================================================
    // Seats
    // ========================================================================

    /// Marks seats empty or sellable and reconciles the seat records.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus does not exist or a write fails.
    pub fn set_seats_empty(
        &mut self,
        bus_id: i64,
        seat_ids: &[String],
        is_empty: bool,
    ) -> Result<BusLayout, PersistenceError> {
        mutations::seats::set_seats_empty(&mut self.conn, bus_id, seat_ids, is_empty)
    }

    /// Assigns a pricing tier to seats.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus does not exist, the tier is blank or a
    /// write fails.
    pub fn apply_seat_tier(
        &mut self,
        bus_id: i64,
        seat_ids: &[String],
        tier_id: &str,
    ) -> Result<BusLayout, PersistenceError> {
        mutations::seats::apply_seat_tier(&mut self.conn, bus_id, seat_ids, tier_id)
    }

    /// Sets the operational status of seats.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus does not exist or a write fails.
    pub fn apply_seat_status(
        &mut self,
        bus_id: i64,
        seat_ids: &[String],
        status: SeatStatus,
    ) -> Result<BusLayout, PersistenceError> {
        mutations::seats::apply_seat_status(&mut self.conn, bus_id, seat_ids, status)
    }

    // ========================================================================
    // Schedules
    // ========================================================================

    /// Reserves a trip, checking for conflicts in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::Rejected` if validation fails or the bus or
    /// a driver is already booked, or a database error.
    pub fn reserve_schedule(&mut self, new_schedule: &NewSchedule) -> Result<i64, PersistenceError> {
        mutations::schedules::reserve_schedule(&mut self.conn, new_schedule)
    }

    /// Retrieves a trip.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_schedule(&mut self, schedule_id: i64) -> Result<Option<Schedule>, PersistenceError> {
        queries::schedules::get_schedule(&mut self.conn, schedule_id)
    }

    /// Lists trips by departure, optionally only those in one status.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_schedules(
        &mut self,
        status: Option<ScheduleStatus>,
    ) -> Result<Vec<Schedule>, PersistenceError> {
        queries::schedules::list_schedules(&mut self.conn, status)
    }

    /// Changes a trip's bus, drivers, times or price.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::Rejected` if the trip is missing, the new
    /// assignment is invalid or conflicts, or a database error.
    pub fn update_schedule(
        &mut self,
        schedule_id: i64,
        assignment: &ScheduleAssignment,
    ) -> Result<Schedule, PersistenceError> {
        mutations::schedules::update_schedule_assignment(&mut self.conn, schedule_id, assignment)
    }

    /// Sets a trip's status.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::Rejected` if the trip is missing or a
    /// reactivated trip conflicts, or a database error.
    pub fn update_schedule_status(
        &mut self,
        schedule_id: i64,
        status: ScheduleStatus,
    ) -> Result<Schedule, PersistenceError> {
        mutations::schedules::update_schedule_status(&mut self.conn, schedule_id, status)
    }

    // ========================================================================
    // Settlements
    // ========================================================================

    /// Opens a pending settlement for a trip.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::Rejected` if the trip is missing or already
    /// settled, or a database error.
    pub fn create_settlement(
        &mut self,
        schedule_id: i64,
        total_income: Decimal,
    ) -> Result<SettlementSummary, PersistenceError> {
        mutations::settlements::create_settlement(&mut self.conn, schedule_id, total_income)
    }

    /// Loads a settlement with its expenses and relations.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub fn get_settlement(
        &mut self,
        settlement_id: i64,
    ) -> Result<Option<SettlementRecord>, PersistenceError> {
        queries::settlements::load_settlement_record(&mut self.conn, settlement_id)
    }

    /// Loads all settlements, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub fn list_settlements(
        &mut self,
        status: Option<SettlementStatus>,
    ) -> Result<Vec<SettlementRecord>, PersistenceError> {
        queries::settlements::list_settlement_records(&mut self.conn, status)
    }

    /// Replaces a settlement's income.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::Rejected` if the settlement is missing or
    /// locked, or a database error.
    pub fn update_settlement_income(
        &mut self,
        settlement_id: i64,
        total_income: Decimal,
    ) -> Result<SettlementSummary, PersistenceError> {
        mutations::settlements::update_settlement_income(&mut self.conn, settlement_id, total_income)
    }

    /// Records an expense and returns its id with the new figures.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::Rejected` if the settlement is missing or
    /// locked, or a database error.
    pub fn add_expense(
        &mut self,
        settlement_id: i64,
        expense: &NewExpense,
    ) -> Result<(i64, SettlementSummary), PersistenceError> {
        mutations::settlements::add_expense(&mut self.conn, settlement_id, expense)
    }

    /// Deletes an expense.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::Rejected` if the settlement or expense is
    /// missing or the settlement is locked, or a database error.
    pub fn delete_expense(
        &mut self,
        settlement_id: i64,
        expense_id: i64,
    ) -> Result<SettlementSummary, PersistenceError> {
        mutations::settlements::delete_expense(&mut self.conn, settlement_id, expense_id)
    }

    /// Moves a settlement to a new status.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::Rejected` if the settlement is missing or
    /// the transition is not allowed, or a database error.
    pub fn transition_settlement(
        &mut self,
        settlement_id: i64,
        status: SettlementStatus,
    ) -> Result<SettlementStatus, PersistenceError> {
        mutations::settlements::transition_settlement(&mut self.conn, settlement_id, status)
    }
}
