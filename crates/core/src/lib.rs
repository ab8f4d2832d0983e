// Copyright (C) 2026 Coachline Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

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

mod error;
mod memory;
mod scheduling;
mod seating;
mod settlement;
mod store;

#[cfg(test)]
mod tests;

// Re-export public types and functions
pub use error::CoreError;
pub use memory::InMemoryFleetStore;
pub use scheduling::{ensure_bus_assignable, ensure_driver_assignable, validate_schedule_proposal};
pub use seating::instantiate_bus_seating;
pub use settlement::validate_settlement_creation;
pub use store::FleetStore;
