// Copyright (C) 2026 Coachline Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.
//!
//! - `fleet` - Companies, routes, drivers, templates, buses and seat records
//! - `schedules` - Trips and the active trips holding a bus or driver
//! - `settlements` - Settlements, expenses and the relation chain for display
//!
//! Lookups by id return `Ok(None)` for a missing row.

pub mod fleet;
pub mod schedules;
pub mod settlements;
