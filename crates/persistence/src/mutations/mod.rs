// Copyright (C) 2026 Coachline Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Write operations.
//!
//! Every mutation that reads before it writes runs inside
//! `immediate_transaction`, which takes the `SQLite` writer lock before the
//! first read. A rule violation rolls the whole transaction back and is
//! returned as `PersistenceError::Rejected`.

pub mod fleet;
pub mod schedules;
pub mod seats;
pub mod settlements;
