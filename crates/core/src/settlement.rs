// Copyright (C) 2026 Coachline Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::CoreError;
use crate::store::FleetStore;
use coachline_domain::DomainError;

/// Checks that a settlement may be opened for a trip.
///
/// A trip has at most one settlement.
///
/// # Errors
///
/// Returns `ScheduleNotFound` or `SettlementExists` as a domain violation, or
/// `CoreError::Storage` if a lookup fails.
pub fn validate_settlement_creation<S>(store: &mut S, schedule_id: i64) -> Result<(), CoreError>
where
    S: FleetStore + ?Sized,
{
    if !store.schedule_exists(schedule_id)? {
        return Err(DomainError::ScheduleNotFound(schedule_id).into());
    }
    if store.find_settlement_for_schedule(schedule_id)?.is_some() {
        return Err(DomainError::SettlementExists { schedule_id }.into());
    }
    Ok(())
}
