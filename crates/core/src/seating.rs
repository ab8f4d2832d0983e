// Copyright (C) 2026 Coachline Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::CoreError;
use crate::store::FleetStore;
use coachline_domain::{BusTypeTemplate, DomainError, SeatInstantiation, instantiate_from_template};

/// Loads a template and builds the seating for a new bus from it.
///
/// # Arguments
///
/// * `store` - Access to templates
/// * `template_id` - The template to copy
/// * `bus_id` - The bus the seat records belong to
///
/// # Errors
///
/// Returns `TemplateNotFound` or `InvalidSeatMatrix` as a domain violation,
/// or `CoreError::Storage` if the lookup fails.
pub fn instantiate_bus_seating<S>(
    store: &mut S,
    template_id: i64,
    bus_id: i64,
) -> Result<SeatInstantiation, CoreError>
where
    S: FleetStore + ?Sized,
{
    let template: BusTypeTemplate = store
        .find_template(template_id)?
        .ok_or(DomainError::TemplateNotFound(template_id))?;

    Ok(instantiate_from_template(&template, bus_id)?)
}
