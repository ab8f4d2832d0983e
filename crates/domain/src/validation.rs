// Copyright (C) 2026 Coachline Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::seat_matrix::{Floor, SeatMatrix};
use crate::types::FloorTag;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::str::FromStr;

/// Maximum length of a normalized plate number.
const MAX_PLATE_NUMBER_LEN: usize = 16;

/// Validates the shape of a seat matrix.
///
/// # Errors
///
/// Returns `DomainError::InvalidSeatMatrix` if:
/// - A present floor has zero rows or zero seats per row
/// - A seat lies outside its floor's grid
/// - Two cells on the same floor share a position
/// - A seat id is empty or repeated anywhere in the matrix
/// - A sellable seat has an empty name, or two sellable seats share a name
/// - An empty slot carries a tier
pub fn validate_seat_matrix(matrix: &SeatMatrix) -> Result<(), DomainError> {
    let mut seen_ids: HashSet<&str> = HashSet::new();
    let mut seen_names: HashSet<&str> = HashSet::new();

    for (tag, floor) in matrix.floors() {
        validate_floor_dimensions(tag, floor)?;

        let mut seen_positions: HashSet<(u32, u32)> = HashSet::new();
        for seat in &floor.seats {
            if seat.id.trim().is_empty() {
                return Err(DomainError::InvalidSeatMatrix(format!(
                    "{tag} floor has a seat without an id"
                )));
            }

            // Rule: ids are unique across both floors
            if !seen_ids.insert(seat.id.as_str()) {
                return Err(DomainError::InvalidSeatMatrix(format!(
                    "seat id '{}' appears more than once",
                    seat.id
                )));
            }

            if seat.row >= floor.dimensions.rows || seat.column >= floor.dimensions.seats_per_row {
                return Err(DomainError::InvalidSeatMatrix(format!(
                    "seat '{}' at row {} column {} lies outside the {}x{} {tag} floor",
                    seat.id,
                    seat.row,
                    seat.column,
                    floor.dimensions.rows,
                    floor.dimensions.seats_per_row
                )));
            }

            if !seen_positions.insert((seat.row, seat.column)) {
                return Err(DomainError::InvalidSeatMatrix(format!(
                    "{tag} floor has two seats at row {} column {}",
                    seat.row, seat.column
                )));
            }

            if seat.is_empty && seat.tier_id.is_some() {
                return Err(DomainError::InvalidSeatMatrix(format!(
                    "empty slot '{}' cannot carry a tier",
                    seat.id
                )));
            }

            // Rule: seats are matched to seat records by name, and an empty
            // slot can be made sellable later
            if seat.name.trim().is_empty() {
                return Err(DomainError::InvalidSeatMatrix(format!(
                    "seat '{}' has no name",
                    seat.id
                )));
            }
            if !seen_names.insert(seat.name.as_str()) {
                return Err(DomainError::InvalidSeatMatrix(format!(
                    "seat name '{}' is used by more than one seat",
                    seat.name
                )));
            }
        }
    }

    Ok(())
}

fn validate_floor_dimensions(tag: FloorTag, floor: &Floor) -> Result<(), DomainError> {
    if floor.dimensions.rows == 0 {
        return Err(DomainError::InvalidSeatMatrix(format!(
            "{tag} floor must have at least one row"
        )));
    }
    if floor.dimensions.seats_per_row == 0 {
        return Err(DomainError::InvalidSeatMatrix(format!(
            "{tag} floor must have at least one seat per row"
        )));
    }
    Ok(())
}

/// Normalizes and validates a plate number.
///
/// Plate numbers are trimmed and uppercased so that uniqueness is
/// case-insensitive.
///
/// # Errors
///
/// Returns `DomainError::InvalidField` if the plate is empty, too long, or
/// contains characters other than ASCII letters, digits, spaces and dashes.
pub fn normalize_plate_number(plate_number: &str) -> Result<String, DomainError> {
    let normalized: String = plate_number.trim().to_uppercase();

    if normalized.is_empty() {
        return Err(DomainError::InvalidField {
            field: "plate_number",
            message: String::from("Plate number cannot be empty"),
        });
    }
    if normalized.len() > MAX_PLATE_NUMBER_LEN {
        return Err(DomainError::InvalidField {
            field: "plate_number",
            message: format!("Plate number cannot exceed {MAX_PLATE_NUMBER_LEN} characters"),
        });
    }
    if !normalized
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == ' ')
    {
        return Err(DomainError::InvalidField {
            field: "plate_number",
            message: format!("Plate number '{normalized}' contains invalid characters"),
        });
    }

    Ok(normalized)
}

/// Validates that a required text field is not blank.
///
/// # Errors
///
/// Returns `DomainError::InvalidField` if the value is empty after trimming.
pub fn validate_required(field: &'static str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::InvalidField {
            field,
            message: format!("{field} cannot be empty"),
        });
    }
    Ok(())
}

/// Parses a non-negative monetary amount.
///
/// # Errors
///
/// Returns `DomainError::InvalidAmount` if the value is not a decimal number
/// or is negative.
pub fn parse_amount(value: &str) -> Result<Decimal, DomainError> {
    let amount: Decimal = Decimal::from_str(value.trim())
        .map_err(|e| DomainError::InvalidAmount(format!("'{value}' is not a number: {e}")))?;
    validate_amount(amount)?;
    Ok(amount)
}

/// Validates that an amount is not negative.
///
/// # Errors
///
/// Returns `DomainError::InvalidAmount` if the amount is below zero.
pub fn validate_amount(amount: Decimal) -> Result<(), DomainError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(DomainError::InvalidAmount(format!(
            "{amount} must not be negative"
        )));
    }
    Ok(())
}
