// Copyright (C) 2026 Coachline Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Conversions between domain values and their stored text form.
//!
//! Timestamps are stored as RFC 3339 in UTC so that text order matches time
//! order. Money is stored as decimal text. Flags are stored as 0/1.

use rust_decimal::Decimal;
use std::str::FromStr;
use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, UtcOffset};

use crate::error::PersistenceError;

pub fn format_timestamp(value: OffsetDateTime) -> Result<String, PersistenceError> {
    value
        .to_offset(UtcOffset::UTC)
        .format(&Rfc3339)
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))
}

pub fn format_optional_timestamp(
    value: Option<OffsetDateTime>,
) -> Result<Option<String>, PersistenceError> {
    value.map(format_timestamp).transpose()
}

pub fn parse_timestamp(column: &'static str, value: &str) -> Result<OffsetDateTime, PersistenceError> {
    OffsetDateTime::parse(value, &Rfc3339).map_err(|_| PersistenceError::CorruptValue {
        column,
        value: value.to_string(),
    })
}

pub fn parse_optional_timestamp(
    column: &'static str,
    value: Option<&str>,
) -> Result<Option<OffsetDateTime>, PersistenceError> {
    value.map(|text| parse_timestamp(column, text)).transpose()
}

pub fn parse_decimal(column: &'static str, value: &str) -> Result<Decimal, PersistenceError> {
    Decimal::from_str(value).map_err(|_| PersistenceError::CorruptValue {
        column,
        value: value.to_string(),
    })
}

/// Parses a stored status or category string.
pub fn parse_stored<T: FromStr>(column: &'static str, value: &str) -> Result<T, PersistenceError> {
    T::from_str(value).map_err(|_| PersistenceError::CorruptValue {
        column,
        value: value.to_string(),
    })
}

pub fn flag(value: bool) -> i32 {
    i32::from(value)
}

pub const fn is_set(value: i32) -> bool {
    value != 0
}
