// Copyright (C) 2026 Coachline Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Trip settlements and their expenses.
//!
//! Totals are recomputed from the stored expenses after every change to the
//! income or the expense list.

use coachline::validate_settlement_creation;
use coachline_domain::{
    DomainError, SettlementStatus, SettlementTotals, compute_totals, ensure_figures_editable,
    validate_amount, validate_settlement_transition,
};
use diesel::SqliteConnection;
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::Text;
use rust_decimal::Decimal;
use time::OffsetDateTime;
use tracing::info;

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::{NewExpense, SettlementSummary};
use crate::diesel_schema::{trip_expenses, trip_settlements};
use crate::encoding::format_timestamp;
use crate::error::PersistenceError;
use crate::queries::settlements::{
    SettlementState, expense_exists, get_settlement_state, list_expense_amounts,
};
use crate::store::ConnectionStore;

fn load_state(
    conn: &mut SqliteConnection,
    settlement_id: i64,
) -> Result<SettlementState, PersistenceError> {
    get_settlement_state(conn, settlement_id)?
        .ok_or_else(|| DomainError::SettlementNotFound(settlement_id).into())
}

/// Recomputes and stores the totals of a settlement.
fn write_totals(
    conn: &mut SqliteConnection,
    state: &SettlementState,
    total_income: Decimal,
) -> Result<SettlementSummary, PersistenceError> {
    let amounts: Vec<Decimal> = list_expense_amounts(conn, state.settlement_id)?;
    let totals: SettlementTotals = compute_totals(total_income, &amounts);

    diesel::update(
        trip_settlements::table.filter(trip_settlements::settlement_id.eq(state.settlement_id)),
    )
    .set((
        trip_settlements::total_income.eq(totals.total_income.to_string()),
        trip_settlements::total_expenses.eq(totals.total_expenses.to_string()),
        trip_settlements::net_amount.eq(totals.net_amount.to_string()),
        trip_settlements::updated_at.eq(sql::<Text>("CURRENT_TIMESTAMP")),
    ))
    .execute(conn)?;

    Ok(SettlementSummary {
        settlement_id: state.settlement_id,
        schedule_id: state.schedule_id,
        status: state.status,
        totals,
    })
}

/// Opens a pending settlement for a trip.
///
/// # Errors
///
/// Returns `Rejected` with `ScheduleNotFound`, `SettlementExists` or
/// `InvalidAmount`, or a database error.
pub fn create_settlement(
    conn: &mut SqliteConnection,
    schedule_id: i64,
    total_income: Decimal,
) -> Result<SettlementSummary, PersistenceError> {
    validate_amount(total_income)?;

    conn.immediate_transaction(|conn| {
        {
            let mut store = ConnectionStore::new(conn);
            validate_settlement_creation(&mut store, schedule_id)?;
        }

        let totals: SettlementTotals = compute_totals(total_income, &[]);
        diesel::insert_into(trip_settlements::table)
            .values((
                trip_settlements::schedule_id.eq(schedule_id),
                trip_settlements::total_income.eq(totals.total_income.to_string()),
                trip_settlements::total_expenses.eq(totals.total_expenses.to_string()),
                trip_settlements::net_amount.eq(totals.net_amount.to_string()),
                trip_settlements::status.eq(SettlementStatus::Pending.as_str()),
            ))
            .execute(conn)?;
        let settlement_id: i64 = get_last_insert_rowid(conn)?;

        info!(settlement_id, schedule_id, %total_income, "Created settlement");
        Ok(SettlementSummary {
            settlement_id,
            schedule_id,
            status: SettlementStatus::Pending,
            totals,
        })
    })
}

/// Replaces the income of a settlement.
///
/// # Errors
///
/// Returns `Rejected` with `SettlementNotFound`, `SettlementLocked` or
/// `InvalidAmount`, or a database error.
pub fn update_settlement_income(
    conn: &mut SqliteConnection,
    settlement_id: i64,
    total_income: Decimal,
) -> Result<SettlementSummary, PersistenceError> {
    validate_amount(total_income)?;

    conn.immediate_transaction(|conn| {
        let state: SettlementState = load_state(conn, settlement_id)?;
        ensure_figures_editable(settlement_id, state.status)?;

        let summary: SettlementSummary = write_totals(conn, &state, total_income)?;
        info!(
            settlement_id,
            %total_income,
            net_amount = %summary.totals.net_amount,
            "Updated settlement income"
        );
        Ok(summary)
    })
}

/// Records an expense against a settlement.
///
/// # Returns
///
/// The new expense id and the recomputed figures.
///
/// # Errors
///
/// Returns `Rejected` with `SettlementNotFound`, `SettlementLocked` or
/// `InvalidAmount`, or a database error.
pub fn add_expense(
    conn: &mut SqliteConnection,
    settlement_id: i64,
    expense: &NewExpense,
) -> Result<(i64, SettlementSummary), PersistenceError> {
    validate_amount(expense.amount)?;
    let description: Option<&str> = expense
        .description
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty());

    conn.immediate_transaction(|conn| {
        let state: SettlementState = load_state(conn, settlement_id)?;
        ensure_figures_editable(settlement_id, state.status)?;

        diesel::insert_into(trip_expenses::table)
            .values((
                trip_expenses::settlement_id.eq(settlement_id),
                trip_expenses::category.eq(expense.category.as_str()),
                trip_expenses::amount.eq(expense.amount.to_string()),
                trip_expenses::description.eq(description),
            ))
            .execute(conn)?;
        let expense_id: i64 = get_last_insert_rowid(conn)?;

        let summary: SettlementSummary = write_totals(conn, &state, state.total_income)?;
        info!(
            settlement_id,
            expense_id,
            category = %expense.category,
            amount = %expense.amount,
            net_amount = %summary.totals.net_amount,
            "Added expense"
        );
        Ok((expense_id, summary))
    })
}

/// Deletes an expense from a settlement.
///
/// # Errors
///
/// Returns `Rejected` with `SettlementNotFound`, `ExpenseNotFound` or
/// `SettlementLocked`, or a database error.
pub fn delete_expense(
    conn: &mut SqliteConnection,
    settlement_id: i64,
    expense_id: i64,
) -> Result<SettlementSummary, PersistenceError> {
    conn.immediate_transaction(|conn| {
        let state: SettlementState = load_state(conn, settlement_id)?;
        if !expense_exists(conn, settlement_id, expense_id)? {
            return Err(DomainError::ExpenseNotFound {
                settlement_id,
                expense_id,
            }
            .into());
        }
        ensure_figures_editable(settlement_id, state.status)?;

        diesel::delete(trip_expenses::table.filter(trip_expenses::expense_id.eq(expense_id)))
            .execute(conn)?;

        let summary: SettlementSummary = write_totals(conn, &state, state.total_income)?;
        info!(
            settlement_id,
            expense_id,
            net_amount = %summary.totals.net_amount,
            "Deleted expense"
        );
        Ok(summary)
    })
}

/// Moves a settlement to a new status.
///
/// Finalizing stamps `settled_at`.
///
/// # Errors
///
/// Returns `Rejected` with `SettlementNotFound` or
/// `InvalidSettlementTransition`, or a database error.
pub fn transition_settlement(
    conn: &mut SqliteConnection,
    settlement_id: i64,
    status: SettlementStatus,
) -> Result<SettlementStatus, PersistenceError> {
    conn.immediate_transaction(|conn| {
        let state: SettlementState = load_state(conn, settlement_id)?;
        validate_settlement_transition(state.status, status)?;

        let settled_at: Option<String> = if status == SettlementStatus::Finalized {
            Some(format_timestamp(OffsetDateTime::now_utc())?)
        } else {
            None
        };

        diesel::update(
            trip_settlements::table.filter(trip_settlements::settlement_id.eq(settlement_id)),
        )
        .set((
            trip_settlements::status.eq(status.as_str()),
            trip_settlements::settled_at.eq(settled_at),
            trip_settlements::updated_at.eq(sql::<Text>("CURRENT_TIMESTAMP")),
        ))
        .execute(conn)?;

        info!(settlement_id, from = %state.status, to = %status, "Transitioned settlement");
        Ok(status)
    })
}
