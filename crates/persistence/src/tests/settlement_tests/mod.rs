// Copyright (C) 2026 Coachline Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{TestFleet, at, create_test_fleet, create_test_schedule};
use crate::{NewExpense, Persistence, PersistenceError, SettlementSummary};
use coachline_domain::{
    DomainError, ExpenseCategory, SettlementRecord, SettlementStatus, SettlementView,
    format_settlement,
};
use rust_decimal::Decimal;

/// Creates the fleet, one trip on bus A driven by X, and its settlement
/// with an income of 5,000,000.
fn create_test_settlement(persistence: &mut Persistence) -> (TestFleet, i64) {
    let fleet: TestFleet = create_test_fleet(persistence);
    let schedule_id: i64 = persistence
        .reserve_schedule(&create_test_schedule(
            &fleet,
            fleet.bus_a,
            fleet.driver_x,
            None,
            (8, 0),
            (14, 0),
        ))
        .unwrap();
    let summary: SettlementSummary = persistence
        .create_settlement(schedule_id, Decimal::new(5_000_000, 0))
        .unwrap();
    (fleet, summary.settlement_id)
}

fn expense(category: ExpenseCategory, amount: i64) -> NewExpense {
    NewExpense {
        category,
        amount: Decimal::new(amount, 0),
        description: None,
    }
}

#[test]
fn test_create_settlement_starts_pending() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let (_, settlement_id) = create_test_settlement(&mut persistence);

    let record: SettlementRecord = persistence.get_settlement(settlement_id).unwrap().unwrap();

    assert_eq!(record.status, SettlementStatus::Pending);
    assert_eq!(record.total_income.as_deref(), Some("5000000"));
    assert_eq!(record.net_amount.as_deref(), Some("5000000"));
    assert!(record.expenses.is_empty());
    assert_eq!(record.settled_at, None);
}

#[test]
fn test_second_settlement_for_schedule_rejected() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let (_, settlement_id) = create_test_settlement(&mut persistence);
    let schedule_id: i64 = persistence
        .get_settlement(settlement_id)
        .unwrap()
        .unwrap()
        .schedule_id;

    let err: PersistenceError = persistence
        .create_settlement(schedule_id, Decimal::ZERO)
        .unwrap_err();

    assert_eq!(
        err.domain_violation(),
        Some(&DomainError::SettlementExists { schedule_id })
    );
}

#[test]
fn test_settlement_for_unknown_schedule_rejected() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();

    let err: PersistenceError = persistence
        .create_settlement(31, Decimal::ZERO)
        .unwrap_err();

    assert_eq!(err.domain_violation(), Some(&DomainError::ScheduleNotFound(31)));
}

#[test]
fn test_expenses_recompute_net_amount() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let (_, settlement_id) = create_test_settlement(&mut persistence);

    let (fuel_id, _) = persistence
        .add_expense(settlement_id, &expense(ExpenseCategory::Fuel, 1_200_000))
        .unwrap();
    let (_, summary) = persistence
        .add_expense(settlement_id, &expense(ExpenseCategory::Tolls, 300_000))
        .unwrap();

    assert_eq!(summary.totals.total_expenses, Decimal::new(1_500_000, 0));
    assert_eq!(summary.totals.net_amount, Decimal::new(3_500_000, 0));

    let summary: SettlementSummary = persistence.delete_expense(settlement_id, fuel_id).unwrap();
    assert_eq!(summary.totals.total_expenses, Decimal::new(300_000, 0));
    assert_eq!(summary.totals.net_amount, Decimal::new(4_700_000, 0));

    let summary: SettlementSummary = persistence
        .update_settlement_income(settlement_id, Decimal::new(200_000, 0))
        .unwrap();
    assert_eq!(summary.totals.net_amount, Decimal::new(-100_000, 0));
}

#[test]
fn test_approved_settlement_locks_expenses_and_income() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let (_, settlement_id) = create_test_settlement(&mut persistence);
    let (expense_id, _) = persistence
        .add_expense(settlement_id, &expense(ExpenseCategory::Fuel, 100))
        .unwrap();

    persistence
        .transition_settlement(settlement_id, SettlementStatus::Approved)
        .unwrap();

    let locked: DomainError = DomainError::SettlementLocked {
        settlement_id,
        status: SettlementStatus::Approved,
    };
    let add: PersistenceError = persistence
        .add_expense(settlement_id, &expense(ExpenseCategory::Other, 5))
        .unwrap_err();
    let delete: PersistenceError = persistence
        .delete_expense(settlement_id, expense_id)
        .unwrap_err();
    let income: PersistenceError = persistence
        .update_settlement_income(settlement_id, Decimal::ONE)
        .unwrap_err();

    assert_eq!(add.domain_violation(), Some(&locked));
    assert_eq!(delete.domain_violation(), Some(&locked));
    assert_eq!(income.domain_violation(), Some(&locked));
    assert_eq!(
        persistence
            .get_settlement(settlement_id)
            .unwrap()
            .unwrap()
            .expenses
            .len(),
        1
    );
}

#[test]
fn test_delete_unknown_expense_rejected() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let (_, settlement_id) = create_test_settlement(&mut persistence);

    let err: PersistenceError = persistence.delete_expense(settlement_id, 99).unwrap_err();

    assert_eq!(
        err.domain_violation(),
        Some(&DomainError::ExpenseNotFound {
            settlement_id,
            expense_id: 99,
        })
    );
}

#[test]
fn test_settlement_transitions() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let (_, settlement_id) = create_test_settlement(&mut persistence);

    let err: PersistenceError = persistence
        .transition_settlement(settlement_id, SettlementStatus::Finalized)
        .unwrap_err();
    assert_eq!(
        err.domain_violation(),
        Some(&DomainError::InvalidSettlementTransition {
            from: SettlementStatus::Pending,
            to: SettlementStatus::Finalized,
        })
    );

    persistence
        .transition_settlement(settlement_id, SettlementStatus::Approved)
        .unwrap();
    persistence
        .transition_settlement(settlement_id, SettlementStatus::Finalized)
        .unwrap();

    let record: SettlementRecord = persistence.get_settlement(settlement_id).unwrap().unwrap();
    assert_eq!(record.status, SettlementStatus::Finalized);
    assert!(record.settled_at.is_some());
}

#[test]
fn test_settlement_view_carries_relations() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let (_, settlement_id) = create_test_settlement(&mut persistence);
    persistence
        .add_expense(
            settlement_id,
            &NewExpense {
                category: ExpenseCategory::DriverAllowance,
                amount: Decimal::new(25_050, 2),
                description: Some(String::from("  meals ")),
            },
        )
        .unwrap();

    let view: SettlementView =
        format_settlement(&persistence.get_settlement(settlement_id).unwrap().unwrap());

    assert_eq!(view.route_name, "Saigon - Da Lat");
    assert_eq!(view.plate_number, "51B-11111");
    assert_eq!(view.bus_type, "Coach 40");
    assert_eq!(view.owner_name, "Phuong Trang");
    assert_eq!(view.driver_name.as_deref(), Some("Nguyen Van X"));
    assert_eq!(view.departure_time, Some(at(8, 0)));
    assert!((view.total_expenses - 250.5).abs() < f64::EPSILON);
    assert_eq!(view.expenses.len(), 1);
    assert_eq!(view.expenses[0].description.as_deref(), Some("meals"));
}

#[test]
fn test_settlement_view_without_owner_reports_unknown() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let fleet: TestFleet = create_test_fleet(&mut persistence);
    let schedule_id: i64 = persistence
        .reserve_schedule(&create_test_schedule(
            &fleet,
            fleet.bus_b,
            fleet.driver_z,
            None,
            (8, 0),
            (9, 0),
        ))
        .unwrap();
    let summary: SettlementSummary = persistence
        .create_settlement(schedule_id, Decimal::ZERO)
        .unwrap();

    let view: SettlementView = format_settlement(
        &persistence
            .get_settlement(summary.settlement_id)
            .unwrap()
            .unwrap(),
    );

    assert_eq!(view.owner_name, "Unknown");
    assert_eq!(view.plate_number, "51B-22222");
}

#[test]
fn test_list_settlements_filters_by_status() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let (_, settlement_id) = create_test_settlement(&mut persistence);

    assert_eq!(persistence.list_settlements(None).unwrap().len(), 1);
    assert!(
        persistence
            .list_settlements(Some(SettlementStatus::Approved))
            .unwrap()
            .is_empty()
    );

    persistence
        .transition_settlement(settlement_id, SettlementStatus::Cancelled)
        .unwrap();
    let cancelled: Vec<SettlementRecord> = persistence
        .list_settlements(Some(SettlementStatus::Cancelled))
        .unwrap();
    assert_eq!(cancelled.len(), 1);
    assert_eq!(cancelled[0].settlement_id, settlement_id);
}
