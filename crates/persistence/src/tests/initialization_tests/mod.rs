// Copyright (C) 2026 Coachline Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Backend initialization tests.
//!
//! Every other persistence test opens an in-memory database, so connection
//! setup and migrations are covered there as well.

use crate::{Persistence, PersistenceError};
use coachline_domain::Driver;
use std::path::PathBuf;

#[test]
fn test_persistence_initialization() {
    let result: Result<Persistence, PersistenceError> = Persistence::new_in_memory();
    assert!(result.is_ok());
}

#[test]
fn test_foreign_key_enforcement_enabled() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    assert!(persistence.verify_foreign_key_enforcement().is_ok());
}

#[test]
fn test_multiple_in_memory_instances_are_isolated() {
    let mut db1: Persistence = Persistence::new_in_memory().unwrap();
    let mut db2: Persistence = Persistence::new_in_memory().unwrap();

    let driver_id: i64 = db1.create_driver("Driver One", "LIC-1").unwrap();

    assert!(db1.get_driver(driver_id).unwrap().is_some());
    assert!(
        db2.get_driver(driver_id).unwrap().is_none(),
        "db2 should not see db1's driver"
    );
}

#[test]
fn test_file_database_keeps_rows_after_reopen() {
    let path: PathBuf = std::env::temp_dir().join(format!(
        "coachline_init_test_{}.sqlite",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);

    let driver_id: i64 = {
        let mut persistence: Persistence = Persistence::new_with_file(&path).unwrap();
        persistence.create_driver("Driver One", "LIC-1").unwrap()
    };

    let mut reopened: Persistence = Persistence::new_with_file(&path).unwrap();
    let driver: Option<Driver> = reopened.get_driver(driver_id).unwrap();
    drop(reopened);

    for suffix in ["", "-wal", "-shm"] {
        let mut file: std::ffi::OsString = path.clone().into_os_string();
        file.push(suffix);
        let _ = std::fs::remove_file(file);
    }

    assert_eq!(driver.map(|d| d.full_name), Some(String::from("Driver One")));
}
