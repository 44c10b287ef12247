#![allow(dead_code)]

use std::path::PathBuf;

use chrono::NaiveDate;
use expense_ledger::{core::time::FixedClock, storage::CsvExpenseStore};
use tempfile::TempDir;

/// A store rooted in its own temporary directory, pinned to `date`.
pub struct TestStore {
    pub dir: TempDir,
    pub store: CsvExpenseStore,
}

impl TestStore {
    pub fn path(&self) -> PathBuf {
        self.store.path().to_path_buf()
    }
}

pub fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub fn setup_store(date: NaiveDate) -> TestStore {
    let dir = TempDir::new().expect("create temp dir");
    let store =
        CsvExpenseStore::with_clock(dir.path().join("expenses.csv"), Box::new(FixedClock(date)));
    TestStore { dir, store }
}
