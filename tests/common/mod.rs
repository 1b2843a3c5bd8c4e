#![allow(dead_code)]

use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use chrono::NaiveDate;
use kakeibo_core::{
    errors::StorageError, storage::Result as StorageResult, Config, FixedClock, JsonFileBackend,
    StorageBackend, StoreRegistry,
};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates a unique data directory that outlives the calling test.
pub fn temp_data_dir() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().join("data");
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

pub fn fixed_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::on(2024, 5, 12))
}

/// Registry over JSON files in `dir`, pinned to 2024-05-12.
pub fn registry_at(dir: &Path) -> StoreRegistry {
    let backend = JsonFileBackend::new(dir).expect("create json backend");
    StoreRegistry::new(Arc::new(backend), &Config::default(), fixed_clock())
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// Asserts two sums agree up to floating-point rounding.
pub fn assert_close(left: f64, right: f64) {
    assert!(
        (left - right).abs() <= 1e-6 * left.abs().max(1.0),
        "{left} != {right}"
    );
}

/// Backend whose reads find nothing and whose writes always fail.
#[derive(Debug, Default)]
pub struct FailingBackend;

impl StorageBackend for FailingBackend {
    fn read(&self, _key: &str) -> StorageResult<Option<String>> {
        Ok(None)
    }

    fn write(&self, key: &str, _contents: &str) -> StorageResult<()> {
        Err(StorageError::Unavailable(format!("{key}: quota exceeded")))
    }

    fn remove(&self, _key: &str) -> StorageResult<bool> {
        Ok(false)
    }
}
