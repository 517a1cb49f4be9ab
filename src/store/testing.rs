//! Seeding helpers for tests. The service itself never writes.

use crate::store::{Store, StoreOptions};
use tempfile::TempDir;

pub(crate) async fn temp_store() -> (Store, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let options = StoreOptions {
        create_if_missing: true,
        ..StoreOptions::default()
    };
    let store = Store::connect(&db_path.to_string_lossy(), options)
        .await
        .expect("Failed to create test database");
    (store, temp_dir)
}

pub(crate) async fn seed_employee(store: &Store, name: &str, safe_name: &str) -> i64 {
    sqlx::query(
        "INSERT INTO employees (employee_name, safe_name, folder_path, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(name)
    .bind(safe_name)
    .bind(format!("output/{}", safe_name))
    .bind(1_700_000_000_i64)
    .execute(store.pool())
    .await
    .unwrap()
    .last_insert_rowid()
}

pub(crate) async fn seed_snapshot(
    store: &Store,
    employee_id: i64,
    window_title: &str,
    captured_at: i64,
) -> i64 {
    sqlx::query("INSERT INTO snapshots (employee_id, window_title, captured_at) VALUES (?, ?, ?)")
        .bind(employee_id)
        .bind(window_title)
        .bind(captured_at)
        .execute(store.pool())
        .await
        .unwrap()
        .last_insert_rowid()
}

pub(crate) async fn seed_snapshot_blob(
    store: &Store,
    employee_id: i64,
    blob: &[u8],
    mime_type: Option<&str>,
) -> i64 {
    sqlx::query(
        "INSERT INTO snapshots (employee_id, window_title, captured_at, image_blob, mime_type) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(employee_id)
    .bind("blob")
    .bind(1_700_000_000_i64)
    .bind(blob)
    .bind(mime_type)
    .execute(store.pool())
    .await
    .unwrap()
    .last_insert_rowid()
}

pub(crate) async fn seed_snapshot_file(store: &Store, employee_id: i64, filepath: &str) -> i64 {
    sqlx::query(
        "INSERT INTO snapshots (employee_id, window_title, captured_at, filepath) VALUES (?, ?, ?, ?)",
    )
    .bind(employee_id)
    .bind("file")
    .bind(1_700_000_000_i64)
    .bind(filepath)
    .execute(store.pool())
    .await
    .unwrap()
    .last_insert_rowid()
}

pub(crate) async fn seed_log(
    store: &Store,
    employee_id: i64,
    level: &str,
    message: &str,
    created_at: i64,
) -> i64 {
    sqlx::query("INSERT INTO logs (employee_id, level, message, created_at) VALUES (?, ?, ?, ?)")
        .bind(employee_id)
        .bind(level)
        .bind(message)
        .bind(created_at)
        .execute(store.pool())
        .await
        .unwrap()
        .last_insert_rowid()
}
