//! Store database operations
//!
//! Owns the connection pool and every query the service runs. All reads are
//! bounded by the configured query timeout; expiry surfaces as
//! [`StoreError::Unavailable`].

use crate::config::DatabaseConfig;
use crate::store::error::StoreError;
use crate::store::models::{ArtifactRecord, Employee, LogEntry, Snapshot};
use sqlx::sqlite::{Sqlite, SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Executor, SqlitePool};
use std::future::Future;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

const EMPLOYEE_COLUMNS: &str = "id, employee_name, safe_name, folder_path, created_at";
const SNAPSHOT_COLUMNS: &str = "id, employee_id, window_title, captured_at";
const LOG_COLUMNS: &str = "id, employee_id, level, message, created_at";

/// Pool settings for [`Store::connect`]
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Maximum number of pooled connections
    pub max_connections: u32,
    /// Budget for acquiring a connection and for each query
    pub timeout: Duration,
    /// Create an empty database when the file is missing (fixtures only)
    pub create_if_missing: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            max_connections: 5,
            timeout: Duration::from_secs(5),
            create_if_missing: false,
        }
    }
}

impl From<&DatabaseConfig> for StoreOptions {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            max_connections: config.max_connections,
            timeout: Duration::from_secs(config.timeout_secs),
            create_if_missing: false,
        }
    }
}

/// One employee's record together with their recent activity
#[derive(Debug, Clone)]
pub struct EmployeeActivity {
    /// The employee, if the identifier resolves
    pub employee: Option<Employee>,
    /// Most recent snapshots, newest first
    pub snapshots: Vec<Snapshot>,
    /// Most recent log entries, newest first
    pub logs: Vec<LogEntry>,
}

/// Process-wide handle to the backing store
pub struct Store {
    pool: SqlitePool,
    query_timeout: Duration,
}

impl Store {
    /// Open a connection pool and apply the schema migration
    ///
    /// # Arguments
    /// * `url` - `sqlite:` URL or bare path to the database file
    /// * `options` - Pool size and timeout budget
    ///
    /// # Returns
    /// * `Ok(Store)` if the store is reachable
    /// * `Err(StoreError::Unavailable)` if the connection could not be established,
    ///   including a missing database file unless `options.create_if_missing` is set
    pub async fn connect(url: &str, options: StoreOptions) -> Result<Self, StoreError> {
        let connection_string = if url.starts_with("sqlite:") {
            url.to_string()
        } else {
            format!("sqlite:{}", url)
        };

        let connect_options = SqliteConnectOptions::from_str(&connection_string)
            .map_err(|e| StoreError::Unavailable(format!("Invalid database URL: {}", e)))?
            .create_if_missing(options.create_if_missing)
            .foreign_keys(true)
            .busy_timeout(options.timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(options.max_connections)
            .acquire_timeout(options.timeout)
            .connect_with(connect_options)
            .await
            .map_err(|e| {
                StoreError::Unavailable(format!("Failed to connect to database: {}", e))
            })?;

        info!("Connected to SQLite database at: {}", url);

        let store = Self {
            pool,
            query_timeout: options.timeout,
        };
        store.run_migrations().await?;

        Ok(store)
    }

    /// Open an existing database file, using default pool options
    pub async fn open(db_path: &Path) -> Result<Self, StoreError> {
        Self::connect(&db_path.to_string_lossy(), StoreOptions::default()).await
    }

    /// Apply the embedded schema. Idempotent; never writes rows.
    async fn run_migrations(&self) -> Result<(), StoreError> {
        debug!("Running database migrations...");

        let migration_sql = include_str!("../../migrations/001_create_tables.sql");

        for statement in split_statements(migration_sql) {
            sqlx::query(&statement)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    StoreError::Migration(format!(
                        "{} - Statement: {}",
                        e,
                        statement.chars().take(100).collect::<String>()
                    ))
                })?;
        }

        debug!("Database migrations completed successfully");
        Ok(())
    }

    /// Run `fut` within the query budget, classifying any failure
    async fn timed<T, F>(&self, context: &str, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.query_timeout, fut).await {
            Ok(result) => result.map_err(|e| StoreError::from_sqlx(context, e)),
            Err(_) => Err(StoreError::Unavailable(format!(
                "{}: timed out after {}ms",
                context,
                self.query_timeout.as_millis()
            ))),
        }
    }

    /// Check the store answers a trivial query
    pub async fn ping(&self) -> Result<(), StoreError> {
        self.timed("ping", async {
            sqlx::query("SELECT 1").execute(&self.pool).await?;
            Ok::<_, sqlx::Error>(())
        })
        .await
    }

    /// Get all employees, ordered by identifier
    pub async fn list_employees(&self) -> Result<Vec<Employee>, StoreError> {
        let sql = format!("SELECT {} FROM employees ORDER BY id ASC", EMPLOYEE_COLUMNS);
        self.timed(
            "list employees",
            sqlx::query_as::<_, Employee>(&sql).fetch_all(&self.pool),
        )
        .await
    }

    /// Get an employee by filesystem-safe name
    pub async fn find_employee_by_safe_name(
        &self,
        safe_name: &str,
    ) -> Result<Option<Employee>, StoreError> {
        let sql = format!("SELECT {} FROM employees WHERE safe_name = ?", EMPLOYEE_COLUMNS);
        self.timed(
            "find employee by safe name",
            sqlx::query_as::<_, Employee>(&sql)
                .bind(safe_name)
                .fetch_optional(&self.pool),
        )
        .await
    }

    /// Get the most recent snapshots, optionally for a single employee
    pub async fn recent_snapshots(
        &self,
        employee_id: Option<i64>,
        limit: i64,
    ) -> Result<Vec<Snapshot>, StoreError> {
        self.timed(
            "fetch snapshots",
            fetch_snapshots(&self.pool, employee_id, limit),
        )
        .await
    }

    /// Get the most recent log entries, optionally for a single employee
    pub async fn recent_logs(
        &self,
        employee_id: Option<i64>,
        limit: i64,
    ) -> Result<Vec<LogEntry>, StoreError> {
        self.timed("fetch logs", fetch_logs(&self.pool, employee_id, limit)).await
    }

    /// Get an employee and their recent activity over a single scoped connection
    ///
    /// The snapshot and log queries are independent: each is ordered by its
    /// own timestamp and bounded by its own limit.
    pub async fn employee_activity(
        &self,
        employee_id: i64,
        snapshot_limit: i64,
        log_limit: i64,
    ) -> Result<EmployeeActivity, StoreError> {
        self.timed("fetch employee activity", async {
            let mut conn = self.pool.acquire().await?;
            let employee = fetch_employee(&mut *conn, employee_id).await?;
            let snapshots = fetch_snapshots(&mut *conn, Some(employee_id), snapshot_limit).await?;
            let logs = fetch_logs(&mut *conn, Some(employee_id), log_limit).await?;
            Ok::<_, sqlx::Error>(EmployeeActivity {
                employee,
                snapshots,
                logs,
            })
        })
        .await
    }

    /// Get the storage location of a single snapshot's bytes
    pub async fn find_artifact(
        &self,
        snapshot_id: i64,
    ) -> Result<Option<ArtifactRecord>, StoreError> {
        self.timed(
            "find artifact",
            sqlx::query_as::<_, ArtifactRecord>(
                "SELECT id, filepath, image_blob, mime_type FROM snapshots WHERE id = ?",
            )
            .bind(snapshot_id)
            .fetch_optional(&self.pool),
        )
        .await
    }

    /// Close the pool, waiting for checked-out connections to return
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Store connection pool closed");
    }

    /// Get the database pool (for seeding and advanced operations)
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

async fn fetch_employee<'e, E>(executor: E, id: i64) -> Result<Option<Employee>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {} FROM employees WHERE id = ?", EMPLOYEE_COLUMNS);
    sqlx::query_as::<_, Employee>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await
}

async fn fetch_snapshots<'e, E>(
    executor: E,
    employee_id: Option<i64>,
    limit: i64,
) -> Result<Vec<Snapshot>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    match employee_id {
        Some(employee_id) => {
            let sql = format!(
                "SELECT {} FROM snapshots WHERE employee_id = ? \
                 ORDER BY captured_at DESC, id DESC LIMIT ?",
                SNAPSHOT_COLUMNS
            );
            sqlx::query_as::<_, Snapshot>(&sql)
                .bind(employee_id)
                .bind(limit)
                .fetch_all(executor)
                .await
        }
        None => {
            let sql = format!(
                "SELECT {} FROM snapshots ORDER BY captured_at DESC, id DESC LIMIT ?",
                SNAPSHOT_COLUMNS
            );
            sqlx::query_as::<_, Snapshot>(&sql)
                .bind(limit)
                .fetch_all(executor)
                .await
        }
    }
}

async fn fetch_logs<'e, E>(
    executor: E,
    employee_id: Option<i64>,
    limit: i64,
) -> Result<Vec<LogEntry>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    match employee_id {
        Some(employee_id) => {
            let sql = format!(
                "SELECT {} FROM logs WHERE employee_id = ? \
                 ORDER BY created_at DESC, id DESC LIMIT ?",
                LOG_COLUMNS
            );
            sqlx::query_as::<_, LogEntry>(&sql)
                .bind(employee_id)
                .bind(limit)
                .fetch_all(executor)
                .await
        }
        None => {
            let sql = format!(
                "SELECT {} FROM logs ORDER BY created_at DESC, id DESC LIMIT ?",
                LOG_COLUMNS
            );
            sqlx::query_as::<_, LogEntry>(&sql)
                .bind(limit)
                .fetch_all(executor)
                .await
        }
    }
}

/// Strip `--` comments and split a migration script into statements
fn split_statements(script: &str) -> Vec<String> {
    let mut cleaned_sql = String::new();
    for line in script.lines() {
        let without_comments = match line.find("--") {
            Some(comment_pos) => &line[..comment_pos],
            None => line,
        };
        let trimmed = without_comments.trim();
        if trimmed.is_empty() {
            continue;
        }
        cleaned_sql.push_str(trimmed);
        cleaned_sql.push(' ');
    }

    cleaned_sql
        .split(';')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
