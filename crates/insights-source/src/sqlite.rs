use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use async_trait::async_trait;
use insights_models::usage_schema::USAGE_VIEWS_DDL;
use insights_models::{ParamValue, ScalarValue, TabularResult};
use rusqlite::types::{Value, ValueRef};
use rusqlite::{Connection, InterruptHandle};
use tracing::{debug, warn};

use crate::error::DataSourceError;
use crate::executor::{QueryExecutor, Statement};

/// Query executor over a SQLite replica of the account-usage views.
///
/// `rusqlite::Connection` is not `Sync`, so access goes through a `Mutex`.
/// Through [`QueryExecutor`] each statement runs on tokio's blocking pool;
/// dropping the returned future interrupts the statement if it is running
/// and skips it if it has not started.
pub struct SqliteSource {
    conn: Arc<Mutex<Connection>>,
    interrupt: Arc<InterruptHandle>,
    running: Arc<Mutex<Option<u64>>>,
    next_call: AtomicU64,
}

impl SqliteSource {
    /// Open a read-only connection to an existing replica.
    pub fn open(path: &str) -> Result<Self, DataSourceError> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self::from_connection(conn))
    }

    /// Open a writable database at `path`, creating the usage schema if needed.
    pub fn create(path: &str) -> Result<Self, DataSourceError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(USAGE_VIEWS_DDL)?;
        Ok(Self::from_connection(conn))
    }

    /// Open an in-memory database with the usage schema. Useful for testing -
    /// the database is writable so tests can seed rows.
    pub fn open_in_memory() -> Result<Self, DataSourceError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(USAGE_VIEWS_DDL)?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            interrupt: Arc::new(conn.get_interrupt_handle()),
            conn: Arc::new(Mutex::new(conn)),
            running: Arc::new(Mutex::new(None)),
            next_call: AtomicU64::new(0),
        }
    }

    /// Run one or more semicolon-separated statements without results.
    pub fn execute_batch(&self, sql: &str) -> Result<(), DataSourceError> {
        let conn = lock(&self.conn)?;
        conn.execute_batch(sql)?;
        Ok(())
    }

    /// Execute a statement on the calling thread and collect every row.
    pub fn query(&self, statement: &Statement) -> Result<TabularResult, DataSourceError> {
        let conn = lock(&self.conn)?;
        run_query(&conn, statement)
    }
}

#[async_trait]
impl QueryExecutor for SqliteSource {
    async fn execute(&self, statement: &Statement) -> Result<TabularResult, DataSourceError> {
        let call = self.next_call.fetch_add(1, Ordering::Relaxed);
        let cancelled = Arc::new(AtomicBool::new(false));
        let mut guard = InterruptOnDrop {
            call,
            cancelled: Arc::clone(&cancelled),
            running: Arc::clone(&self.running),
            interrupt: Arc::clone(&self.interrupt),
            armed: true,
        };

        let conn = Arc::clone(&self.conn);
        let running = Arc::clone(&self.running);
        let statement = statement.clone();
        let task = tokio::task::spawn_blocking(move || {
            let conn = lock(&conn)?;
            {
                let mut current = lock(&running)?;
                if cancelled.load(Ordering::SeqCst) {
                    return Err(DataSourceError::Query(
                        "statement cancelled before it started".to_string(),
                    ));
                }
                *current = Some(call);
            }
            let result = run_query(&conn, &statement);
            *lock(&running)? = None;
            result
        });

        let result = task
            .await
            .map_err(|e| DataSourceError::Unavailable(format!("SQLite worker failed: {e}")));
        guard.armed = false;
        result?
    }
}

/// Stops this call's statement when its future is dropped before completion.
struct InterruptOnDrop {
    call: u64,
    cancelled: Arc<AtomicBool>,
    running: Arc<Mutex<Option<u64>>>,
    interrupt: Arc<InterruptHandle>,
    armed: bool,
}

impl Drop for InterruptOnDrop {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.cancelled.store(true, Ordering::SeqCst);
        // Holding `running` pins the statement: it cannot finish and hand the
        // connection to another call while we interrupt.
        let current = self.running.lock().unwrap_or_else(|e| e.into_inner());
        if *current == Some(self.call) {
            warn!(call = self.call, "Interrupting abandoned statement");
            self.interrupt.interrupt();
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, DataSourceError> {
    mutex
        .lock()
        .map_err(|e| DataSourceError::Unavailable(format!("SQLite mutex poisoned: {e}")))
}

fn run_query(conn: &Connection, statement: &Statement) -> Result<TabularResult, DataSourceError> {
    let started = Instant::now();
    let mut stmt = conn.prepare_cached(&statement.sql)?;

    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let params: Vec<Value> = statement.params.iter().map(to_sql_value).collect();

    let mut rows = stmt.query(rusqlite::params_from_iter(params.iter()))?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut values = Vec::with_capacity(columns.len());
        for (idx, column) in columns.iter().enumerate() {
            values.push(to_scalar(column, row.get_ref(idx)?)?);
        }
        out.push(values);
    }

    debug!(
        rows = out.len(),
        params = statement.params.len(),
        elapsed_ms = started.elapsed().as_millis(),
        "Executed statement"
    );
    Ok(TabularResult::new(columns, out)?)
}

fn to_sql_value(param: &ParamValue) -> Value {
    match param {
        ParamValue::Null => Value::Null,
        ParamValue::Bool(v) => Value::Integer(i64::from(*v)),
        ParamValue::Int(v) => Value::Integer(*v),
        ParamValue::Float(v) => Value::Real(*v),
        ParamValue::Text(v) => Value::Text(v.clone()),
        ParamValue::Date(v) => Value::Text(v.format("%Y-%m-%d").to_string()),
        ParamValue::Timestamp(v) => Value::Text(v.format("%Y-%m-%d %H:%M:%S").to_string()),
    }
}

fn to_scalar(column: &str, value: ValueRef<'_>) -> Result<ScalarValue, DataSourceError> {
    match value {
        ValueRef::Null => Ok(ScalarValue::Null),
        ValueRef::Integer(v) => Ok(ScalarValue::Integer(v)),
        ValueRef::Real(v) => Ok(ScalarValue::Real(v)),
        ValueRef::Text(bytes) => String::from_utf8(bytes.to_vec())
            .map(ScalarValue::Text)
            .map_err(|e| DataSourceError::Decode {
                column: column.to_string(),
                reason: e.to_string(),
            }),
        ValueRef::Blob(_) => Err(DataSourceError::Decode {
            column: column.to_string(),
            reason: "binary values are not supported".to_string(),
        }),
    }
}
