//! Store collaborator: scoped sessions that execute positional SQL.

use std::time::Duration;

use parking_lot::Mutex;
use rusqlite::{params_from_iter, Connection};
use tracing::{debug, info};

use crate::config::SqliteConfig;
use crate::error::MapperResult;
use crate::value::Value;

/// Outcome of an INSERT.
#[derive(Debug, Clone, PartialEq)]
pub struct Insertion {
    pub rows_affected: usize,
    /// Key assigned by the store, when it reports one.
    pub generated_key: Option<Value>,
}

/// A row returned by [`Session::query`].
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub columns: Vec<String>,
    pub values: Vec<Value>,
}

impl Row {
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.values.get(i))
    }

    pub fn into_pairs(self) -> impl Iterator<Item = (String, Value)> {
        self.columns.into_iter().zip(self.values)
    }
}

/// A per-call connection. Dropping the session releases it.
pub trait Session {
    /// Runs a mutation and returns the number of affected rows.
    fn execute(&mut self, sql: &str, args: &[Value]) -> MapperResult<usize>;

    fn insert(&mut self, sql: &str, args: &[Value]) -> MapperResult<Insertion>;

    fn query(&mut self, sql: &str, args: &[Value]) -> MapperResult<Vec<Row>>;
}

/// Source of scoped sessions.
pub trait Store: Send + Sync {
    type Session: Session;

    fn session(&self) -> MapperResult<Self::Session>;
}

/// SQLite-backed [`Store`] opening one connection per session.
pub struct SqliteStore {
    config: SqliteConfig,
    // keeps a shared in-memory database alive between sessions
    _anchor: Option<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens the store and runs the configured `init_sql` once.
    pub fn open(config: SqliteConfig) -> MapperResult<Self> {
        config.validate()?;
        info!(path = %config.db_path, "opening sqlite store");

        let conn = open_connection(&config)?;
        for sql in &config.init_sql {
            conn.execute_batch(sql)?;
        }
        let anchor = if config.is_in_memory() {
            Some(Mutex::new(conn))
        } else {
            None
        };

        Ok(Self {
            config,
            _anchor: anchor,
        })
    }

    pub fn config(&self) -> &SqliteConfig {
        &self.config
    }

    /// Runs a batch of statements on a fresh session, e.g. for schema setup.
    pub fn execute_batch(&self, sql: &str) -> MapperResult<()> {
        let session = self.session()?;
        session.conn.execute_batch(sql)?;
        Ok(())
    }
}

impl Store for SqliteStore {
    type Session = SqliteSession;

    fn session(&self) -> MapperResult<SqliteSession> {
        Ok(SqliteSession {
            conn: open_connection(&self.config)?,
        })
    }
}

fn open_connection(config: &SqliteConfig) -> MapperResult<Connection> {
    let conn = Connection::open(&config.db_path)?;
    if let Some(ms) = config.busy_timeout_ms {
        conn.busy_timeout(Duration::from_millis(ms))?;
    }
    Ok(conn)
}

/// A single SQLite connection, closed on drop.
pub struct SqliteSession {
    conn: Connection,
}

impl Session for SqliteSession {
    fn execute(&mut self, sql: &str, args: &[Value]) -> MapperResult<usize> {
        debug!(sql, args = args.len(), "executing statement");
        let mut stmt = self.conn.prepare_cached(sql)?;
        Ok(stmt.execute(params_from_iter(args.iter()))?)
    }

    fn insert(&mut self, sql: &str, args: &[Value]) -> MapperResult<Insertion> {
        let rows_affected = self.execute(sql, args)?;
        let generated_key =
            (rows_affected > 0).then(|| Value::Integer(self.conn.last_insert_rowid()));
        Ok(Insertion {
            rows_affected,
            generated_key,
        })
    }

    fn query(&mut self, sql: &str, args: &[Value]) -> MapperResult<Vec<Row>> {
        debug!(sql, args = args.len(), "running query");
        let mut stmt = self.conn.prepare_cached(sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let mut rows = stmt.query(params_from_iter(args.iter()))?;
        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            let values = (0..columns.len())
                .map(|i| Value::from_value_ref(row.get_ref(i)?))
                .collect::<MapperResult<Vec<_>>>()?;
            result.push(Row {
                columns: columns.clone(),
                values,
            });
        }
        Ok(result)
    }
}
