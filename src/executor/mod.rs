/// Executor module - runs SQL text against the session's connection
///
/// Structure:
/// - mod: mutation and query paths, statement routing
/// - ddl: CREATE/DROP TABLE builders
/// - dml: INSERT/UPDATE/DELETE builders and literal rendering
pub mod ddl;
pub mod dml;

pub use ddl::DdlExecutor;
pub use dml::DmlExecutor;

use crate::session::Session;
use crate::types::{DatabaseError, TabularResult, Value};
use tracing::{debug, warn};

/// How a piece of SQL text is routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Query,
    Mutation,
}

#[derive(Debug)]
pub enum QueryResult {
    /// Rows changed by the last data-modifying statement
    Changed(usize),
    Rows(TabularResult),
}

/// Classifies `sql` by its leading keyword: `SELECT` (any case, leading
/// whitespace ignored) is a query, everything else a mutation.
#[must_use]
pub fn classify_statement(sql: &str) -> StatementKind {
    let is_select = sql
        .trim_start()
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("SELECT"));

    if is_select {
        StatementKind::Query
    } else {
        StatementKind::Mutation
    }
}

pub struct StatementExecutor;

impl StatementExecutor {
    /// Runs DDL or DML text.
    ///
    /// Returns the number of rows changed by the most recent INSERT, UPDATE or
    /// DELETE on the connection.
    pub fn execute_mutation(session: &Session, sql: &str) -> Result<usize, DatabaseError> {
        let conn = session.connection()?;
        debug!(sql = sql.trim(), "execute mutation");

        conn.execute_batch(sql).map_err(|e| {
            warn!(error = %e, sql = sql.trim(), "mutation failed");
            DatabaseError::Execution(e)
        })?;

        Ok(usize::try_from(conn.changes()).unwrap_or(usize::MAX))
    }

    /// Runs a row-producing statement and materializes every row.
    ///
    /// The cursor lives only inside this call, so it is always exhausted and
    /// released before the next statement is issued.
    pub fn execute_query(session: &Session, sql: &str) -> Result<TabularResult, DatabaseError> {
        let conn = session.connection()?;
        debug!(sql = sql.trim(), "execute query");

        Self::collect_rows(conn, sql).map_err(|e| {
            warn!(error = %e, sql = sql.trim(), "query failed");
            DatabaseError::Execution(e)
        })
    }

    fn collect_rows(conn: &rusqlite::Connection, sql: &str) -> rusqlite::Result<TabularResult> {
        let mut stmt = conn.prepare(sql)?;
        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();
        let width = columns.len();

        let mut result = TabularResult::new(columns);
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let values = (0..width)
                .map(|i| row.get_ref(i).map(Value::from))
                .collect::<rusqlite::Result<Vec<_>>>()?;
            result.rows.push(values);
        }

        Ok(result)
    }

    /// Routes `sql` through [`classify_statement`].
    pub fn execute(session: &Session, sql: &str) -> Result<QueryResult, DatabaseError> {
        match classify_statement(sql) {
            StatementKind::Query => Self::execute_query(session, sql).map(QueryResult::Rows),
            StatementKind::Mutation => {
                Self::execute_mutation(session, sql).map(QueryResult::Changed)
            }
        }
    }
}
