use super::import::ImportReport;
use crate::catalog::SchemaIntrospector;
use crate::executor::StatementExecutor;
use crate::executor::dml::insert_values_sql;
use crate::session::Session;
use crate::storage::blob;
use crate::types::{DatabaseError, Value};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableSnapshot {
    pub name: String,
    pub create_sql: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// Typed copy of every table, for the binary dump format.
///
/// Unlike the SQL dump, values keep their storage class on the way back.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DatabaseSnapshot {
    pub tables: Vec<TableSnapshot>,
}

impl DatabaseSnapshot {
    pub fn capture(session: &Session) -> Result<Self, DatabaseError> {
        session.connection()?;

        let mut tables = Vec::new();
        for name in SchemaIntrospector::list_tables(session) {
            let Some(create_sql) = SchemaIntrospector::table_sql(session, &name)? else {
                continue;
            };
            let data = StatementExecutor::execute_query(session, &format!("SELECT * FROM {name}"))?;
            tables.push(TableSnapshot {
                name,
                create_sql,
                columns: data.columns,
                rows: data.rows,
            });
        }

        Ok(Self { tables })
    }

    /// Recreates the tables and rows in `session`, best effort like the SQL
    /// importer: failed statements are reported, not fatal.
    pub fn restore(&self, session: &Session) -> Result<ImportReport, DatabaseError> {
        session.connection()?;

        let mut report = ImportReport::default();
        for table in &self.tables {
            report.replay(session, None, table.create_sql.clone());
            for row in &table.rows {
                report.replay(session, None, insert_values_sql(&table.name, row));
            }
        }

        info!(
            tables = self.tables.len(),
            executed = report.executed,
            failed = report.failures.len(),
            "snapshot restored"
        );
        Ok(report)
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.tables.iter().map(|t| t.rows.len()).sum()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, DatabaseError> {
        blob::encode(self)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, DatabaseError> {
        blob::decode(data)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), DatabaseError> {
        blob::save(path, self)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DatabaseError> {
        blob::load(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_capture_save_load_restore() {
        let temp_dir = TempDir::new().unwrap();

        let mut source = Session::new();
        source.connect(temp_dir.path().join("source.db")).unwrap();
        StatementExecutor::execute_mutation(
            &source,
            "CREATE TABLE mixed (a, b, c, d, e);
             INSERT INTO mixed VALUES (1, 2.0, 'three', X'04', NULL);
             CREATE VIEW v AS SELECT a FROM mixed;",
        )
        .unwrap();

        let snapshot = DatabaseSnapshot::capture(&source).unwrap();
        assert_eq!(snapshot.tables.len(), 1);
        assert_eq!(snapshot.row_count(), 1);
        assert_eq!(snapshot.tables[0].columns, vec!["a", "b", "c", "d", "e"]);

        let path = temp_dir.path().join("snapshot.odb");
        snapshot.save(&path).unwrap();
        let loaded = DatabaseSnapshot::load(&path).unwrap();
        assert_eq!(loaded, snapshot);

        let mut target = Session::new();
        target.connect(temp_dir.path().join("target.db")).unwrap();
        let report = loaded.restore(&target).unwrap();
        assert!(report.is_clean());
        assert_eq!(report.executed, 2);

        let rows = StatementExecutor::execute_query(&target, "SELECT * FROM mixed").unwrap();
        assert_eq!(
            rows.rows,
            vec![vec![
                Value::Integer(1),
                Value::Real(2.0),
                Value::from("three"),
                Value::Blob(vec![4]),
                Value::Null,
            ]]
        );
    }

    #[test]
    fn test_restore_into_existing_table_reports_failure() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = Session::new();
        session.connect(temp_dir.path().join("s.db")).unwrap();
        StatementExecutor::execute_mutation(&session, "CREATE TABLE t (v); INSERT INTO t VALUES (1);").unwrap();

        let snapshot = DatabaseSnapshot::capture(&session).unwrap();
        let report = snapshot.restore(&session).unwrap();

        // CREATE fails, the row is still inserted
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].ordinal, 1);
        assert_eq!(report.executed, 1);
    }
}
