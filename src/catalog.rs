use crate::session::Session;
use crate::types::DatabaseError;
use rusqlite::OptionalExtension;
use tracing::warn;

/// Ordinary tables only. Names starting with `sqlite_` belong to the engine
/// (e.g. `sqlite_sequence`, created by AUTOINCREMENT) and are left out.
const LIST_TABLES_SQL: &str = "SELECT name FROM sqlite_master \
     WHERE type = 'table' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\' \
     ORDER BY name";

const TABLE_SQL_SQL: &str = "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?1";

/// Reads schema information from the SQLite catalog.
pub struct SchemaIntrospector;

impl SchemaIntrospector {
    /// Names of the user tables, in the order the catalog returns them.
    ///
    /// A closed session or an unreadable catalog yields an empty list.
    #[must_use]
    pub fn list_tables(session: &Session) -> Vec<String> {
        match Self::try_list_tables(session) {
            Ok(tables) => tables,
            Err(DatabaseError::NotConnected) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "failed to list tables");
                Vec::new()
            }
        }
    }

    fn try_list_tables(session: &Session) -> Result<Vec<String>, DatabaseError> {
        let conn = session.connection()?;
        let mut stmt = conn.prepare(LIST_TABLES_SQL)?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    /// The statement that created `table`, as stored in the catalog.
    pub fn table_sql(session: &Session, table: &str) -> Result<Option<String>, DatabaseError> {
        let conn = session.connection()?;
        let sql = conn
            .query_row(TABLE_SQL_SQL, [table], |row| row.get::<_, Option<String>>(0))
            .optional()?;
        Ok(sql.flatten())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_session(temp_dir: &TempDir) -> Session {
        let mut session = Session::new();
        session.connect(temp_dir.path().join("catalog.db")).unwrap();
        session
    }

    fn run(session: &Session, sql: &str) {
        session.connection().unwrap().execute_batch(sql).unwrap();
    }

    #[test]
    fn test_list_tables_closed_session() {
        let session = Session::new();
        assert!(SchemaIntrospector::list_tables(&session).is_empty());
    }

    #[test]
    fn test_list_tables_empty_database() {
        let temp_dir = TempDir::new().unwrap();
        let session = open_session(&temp_dir);
        assert!(SchemaIntrospector::list_tables(&session).is_empty());
    }

    #[test]
    fn test_list_tables_excludes_views_indexes_and_internal_tables() {
        let temp_dir = TempDir::new().unwrap();
        let session = open_session(&temp_dir);

        run(
            &session,
            "CREATE TABLE users (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT);
             CREATE TABLE orders (id INTEGER PRIMARY KEY, user_id INTEGER);
             CREATE INDEX idx_orders_user ON orders(user_id);
             CREATE VIEW user_names AS SELECT name FROM users;
             INSERT INTO users (name) VALUES ('a');",
        );

        let tables = SchemaIntrospector::list_tables(&session);
        assert_eq!(tables, vec!["orders".to_string(), "users".to_string()]);
    }

    #[test]
    fn test_table_sql() {
        let temp_dir = TempDir::new().unwrap();
        let session = open_session(&temp_dir);
        run(&session, "CREATE TABLE notes (body TEXT)");

        let sql = SchemaIntrospector::table_sql(&session, "notes").unwrap();
        assert_eq!(sql.as_deref(), Some("CREATE TABLE notes (body TEXT)"));

        assert_eq!(SchemaIntrospector::table_sql(&session, "missing").unwrap(), None);
    }

    #[test]
    fn test_table_sql_requires_connection() {
        let session = Session::new();
        assert!(matches!(
            SchemaIntrospector::table_sql(&session, "x"),
            Err(DatabaseError::NotConnected)
        ));
    }
}
