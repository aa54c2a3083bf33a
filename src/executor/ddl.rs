/// DDL (Data Definition Language) operations
///
/// CREATE TABLE, DROP TABLE

use crate::session::Session;
use crate::types::DatabaseError;
use super::StatementExecutor;

/// Implicit first column of every table created through [`DdlExecutor::create_table`]
pub const ID_COLUMN: &str = "id";

pub struct DdlExecutor;

impl DdlExecutor {
    /// Execute CREATE TABLE IF NOT EXISTS with an implicit auto-increment `id`
    ///
    /// Column definitions are spliced in verbatim; SQLite reports bad ones.
    pub fn create_table<S: AsRef<str>>(
        session: &Session,
        table_name: &str,
        column_defs: &[S],
    ) -> Result<(), DatabaseError> {
        let sql = create_table_sql(table_name, column_defs);
        StatementExecutor::execute_mutation(session, &sql)?;
        Ok(())
    }

    /// Execute DROP TABLE
    pub fn drop_table(session: &Session, table_name: &str) -> Result<(), DatabaseError> {
        StatementExecutor::execute_mutation(session, &format!("DROP TABLE {table_name}"))?;
        Ok(())
    }
}

#[must_use]
pub fn create_table_sql<S: AsRef<str>>(table_name: &str, column_defs: &[S]) -> String {
    let mut sql = format!(
        "CREATE TABLE IF NOT EXISTS {table_name} ({ID_COLUMN} INTEGER PRIMARY KEY AUTOINCREMENT"
    );
    for def in column_defs {
        sql.push_str(", ");
        sql.push_str(def.as_ref());
    }
    sql.push(')');
    sql
}
