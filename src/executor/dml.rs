/// DML (Data Manipulation Language) operations
///
/// INSERT, UPDATE, DELETE statement builders. Text-only inserts quote every
/// value; the typed builders render each `Value` with its own literal form.

use crate::session::Session;
use crate::types::value::quote_text;
use crate::types::{DatabaseError, Value};
use super::StatementExecutor;

pub struct DmlExecutor;

impl DmlExecutor {
    /// Execute INSERT with every value sent as a quoted text literal
    ///
    /// Embedded single quotes are doubled; nothing else is escaped or coerced,
    /// so the column affinity decides the stored type.
    pub fn insert_row<C: AsRef<str>, V: AsRef<str>>(
        session: &Session,
        table_name: &str,
        columns: &[C],
        values: &[V],
    ) -> Result<(), DatabaseError> {
        let sql = insert_row_sql(table_name, columns, values);
        StatementExecutor::execute_mutation(session, &sql)?;
        Ok(())
    }
}

#[must_use]
pub fn insert_row_sql<C: AsRef<str>, V: AsRef<str>>(
    table_name: &str,
    columns: &[C],
    values: &[V],
) -> String {
    let columns_str = columns.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(", ");
    let values_str = values
        .iter()
        .map(|v| quote_text(v.as_ref()))
        .collect::<Vec<_>>()
        .join(", ");

    format!("INSERT INTO {table_name} ({columns_str}) VALUES ({values_str})")
}

/// INSERT for a whole row in table column order, with typed literals
#[must_use]
pub fn insert_values_sql(table_name: &str, values: &[Value]) -> String {
    format!("INSERT INTO {table_name} VALUES ({})", literal_list(values))
}

/// INSERT for the named columns, with typed literals
#[must_use]
pub fn insert_columns_sql<C: AsRef<str>>(table_name: &str, columns: &[C], values: &[Value]) -> String {
    let columns_str = columns.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(", ");
    format!(
        "INSERT INTO {table_name} ({columns_str}) VALUES ({})",
        literal_list(values)
    )
}

#[must_use]
pub fn update_by_id_sql(table_name: &str, id_column: &str, id: &Value, assignments: &[(&str, &Value)]) -> String {
    let set_str = assignments
        .iter()
        .map(|(column, value)| format!("{column} = {}", value.to_sql_literal()))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "UPDATE {table_name} SET {set_str} WHERE {id_column} = {}",
        id.to_sql_literal()
    )
}

#[must_use]
pub fn delete_by_id_sql(table_name: &str, id_column: &str, id: &Value) -> String {
    format!(
        "DELETE FROM {table_name} WHERE {id_column} = {}",
        id.to_sql_literal()
    )
}

fn literal_list(values: &[Value]) -> String {
    values
        .iter()
        .map(Value::to_sql_literal)
        .collect::<Vec<_>>()
        .join(", ")
}
