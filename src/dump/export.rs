use crate::catalog::SchemaIntrospector;
use crate::executor::StatementExecutor;
use crate::session::Session;
use crate::types::{DatabaseError, Value};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Copy, Default)]
pub struct ExportOptions {
    /// Emit only CREATE statements
    pub schema_only: bool,
    /// Emit only INSERT statements
    pub data_only: bool,
    /// Prefix the dump with a `--` comment block
    pub header: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    pub tables: usize,
    pub rows: usize,
}

/// Writes every table as its CREATE statement followed by one INSERT per row.
///
/// Tables come in catalog order; a table the catalog holds no creation
/// statement for is skipped. Each table block ends with a blank line, so the
/// output can be fed straight back to the importer.
pub fn export_dump<W: Write>(
    session: &Session,
    output: &mut W,
    options: &ExportOptions,
) -> Result<ExportSummary, DatabaseError> {
    if options.schema_only && options.data_only {
        return Err(DatabaseError::InvalidInput(
            "schema-only and data-only cannot be used together".to_string(),
        ));
    }
    session.connection()?;

    if options.header {
        write_header(session, output)?;
    }

    let mut summary = ExportSummary::default();

    for table in SchemaIntrospector::list_tables(session) {
        let Some(create_sql) = SchemaIntrospector::table_sql(session, &table)? else {
            continue;
        };
        summary.tables += 1;

        if !options.data_only {
            writeln!(output, "{create_sql};")?;
            writeln!(output)?;
        }

        if !options.schema_only {
            summary.rows += dump_rows(session, &table, output)?;
        }

        writeln!(output)?;
    }

    output.flush()?;
    info!(tables = summary.tables, rows = summary.rows, "dump exported");
    Ok(summary)
}

pub fn export_dump_to_string(session: &Session, options: &ExportOptions) -> Result<String, DatabaseError> {
    let mut buffer = Vec::new();
    export_dump(session, &mut buffer, options)?;
    String::from_utf8(buffer).map_err(|e| DatabaseError::InvalidInput(e.to_string()))
}

pub fn export_dump_file<P: AsRef<Path>>(
    session: &Session,
    path: P,
    options: &ExportOptions,
) -> Result<ExportSummary, DatabaseError> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    export_dump(session, &mut writer, options)
}

fn write_header<W: Write>(session: &Session, output: &mut W) -> Result<(), DatabaseError> {
    let database = session
        .current_database()
        .map_or_else(String::new, |p| p.display().to_string());

    writeln!(output, "--")?;
    writeln!(output, "-- dbdesk database dump")?;
    writeln!(output, "-- Database: {database}")?;
    writeln!(output, "-- Generated: {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(output, "--")?;
    writeln!(output)?;
    Ok(())
}

fn dump_rows<W: Write>(session: &Session, table: &str, output: &mut W) -> Result<usize, DatabaseError> {
    let data = StatementExecutor::execute_query(session, &format!("SELECT * FROM {table}"))?;

    for row in &data.rows {
        let values_str = row.iter().map(Value::to_sql_literal).collect::<Vec<_>>().join(", ");
        writeln!(output, "INSERT INTO {table} VALUES ({values_str});")?;
    }

    Ok(data.row_count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{DdlExecutor, DmlExecutor};
    use tempfile::TempDir;

    fn open_session(temp_dir: &TempDir, name: &str) -> Session {
        let mut session = Session::new();
        session.connect(temp_dir.path().join(name)).unwrap();
        session
    }

    #[test]
    fn test_rows_keep_storage_class_in_untyped_columns() {
        let temp_dir = TempDir::new().unwrap();
        let session = open_session(&temp_dir, "untyped.db");
        StatementExecutor::execute_mutation(
            &session,
            "CREATE TABLE t (v);
             INSERT INTO t VALUES (30), (2.5), (4.0), ('30'), ('it''s'), (X'AB'), (NULL);",
        )
        .unwrap();

        let dump = export_dump_to_string(&session, &ExportOptions { data_only: true, ..Default::default() }).unwrap();
        let expected = "INSERT INTO t VALUES (30);\n\
                        INSERT INTO t VALUES (2.5);\n\
                        INSERT INTO t VALUES (4.0);\n\
                        INSERT INTO t VALUES ('30');\n\
                        INSERT INTO t VALUES ('it''s');\n\
                        INSERT INTO t VALUES (X'AB');\n\
                        INSERT INTO t VALUES (NULL);\n\
                        \n";
        assert_eq!(dump, expected);
    }

    #[test]
    fn test_export_format() {
        let temp_dir = TempDir::new().unwrap();
        let session = open_session(&temp_dir, "export.db");

        DdlExecutor::create_table(&session, "people", &["name TEXT", "age INTEGER"]).unwrap();
        DmlExecutor::insert_row(&session, "people", &["name", "age"], &["O'Brien", "30"]).unwrap();
        StatementExecutor::execute_mutation(&session, "INSERT INTO people (name) VALUES (NULL)").unwrap();

        let dump = export_dump_to_string(&session, &ExportOptions::default()).unwrap();
        let expected = "CREATE TABLE people (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT, age INTEGER);\n\
                        \n\
                        INSERT INTO people VALUES (1, 'O''Brien', 30);\n\
                        INSERT INTO people VALUES (2, NULL, NULL);\n\
                        \n";
        assert_eq!(dump, expected);
    }

    #[test]
    fn test_export_empty_table_and_empty_database() {
        let temp_dir = TempDir::new().unwrap();
        let session = open_session(&temp_dir, "empty.db");

        let dump = export_dump_to_string(&session, &ExportOptions::default()).unwrap();
        assert_eq!(dump, "");

        StatementExecutor::execute_mutation(&session, "CREATE TABLE t (v)").unwrap();
        let dump = export_dump_to_string(&session, &ExportOptions::default()).unwrap();
        assert_eq!(dump, "CREATE TABLE t (v);\n\n\n");
    }

    #[test]
    fn test_export_options() {
        let temp_dir = TempDir::new().unwrap();
        let session = open_session(&temp_dir, "opts.db");
        StatementExecutor::execute_mutation(&session, "CREATE TABLE t (v); INSERT INTO t VALUES (1);").unwrap();

        let schema = export_dump_to_string(&session, &ExportOptions { schema_only: true, ..Default::default() }).unwrap();
        assert_eq!(schema, "CREATE TABLE t (v);\n\n\n");

        let data = export_dump_to_string(&session, &ExportOptions { data_only: true, ..Default::default() }).unwrap();
        assert_eq!(data, "INSERT INTO t VALUES (1);\n\n");

        let header = export_dump_to_string(&session, &ExportOptions { header: true, ..Default::default() }).unwrap();
        assert!(header.starts_with("--\n-- dbdesk database dump\n-- Database: "));

        let both = ExportOptions { schema_only: true, data_only: true, header: false };
        assert!(matches!(
            export_dump_to_string(&session, &both),
            Err(DatabaseError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_export_requires_connection() {
        let session = Session::new();
        assert!(matches!(
            export_dump_to_string(&session, &ExportOptions::default()),
            Err(DatabaseError::NotConnected)
        ));
    }

    #[test]
    fn test_export_dump_file() {
        let temp_dir = TempDir::new().unwrap();
        let session = open_session(&temp_dir, "file.db");
        StatementExecutor::execute_mutation(&session, "CREATE TABLE t (v); INSERT INTO t VALUES ('x');").unwrap();

        let path = temp_dir.path().join("out.sql");
        let summary = export_dump_file(&session, &path, &ExportOptions::default()).unwrap();
        assert_eq!(summary, ExportSummary { tables: 1, rows: 1 });
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "CREATE TABLE t (v);\n\nINSERT INTO t VALUES ('x');\n\n"
        );
    }
}
