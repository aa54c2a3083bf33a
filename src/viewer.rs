use crate::catalog::SchemaIntrospector;
use crate::executor::ddl::ID_COLUMN;
use crate::executor::dml::{delete_by_id_sql, insert_columns_sql, update_by_id_sql};
use crate::executor::{DdlExecutor, StatementExecutor, StatementKind, classify_statement};
use crate::session::Session;
use crate::types::{DatabaseError, TabularResult, Value};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    NoTableSelected,
    TableSelected,
    RowsLoaded,
}

/// Where the rows on screen came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewSource {
    Table(String),
    Query(String),
}

#[derive(Debug)]
struct LoadedView {
    source: ViewSource,
    result: TabularResult,
    dirty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementOutcome {
    /// The view now holds this many rows
    Rows(usize),
    Changed(usize),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ApplySummary {
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
}

/// Table list, current table and its rows, for one open database.
///
/// Row edits only touch the in-memory view until [`TableViewer::save_changes`]
/// writes the difference back.
pub struct TableViewer<'a> {
    session: &'a Session,
    tables: Vec<String>,
    selected: Option<String>,
    view: Option<LoadedView>,
    status: String,
}

impl<'a> TableViewer<'a> {
    pub fn new(session: &'a Session) -> Self {
        let mut viewer = Self {
            session,
            tables: Vec::new(),
            selected: None,
            view: None,
            status: "Ready".to_string(),
        };
        viewer.refresh_tables();
        viewer
    }

    #[must_use]
    pub fn state(&self) -> ViewState {
        match (&self.selected, &self.view) {
            (_, Some(_)) => ViewState::RowsLoaded,
            (Some(_), None) => ViewState::TableSelected,
            (None, None) => ViewState::NoTableSelected,
        }
    }

    #[must_use]
    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    #[must_use]
    pub fn selected_table(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    #[must_use]
    pub fn view(&self) -> Option<&TabularResult> {
        self.view.as_ref().map(|v| &v.result)
    }

    #[must_use]
    pub fn view_source(&self) -> Option<&ViewSource> {
        self.view.as_ref().map(|v| &v.source)
    }

    #[must_use]
    pub fn has_staged_changes(&self) -> bool {
        self.view.as_ref().is_some_and(|v| v.dirty)
    }

    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn refresh_tables(&mut self) -> &[String] {
        self.tables = SchemaIntrospector::list_tables(self.session);

        let file_name = self
            .session
            .current_database()
            .and_then(|p| p.file_name())
            .map_or_else(String::new, |n| n.to_string_lossy().into_owned());
        self.status = format!("Loaded {} tables from {file_name}", self.tables.len());

        &self.tables
    }

    /// Makes `name` the current table and loads all of its rows, dropping any
    /// previous view and staged edits.
    pub fn select_table(&mut self, name: &str) -> Result<&TabularResult, DatabaseError> {
        self.view = None;
        self.selected = Some(name.to_string());

        match StatementExecutor::execute_query(self.session, &format!("SELECT * FROM {name}")) {
            Ok(result) => {
                self.status = format!("Loaded table: {name} ({} rows)", result.row_count());
                let view = self.view.insert(LoadedView {
                    source: ViewSource::Table(name.to_string()),
                    result,
                    dirty: false,
                });
                Ok(&view.result)
            }
            Err(e) => {
                self.status = format!("ERROR: {e}");
                Err(e)
            }
        }
    }

    pub fn create_table<S: AsRef<str>>(&mut self, name: &str, column_defs: &[S]) -> Result<(), DatabaseError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DatabaseError::InvalidInput("Please enter a table name".to_string()));
        }

        let defs: Vec<&str> = column_defs
            .iter()
            .map(|d| d.as_ref().trim())
            .filter(|d| !d.is_empty())
            .collect();
        if defs.is_empty() {
            return Err(DatabaseError::InvalidInput("Please add at least one column".to_string()));
        }

        if let Err(e) = DdlExecutor::create_table(self.session, name, &defs) {
            self.status = format!("ERROR: {e}");
            return Err(e);
        }

        self.refresh_tables();
        self.status = format!("Created table: {name}");
        info!(table = name, "table created");
        Ok(())
    }

    pub fn drop_table(&mut self, name: &str) -> Result<(), DatabaseError> {
        if let Err(e) = DdlExecutor::drop_table(self.session, name) {
            self.status = format!("ERROR: {e}");
            return Err(e);
        }

        if self.selected.as_deref() == Some(name) {
            self.selected = None;
            self.view = None;
        }

        self.refresh_tables();
        self.status = format!("Deleted table: {name}");
        Ok(())
    }

    /// Appends a blank row: NULL in the first (id) column, empty text elsewhere.
    pub fn add_row(&mut self) -> Result<(), DatabaseError> {
        let view = self.table_view_mut()?;
        let width = view.result.column_count();
        if width <= 1 {
            return Err(DatabaseError::NoEditableColumns);
        }

        let mut row = Vec::with_capacity(width);
        row.push(Value::Null);
        row.resize(width, Value::Text(String::new()));
        view.result.rows.push(row);
        view.dirty = true;

        self.status = "Added new row (remember to save changes)".to_string();
        Ok(())
    }

    pub fn delete_row(&mut self, index: usize) -> Result<(), DatabaseError> {
        let view = self.table_view_mut()?;
        if index >= view.result.row_count() {
            return Err(DatabaseError::RowOutOfRange(index));
        }

        view.result.rows.remove(index);
        view.dirty = true;

        self.status = "Deleted row (remember to save changes)".to_string();
        Ok(())
    }

    pub fn set_cell(&mut self, row: usize, column: usize, value: Value) -> Result<(), DatabaseError> {
        let view = self.table_view_mut()?;
        if column >= view.result.column_count() {
            return Err(DatabaseError::ColumnOutOfRange(column));
        }
        let cell = view
            .result
            .rows
            .get_mut(row)
            .and_then(|r| r.get_mut(column))
            .ok_or(DatabaseError::RowOutOfRange(row))?;

        *cell = value;
        view.dirty = true;
        Ok(())
    }

    /// Writes the staged rows back to the selected table.
    ///
    /// The view is compared with a fresh read of the table by `id`: ids that
    /// disappeared are deleted, rows with a NULL id are inserted, and rows
    /// whose values changed are updated. Everything runs in one transaction,
    /// then the table is reloaded.
    pub fn save_changes(&mut self) -> Result<ApplySummary, DatabaseError> {
        let Some(table) = self.selected.clone() else {
            return Err(DatabaseError::NoTableSelected);
        };
        let view = match &self.view {
            Some(view) if view.source == ViewSource::Table(table.clone()) => view,
            Some(_) => return Err(DatabaseError::NotTableBacked),
            None => return Err(DatabaseError::NoTableSelected),
        };

        if !view.dirty {
            self.status = format!("No changes to save in {table}");
            return Ok(ApplySummary::default());
        }

        let statements = match self.plan_changes(&table, &view.result) {
            Ok(plan) => plan,
            Err(e) => {
                self.status = format!("ERROR: {e}");
                return Err(e);
            }
        };

        if let Err(e) = self.apply_in_transaction(&statements.sql) {
            self.status = format!("ERROR: {e}");
            return Err(e);
        }

        self.select_table(&table)?;
        self.status = format!("Saved changes to {table}");
        info!(
            table = table.as_str(),
            inserted = statements.summary.inserted,
            updated = statements.summary.updated,
            deleted = statements.summary.deleted,
            "staged changes saved"
        );
        Ok(statements.summary)
    }

    fn plan_changes(&self, table: &str, staged: &TabularResult) -> Result<ChangePlan, DatabaseError> {
        let id_idx = staged
            .column_index(ID_COLUMN)
            .ok_or_else(|| DatabaseError::MissingIdColumn(table.to_string()))?;

        let fresh = StatementExecutor::execute_query(self.session, &format!("SELECT * FROM {table}"))?;
        if fresh.columns != staged.columns {
            return Err(DatabaseError::InvalidInput(format!(
                "columns of {table} changed since it was loaded"
            )));
        }

        let id_key = |row: &Vec<Value>| row[id_idx].to_sql_literal();

        // every persisted row must be addressable by its id alone
        let mut fresh_by_id: HashMap<String, &Vec<Value>> = HashMap::with_capacity(fresh.row_count());
        for row in &fresh.rows {
            if row[id_idx].is_null() || fresh_by_id.insert(id_key(row), row).is_some() {
                return Err(DatabaseError::NonUniqueId(table.to_string()));
            }
        }
        let mut staged_ids: HashSet<String> = HashSet::with_capacity(staged.row_count());
        for row in staged.rows.iter().filter(|row| !row[id_idx].is_null()) {
            if !staged_ids.insert(id_key(row)) {
                return Err(DatabaseError::NonUniqueId(table.to_string()));
            }
        }

        let other_columns: Vec<usize> = (0..staged.column_count()).filter(|&i| i != id_idx).collect();
        let mut plan = ChangePlan::default();

        for row in &fresh.rows {
            if !staged_ids.contains(&id_key(row)) {
                plan.sql.push(delete_by_id_sql(table, ID_COLUMN, &row[id_idx]));
                plan.summary.deleted += 1;
            }
        }

        for row in &staged.rows {
            let id = &row[id_idx];
            if id.is_null() {
                let columns: Vec<&str> = other_columns.iter().map(|&i| staged.columns[i].as_str()).collect();
                let values: Vec<Value> = other_columns.iter().map(|&i| row[i].clone()).collect();
                plan.sql.push(insert_columns_sql(table, &columns, &values));
                plan.summary.inserted += 1;
                continue;
            }

            match fresh_by_id.get(&id_key(row)) {
                Some(persisted) => {
                    let assignments: Vec<(&str, &Value)> = other_columns
                        .iter()
                        .filter(|&&i| row[i] != persisted[i])
                        .map(|&i| (staged.columns[i].as_str(), &row[i]))
                        .collect();
                    if !assignments.is_empty() {
                        plan.sql.push(update_by_id_sql(table, ID_COLUMN, id, &assignments));
                        plan.summary.updated += 1;
                    }
                }
                // removed behind our back; put it back as staged
                None => {
                    plan.sql.push(insert_columns_sql(table, &staged.columns, row));
                    plan.summary.inserted += 1;
                }
            }
        }

        Ok(plan)
    }

    /// Runs `statements` between `BEGIN` and `COMMIT`. Any failure, COMMIT
    /// included, rolls the whole batch back and returns the first error.
    fn apply_in_transaction(&self, statements: &[String]) -> Result<(), DatabaseError> {
        StatementExecutor::execute_mutation(self.session, "BEGIN")?;

        let applied = statements
            .iter()
            .try_for_each(|sql| {
                debug!(sql = sql.as_str(), "apply staged change");
                StatementExecutor::execute_mutation(self.session, sql).map(|_| ())
            })
            .and_then(|()| StatementExecutor::execute_mutation(self.session, "COMMIT").map(|_| ()));

        if let Err(e) = applied {
            if let Err(rollback) = StatementExecutor::execute_mutation(self.session, "ROLLBACK") {
                warn!(error = %rollback, "rollback of staged changes failed");
            }
            return Err(e);
        }
        Ok(())
    }

    /// Runs ad hoc SQL. Queries replace the current view; other statements
    /// refresh the table list on success, since they may change the schema.
    pub fn execute_statement(&mut self, sql: &str) -> Result<StatementOutcome, DatabaseError> {
        let sql = sql.trim();

        match classify_statement(sql) {
            StatementKind::Query => {
                self.view = None;
                match StatementExecutor::execute_query(self.session, sql) {
                    Ok(result) => {
                        let rows = result.row_count();
                        self.status = format!("Query executed: {rows} rows returned");
                        self.view = Some(LoadedView {
                            source: ViewSource::Query(sql.to_string()),
                            result,
                            dirty: false,
                        });
                        Ok(StatementOutcome::Rows(rows))
                    }
                    Err(e) => {
                        self.status = format!("ERROR: {e}");
                        Err(e)
                    }
                }
            }
            StatementKind::Mutation => match StatementExecutor::execute_mutation(self.session, sql) {
                Ok(changed) => {
                    self.refresh_tables();
                    self.status = format!("Query executed successfully ({changed} rows changed)");
                    Ok(StatementOutcome::Changed(changed))
                }
                Err(e) => {
                    self.status = format!("ERROR: Failed to execute query: {e}");
                    Err(e)
                }
            },
        }
    }

    /// The loaded view, provided it shows the selected table itself.
    fn table_view_mut(&mut self) -> Result<&mut LoadedView, DatabaseError> {
        let Some(table) = self.selected.as_deref() else {
            return Err(DatabaseError::NoTableSelected);
        };
        match self.view.as_mut() {
            Some(view) if matches!(&view.source, ViewSource::Table(t) if t == table) => Ok(view),
            Some(_) => Err(DatabaseError::NotTableBacked),
            None => Err(DatabaseError::NoEditableColumns),
        }
    }
}

#[derive(Debug, Default)]
struct ChangePlan {
    sql: Vec<String>,
    summary: ApplySummary,
}
