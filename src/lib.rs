// dbdesk - SQLite session core for a desktop database browser
// Session, catalog, statements, dumps and an editable table view

// Clippy configuration - allow non-critical warnings
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::manual_let_else)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::format_push_string)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::multiple_crate_versions)]

// Core value types and errors
pub mod core;

// Short path for the shared value and error types: crate::types::{Value, DatabaseError}
pub mod types {
    pub use crate::core::*;
}

// Connection lifecycle
pub mod session;

// Table listing from sqlite_master
pub mod catalog;

// Statement routing, DDL and DML builders
pub mod executor;

// SQL dump import/export, binary snapshots
pub mod dump;

// Opaque file persistence
pub mod storage;

// Table view with staged row edits
pub mod viewer;

pub mod config;
pub mod logging;
pub mod render;

// Re-export commonly used types for convenience
pub use core::{DatabaseError, TabularResult, Value};
pub use session::Session;
pub use catalog::SchemaIntrospector;
pub use executor::{QueryResult, StatementExecutor, StatementKind, classify_statement};
pub use dump::{DatabaseSnapshot, ExportOptions, ImportReport};
pub use viewer::{ApplySummary, TableViewer, ViewSource, ViewState};
pub use config::AppConfig;
