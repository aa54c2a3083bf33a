// SQL text dumps (import/export) and typed binary snapshots
pub mod import;
pub mod export;
pub mod snapshot;

pub use import::{
    DumpStatement, ImportReport, StatementFailure, StatementSplitter, import_dump,
    import_dump_file, import_dump_str, split_statements,
};
pub use export::{ExportOptions, ExportSummary, export_dump, export_dump_file, export_dump_to_string};
pub use snapshot::{DatabaseSnapshot, TableSnapshot};
