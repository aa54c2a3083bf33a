use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("No database is open")]
    NotConnected,
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Execution error: {0}")]
    Execution(#[from] rusqlite::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Binary Serialization error: {0}")]
    BinarySerialization(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("No table selected")]
    NoTableSelected,
    #[error("Table has no editable columns")]
    NoEditableColumns,
    #[error("Row {0} is out of range")]
    RowOutOfRange(usize),
    #[error("Column {0} is out of range")]
    ColumnOutOfRange(usize),
    #[error("Current view is not backed by a table")]
    NotTableBacked,
    #[error("Table '{0}' has no id column")]
    MissingIdColumn(String),
    #[error("Rows of '{0}' cannot be told apart: id is NULL or repeated")]
    NonUniqueId(String),
}

impl From<config::ConfigError> for DatabaseError {
    fn from(e: config::ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}
