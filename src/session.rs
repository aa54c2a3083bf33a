use crate::types::DatabaseError;
use rusqlite::Connection;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// The single live connection of the process.
///
/// A `Session` holds at most one SQLite handle. Connecting replaces the
/// previous handle after closing it, and every other component reaches the
/// handle only through [`Session::connection`].
#[derive(Debug, Default)]
pub struct Session {
    current_database: Option<PathBuf>,
    connection: Option<Connection>,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Materializes an empty database file at `path`.
    ///
    /// The file is created when absent, opened once to check that SQLite
    /// accepts it, then released. The active session, if any, is untouched.
    pub fn create_database<P: AsRef<Path>>(path: P) -> Result<(), DatabaseError> {
        let path = path.as_ref();
        if !path.exists() {
            File::create(path).map_err(|e| {
                DatabaseError::Connection(format!("cannot create '{}': {e}", path.display()))
            })?;
        }

        let conn = open_verified(path)?;
        conn.close().map_err(|(_, e)| {
            DatabaseError::Connection(format!("cannot release '{}': {e}", path.display()))
        })?;

        info!(path = %path.display(), "created database");
        Ok(())
    }

    /// Opens `path` as the current database, closing the previous handle first.
    ///
    /// A directory is rejected before anything is closed. If SQLite refuses the
    /// file the session ends up closed.
    pub fn connect<P: AsRef<Path>>(&mut self, path: P) -> Result<(), DatabaseError> {
        let path = path.as_ref();
        if path.is_dir() {
            return Err(DatabaseError::Connection(format!(
                "'{}' is a directory",
                path.display()
            )));
        }

        self.close();

        let conn = open_verified(path)?;
        self.connection = Some(conn);
        self.current_database = Some(path.to_path_buf());

        info!(path = %path.display(), "connected");
        Ok(())
    }

    #[must_use]
    pub fn current_database(&self) -> Option<&Path> {
        self.current_database.as_deref()
    }

    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Releases the held handle. Safe to call any number of times.
    pub fn close(&mut self) {
        if let Some(conn) = self.connection.take() {
            debug!("closing connection");
            // on failure the returned handle is dropped here, which closes it
            if let Err((_conn, e)) = conn.close() {
                warn!(error = %e, "error while closing connection");
            }
        }
        self.current_database = None;
    }

    pub(crate) fn connection(&self) -> Result<&Connection, DatabaseError> {
        self.connection.as_ref().ok_or(DatabaseError::NotConnected)
    }
}

/// Opens a handle and reads the schema version, which makes SQLite parse the
/// file header and reject files that are not databases.
fn open_verified(path: &Path) -> Result<Connection, DatabaseError> {
    let conn = Connection::open(path).map_err(|e| {
        DatabaseError::Connection(format!("cannot open '{}': {e}", path.display()))
    })?;

    conn.query_row("PRAGMA schema_version", [], |row| row.get::<_, i64>(0))
        .map_err(|e| {
            DatabaseError::Connection(format!("'{}' is not usable: {e}", path.display()))
        })?;

    Ok(conn)
}
