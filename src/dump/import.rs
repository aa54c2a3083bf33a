use crate::executor::StatementExecutor;
use crate::session::Session;
use crate::types::DatabaseError;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{info, warn};

/// One statement cut out of dump text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpStatement {
    /// 1-based line on which the statement's first line sits
    pub line: usize,
    pub text: String,
}

/// Line-oriented statement splitter.
///
/// Lines accumulate (each followed by `\n`) until one whose trimmed content
/// ends with `;`. There is no tokenizer: a string literal that ends a line
/// with `;` splits the statement, and comments travel inside the buffer.
#[derive(Debug, Default)]
pub struct StatementSplitter {
    buffer: String,
    start_line: usize,
    line_no: usize,
}

impl StatementSplitter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_line(&mut self, line: &str) -> Option<DumpStatement> {
        self.line_no += 1;
        if self.buffer.is_empty() {
            self.start_line = self.line_no;
        }

        self.buffer.push_str(line);
        self.buffer.push('\n');

        if line.trim().ends_with(';') {
            Some(DumpStatement {
                line: self.start_line,
                text: std::mem::take(&mut self.buffer),
            })
        } else {
            None
        }
    }

    /// Text left over after the last terminated statement, if it is more than
    /// whitespace.
    #[must_use]
    pub fn finish(self) -> Option<DumpStatement> {
        if self.buffer.trim().is_empty() {
            None
        } else {
            Some(DumpStatement {
                line: self.start_line,
                text: self.buffer,
            })
        }
    }
}

/// Splits a whole dump into its terminated statements.
#[must_use]
pub fn split_statements(input: &str) -> Vec<DumpStatement> {
    let mut splitter = StatementSplitter::new();
    input
        .lines()
        .filter_map(|line| splitter.push_line(line))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementFailure {
    /// 1-based position among the statements attempted
    pub ordinal: usize,
    /// Source line, when the statement came from dump text
    pub line: Option<usize>,
    pub statement: String,
    pub message: String,
}

/// Outcome of a best-effort replay.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub executed: usize,
    pub failures: Vec<StatementFailure>,
    /// Trailing text that never reached a terminating `;`; it is not executed
    pub unterminated: Option<String>,
}

impl ImportReport {
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.executed + self.failures.len()
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.unterminated.is_none()
    }

    /// Executes one statement and records the outcome. A failure is logged and
    /// kept; it never stops the caller's replay.
    pub(crate) fn replay(&mut self, session: &Session, line: Option<usize>, statement: String) {
        let ordinal = self.attempted() + 1;
        match StatementExecutor::execute_mutation(session, &statement) {
            Ok(_) => self.executed += 1,
            Err(e) => {
                warn!(ordinal, line = ?line, error = %e, "dump statement failed");
                self.failures.push(StatementFailure {
                    ordinal,
                    line,
                    statement,
                    message: e.to_string(),
                });
            }
        }
    }
}

/// Replays dump text from `reader` statement by statement.
///
/// Each statement runs on its own as soon as it is complete; failing ones are
/// reported and skipped. Only a read error (including invalid UTF-8) fails the
/// import, and statements replayed before it stay applied.
pub fn import_dump<R: BufRead>(session: &Session, reader: R) -> Result<ImportReport, DatabaseError> {
    session.connection()?;

    let mut splitter = StatementSplitter::new();
    let mut report = ImportReport::default();

    for line in reader.lines() {
        let line = line?;
        if let Some(statement) = splitter.push_line(&line) {
            report.replay(session, Some(statement.line), statement.text);
        }
    }

    if let Some(rest) = splitter.finish() {
        warn!(line = rest.line, "dump ends with an unterminated statement");
        report.unterminated = Some(rest.text);
    }

    info!(
        executed = report.executed,
        failed = report.failures.len(),
        "dump imported"
    );
    Ok(report)
}

pub fn import_dump_str(session: &Session, input: &str) -> Result<ImportReport, DatabaseError> {
    import_dump(session, input.as_bytes())
}

pub fn import_dump_file<P: AsRef<Path>>(session: &Session, path: P) -> Result<ImportReport, DatabaseError> {
    let file = File::open(path.as_ref())?;
    import_dump(session, BufReader::new(file))
}
