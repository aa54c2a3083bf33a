use clap::{Parser, ValueEnum};
use dbdesk::dump::{DatabaseSnapshot, ImportReport, import_dump_str, split_statements};
use dbdesk::{AppConfig, Session};
use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum RestoreFormat {
    Sql,
    Binary,
    Auto, // Auto-detect based on content
}

#[derive(Debug, Parser)]
#[command(name = "dbdesk_restore")]
#[command(about = "Import a SQL dump or binary snapshot into a SQLite database", long_about = None)]
struct Args {
    /// Database file to restore into (created if missing)
    database: PathBuf,

    /// Input format: sql, binary, or auto (default: auto-detect)
    #[arg(short = 'f', long, value_enum, default_value = "auto")]
    format: RestoreFormat,

    /// Input file (default: stdin)
    #[arg(short = 'i', long)]
    input: Option<PathBuf>,

    /// Dry run: count statements without executing them
    #[arg(long)]
    dry_run: bool,

    /// Config file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = AppConfig::load(args.config.as_deref())?;
    dbdesk::logging::init_tracing(&config.log_level);

    // Read input from file or stdin
    let mut input_data = Vec::new();
    if let Some(path) = &args.input {
        File::open(path)?.read_to_end(&mut input_data)?;
    } else {
        io::stdin().read_to_end(&mut input_data)?;
    }

    let format = match args.format {
        RestoreFormat::Auto => detect_format(&input_data),
        f => f,
    };

    match format {
        RestoreFormat::Binary => {
            let snapshot = DatabaseSnapshot::from_bytes(&input_data)?;
            if args.dry_run {
                println!(
                    "Dry run: snapshot with {} tables, {} rows",
                    snapshot.tables.len(),
                    snapshot.row_count()
                );
                return Ok(());
            }

            let session = open(&args)?;
            let report = snapshot.restore(&session)?;
            print_report("Binary restore", &report);
        }
        RestoreFormat::Sql | RestoreFormat::Auto => {
            let input_str = String::from_utf8(input_data)?;
            if args.dry_run {
                let statements = split_statements(&input_str);
                println!("Dry run: {} SQL statements found", statements.len());
                return Ok(());
            }

            let session = open(&args)?;
            let report = import_dump_str(&session, &input_str)?;
            print_report("SQL restore", &report);
        }
    }

    Ok(())
}

fn open(args: &Args) -> Result<Session, dbdesk::DatabaseError> {
    let mut session = Session::new();
    session.connect(&args.database)?;
    Ok(session)
}

/// Auto-detect format based on content
///
/// UTF-8 without NUL bytes is SQL text; anything else is a binary snapshot.
fn detect_format(data: &[u8]) -> RestoreFormat {
    match std::str::from_utf8(data) {
        Ok(text) if !text.contains('\0') => RestoreFormat::Sql,
        _ => RestoreFormat::Binary,
    }
}

fn print_report(label: &str, report: &ImportReport) {
    println!(
        "{label} completed: {} statements executed, {} failed",
        report.executed,
        report.failures.len()
    );
    for failure in &report.failures {
        let line = failure.line.map_or_else(String::new, |l| format!(" at line {l}"));
        eprintln!("Statement #{}{line} failed: {}", failure.ordinal, failure.message);
    }
    if let Some(rest) = &report.unterminated {
        eprintln!("Unterminated statement at end of input was not executed:\n{rest}");
    }
}
