use clap::{Parser, ValueEnum};
use dbdesk::dump::{DatabaseSnapshot, ExportOptions, export_dump};
use dbdesk::{AppConfig, Session};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DumpFormat {
    Sql,
    Binary,
}

#[derive(Debug, Parser)]
#[command(name = "dbdesk_dump")]
#[command(about = "Export a SQLite database to a SQL dump or binary snapshot", long_about = None)]
struct Args {
    /// Database file to dump
    database: PathBuf,

    /// Export only schema (CREATE statements)
    #[arg(long, conflicts_with = "data_only")]
    schema_only: bool,

    /// Export only data (INSERT statements)
    #[arg(long)]
    data_only: bool,

    /// Start the dump with a comment header (default from config)
    #[arg(long)]
    header: bool,

    /// Output format: sql or binary
    #[arg(short = 'f', long, value_enum, default_value = "sql")]
    format: DumpFormat,

    /// Output file (default: stdout)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Config file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = AppConfig::load(args.config.as_deref())?;
    dbdesk::logging::init_tracing(&config.log_level);

    // Connecting would create a missing file, which is never what a dump wants
    if !args.database.is_file() {
        eprintln!("Error: database file not found: {}", args.database.display());
        std::process::exit(1);
    }

    let mut session = Session::new();
    session.connect(&args.database)?;

    // Determine output writer (stdout or file)
    let mut output: Box<dyn Write> = if let Some(path) = &args.output {
        Box::new(BufWriter::new(File::create(path)?))
    } else {
        Box::new(io::stdout().lock())
    };

    match args.format {
        DumpFormat::Sql => {
            let options = ExportOptions {
                schema_only: args.schema_only,
                data_only: args.data_only,
                header: args.header || config.dump_header,
            };
            let summary = export_dump(&session, &mut output, &options)?;
            eprintln!("Dumped {} tables, {} rows", summary.tables, summary.rows);
        }
        DumpFormat::Binary => {
            let snapshot = DatabaseSnapshot::capture(&session)?;
            output.write_all(&snapshot.to_bytes()?)?;
            output.flush()?;
            eprintln!(
                "Dumped {} tables, {} rows (binary)",
                snapshot.tables.len(),
                snapshot.row_count()
            );
        }
    }

    session.close();
    Ok(())
}
