use clap::Parser;
use dbdesk::dump::{DatabaseSnapshot, ExportOptions, ImportReport, export_dump_file, import_dump_file};
use dbdesk::render::format_result;
use dbdesk::viewer::StatementOutcome;
use dbdesk::{AppConfig, Session, TableViewer, Value};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::path::PathBuf;

/// dbdesk interactive shell
#[derive(Parser, Debug)]
#[command(name = "dbdesk")]
#[command(about = "Browse and edit SQLite databases from the terminal", long_about = None)]
struct Args {
    /// Database file to open on startup
    database: Option<PathBuf>,

    /// Config file (default: ./dbdesk.toml or the user config dir)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Log level or filter, e.g. debug or dbdesk=trace
    #[arg(long)]
    log: Option<String>,
}

/// What the command loop hands back to the session owner
enum Action {
    Open(PathBuf),
    Create(PathBuf),
    Quit,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let mut config = AppConfig::load(args.config.as_deref())?;
    config.apply_overrides(args.database, args.log);
    dbdesk::logging::init_tracing(&config.log_level);

    println!("dbdesk {} - type \\? for help, \\q to quit", env!("CARGO_PKG_VERSION"));

    let mut rl = DefaultEditor::new()?;
    let history_file = config
        .history
        .then(dirs::home_dir)
        .flatten()
        .map(|p| p.join(".dbdesk_history"));

    if let Some(ref path) = history_file {
        let _ = rl.load_history(path); // Ignore error if file doesn't exist
    }

    let mut session = Session::new();
    if let Some(path) = config.database.clone() {
        open(&mut session, path);
    }

    loop {
        let viewer = TableViewer::new(&session);
        let action = command_loop(&mut rl, &session, viewer, &config);

        match action {
            Ok(Action::Open(path)) => open(&mut session, path),
            Ok(Action::Create(path)) => match Session::create_database(&path) {
                Ok(()) => open(&mut session, path),
                Err(e) => eprintln!("✗ {e}"),
            },
            Ok(Action::Quit) => break,
            Err(e) => {
                if let Some(ref path) = history_file {
                    let _ = rl.save_history(path);
                }
                return Err(e.into());
            }
        }
    }

    if let Some(ref path) = history_file {
        let _ = rl.save_history(path);
    }
    session.close();

    Ok(())
}

fn open(session: &mut Session, path: PathBuf) {
    match session.connect(&path) {
        Ok(()) => println!("✓ Connected to {}", path.display()),
        Err(e) => eprintln!("✗ {e}"),
    }
}

fn command_loop(
    rl: &mut DefaultEditor,
    session: &Session,
    mut viewer: TableViewer<'_>,
    config: &AppConfig,
) -> Result<Action, ReadlineError> {
    loop {
        let prompt = match (session.current_database(), viewer.selected_table()) {
            (None, _) => "dbdesk> ".to_string(),
            (Some(db), None) => format!("{}> ", file_label(db)),
            (Some(db), Some(table)) => {
                let marker = if viewer.has_staged_changes() { "*" } else { "" };
                format!("{}:{table}{marker}> ", file_label(db))
            }
        };

        let input = match rl.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => return Ok(Action::Quit),
            Err(err) => return Err(err),
        };

        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(input);

        if !input.starts_with('\\') {
            run_statement(&mut viewer, input);
            continue;
        }

        let (command, rest) = input.split_once(char::is_whitespace).unwrap_or((input, ""));
        let rest = rest.trim();

        match command {
            "\\q" | "\\quit" => return Ok(Action::Quit),
            "\\c" | "\\connect" if !rest.is_empty() => return Ok(Action::Open(PathBuf::from(rest))),
            "\\n" | "\\new" if !rest.is_empty() => return Ok(Action::Create(PathBuf::from(rest))),
            "\\?" | "\\h" | "\\help" => print_help(),
            "\\dt" => {
                for table in viewer.refresh_tables() {
                    println!("  {table}");
                }
                println!("{}", viewer.status());
            }
            "\\s" if !rest.is_empty() => match viewer.select_table(rest) {
                Ok(result) => print!("{}", format_result(result, true)),
                Err(e) => eprintln!("✗ {e}"),
            },
            "\\ct" if !rest.is_empty() => {
                let (name, defs) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                let defs: Vec<&str> = defs.split(',').collect();
                report(viewer.create_table(name, &defs).map(|()| viewer.status().to_string()));
            }
            "\\drop" if !rest.is_empty() => {
                report(viewer.drop_table(rest).map(|()| viewer.status().to_string()));
            }
            "\\add" => {
                report(viewer.add_row().map(|()| viewer.status().to_string()));
                show_view(&viewer);
            }
            "\\del" => match rest.parse::<usize>() {
                Ok(row) => {
                    report(viewer.delete_row(row).map(|()| viewer.status().to_string()));
                    show_view(&viewer);
                }
                Err(_) => eprintln!("Usage: \\del ROW"),
            },
            "\\set" => match parse_set(rest) {
                Some((row, column, value)) => {
                    report(viewer.set_cell(row, column, value).map(|()| "Cell staged".to_string()));
                    show_view(&viewer);
                }
                None => eprintln!("Usage: \\set ROW COL VALUE"),
            },
            "\\save" => report(viewer.save_changes().map(|s| {
                format!(
                    "{} ({} inserted, {} updated, {} deleted)",
                    viewer.status(),
                    s.inserted,
                    s.updated,
                    s.deleted
                )
            })),
            "\\i" if !rest.is_empty() => {
                match import_dump_file(session, rest) {
                    Ok(import) => print_import(&import),
                    Err(e) => eprintln!("✗ {e}"),
                }
                viewer.refresh_tables();
            }
            "\\e" if !rest.is_empty() => {
                let options = ExportOptions {
                    header: config.dump_header,
                    ..ExportOptions::default()
                };
                report(
                    export_dump_file(session, rest, &options)
                        .map(|s| format!("Exported {} tables, {} rows to {rest}", s.tables, s.rows)),
                );
            }
            "\\snap" if !rest.is_empty() => report(DatabaseSnapshot::capture(session).and_then(|snapshot| {
                snapshot.save(rest)?;
                Ok(format!(
                    "Saved snapshot of {} tables, {} rows to {rest}",
                    snapshot.tables.len(),
                    snapshot.row_count()
                ))
            })),
            "\\load" if !rest.is_empty() => {
                match DatabaseSnapshot::load(rest).and_then(|snapshot| snapshot.restore(session)) {
                    Ok(import) => print_import(&import),
                    Err(e) => eprintln!("✗ {e}"),
                }
                viewer.refresh_tables();
            }
            _ => println!("Unknown or incomplete meta-command: {input}. Use \\? for help."),
        }
    }
}

fn run_statement(viewer: &mut TableViewer<'_>, sql: &str) {
    match viewer.execute_statement(sql) {
        Ok(StatementOutcome::Rows(_)) => {
            if let Some(result) = viewer.view() {
                print!("{}", format_result(result, false));
            }
        }
        Ok(StatementOutcome::Changed(_)) => println!("{}", viewer.status()),
        Err(e) => eprintln!("✗ {e}"),
    }
}

fn report(result: Result<String, dbdesk::DatabaseError>) {
    match result {
        Ok(message) => println!("✓ {message}"),
        Err(e) => eprintln!("✗ {e}"),
    }
}

fn show_view(viewer: &TableViewer<'_>) {
    if let Some(result) = viewer.view() {
        print!("{}", format_result(result, true));
    }
}

fn print_import(import: &ImportReport) {
    println!("Executed {} statements, {} failed", import.executed, import.failures.len());
    for failure in &import.failures {
        let line = failure.line.map_or_else(String::new, |l| format!(" (line {l})"));
        eprintln!("  #{}{line}: {}", failure.ordinal, failure.message);
    }
    if import.unterminated.is_some() {
        eprintln!("  unterminated statement at end of input was not executed");
    }
}

fn file_label(path: &std::path::Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

/// `ROW COL VALUE`, where VALUE is `NULL`, a number, or text (optionally quoted)
fn parse_set(rest: &str) -> Option<(usize, usize, Value)> {
    let mut parts = rest.splitn(3, char::is_whitespace);
    let row = parts.next()?.parse().ok()?;
    let column = parts.next()?.parse().ok()?;
    let raw = parts.next()?.trim();

    let value = if raw.eq_ignore_ascii_case("NULL") {
        Value::Null
    } else if let Ok(i) = raw.parse::<i64>() {
        Value::Integer(i)
    } else if let Some(r) = raw
        .parse::<f64>()
        .ok()
        .filter(|_| raw.bytes().any(|b| b.is_ascii_digit()))
    {
        Value::Real(r)
    } else {
        let unquoted = raw
            .strip_prefix('\'')
            .and_then(|s| s.strip_suffix('\''))
            .unwrap_or(raw);
        Value::from(unquoted)
    };

    Some((row, column, value))
}

fn print_help() {
    println!("Meta-commands:");
    println!("  \\c PATH               - Open a database file");
    println!("  \\n PATH               - Create a database file and open it");
    println!("  \\dt                   - List tables");
    println!("  \\s TABLE              - Select a table and show its rows");
    println!("  \\ct TABLE DEF[, DEF]  - Create a table (an id column is added)");
    println!("  \\drop TABLE           - Drop a table");
    println!("  \\add                  - Stage a blank row");
    println!("  \\del ROW              - Stage deleting a row");
    println!("  \\set ROW COL VALUE    - Stage a cell edit");
    println!("  \\save                 - Write staged edits to the table");
    println!("  \\i FILE               - Import a SQL dump");
    println!("  \\e FILE               - Export a SQL dump");
    println!("  \\snap FILE            - Save a binary snapshot");
    println!("  \\load FILE            - Restore a binary snapshot");
    println!("  \\?                    - Show this help");
    println!("  \\q                    - Quit");
    println!("\nAnything else runs as SQL against the open database.");
}
