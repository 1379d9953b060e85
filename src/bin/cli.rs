//! OpalDB - interactive SQL shell

use std::env;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing_subscriber::EnvFilter;

use opaldb::executor::QueryExecutor;
use opaldb::snapshot::JsonSnapshot;
use opaldb::storage::{Row, Value};

/// Default snapshot file next to the working directory
const DEFAULT_SNAPSHOT: &str = "opaldb.json";

/// Print welcome banner
fn print_banner() {
    println!(
        r#"
   ___              _ ____  ____
  / _ \ _ __   __ _| |  _ \| __ )
 | | | | '_ \ / _` | | | | |  _ \
 | |_| | |_) | (_| | | |_| | |_) |
  \___/| .__/ \__,_|_|____/|____/
       |_|

 A minimal relational database engine in Rust
 Type '.help' for help, '.quit' to exit
"#
    );
}

/// Print help message
fn print_help() {
    println!(
        r#"
Commands:
  .help              Show this help message
  .quit / .exit      Exit OpalDB
  .tables            List all tables
  .schema [table]    Show table schema
  .clear             Clear screen

SQL Commands:
  CREATE TABLE ...   Create a new table
  DROP TABLE ...     Drop a table
  INSERT INTO ...    Insert a row
  SELECT ...         Query data
  UPDATE ...         Update rows
  DELETE FROM ...    Delete rows

Examples:
  CREATE TABLE users (id INTEGER PRIMARY KEY, name VARCHAR(100));
  INSERT INTO users VALUES (1, 'Alice');
  SELECT * FROM users WHERE id = 1;
"#
    );
}

/// Format query results as a table
fn format_results(columns: &[String], rows: &[Row]) -> String {
    if columns.is_empty() && rows.is_empty() {
        return String::new();
    }

    // Calculate column widths
    let mut widths: Vec<usize> = columns.iter().map(|c| c.len()).collect();

    for row in rows {
        for (i, column) in columns.iter().enumerate() {
            let value = row.get(column).unwrap_or(&Value::Null);
            widths[i] = widths[i].max(format!("{}", value).len());
        }
    }

    let mut output = String::new();

    // Header separator
    let separator: String = widths
        .iter()
        .map(|w| "-".repeat(*w + 2))
        .collect::<Vec<_>>()
        .join("+");
    let separator = format!("+{}+\n", separator);

    // Header
    output.push_str(&separator);
    let header: String = columns
        .iter()
        .zip(&widths)
        .map(|(c, w)| format!(" {:^width$} ", c, width = *w))
        .collect::<Vec<_>>()
        .join("|");
    output.push_str(&format!("|{}|\n", header));
    output.push_str(&separator);

    // Rows
    for row in rows {
        let row_str: String = columns
            .iter()
            .zip(&widths)
            .map(|(c, w)| {
                let value = row.get(c).unwrap_or(&Value::Null);
                format!(" {:>width$} ", format!("{}", value), width = *w)
            })
            .collect::<Vec<_>>()
            .join("|");
        output.push_str(&format!("|{}|\n", row_str));
    }

    if !rows.is_empty() {
        output.push_str(&separator);
    }

    output.push_str(&format!("{} row(s) returned\n", rows.len()));

    output
}

/// Execute a SQL statement and print the outcome
fn run_statement(sql: &str, executor: &mut QueryExecutor) {
    let result = executor.execute_sql(sql);
    if !result.success {
        eprintln!("Error: {}", result.message);
        return;
    }
    match (&result.rows, &result.columns) {
        (Some(rows), Some(columns)) => print!("{}", format_results(columns, rows)),
        _ => println!("{}", result.message),
    }
}

/// Handle special dot commands. Returns false when the REPL should exit.
fn handle_special_command(cmd: &str, executor: &QueryExecutor) -> bool {
    let parts: Vec<&str> = cmd.split_whitespace().collect();

    match parts.first().copied() {
        Some(".help") => print_help(),
        Some(".quit") | Some(".exit") => {
            println!("Goodbye!");
            return false;
        }
        Some(".tables") => {
            let tables = executor.database().table_names();
            if tables.is_empty() {
                println!("No tables found.");
            } else {
                println!("Tables:");
                for table in tables {
                    println!("  {}", table);
                }
            }
        }
        Some(".schema") => {
            let database = executor.database();
            let tables: Vec<String> = match parts.get(1) {
                Some(table) => vec![table.to_string()],
                None => database.table_names().iter().map(|t| t.to_string()).collect(),
            };
            for table in tables {
                match database.describe(&table) {
                    Ok(info) => println!("{}", info),
                    Err(e) => eprintln!("Error: {}", e),
                }
            }
        }
        Some(".clear") => {
            // ANSI escape: clear screen, cursor home
            print!("\x1B[2J\x1B[1;1H");
        }
        Some(cmd) => {
            eprintln!("Unknown command: {}", cmd);
            eprintln!("Type '.help' for available commands.");
        }
        None => {}
    }
    true
}

/// Main REPL loop
fn run_repl(mut executor: QueryExecutor) -> anyhow::Result<()> {
    print_banner();

    let mut rl = DefaultEditor::new()?;
    let mut buffer = String::new();

    loop {
        let prompt = if buffer.is_empty() { "opaldb> " } else { "   ...> " };
        match rl.readline(prompt) {
            Ok(line) => {
                let trimmed = line.trim();

                if buffer.is_empty() && trimmed.starts_with('.') {
                    let _ = rl.add_history_entry(trimmed);
                    if !handle_special_command(trimmed, &executor) {
                        return Ok(());
                    }
                    continue;
                }

                if trimmed.is_empty() {
                    continue;
                }

                // Accumulate until the statement ends with a semicolon
                buffer.push_str(&line);
                buffer.push('\n');
                if trimmed.ends_with(';') {
                    let sql = std::mem::take(&mut buffer);
                    let _ = rl.add_history_entry(sql.trim());
                    run_statement(sql.trim(), &mut executor);
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C throws away the pending statement
                buffer.clear();
                println!("^C");
            }
            Err(ReadlineError::Eof) => {
                println!("Goodbye!");
                return Ok(());
            }
            Err(e) => {
                eprintln!("Error reading input: {}", e);
                return Ok(());
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args: Vec<String> = env::args().collect();
    let mut snapshot_path = Some(DEFAULT_SNAPSHOT.to_string());

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--file" | "-f" => {
                if let Some(path) = args.get(i + 1) {
                    snapshot_path = Some(path.clone());
                }
                i += 1;
            }
            "--no-persist" => {
                snapshot_path = None;
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                eprintln!("Usage: opaldb-cli [--file PATH | --no-persist]");
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let executor = match snapshot_path {
        Some(path) => QueryExecutor::with_snapshot(Box::new(JsonSnapshot::new(path)))?,
        None => QueryExecutor::new(),
    };

    run_repl(executor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_results_table() {
        let mut row = Row::new();
        row.set("id", Value::Integer(1));
        row.set("name", Value::Text("Alice".to_string()));

        let output = format_results(&["id".to_string(), "name".to_string()], &[row]);
        assert!(output.contains("| id | name  |"));
        assert!(output.contains("|  1 | Alice |"));
        assert!(output.contains("1 row(s) returned"));
        assert!(output.starts_with("+----+-------+"));
    }

    #[test]
    fn test_format_results_renders_null() {
        let mut row = Row::new();
        row.set("id", Value::Integer(1));

        let output = format_results(&["id".to_string(), "name".to_string()], &[row]);
        assert!(output.contains("NULL"));
    }

    #[test]
    fn test_format_results_empty() {
        assert_eq!(format_results(&[], &[]), "");
        let output = format_results(&["id".to_string()], &[]);
        assert!(output.contains("0 row(s) returned"));
    }
}
