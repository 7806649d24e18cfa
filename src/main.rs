//! Command-line shell for minidb.
//!
//! ```bash
//! # Start interactive REPL
//! minidb --data-dir ./data
//!
//! # Execute a single line
//! minidb -c "SELECT * FROM users"
//!
//! # Execute every line of a script
//! minidb -f script.sql
//! ```

use std::fs::File;
use std::io::{self, BufReader, Stdout};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use minidb::Database;
use minidb::console::{Console, Control};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// minidb command-line interface
#[derive(Parser, Debug)]
#[command(name = "minidb", version, about = "In-memory relational database shell")]
struct Args {
    /// Directory that `@save` and `@load` resolve file names against
    #[arg(long, value_name = "DIR", default_value = ".", env = "MINIDB_DATA_DIR")]
    data_dir: PathBuf,

    /// Execute a single line and exit
    #[arg(short = 'c', long)]
    command: Option<String>,

    /// Execute every line of a file and exit
    #[arg(short = 'f', long, value_name = "FILE")]
    file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Suppress the banner
    #[arg(short = 'q', long)]
    quiet: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut console = Console::new(Database::new(), args.data_dir.clone(), io::stdout());

    if let Some(command) = &args.command {
        info!("Executing command: {}", command);
        console.handle_line(command)?;
        Ok(())
    } else if let Some(file) = &args.file {
        info!("Executing file: {}", file.display());
        let input = File::open(file).with_context(|| format!("cannot open {}", file.display()))?;
        console.run(BufReader::new(input))?;
        Ok(())
    } else {
        run_repl(&mut console, args.quiet)
    }
}

/// `RUST_LOG` wins over the default filter when set.
fn init_logging(verbose: bool) {
    let default = if verbose { "minidb=debug" } else { "minidb=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn run_repl(console: &mut Console<Stdout>, quiet: bool) -> Result<()> {
    let mut editor = DefaultEditor::new()?;

    if !quiet {
        println!("minidb {}", env!("CARGO_PKG_VERSION"));
        println!("Data directory: {}", console.data_dir().display());
        println!("Type @info to list tables, @close to quit.");
    }

    loop {
        match editor.readline("minidb> ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(line.as_str());

                if console.handle_line(&line)? == Control::Close {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                error!("Readline error: {}", e);
                break;
            }
        }
    }

    Ok(())
}
