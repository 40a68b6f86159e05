use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use treelox::ast_printer::AstPrinter;
use treelox::lox::{parse_source, Lox};
use treelox::scanner::scan_tokens;
use treelox::RunFailure;

/// Exit status for any static or runtime error in a file run.
const EXIT_FAILURE: i32 = 65;

#[derive(ClapParser, Debug)]
#[command(version, about = "Tree-walking Lox interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize {
        filename: Option<PathBuf>,

        /// Print the token list as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parses a program and prints each statement's AST
    Parse { filename: Option<PathBuf> },

    /// Runs a Lox program, or starts a prompt when no file is given
    Run { filename: Option<PathBuf> },
}

fn read_file(filename: PathBuf) -> Result<String> {
    info!("Reading file: {:?}", filename);
    let file = File::open(&filename).context(format!("Failed to open file {:?}", filename))?;
    let mut reader = BufReader::new(file);
    let mut buf = String::new();

    let bytes = reader
        .read_to_string(&mut buf)
        .context(format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", bytes, filename);

    Ok(buf)
}

fn init_logger() -> Result<()> {
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    Builder::new()
        .format(|buf, record| {
            let path = record.module_path().unwrap_or("<unnamed>");
            let module = path.strip_prefix("treelox::").unwrap_or(path);
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug) // RUST_LOG still overrides
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

/// Print every diagnostic of a failed run to stderr.
fn report(failure: &RunFailure) {
    match failure {
        RunFailure::Static(errors) => {
            for e in errors {
                eprintln!("{}", e);
            }
        }

        RunFailure::Runtime(e) => eprintln!("{}", e),
    }
}

fn run_prompt() -> Result<()> {
    info!("Starting prompt");

    let mut lox = Lox::new();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush().context("Failed to flush prompt")?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("Failed to read from stdin")?;

        // Errors are per line; the session keeps its globals.
        if let Err(failure) = lox.run(&line) {
            debug!("Prompt line failed: {}", failure);
            report(&failure);
        }
    }

    info!("Prompt closed");
    Ok(())
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    if args.log {
        init_logger()?;
    } else {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    match args.commands {
        Commands::Tokenize { filename, json } => match filename {
            Some(filename) => {
                info!("Running Tokenize subcommand");
                let source = read_file(filename)?;
                let (tokens, errors) = scan_tokens(&source);

                for e in &errors {
                    eprintln!("{}", e);
                }

                if json {
                    let dump =
                        serde_json::to_string_pretty(&tokens).context("Failed to encode tokens")?;
                    println!("{}", dump);
                } else {
                    for token in &tokens {
                        println!("{}", token);
                    }
                }

                if !errors.is_empty() {
                    debug!("Tokenization failed, exiting with code {}", EXIT_FAILURE);
                    std::process::exit(EXIT_FAILURE);
                }

                info!("Tokenization completed successfully");
            }

            None => {
                info!("No filepath provided for Tokenize");
                println!("No input filepath was provided. Exiting...");
            }
        },

        Commands::Parse { filename } => match filename {
            Some(filename) => {
                info!("Running Parse subcommand");
                let source = read_file(filename)?;
                let (statements, errors) = parse_source(&source);

                if !errors.is_empty() {
                    report(&RunFailure::Static(errors));
                    std::process::exit(EXIT_FAILURE);
                }

                for stmt in &statements {
                    println!("{}", AstPrinter::print_stmt(stmt));
                }

                info!("Parse subcommand completed");
            }

            None => {
                info!("No filepath provided for Parse");
                println!("No input filepath was provided. Exiting...");
            }
        },

        Commands::Run { filename } => match filename {
            Some(filename) => {
                info!("Running Run subcommand");
                let source = read_file(filename)?;
                let mut lox = Lox::new();

                if let Err(failure) = lox.run(&source) {
                    debug!("Run failed: {}", failure);
                    report(&failure);
                    std::process::exit(EXIT_FAILURE);
                }

                info!("Program executed successfully");
            }

            None => run_prompt()?,
        },
    }

    Ok(())
}
