use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use log::{error, info};
use rowfold::{fold_store, BatchOutcome, FoldOptions, StanzaStore, ThinRow};
use std::io::{Read, Write};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "rowfold")]
#[command(about = "Fold thin RDF rows into nested thick rows")]
#[command(arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Verbose mode - sets the RUST_LOG level to info, defaults to warning level
    #[clap(long, short, action, default_value = "false", global = true)]
    verbose: bool,
    /// Debug mode - sets the RUST_LOG level to debug, defaults to warning level
    #[clap(long, action, default_value = "false", global = true)]
    debug: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Convert a JSON array of 7-field thin rows into thick rows
    Convert {
        /// The file to read thin rows from; stdin when omitted
        input: Option<PathBuf>,
        /// The file to write thick rows to; stdout when omitted
        #[clap(long, short)]
        output: Option<PathBuf>,
        /// Pretty-print the output JSON
        #[clap(long, action)]
        pretty: bool,
        /// Fail on any warning or stanza error instead of degrading
        #[clap(long, action)]
        strict: bool,
        /// Attach each annotation to only the first row matching its target
        #[clap(long = "first-match", action)]
        first_match: bool,
    },
    /// Check thin rows for contract violations and malformed structures
    Validate {
        /// The file to read thin rows from; stdin when omitted
        input: Option<PathBuf>,
    },
    /// Prints the version of the rowfold binary
    Version,
}

fn read_rows(input: Option<&PathBuf>) -> Result<Vec<ThinRow>> {
    let content = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            buffer
        }
    };
    let fields: Vec<[String; 7]> =
        serde_json::from_str(&content).context("input is not a JSON array of 7-field rows")?;
    Ok(fields.into_iter().map(ThinRow::from_fields).collect())
}

fn report_failures(outcome: &BatchOutcome) {
    for failure in &outcome.failures {
        error!("stanza {} failed: {}", failure.stanza, failure.error);
    }
}

fn main() -> Result<()> {
    let cmd = Cli::parse();

    rowfold::init_logging();
    let log_level = if cmd.verbose { "info" } else { "warn" };
    let log_level = if cmd.debug { "debug" } else { log_level };
    std::env::set_var("RUST_LOG", log_level);
    env_logger::init();

    match cmd.command {
        Commands::Convert {
            input,
            output,
            pretty,
            strict,
            first_match,
        } => {
            let rows = read_rows(input.as_ref())?;
            let store = StanzaStore::from_rows(rows);
            info!("folding {} stanzas", store.len());
            let options = FoldOptions {
                match_policy: first_match.into(),
            };
            let outcome = fold_store(&store, &options);
            report_failures(&outcome);
            if strict && !outcome.is_clean() {
                return Err(anyhow!(
                    "strict mode: {} failed stanzas, {} stanzas with warnings",
                    outcome.failures.len(),
                    outcome
                        .folds
                        .iter()
                        .filter(|fold| !fold.warnings.is_empty())
                        .count()
                ));
            }

            let thick: Vec<_> = outcome.rows().collect();
            let rendered = if pretty {
                serde_json::to_string_pretty(&thick)?
            } else {
                serde_json::to_string(&thick)?
            };
            match output {
                Some(path) => std::fs::write(&path, rendered)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => {
                    let mut stdout = std::io::stdout();
                    stdout.write_all(rendered.as_bytes())?;
                    stdout.write_all(b"\n")?;
                }
            }
        }
        Commands::Validate { input } => {
            let rows = read_rows(input.as_ref())?;
            let store = StanzaStore::from_rows(rows);
            let outcome = fold_store(&store, &FoldOptions::default());
            report_failures(&outcome);
            let mut num_warnings = 0;
            for fold in &outcome.folds {
                for warning in &fold.warnings {
                    println!("{}: {}", fold.stanza, warning);
                    num_warnings += 1;
                }
            }
            println!(
                "{} stanzas, {} failed, {} warnings",
                store.len(),
                outcome.failures.len(),
                num_warnings
            );
            if !outcome.failures.is_empty() {
                return Err(anyhow!("{} stanzas failed", outcome.failures.len()));
            }
        }
        Commands::Version => {
            println!("rowfold {}", env!("CARGO_PKG_VERSION"));
        }
    }
    Ok(())
}
