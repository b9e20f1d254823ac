use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use gpa_tally::config::Config;
use gpa_tally::grading::{ColumnOverrides, GradingConfig};
use gpa_tally::history::{find_by_prefix, HistoryEntry, HistoryStore, StorageScope};
use gpa_tally::output;
use gpa_tally::table::{self, LoadStatus, Table};

const EXIT_SUCCESS: i32 = 0;
const EXIT_NO_DATA: i32 = 1;
const EXIT_INPUT: i32 = 2;
const EXIT_STORAGE: i32 = 3;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Calculate weighted average score and grade point from a course table
    Calc {
        /// CSV or spreadsheet (.xlsx, .xls, .ods) with one course per row
        file: PathBuf,

        /// Label stored with the result (defaults to the file name)
        #[arg(short, long)]
        label: Option<String>,

        /// Save the result to history
        #[arg(short, long)]
        save: bool,

        /// Column holding the course name (0-based)
        #[arg(long)]
        name_col: Option<usize>,

        /// Column holding the score (0-based)
        #[arg(long)]
        score_col: Option<usize>,

        /// Column holding the credit (0-based)
        #[arg(long)]
        credit_col: Option<usize>,

        /// Number of header rows to skip
        #[arg(long)]
        header_rows: Option<usize>,
    },
    /// Inspect saved calculations (lists them if no action is given)
    History {
        #[command(subcommand)]
        action: Option<HistoryAction>,
    },
    /// Write the default config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand, Debug)]
enum HistoryAction {
    /// List saved calculations, oldest first
    List,
    /// Show one saved calculation in full
    Show {
        /// Entry id or a unique prefix of it
        id: String,
    },
    /// Delete one saved calculation
    Remove {
        /// Entry id or a unique prefix of it
        id: String,
    },
    /// Delete all saved calculations
    Clear,
}

#[derive(Parser, Debug)]
#[command(name = "gpa-tally")]
#[command(about = "Weighted average score and GPA calculator", long_about = None)]
#[command(version)]
struct Cli {
    /// Log progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log debug detail to stderr
    #[arg(long, global = true)]
    debug: bool,

    /// Path to config file (defaults to ~/.config/gpa-tally/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

fn init_logging(verbose: bool, debug: bool) {
    let default_level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        "warn"
    };
    // RUST_LOG wins over the flags when set
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.debug);

    if let Commands::Init { force } = cli.command {
        let path = match cli.config {
            Some(p) => p,
            None => match gpa_tally::config::get_config_path() {
                Ok(p) => p,
                Err(e) => {
                    eprintln!("Config error: {}", e);
                    std::process::exit(EXIT_CONFIG);
                }
            },
        };
        if let Err(e) = gpa_tally::config::write_default_config(&path, force) {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
        println!("Config written to {}", path.display());
        std::process::exit(EXIT_SUCCESS);
    }

    // Load config
    let config = match gpa_tally::config::load_config(cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    let use_colors = output::should_use_colors();

    let code = match cli.command {
        Commands::Calc {
            file,
            label,
            save,
            name_col,
            score_col,
            credit_col,
            header_rows,
        } => {
            let overrides = ColumnOverrides {
                name: name_col,
                score: score_col,
                credit: credit_col,
                header_rows,
            };
            run_calc(&config, &file, label, save, &overrides, use_colors)
        }
        Commands::History { action } => {
            run_history(&config, action.unwrap_or(HistoryAction::List), use_colors)
        }
        Commands::Init { .. } => EXIT_SUCCESS,
    };

    std::process::exit(code);
}

fn run_calc(
    config: &Config,
    file: &std::path::Path,
    label: Option<String>,
    save: bool,
    overrides: &ColumnOverrides,
    use_colors: bool,
) -> i32 {
    // Command-line column overrides are validated together with the rest of the grading config
    let grading = GradingConfig {
        columns: config.grading.columns.overridden(overrides),
        ..config.grading.clone()
    };
    if let Err(errors) = gpa_tally::grading::validate_grading(&grading) {
        eprintln!("Grading config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return EXIT_CONFIG;
    }

    let course_table = match Table::from_path(file) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Input error: {}", e);
            return EXIT_INPUT;
        }
    };

    let report = table::load(&course_table, &grading, &grading.columns);
    let diagnostics = output::format_diagnostics(&report.diagnostics, use_colors);

    if let LoadStatus::NoUsableData { .. } = report.status() {
        if !diagnostics.is_empty() {
            eprintln!("{}", diagnostics);
        }
        eprintln!("Could not compute: no usable course rows in {}", file.display());
        return EXIT_NO_DATA;
    }

    let source_label = label.unwrap_or_else(|| {
        file.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.display().to_string())
    });

    let result = match gpa_tally::gpa::calculate_report(&report, &grading, &source_label) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Could not compute: {}", e);
            return EXIT_NO_DATA;
        }
    };

    println!("{}", output::format_result(&result, use_colors));
    if !diagnostics.is_empty() {
        println!();
        println!("{}", diagnostics);
    }

    if !save {
        return EXIT_SUCCESS;
    }

    let saved = HistoryStore::open(&config.storage_locations())
        .and_then(|store| store.append(result).map(|entry| (store, entry)));
    match saved {
        Ok((store, entry)) => {
            println!();
            println!("Saved to history as {}", entry.short_id());
            if store.scope() == StorageScope::Fallback {
                eprintln!(
                    "Note: history is stored in the temporary location {}",
                    store.path().display()
                );
            }
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("Computed, but could not save to history: {}", e);
            EXIT_STORAGE
        }
    }
}

fn run_history(config: &Config, action: HistoryAction, use_colors: bool) -> i32 {
    let store = match HistoryStore::open(&config.storage_locations()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Storage error: {}", e);
            return EXIT_STORAGE;
        }
    };

    let entries = match store.list() {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("Storage error: {}", e);
            return EXIT_STORAGE;
        }
    };

    match action {
        HistoryAction::List => {
            println!(
                "{}",
                output::format_history_list(&entries, store.scope(), use_colors)
            );
            EXIT_SUCCESS
        }
        HistoryAction::Show { id } => match lookup(&entries, &id) {
            Some(entry) => {
                println!("{}", output::format_entry_detail(entry, use_colors));
                EXIT_SUCCESS
            }
            None => EXIT_INPUT,
        },
        HistoryAction::Remove { id } => {
            let Some(entry) = lookup(&entries, &id) else {
                return EXIT_INPUT;
            };
            match store.remove(entry.id) {
                Ok(true) => {
                    println!("Removed {}", entry.short_id());
                    EXIT_SUCCESS
                }
                Ok(false) => {
                    eprintln!("No history entry matches '{}'", id);
                    EXIT_INPUT
                }
                Err(e) => {
                    eprintln!("Storage error: {}", e);
                    EXIT_STORAGE
                }
            }
        }
        HistoryAction::Clear => match store.clear() {
            Ok(removed) => {
                println!("Removed {} saved calculation(s)", removed);
                EXIT_SUCCESS
            }
            Err(e) => {
                eprintln!("Storage error: {}", e);
                EXIT_STORAGE
            }
        },
    }
}

fn lookup<'a>(entries: &'a [HistoryEntry], id: &str) -> Option<&'a HistoryEntry> {
    let found = find_by_prefix(entries, id);
    if found.is_none() {
        eprintln!("No single history entry matches '{}'", id);
    }
    found
}
