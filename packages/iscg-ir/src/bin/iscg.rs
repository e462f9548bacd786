//! ISCG CLI
//!
//! # Usage
//!
//! ```bash
//! # Batch: every *_info_summary.json under summaries/
//! iscg run --summaries summaries/ --globals globals/ --structs structs/ --out graphs/ -j 8
//!
//! # One summary file, graph JSON on stdout
//! iscg function --summary summaries/libfoo_info_summary.json --name parse_header
//! ```

use clap::{Args, Parser, Subcommand};
use iscg_ir::config::PipelineConfig;
use iscg_ir::features::serialization::to_json;
use iscg_ir::features::symbol_tables::FrequencyTables;
use iscg_ir::pipeline::{load_metadata, load_summary, process_function, BatchInputs, BatchRunner};
use iscg_ir::{IscgError, Result};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "iscg")]
#[command(about = "Canonicalize LLVM-IR instruction records and build ISCG graphs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Process every unit under a directory
    Run {
        /// Directory searched recursively for summary files
        #[arg(long)]
        summaries: PathBuf,

        /// Directory of `<stem>_globals.json` files
        #[arg(long)]
        globals: Option<PathBuf>,

        /// Directory of `<stem>_structs.json` files
        #[arg(long)]
        structs: Option<PathBuf>,

        /// Output directory
        #[arg(short, long)]
        out: PathBuf,

        /// Number of workers (0 = all cores)
        #[arg(short = 'j', long)]
        jobs: Option<usize>,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Process one summary file and print the graphs
    Function {
        #[arg(long)]
        summary: PathBuf,

        #[arg(long)]
        globals: Option<PathBuf>,

        #[arg(long)]
        structs: Option<PathBuf>,

        /// Only this function
        #[arg(long)]
        name: Option<String>,

        /// Print canonical functions instead of graphs
        #[arg(long)]
        canonical: bool,

        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// YAML pipeline config
    #[arg(long)]
    config: Option<PathBuf>,

    /// Constant frequency counts (JSON)
    #[arg(long)]
    common_constants: Option<PathBuf>,

    /// Call frequency counts (JSON)
    #[arg(long)]
    common_calls: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

impl CommonArgs {
    /// File values first, then flag overrides
    fn load_config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_yaml(path)?,
            None => PipelineConfig::default(),
        };
        if let Some(path) = &self.common_constants {
            config.frequency.constants_path = Some(path.clone());
        }
        if let Some(path) = &self.common_calls {
            config.frequency.calls_path = Some(path.clone());
        }
        if self.pretty {
            config.io.pretty = true;
        }
        Ok(config)
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let outcome = match cli.command {
        Commands::Run {
            summaries,
            globals,
            structs,
            out,
            jobs,
            common,
        } => run_batch(
            BatchInputs {
                summaries,
                globals_dir: globals,
                structs_dir: structs,
                out_dir: out,
            },
            jobs,
            &common,
        ),
        Commands::Function {
            summary,
            globals,
            structs,
            name,
            canonical,
            common,
        } => run_single(summary, globals, structs, name, canonical, &common),
    };

    match outcome {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_batch(inputs: BatchInputs, jobs: Option<usize>, common: &CommonArgs) -> Result<ExitCode> {
    let mut config = common.load_config()?;
    if let Some(jobs) = jobs {
        config.parallel.num_workers = jobs;
    }
    let runner = BatchRunner::from_config(config)?;
    let report = runner.run(&inputs)?;

    eprintln!(
        "{} units, {} functions: {} written, {} skipped, {} failed ({} warnings)",
        report.units, report.functions, report.written, report.skipped, report.failed,
        report.warnings
    );
    // per-function failures are in errors.json; the run itself succeeded
    Ok(ExitCode::SUCCESS)
}

fn run_single(
    summary: PathBuf,
    globals: Option<PathBuf>,
    structs: Option<PathBuf>,
    name: Option<String>,
    canonical: bool,
    common: &CommonArgs,
) -> Result<ExitCode> {
    let config = common.load_config()?;
    config.validate()?;
    let frequency = FrequencyTables::load(&config.frequency)?;
    let metadata = load_metadata(globals.as_deref(), structs.as_deref())?;

    let functions: Vec<_> = load_summary(&summary)?
        .into_iter()
        .filter(|f| name.as_deref().map_or(true, |n| f.name == n))
        .collect();
    if functions.is_empty() {
        error!(
            "no function {} in {}",
            name.as_deref().unwrap_or("<any>"),
            summary.display()
        );
        return Ok(ExitCode::FAILURE);
    }

    let mut failed = false;
    let mut rendered = Vec::with_capacity(functions.len());
    for function in &functions {
        match process_function(function, &metadata, &frequency, &config) {
            Ok(output) => {
                for diagnostic in &output.diagnostics {
                    eprintln!("{}: {}", function.name, diagnostic);
                }
                let json = if canonical {
                    if config.io.pretty {
                        serde_json::to_string_pretty(&output.canonical)?
                    } else {
                        serde_json::to_string(&output.canonical)?
                    }
                } else {
                    to_json(&output.document, config.io.pretty)?
                };
                rendered.push(json);
            }
            Err(e @ IscgError::MalformedInstruction { .. })
            | Err(e @ IscgError::SerializationInvariantViolation { .. }) => {
                error!(function = %function.name, "{}", e);
                failed = true;
            }
            Err(e) => return Err(e),
        }
    }

    // one document per line; a single function prints bare
    println!("{}", rendered.join("\n"));
    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
