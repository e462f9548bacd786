/*
 * Batch runner
 *
 * Discovers units, fans (unit, function) pairs out over a rayon pool and
 * writes one ISCG file per function plus an optional canonical file per
 * unit. Read-only run state (config, frequency tables, per-unit metadata)
 * is shared through `Arc`. A failing function or unit is logged and never
 * stops its siblings.
 */

use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::errors::Result;
use crate::features::serialization::IscgDocument;
use crate::features::symbol_tables::FrequencyTables;
use crate::pipeline::error_log::{ErrorLog, FunctionKey};
use crate::pipeline::io::{
    canonical_output_path, discover_units, iscg_output_path, load_metadata, load_summary,
    write_json, UnitPaths,
};
use crate::pipeline::processor::process_function;
use crate::shared::models::{CanonicalFunction, Function, Metadata};

// ═══════════════════════════════════════════════════════════════════════════
// Inputs / report
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct BatchInputs {
    /// Searched recursively for summary files
    pub summaries: PathBuf,
    pub globals_dir: Option<PathBuf>,
    pub structs_dir: Option<PathBuf>,
    pub out_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub units: usize,
    pub functions: usize,
    /// ISCG files written in this run
    pub written: usize,
    /// Functions whose output already existed
    pub skipped: usize,
    /// Failed functions plus units that could not be loaded
    pub failed: usize,
    pub warnings: usize,
}

impl BatchReport {
    fn merge(self, other: Self) -> Self {
        Self {
            units: self.units + other.units,
            functions: self.functions + other.functions,
            written: self.written + other.written,
            skipped: self.skipped + other.skipped,
            failed: self.failed + other.failed,
            warnings: self.warnings + other.warnings,
        }
    }

    pub fn succeeded(&self) -> usize {
        self.written + self.skipped
    }
}

enum FunctionOutcome {
    Written {
        canonical: Option<CanonicalFunction>,
        warnings: usize,
    },
    /// Graph already on disk; the canonical form may still be needed
    Skipped {
        canonical: Option<CanonicalFunction>,
    },
    Failed,
}

// ═══════════════════════════════════════════════════════════════════════════
// Runner
// ═══════════════════════════════════════════════════════════════════════════

pub struct BatchRunner {
    config: Arc<PipelineConfig>,
    frequency: Arc<FrequencyTables>,
    log: ErrorLog,
}

impl BatchRunner {
    pub fn new(config: PipelineConfig, frequency: FrequencyTables) -> Self {
        Self {
            config: Arc::new(config),
            frequency: Arc::new(frequency),
            log: ErrorLog::new(),
        }
    }

    /// Validates the config and loads the frequency tables it names
    pub fn from_config(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let frequency = FrequencyTables::load(&config.frequency)?;
        Ok(Self::new(config, frequency))
    }

    pub fn error_log(&self) -> &ErrorLog {
        &self.log
    }

    /// Only run-level IO and pool errors are returned; everything else is
    /// recorded in `<out_dir>/errors.json`
    pub fn run(&self, inputs: &BatchInputs) -> Result<BatchReport> {
        let start = Instant::now();
        let units = discover_units(&inputs.summaries, &self.config.io.summary_suffix)?;

        let workers = self.config.parallel.effective_workers();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .stack_size(self.config.parallel.stack_size_mb * 1024 * 1024)
            .thread_name(|i| format!("iscg-worker-{}", i))
            .build()?;
        info!(units = units.len(), workers, "Starting ISCG batch");

        let report = pool.install(|| {
            units
                .par_iter()
                .map(|summary| self.run_unit(summary, inputs))
                .reduce(BatchReport::default, BatchReport::merge)
        });

        self.log.write(&inputs.out_dir)?;

        info!(
            "Finished: {}/{} ({} written, {} skipped, {} failed, {} warnings) in {:.2?}",
            report.succeeded(),
            report.functions,
            report.written,
            report.skipped,
            report.failed,
            report.warnings,
            start.elapsed()
        );
        Ok(report)
    }

    fn run_unit(&self, summary: &Path, inputs: &BatchInputs) -> BatchReport {
        let io = &self.config.io;
        let Some(unit) = UnitPaths::resolve(
            summary,
            inputs.globals_dir.as_deref(),
            inputs.structs_dir.as_deref(),
            io,
        ) else {
            debug!(path = %summary.display(), "not a summary file");
            return BatchReport::default();
        };

        let mut report = BatchReport {
            units: 1,
            ..Default::default()
        };

        let loaded = load_summary(&unit.summary).and_then(|functions| {
            load_metadata(unit.globals.as_deref(), unit.structs.as_deref())
                .map(|meta| (functions, Arc::new(meta)))
        });
        let (functions, metadata) = match loaded {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!(unit = %unit.stem, "unit skipped: {}", e);
                self.log.record_failure(FunctionKey::unit_wide(&unit.stem), &e);
                report.failed = 1;
                return report;
            }
        };

        let canonical_path = canonical_output_path(&inputs.out_dir, &unit.stem);
        let want_canonical =
            io.write_canonical && !(io.skip_existing && canonical_path.exists());

        let outcomes: Vec<FunctionOutcome> = functions
            .par_iter()
            .map(|function| {
                self.run_function(&unit.stem, function, &metadata, inputs, want_canonical)
            })
            .collect();

        report.functions = functions.len();
        let mut canonical = Vec::new();
        for outcome in outcomes {
            match outcome {
                FunctionOutcome::Written {
                    canonical: c,
                    warnings,
                } => {
                    report.written += 1;
                    report.warnings += warnings;
                    canonical.extend(c);
                }
                FunctionOutcome::Skipped { canonical: c } => {
                    report.skipped += 1;
                    canonical.extend(c);
                }
                FunctionOutcome::Failed => report.failed += 1,
            }
        }

        if want_canonical && !canonical.is_empty() {
            if let Err(e) = write_json(&canonical_path, &canonical, io.pretty) {
                warn!(unit = %unit.stem, "canonical output not written: {}", e);
                self.log.record_failure(FunctionKey::unit_wide(&unit.stem), &e);
                report.failed += 1;
            }
        }

        debug!(
            unit = %unit.stem,
            functions = report.functions,
            written = report.written,
            skipped = report.skipped,
            failed = report.failed,
            "unit done"
        );
        report
    }

    fn run_function(
        &self,
        stem: &str,
        function: &Function,
        metadata: &Metadata,
        inputs: &BatchInputs,
        want_canonical: bool,
    ) -> FunctionOutcome {
        let io = &self.config.io;
        let out_path = iscg_output_path(&inputs.out_dir, stem, &function.name, io);
        let graph_exists = io.skip_existing && out_path.exists();
        if graph_exists && !want_canonical {
            return FunctionOutcome::Skipped { canonical: None };
        }

        let key = FunctionKey::new(stem, &function.name);
        let output = match process_function(function, metadata, &self.frequency, &self.config) {
            Ok(output) => output,
            Err(e) => {
                warn!(unit = stem, function = %function.name, "function failed: {}", e);
                self.log.record_failure(key, &e);
                return FunctionOutcome::Failed;
            }
        };
        let canonical = want_canonical.then_some(output.canonical);
        if graph_exists {
            return FunctionOutcome::Skipped { canonical };
        }

        let warnings = output.diagnostics.len();
        self.log.record_warnings(key.clone(), &output.diagnostics);
        match write_json::<IscgDocument>(&out_path, &output.document, io.pretty) {
            Ok(()) => FunctionOutcome::Written {
                canonical,
                warnings,
            },
            Err(e) => {
                self.log.record_failure(key, &e);
                FunctionOutcome::Failed
            }
        }
    }
}
