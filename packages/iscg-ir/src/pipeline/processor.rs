//! Per-function processing
//!
//! canonicalize → build ISCG → flatten. Everything a function needs is
//! passed in; nothing here touches the filesystem.

use tracing::{debug, warn};

use crate::config::PipelineConfig;
use crate::errors::Result;
use crate::features::canonicalize::Canonicalizer;
use crate::features::iscg::{IscgUseCase, IscgUseCaseImpl};
use crate::features::serialization::{to_document, IscgDocument};
use crate::features::symbol_tables::{FrequencyTables, FunctionSymbols};
use crate::shared::models::{CanonicalFunction, DiagnosticKind, Diagnostics, Function, Metadata};

/// Everything produced for one function
#[derive(Debug, Clone)]
pub struct FunctionOutput {
    pub canonical: CanonicalFunction,
    pub symbols: FunctionSymbols,
    pub document: IscgDocument,
    /// Canonicalization and graph warnings, in that order
    pub diagnostics: Diagnostics,
}

pub fn process_function(
    function: &Function,
    metadata: &Metadata,
    frequency: &FrequencyTables,
    config: &PipelineConfig,
) -> Result<FunctionOutput> {
    let canonical =
        Canonicalizer::new(metadata, frequency, &config.canonicalize).canonicalize(function);

    let build = IscgUseCaseImpl::from_pipeline(config).build_iscg(&canonical, metadata)?;
    let document = to_document(&build.graph)?;

    let mut diagnostics = canonical.diagnostics;
    diagnostics.extend(build.diagnostics);
    log_diagnostics(&function.name, &diagnostics);

    debug!(
        function = %function.name,
        instructions = function.instruction_count(),
        nodes = document.nodes.len(),
        links = document.links.len(),
        "function processed"
    );

    Ok(FunctionOutput {
        canonical: CanonicalFunction::from(canonical.function),
        symbols: canonical.symbols,
        document,
        diagnostics,
    })
}

fn log_diagnostics(function: &str, diagnostics: &Diagnostics) {
    for diagnostic in diagnostics {
        match diagnostic.kind {
            // expected for external symbols missing from the companion files
            DiagnosticKind::MetadataGap => debug!(function, "{}", diagnostic),
            DiagnosticKind::UnresolvedReference | DiagnosticKind::UnreachableBlock => {
                warn!(function, "{}", diagnostic)
            }
        }
    }
}
