//! Generation pipeline orchestrator.

use std::io::Write;
use std::path::Path;

use hdrbind_ast::{FrontEnd, JsonFrontEnd};
use hdrbind_core::{
    verify_layouts, Collector, DeclRecord, DiagnosticsGate, LayoutMismatch, SkippedDecl,
};
use tracing::{debug, info, warn};

use crate::config::BindingConfig;
use crate::ctypes::CtypesTemplate;
use crate::emit::{EmitOptions, Emitter};
use crate::error::{GenError, Result};
use crate::template::BindingTemplate;

/// Everything learned about a header short of rendering it.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub diagnostics: DiagnosticsGate,
    pub records: Vec<DeclRecord>,
    pub skipped: Vec<SkippedDecl>,
    pub mismatches: Vec<LayoutMismatch>,
    /// Nodes the collector dispatched on.
    pub visited: usize,
}

/// Output of a successful generation run.
#[derive(Debug, Clone)]
pub struct Generated {
    /// The artifact text.
    pub text: String,
    pub analysis: Analysis,
}

/// Run the pipeline up to emission:
/// parse -> diagnostics gate -> collect -> layout verification.
pub fn analyze(front_end: &dyn FrontEnd, config: &BindingConfig) -> Result<Analysis> {
    config.validate()?;

    // Stage 1: Parse
    let unit = front_end.parse(&config.source, &config.args)?;
    debug!(
        source = %config.source.display(),
        nodes = unit.root.subtree_len(),
        "parsed translation unit"
    );

    // Stage 2: Diagnostics gate
    let diagnostics = DiagnosticsGate::evaluate(&unit.diagnostics);
    diagnostics.check()?;

    // Stage 3: Collect
    let collection = Collector::new(config.scope_filter()).collect(&unit.root)?;
    info!(
        records = collection.records.len(),
        skipped = collection.skipped.len(),
        "collected declarations"
    );

    // Stage 4: Recompute layouts
    let mismatches = verify_layouts(&collection.records, config.data_model());
    for mismatch in &mismatches {
        warn!("layout mismatch: {mismatch}");
    }

    Ok(Analysis {
        diagnostics,
        records: collection.records,
        skipped: collection.skipped,
        mismatches,
        visited: collection.visited,
    })
}

/// Run the full pipeline with the given template.
pub fn generate_with(
    front_end: &dyn FrontEnd,
    config: &BindingConfig,
    template: &dyn BindingTemplate,
) -> Result<Generated> {
    let analysis = analyze(front_end, config)?;

    // Stage 5: Emit
    let options = EmitOptions {
        name: config.name.clone(),
        enum_mode: config.enum_mode,
        library: config.library.clone(),
    };
    let text = Emitter::new(template, options).emit(&analysis.records);
    Ok(Generated { text, analysis })
}

/// Run the full pipeline and render Python `ctypes` bindings.
pub fn generate(front_end: &dyn FrontEnd, config: &BindingConfig) -> Result<Generated> {
    generate_with(front_end, config, &CtypesTemplate::new())
}

/// The front-end a configuration asks for: its pre-dumped tree when `ast`
/// is set, libclang otherwise.
pub fn front_end_for(config: &BindingConfig) -> Result<Box<dyn FrontEnd>> {
    if let Some(ast) = &config.ast {
        return Ok(Box::new(JsonFrontEnd::new(ast.clone())));
    }
    live_front_end()
}

#[cfg(feature = "libclang")]
fn live_front_end() -> Result<Box<dyn FrontEnd>> {
    Ok(Box::new(hdrbind_ast::ClangFrontEnd::new()))
}

#[cfg(not(feature = "libclang"))]
fn live_front_end() -> Result<Box<dyn FrontEnd>> {
    Err(GenError::Config {
        detail: "no declaration tree: set `ast` or build with the `libclang` feature".to_string(),
    })
}

/// Write `text` to `path` atomically: either the whole artifact lands or
/// nothing does.
pub fn write_artifact(path: &Path, text: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(text.as_bytes())?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| GenError::Persist {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    info!(path = %path.display(), bytes = text.len(), "wrote artifact");
    Ok(())
}
