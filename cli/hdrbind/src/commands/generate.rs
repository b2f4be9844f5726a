//! `hdrbind generate`

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use hdrbind_gen::{BindingTemplate, CtypesTemplate, EnumMode};
use tracing::info;

/// Command-line settings that take precedence over the configuration file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub output: Option<PathBuf>,
    pub library: Option<String>,
    pub enum_mode: Option<EnumMode>,
    pub ast: Option<PathBuf>,
}

pub fn run(config_path: &Path, overrides: Overrides, dry_run: bool) -> Result<()> {
    let mut config = super::load_config(config_path, overrides.ast)?;
    if let Some(output) = overrides.output {
        config.output = Some(output);
    }
    if let Some(library) = overrides.library {
        config.library = Some(library);
    }
    if let Some(mode) = overrides.enum_mode {
        config.enum_mode = mode;
    }

    let template = CtypesTemplate::new();
    let front_end = hdrbind_gen::front_end_for(&config)?;
    let generated = hdrbind_gen::generate_with(front_end.as_ref(), &config, &template)
        .with_context(|| format!("generating bindings for {}", config.source.display()))?;

    for skipped in &generated.analysis.skipped {
        info!("skipped {} '{}': {}", skipped.kind.name(), skipped.name, skipped.reason);
    }

    if dry_run {
        print!("{}", generated.text);
        return Ok(());
    }

    let output = config.output_path(template.extension());
    hdrbind_gen::write_artifact(&output, &generated.text)
        .with_context(|| format!("writing {}", output.display()))?;

    let analysis = &generated.analysis;
    println!(
        "Generated '{}' ({} declarations, {} skipped) → {}",
        config.name,
        analysis.records.len(),
        analysis.skipped.len(),
        output.display()
    );
    if !analysis.mismatches.is_empty() {
        println!(
            "  {} layout mismatch(es); run `hdrbind check` for details",
            analysis.mismatches.len()
        );
    }
    Ok(())
}
