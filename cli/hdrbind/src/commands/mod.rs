//! CLI command implementations.

pub mod check;
#[cfg(feature = "libclang")]
pub mod dump_ast;
pub mod generate;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use hdrbind_gen::BindingConfig;

/// Load a configuration file, replacing its tree dump when `ast` is given.
pub fn load_config(path: &Path, ast: Option<PathBuf>) -> Result<BindingConfig> {
    let mut config =
        BindingConfig::load(path).with_context(|| format!("loading {}", path.display()))?;
    if ast.is_some() {
        config.ast = ast;
    }
    Ok(config)
}
