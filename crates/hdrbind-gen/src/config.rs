//! Binding configuration.
//!
//! A [`BindingConfig`] names the header to translate, how to parse it and
//! where the artifact goes. It loads from JSON or TOML depending on the file
//! extension; relative paths are taken relative to the config file.
//!
//! ```toml
//! source = "democ.h"
//! name = "demo"
//! scope = ["democ.h"]
//! library = "./democ.so"
//! enum_mode = "flat"
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use hdrbind_core::{DataModel, ScopeFilter};
use serde::{Deserialize, Serialize};

use crate::error::{GenError, Result};

/// How enumerations are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumMode {
    /// One integer-backed named type per enumeration.
    #[default]
    Named,
    /// Module-level integer constants plus an integer alias of the enum name.
    Flat,
}

impl FromStr for EnumMode {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "named" => Ok(EnumMode::Named),
            "flat" => Ok(EnumMode::Flat),
            other => Err(GenError::Config {
                detail: format!("unknown enum mode '{other}' (expected 'named' or 'flat')"),
            }),
        }
    }
}

impl fmt::Display for EnumMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EnumMode::Named => "named",
            EnumMode::Flat => "flat",
        })
    }
}

/// Settings for one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingConfig {
    /// Primary header to parse.
    #[serde(alias = "parse")]
    pub source: PathBuf,
    /// Preprocessor arguments, in order.
    #[serde(default)]
    pub args: Vec<String>,
    /// Allowed source files; absent means no filter.
    #[serde(default)]
    pub scope: Option<Vec<PathBuf>>,
    /// Base name of the artifact and of the handle type.
    pub name: String,
    #[serde(default)]
    pub enum_mode: EnumMode,
    /// Library path baked into the handle constructor as its default.
    #[serde(default, alias = "dll")]
    pub library: Option<String>,
    #[serde(default)]
    pub output: Option<PathBuf>,
    /// Pre-dumped declaration tree used instead of parsing `source`.
    #[serde(default)]
    pub ast: Option<PathBuf>,
    /// Pointer width used when recomputing layouts; host width when absent.
    #[serde(default)]
    pub pointer_size: Option<u64>,
    /// Directory relative paths are resolved against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl BindingConfig {
    /// A configuration with only the required settings.
    pub fn new(source: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            args: Vec::new(),
            scope: None,
            name: name.into(),
            enum_mode: EnumMode::default(),
            library: None,
            output: None,
            ast: None,
            pointer_size: None,
            base_dir: PathBuf::new(),
        }
    }

    /// Parse a JSON configuration.
    pub fn from_json(input: &str) -> Result<Self> {
        let config: BindingConfig = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML configuration.
    pub fn from_toml(input: &str) -> Result<Self> {
        let config: BindingConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file; `.toml` files are TOML, anything else JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml(&content)?,
            _ => Self::from_json(&content)?,
        };
        config.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        config.resolve_paths();
        Ok(config)
    }

    /// Check the settings that have no usable default.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(GenError::Config {
                detail: "name is required".to_string(),
            });
        }
        if self.source.as_os_str().is_empty() {
            return Err(GenError::Config {
                detail: "source is required".to_string(),
            });
        }
        if let Some(size) = self.pointer_size {
            if size != 4 && size != 8 {
                return Err(GenError::Config {
                    detail: format!("pointer_size must be 4 or 8, got {size}"),
                });
            }
        }
        Ok(())
    }

    fn resolve_paths(&mut self) {
        let base = self.base_dir.clone();
        let join = |p: &Path| if p.is_relative() { base.join(p) } else { p.to_path_buf() };
        self.source = join(self.source.as_path());
        if let Some(scope) = self.scope.as_mut() {
            for entry in scope.iter_mut() {
                *entry = join(entry.as_path());
            }
        }
        self.output = self.output.as_deref().map(join);
        self.ast = self.ast.as_deref().map(join);
    }

    /// Where the artifact is written.
    pub fn output_path(&self, extension: &str) -> PathBuf {
        match &self.output {
            Some(path) => path.clone(),
            None => self.base_dir.join(format!("{}.{extension}", self.name)),
        }
    }

    pub fn scope_filter(&self) -> ScopeFilter {
        match &self.scope {
            Some(files) => ScopeFilter::new(files),
            None => ScopeFilter::unrestricted(),
        }
    }

    pub fn data_model(&self) -> DataModel {
        self.pointer_size
            .map(|pointer_size| DataModel { pointer_size })
            .unwrap_or_else(DataModel::host)
    }
}
