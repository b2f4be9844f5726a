//! The front-end collaborator interface.
//!
//! hdrbind never parses C itself. A [`FrontEnd`] turns a header path plus
//! preprocessor arguments into a [`TranslationUnit`]; everything downstream
//! only sees that value.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::diagnostic::Diagnostic;
use crate::error::Result;
use crate::node::Node;

/// A parsed translation unit: the declaration tree plus its diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationUnit {
    pub root: Node,
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
}

impl TranslationUnit {
    pub fn new(root: Node) -> Self {
        Self {
            root,
            diagnostics: Vec::new(),
        }
    }

    pub fn with_diagnostic(mut self, diagnostic: Diagnostic) -> Self {
        self.diagnostics.push(diagnostic);
        self
    }

    /// Decode a tree previously written by [`TranslationUnit::to_json`].
    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Serialize the tree as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a tree dump from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

/// Capability that parses a C header into a declaration tree.
pub trait FrontEnd {
    /// Parse `path` with the given preprocessor arguments.
    fn parse(&self, path: &Path, args: &[String]) -> Result<TranslationUnit>;
}

/// Front-end that replays a tree dump instead of parsing.
///
/// The header path handed to [`FrontEnd::parse`] is ignored; the dump
/// already fixes what was parsed and with which arguments.
#[derive(Debug, Clone)]
pub struct JsonFrontEnd {
    dump: PathBuf,
}

impl JsonFrontEnd {
    pub fn new(dump: impl Into<PathBuf>) -> Self {
        Self { dump: dump.into() }
    }
}

impl FrontEnd for JsonFrontEnd {
    fn parse(&self, path: &Path, _args: &[String]) -> Result<TranslationUnit> {
        debug!(dump = %self.dump.display(), header = %path.display(), "loading tree dump");
        TranslationUnit::load(&self.dump)
    }
}

/// Front-end that hands out an already-built translation unit.
#[derive(Debug, Clone)]
pub struct InMemoryFrontEnd {
    unit: TranslationUnit,
}

impl InMemoryFrontEnd {
    pub fn new(unit: TranslationUnit) -> Self {
        Self { unit }
    }
}

impl FrontEnd for InMemoryFrontEnd {
    fn parse(&self, _path: &Path, _args: &[String]) -> Result<TranslationUnit> {
        Ok(self.unit.clone())
    }
}
