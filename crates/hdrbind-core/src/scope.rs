//! Source file allow-list.
//!
//! Restricts collection to declarations whose file is one of a configured
//! set. A node file matches an entry either verbatim or once both paths are
//! canonicalized, so `./demo.h` and `/abs/path/demo.h` name the same file.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use tracing::trace;

/// Allow-list of source files. An empty filter admits everything.
#[derive(Debug, Default)]
pub struct ScopeFilter {
    verbatim: BTreeSet<String>,
    canonical: BTreeSet<PathBuf>,
    cache: RefCell<HashMap<String, Option<PathBuf>>>,
}

impl ScopeFilter {
    /// A filter that admits every file.
    pub fn unrestricted() -> Self {
        Self::default()
    }

    /// A filter admitting exactly `files`.
    pub fn new<I, P>(files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut verbatim = BTreeSet::new();
        let mut canonical = BTreeSet::new();
        for file in files {
            let path = file.as_ref();
            verbatim.insert(path.to_string_lossy().into_owned());
            if let Ok(c) = path.canonicalize() {
                canonical.insert(c);
            }
        }
        Self {
            verbatim,
            canonical,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Whether a filter is in effect.
    pub fn is_restricted(&self) -> bool {
        !self.verbatim.is_empty()
    }

    /// Whether declarations located in `file` are collected.
    pub fn allows(&self, file: &str) -> bool {
        if !self.is_restricted() || self.verbatim.contains(file) {
            return true;
        }
        if self.canonical.is_empty() {
            return false;
        }
        let mut cache = self.cache.borrow_mut();
        let resolved = cache
            .entry(file.to_string())
            .or_insert_with(|| Path::new(file).canonicalize().ok());
        let allowed = resolved
            .as_ref()
            .is_some_and(|path| self.canonical.contains(path));
        trace!(file, allowed, "scope check");
        allowed
    }

    /// Whether a node located in `file` (if known) is collected. Nodes
    /// without a location are admitted only by an unrestricted filter.
    pub fn admits(&self, file: Option<&str>) -> bool {
        match file {
            Some(file) => self.allows(file),
            None => !self.is_restricted(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn unrestricted_admits_everything() {
        let filter = ScopeFilter::unrestricted();
        assert!(filter.allows("/usr/include/stdio.h"));
        assert!(filter.admits(None));
    }

    #[test]
    fn verbatim_match() {
        let filter = ScopeFilter::new(["demo.h"]);
        assert!(filter.allows("demo.h"));
        assert!(!filter.allows("/usr/include/stdio.h"));
        assert!(!filter.admits(None));
    }

    #[test]
    fn canonical_match() {
        let dir = tempfile::tempdir().unwrap();
        let header = dir.path().join("demo.h");
        fs::write(&header, "/* empty */\n").unwrap();
        let dotted = dir.path().join(".").join("demo.h");

        let filter = ScopeFilter::new([dotted]);
        assert!(filter.allows(header.to_str().unwrap()));
        // Second lookup is served from the cache.
        assert!(filter.allows(header.to_str().unwrap()));
    }

    #[test]
    fn missing_files_only_match_verbatim() {
        let filter = ScopeFilter::new(["/nonexistent/a.h"]);
        assert!(filter.allows("/nonexistent/a.h"));
        assert!(!filter.allows("/nonexistent/./a.h"));
    }
}
