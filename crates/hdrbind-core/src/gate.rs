//! Diagnostics gate.
//!
//! Tallies the front-end's diagnostics by severity and decides whether a
//! translation unit is safe to translate. Any error or fatal blocks;
//! warnings and notes are only logged.

use hdrbind_ast::{Diagnostic, Severity};
use tracing::{debug, error, warn};

use crate::error::{CoreError, Result};

/// Severity counters for one translation unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiagnosticsGate {
    pub notes: usize,
    pub warnings: usize,
    pub errors: usize,
    pub fatals: usize,
}

impl DiagnosticsGate {
    /// Log and count every diagnostic.
    pub fn evaluate(diagnostics: &[Diagnostic]) -> Self {
        let mut gate = Self::default();
        for diagnostic in diagnostics {
            gate.record(diagnostic);
        }
        gate
    }

    fn record(&mut self, diagnostic: &Diagnostic) {
        match diagnostic.severity {
            Severity::Ignored => {}
            Severity::Note => {
                debug!("{diagnostic}");
                self.notes += 1;
            }
            Severity::Warning => {
                warn!("{diagnostic}");
                self.warnings += 1;
            }
            Severity::Error => {
                error!("{diagnostic}");
                self.errors += 1;
            }
            Severity::Fatal => {
                error!("{diagnostic}");
                self.fatals += 1;
            }
        }
    }

    /// Whether generation must stop.
    pub fn is_blocking(&self) -> bool {
        self.errors > 0 || self.fatals > 0
    }

    /// `Ok` when generation may proceed, [`CoreError::Blocked`] otherwise.
    pub fn check(&self) -> Result<()> {
        if self.is_blocking() {
            return Err(CoreError::Blocked {
                warnings: self.warnings,
                errors: self.errors,
                fatals: self.fatals,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdrbind_ast::SourceLocation;

    fn diag(severity: Severity) -> Diagnostic {
        Diagnostic::new(severity, "something").at(SourceLocation::new("demo.h", 3, 7))
    }

    #[test]
    fn empty_passes() {
        let gate = DiagnosticsGate::evaluate(&[]);
        assert_eq!(gate, DiagnosticsGate::default());
        assert!(gate.check().is_ok());
    }

    #[test]
    fn warnings_do_not_block() {
        let gate = DiagnosticsGate::evaluate(&[
            diag(Severity::Warning),
            diag(Severity::Warning),
            diag(Severity::Note),
            diag(Severity::Ignored),
        ]);
        assert_eq!(gate.warnings, 2);
        assert_eq!(gate.notes, 1);
        assert!(!gate.is_blocking());
    }

    #[test]
    fn one_error_blocks() {
        let gate = DiagnosticsGate::evaluate(&[diag(Severity::Warning), diag(Severity::Error)]);
        assert_eq!(
            gate.check(),
            Err(CoreError::Blocked {
                warnings: 1,
                errors: 1,
                fatals: 0
            })
        );
    }

    #[test]
    fn fatal_blocks() {
        let gate = DiagnosticsGate::evaluate(&[diag(Severity::Fatal)]);
        assert!(gate.is_blocking());
        assert!(gate.check().unwrap_err().is_fatal());
    }
}
