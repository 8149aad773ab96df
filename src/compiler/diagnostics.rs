//! Diagnostics collected while compiling.
//!
//! The compiler does not log. Anything worth reporting that does not abort
//! compilation is recorded here and handed back to the caller.

use super::CompileError;
use std::fmt;

/// How serious a diagnostic is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Output is complete but probably not what was meant
    Warning,
    /// A unit failed and was left out of the output
    Skipped,
}

/// A single diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Severity::Warning => write!(f, "{}", self.message),
            Severity::Skipped => write!(f, "skipped: {}", self.message),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn warn(&mut self, message: impl Into<String>) {
        self.push(Diagnostic {
            severity: Severity::Warning,
            message: message.into(),
        });
    }

    /// Record a unit dropped because of `err`
    pub fn skipped(&mut self, err: &CompileError) {
        self.push(Diagnostic {
            severity: Severity::Skipped,
            message: err.to_string(),
        });
    }

    // A node with a bad kind fails in every phase; report it once.
    fn push(&mut self, diagnostic: Diagnostic) {
        if !self.entries.contains(&diagnostic) {
            self.entries.push(diagnostic);
        }
    }

    /// Merge another set, dropping entries already present
    pub fn extend(&mut self, other: &Diagnostics) {
        for diagnostic in other.iter() {
            self.push(diagnostic.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(|d| d.severity == Severity::Warning)
    }

    pub fn skipped_units(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(|d| d.severity == Severity::Skipped)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
