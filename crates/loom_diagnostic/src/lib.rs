#![cfg_attr(docsrs, feature(doc_cfg))]

//! # loom-diagnostic
//!
//! The diagnostic stream named in spec.md §6: "All resolver and
//! evaluator errors are sent to a reporter with severity
//! (error/warning), location, and message. An error aborts IR
//! emission; a warning does not."
//!
//! # Modules
//!
//! - [`Diagnostic`]/[`Severity`] — one reported problem
//! - [`Reporter`] — the accumulating sink; a single pass collects all
//!   diagnostics before the resolver returns to its caller (spec.md §7)
//! - [`style`] — ANSI terminal coloring for human-facing rendering
//!
//! # Example
//!
//! ```
//! use loom_base::Span;
//! use loom_diagnostic::{Reporter, Severity};
//!
//! let mut reporter = Reporter::new();
//! reporter.warn(Span::new(0, 3), "unused import 'foo'");
//! reporter.error(Span::new(10, 14), "unbound variable 'frob'");
//!
//! assert!(reporter.has_errors());
//! assert_eq!(reporter.diagnostics().len(), 2);
//! assert_eq!(reporter.diagnostics()[0].severity, Severity::Warning);
//! ```

pub mod style;

pub use style::Style;

use loom_base::Span;
use std::fmt;

/// Severity of a reported [`Diagnostic`].
///
/// An `Error` aborts IR emission (spec.md §7); a `Warning` does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Severity {
    Warning,
    Error,
}

/// One reported problem: a severity, a source location, and a message.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Diagnostic {
    pub severity: Severity,
    pub span: Span,
    pub message: String,
}

impl Diagnostic {
    pub fn error(span: Span, message: impl Into<String>) -> Self {
        Self { severity: Severity::Error, span, message: message.into() }
    }

    pub fn warning(span: Span, message: impl Into<String>) -> Self {
        Self { severity: Severity::Warning, span, message: message.into() }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            Severity::Error => Style::bold_red("error"),
            Severity::Warning => Style::yellow("warning"),
        };
        write!(
            f,
            "{}: {} ({}..{})",
            label, self.message, self.span.start, self.span.end
        )
    }
}

/// Accumulating sink for [`Diagnostic`]s produced during one resolver
/// (or evaluator) pass.
///
/// Matches spec.md §7's propagation model: "resolver errors accumulate
/// in a report buffer; a single pass collects all errors before
/// returning to the caller." The resolver keeps running after an
/// error so it can surface every problem in one shot, only refusing to
/// emit IR if [`Reporter::has_errors`] is true once the pass completes.
#[derive(Debug, Default)]
pub struct Reporter {
    diagnostics: Vec<Diagnostic>,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an error-severity diagnostic.
    pub fn error(&mut self, span: Span, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::error(span, message));
    }

    /// Records a warning-severity diagnostic.
    pub fn warn(&mut self, span: Span, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::warning(span, message));
    }

    /// Pushes an already-constructed diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// `true` if any recorded diagnostic is error-severity.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }

    /// All diagnostics recorded so far, in report order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consumes the reporter, returning its diagnostics.
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Number of error-severity diagnostics recorded.
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Error).count()
    }

    /// Number of warning-severity diagnostics recorded.
    pub fn warning_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Warning).count()
    }
}
