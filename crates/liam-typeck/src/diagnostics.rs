//! Diagnostics sink shared by every pass

use std::fmt;
use std::path::{Path, PathBuf};

use liam_ast::Span;

use crate::error::ErrorKind;

/// Pipeline stage that produced a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Pass {
    Load,
    Declare,
    TypeCheck,
    BorrowCheck,
    Backend,
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Pass::Load => "load",
            Pass::Declare => "declare",
            Pass::TypeCheck => "type check",
            Pass::BorrowCheck => "borrow check",
            Pass::Backend => "backend",
        };
        write!(f, "{}", name)
    }
}

/// Secondary location attached to a report
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub span: Span,
    pub message: String,
}

/// One diagnostic
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorReport {
    pub file: PathBuf,
    pub line: u32,
    pub character: u32,
    pub message: String,
    pub kind: ErrorKind,
    pub pass: Pass,
    pub span: Span,
    pub notes: Vec<Note>,
}

impl ErrorReport {
    pub fn new(pass: Pass, file: &Path, span: Span, kind: ErrorKind) -> Self {
        Self {
            file: file.to_path_buf(),
            line: span.line,
            character: span.column,
            message: kind.to_string(),
            kind,
            pass,
            span,
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, span: Span, message: impl Into<String>) -> Self {
        self.notes.push(Note {
            span,
            message: message.into(),
        });
        self
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {} error: {}",
            self.file.display(),
            self.line,
            self.character,
            self.pass,
            self.message
        )
    }
}

/// Position in the report stream, taken before a pass starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

/// Append-only accumulator of reports for one compilation
#[derive(Debug, Default)]
pub struct Diagnostics {
    reports: Vec<ErrorReport>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, report: ErrorReport) {
        log::debug!("{}", report);
        self.reports.push(report);
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.reports.len())
    }

    pub fn has_errors_since(&self, checkpoint: Checkpoint) -> bool {
        self.reports.len() > checkpoint.0
    }

    /// Reports appended after `checkpoint`.
    pub fn since(&self, checkpoint: Checkpoint) -> &[ErrorReport] {
        &self.reports[checkpoint.0.min(self.reports.len())..]
    }

    pub fn reports(&self) -> &[ErrorReport] {
        &self.reports
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}
