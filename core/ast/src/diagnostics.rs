//! Diagnostics sink shared by every front-end phase.
//!
//! One [`Diagnostics`] value is threaded through the lexer, the parser and the
//! type checker of a compilation run. Entries are kept up to a fixed capacity;
//! anything beyond it is counted in [`Diagnostics::dropped`] so a flood of
//! follow-up errors can never hide that something was lost.
//!
//! Rendering follows the familiar caret layout:
//!
//! ```text
//! error[SyntaxError]: expected ';' after expression
//!  --> main.cnd:3:10
//!   |
//! 3 | let x = 1
//!   |          ^ expected ';'
//!   = help: terminate the statement with ';'
//! ```

use core::fmt;
use std::fmt::{Display, Formatter, Write as _};

use crate::nodes::Position;

/// Default capacity of a [`Diagnostics`] sink.
pub const DEFAULT_MAX_DIAGNOSTICS: usize = 100;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum DiagnosticKind {
    LexError,
    SyntaxError,
    TypeError,
    Warning,
}

impl DiagnosticKind {
    #[must_use]
    pub fn is_error(self) -> bool {
        !matches!(self, DiagnosticKind::Warning)
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            DiagnosticKind::LexError => "LexError",
            DiagnosticKind::SyntaxError => "SyntaxError",
            DiagnosticKind::TypeError => "TypeError",
            DiagnosticKind::Warning => "Warning",
        }
    }
}

impl Display for DiagnosticKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub file: String,
    pub message: String,
    /// One-based; zero means the diagnostic has no source location.
    pub line: u32,
    pub column: u32,
    pub source_line: Option<String>,
    /// Width of the caret underline, at least one.
    pub length: usize,
    pub label: Option<String>,
    pub note: Option<String>,
    pub help: Option<String>,
}

impl Diagnostic {
    #[must_use]
    pub fn new(
        kind: DiagnosticKind,
        file: impl Into<String>,
        message: impl Into<String>,
        position: Position,
    ) -> Self {
        Self {
            kind,
            file: file.into(),
            message: message.into(),
            line: position.line,
            column: position.column,
            source_line: None,
            length: 1,
            label: None,
            note: None,
            help: None,
        }
    }

    #[must_use]
    pub fn lex_error(file: impl Into<String>, message: impl Into<String>, position: Position) -> Self {
        Self::new(DiagnosticKind::LexError, file, message, position)
    }

    #[must_use]
    pub fn syntax_error(
        file: impl Into<String>,
        message: impl Into<String>,
        position: Position,
    ) -> Self {
        Self::new(DiagnosticKind::SyntaxError, file, message, position)
    }

    #[must_use]
    pub fn type_error(file: impl Into<String>, message: impl Into<String>, position: Position) -> Self {
        Self::new(DiagnosticKind::TypeError, file, message, position)
    }

    #[must_use]
    pub fn warning(file: impl Into<String>, message: impl Into<String>, position: Position) -> Self {
        Self::new(DiagnosticKind::Warning, file, message, position)
    }

    #[must_use]
    pub fn with_source_line(mut self, source_line: impl Into<String>) -> Self {
        self.source_line = Some(source_line.into());
        self
    }

    #[must_use]
    pub fn with_length(mut self, length: usize) -> Self {
        self.length = length.max(1);
        self
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    #[must_use]
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.kind.is_error()
    }

    #[must_use]
    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let severity = if self.is_error() { "error" } else { "warning" };
        writeln!(f, "{severity}[{}]: {}", self.kind, self.message)?;
        let width = if self.line == 0 {
            1
        } else {
            self.line.to_string().len()
        };
        let pad = " ".repeat(width);
        if self.line > 0 {
            writeln!(f, "{pad}--> {}:{}:{}", self.file, self.line, self.column)?;
            if let Some(source) = &self.source_line {
                writeln!(f, "{pad} |")?;
                writeln!(f, "{:>width$} | {source}", self.line)?;
                // Keep tabs so the caret lines up with the echoed source.
                let indent: String = source
                    .chars()
                    .take(self.column.saturating_sub(1) as usize)
                    .map(|c| if c == '\t' { '\t' } else { ' ' })
                    .collect();
                let carets = "^".repeat(self.length.max(1));
                match &self.label {
                    Some(label) => writeln!(f, "{pad} | {indent}{carets} {label}")?,
                    None => writeln!(f, "{pad} | {indent}{carets}")?,
                }
            }
        } else if !self.file.is_empty() {
            writeln!(f, "{pad}--> {}", self.file)?;
        }
        if let Some(note) = &self.note {
            writeln!(f, "{pad} = note: {note}")?;
        }
        if let Some(help) = &self.help {
            writeln!(f, "{pad} = help: {help}")?;
        }
        Ok(())
    }
}

/// Bounded collection of diagnostics for one compilation run.
///
/// Lifecycle: `clear`, accumulate with `add`, `report`, `clear` again for the next run.
#[derive(Debug)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
    capacity: usize,
    errors: usize,
    warnings: usize,
    dropped: usize,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_DIAGNOSTICS)
    }
}

impl Diagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity.min(DEFAULT_MAX_DIAGNOSTICS)),
            capacity,
            errors: 0,
            warnings: 0,
            dropped: 0,
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Records `diagnostic`. Returns `false` when the sink is full and the
    /// entry was dropped; it still counts towards the error/warning totals.
    pub fn add(&mut self, diagnostic: Diagnostic) -> bool {
        if diagnostic.is_error() {
            self.errors += 1;
        } else {
            self.warnings += 1;
        }
        if self.entries.len() >= self.capacity {
            self.dropped += 1;
            return false;
        }
        self.entries.push(diagnostic);
        true
    }

    /// Appends every entry of `other`, honouring this sink's capacity.
    pub fn extend(&mut self, other: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in other {
            self.add(diagnostic);
        }
    }

    /// Renders all entries in insertion order.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for diagnostic in &self.entries {
            let _ = writeln!(out, "{diagnostic}");
        }
        if self.dropped > 0 {
            let _ = writeln!(
                out,
                "note: {} further diagnostic(s) dropped after reaching the limit of {}",
                self.dropped, self.capacity
            );
        }
        out
    }

    /// Prints every entry to stderr and returns whether any error was recorded.
    pub fn report(&self) -> bool {
        if !self.entries.is_empty() || self.dropped > 0 {
            eprint!("{}", self.render());
        }
        self.has_errors()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.errors = 0;
        self.warnings = 0;
        self.dropped = 0;
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    /// Errors recorded since the last clear, including dropped ones.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors
    }

    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.warnings
    }

    #[must_use]
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    /// Stored entries of one kind, mostly useful in tests.
    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.kind == kind)
    }
}

impl<'d> IntoIterator for &'d Diagnostics {
    type Item = &'d Diagnostic;
    type IntoIter = std::slice::Iter<'d, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_errors_and_warnings() {
        let mut sink = Diagnostics::new();
        assert!(!sink.has_errors());
        sink.add(Diagnostic::warning("a.cnd", "unused", Position::new(1, 1)));
        assert!(!sink.has_errors());
        sink.add(Diagnostic::type_error("a.cnd", "mismatch", Position::new(2, 3)));
        assert!(sink.has_errors());
        assert_eq!(sink.error_count(), 1);
        assert_eq!(sink.warning_count(), 1);
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn capacity_overflow_is_counted() {
        let mut sink = Diagnostics::with_capacity(2);
        for i in 1..=5 {
            let accepted = sink.add(Diagnostic::syntax_error("a.cnd", "bad", Position::new(i, 1)));
            assert_eq!(accepted, i <= 2);
        }
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.dropped(), 3);
        assert_eq!(sink.error_count(), 5);
        assert!(sink.render().contains("3 further diagnostic(s) dropped"));
    }

    #[test]
    fn clear_resets_everything() {
        let mut sink = Diagnostics::with_capacity(1);
        sink.add(Diagnostic::lex_error("a.cnd", "x", Position::new(1, 1)));
        sink.add(Diagnostic::lex_error("a.cnd", "y", Position::new(1, 2)));
        sink.clear();
        assert!(sink.is_empty());
        assert!(!sink.has_errors());
        assert_eq!(sink.dropped(), 0);
    }

    #[test]
    fn renders_caret_under_column() {
        let diagnostic = Diagnostic::syntax_error(
            "main.cnd",
            "expected ';' after expression",
            Position::new(3, 10),
        )
        .with_source_line("let x = 1")
        .with_label("expected ';'")
        .with_help("terminate the statement with ';'");
        let expected = "\
error[SyntaxError]: expected ';' after expression
 --> main.cnd:3:10
  |
3 | let x = 1
  |          ^ expected ';'
  = help: terminate the statement with ';'
";
        assert_eq!(diagnostic.to_string(), expected);
    }

    #[test]
    fn caret_width_follows_length() {
        let diagnostic = Diagnostic::warning("m.cnd", "private main", Position::new(12, 6))
            .with_source_line("priv fn main() -> int {")
            .with_length(4);
        let rendered = diagnostic.to_string();
        assert!(rendered.starts_with("warning[Warning]: private main\n"));
        assert!(rendered.contains("   |      ^^^^\n"));
        assert!(rendered.contains("12 | priv fn main"));
    }
}
