//! Settings of one compilation run.

use std::fmt::{self, Display, Formatter};

use cinder_ast::Arena;
use cinder_ast::arena::DEFAULT_MAX_BLOCK_SIZE;
use cinder_ast::diagnostics::{DEFAULT_MAX_DIAGNOSTICS, Diagnostics};

/// Front-end phases in pipeline order.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub enum Phase {
    Lex,
    Parse,
    Check,
}

impl Display for Phase {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(match self {
            Phase::Lex => "lexing",
            Phase::Parse => "parsing",
            Phase::Check => "type checking",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompileOptions {
    /// Diagnostics kept for rendering; further ones are only counted.
    pub max_diagnostics: usize,
    /// Size of the arena's standard blocks.
    pub max_block_size: usize,
    pub warnings_as_errors: bool,
    /// Last phase to run.
    pub stop_after: Phase,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            max_diagnostics: DEFAULT_MAX_DIAGNOSTICS,
            max_block_size: DEFAULT_MAX_BLOCK_SIZE,
            warnings_as_errors: false,
            stop_after: Phase::Check,
        }
    }
}

impl CompileOptions {
    #[must_use]
    pub fn with_max_diagnostics(mut self, max_diagnostics: usize) -> Self {
        self.max_diagnostics = max_diagnostics;
        self
    }

    #[must_use]
    pub fn with_max_block_size(mut self, max_block_size: usize) -> Self {
        self.max_block_size = max_block_size;
        self
    }

    #[must_use]
    pub fn with_warnings_as_errors(mut self, warnings_as_errors: bool) -> Self {
        self.warnings_as_errors = warnings_as_errors;
        self
    }

    #[must_use]
    pub fn stop_after(mut self, phase: Phase) -> Self {
        self.stop_after = phase;
        self
    }

    #[must_use]
    pub fn runs(&self, phase: Phase) -> bool {
        phase <= self.stop_after
    }

    /// A fresh arena sized for this run.
    #[must_use]
    pub fn arena(&self) -> Arena {
        Arena::with_max_block_size(self.max_block_size)
    }

    #[must_use]
    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics::with_capacity(self.max_diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_run_every_phase() {
        let options = CompileOptions::default();
        assert!(options.runs(Phase::Lex));
        assert!(options.runs(Phase::Check));
        assert!(!options.warnings_as_errors);
        assert_eq!(options.diagnostics().capacity(), DEFAULT_MAX_DIAGNOSTICS);
    }

    #[test]
    fn stop_after_limits_phases() {
        let options = CompileOptions::default()
            .stop_after(Phase::Parse)
            .with_max_diagnostics(5)
            .with_max_block_size(4096);
        assert!(options.runs(Phase::Parse));
        assert!(!options.runs(Phase::Check));
        assert_eq!(options.diagnostics().capacity(), 5);
        assert_eq!(options.arena().max_block_size(), 4096);
    }
}
