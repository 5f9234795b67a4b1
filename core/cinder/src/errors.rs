use std::path::PathBuf;

use crate::options::Phase;

/// Failures of the compilation pipeline itself.
///
/// Diagnostics explaining *why* a phase failed are already in the sink by the
/// time a [`CompileError::PhaseFailed`] is returned.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("cannot read `{}`", path.display())]
    SourceIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{phase} failed: {errors} error(s) emitted")]
    PhaseFailed { phase: Phase, errors: usize },

    #[error("warnings treated as errors: {warnings} warning(s) emitted")]
    DeniedWarnings { warnings: usize },

    #[error("no source files given")]
    NoSources,

    #[error("code generation failed")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}
