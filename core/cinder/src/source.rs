//! Loading source files from disk.

use std::path::Path;

use crate::errors::CompileError;

/// One input file: the path it was read from (used in diagnostics) and its text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFile {
    pub path: String,
    pub text: String,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }

    /// Reads the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::SourceIo`] when the file cannot be read.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, CompileError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| CompileError::SourceIo {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(path.display().to_string(), text))
    }

    pub(crate) fn as_pair(&self) -> (&str, &str) {
        (&self.path, &self.text)
    }
}

/// Reads every file in `paths`, in order. The first unreadable file aborts the load.
///
/// # Errors
///
/// Returns [`CompileError::NoSources`] for an empty list and
/// [`CompileError::SourceIo`] for a missing or unreadable file.
pub fn load_sources<P: AsRef<Path>>(paths: &[P]) -> anyhow::Result<Vec<SourceFile>> {
    if paths.is_empty() {
        return Err(CompileError::NoSources.into());
    }
    let mut sources = Vec::with_capacity(paths.len());
    for path in paths {
        let source = SourceFile::read(path)?;
        tracing::debug!(path = %source.path, bytes = source.text.len(), "loaded source");
        sources.push(source);
    }
    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn loads_files_in_order() {
        let temp = assert_fs::TempDir::new().unwrap();
        let first = temp.child("util.cnd");
        first.write_str("@module util;").unwrap();
        let second = temp.child("main.cnd");
        second.write_str("fn main() -> int { return 0; }").unwrap();

        let sources = load_sources(&[first.path(), second.path()]).unwrap();
        assert_eq!(sources.len(), 2);
        assert!(sources[0].path.ends_with("util.cnd"));
        assert_eq!(sources[1].text, "fn main() -> int { return 0; }");
    }

    #[test]
    fn missing_file_is_fatal() {
        let temp = assert_fs::TempDir::new().unwrap();
        let missing = temp.child("nope.cnd");
        let err = load_sources(&[missing.path()]).unwrap_err();
        let err = err.downcast_ref::<CompileError>().unwrap();
        assert!(matches!(err, CompileError::SourceIo { .. }));
    }

    #[test]
    fn empty_input_is_rejected() {
        let paths: [&str; 0] = [];
        let err = load_sources(&paths).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CompileError>(),
            Some(CompileError::NoSources)
        ));
    }
}
