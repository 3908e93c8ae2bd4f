//! PHPDoc type annotation checker.
//!
//! Parses the PHPStan / Psalm flavoured type syntax of doc comments,
//! normalizes it, and checks it against the native PHP signature of the
//! declaration it documents: a documented type must be the native type
//! or narrower.  Non-canonical spellings (`Integer`, `boolean`, `$this`…)
//! are reported as fixable style warnings.
//!
//! The pieces, bottom-up:
//!
//! - [`doctype`]: the type parser and comparator, usable on its own.
//! - [`docblock`]: doc comment → tags, and writing corrected tags back.
//! - `parser`: mago-syntax AST walking that attaches comments to
//!   declarations.
//! - [`Checker`]: runs everything on a file and yields [`Diagnostic`]s.

pub mod config;
pub mod diagnostics;
pub mod docblock;
pub mod doctype;
pub mod error;
pub mod scope;
pub mod types;

mod parser;
mod util;

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

pub use config::{Config, OutputFormat};
pub use diagnostics::{Diagnostic, DiagnosticCode, FileReport, Severity};
pub use doctype::PhpDocTypeParser;
pub use error::{CheckError, ParseError};
pub use scope::Scope;
pub use types::{
    Artifact, ArtifactRegistry, FieldsToExtract, PassMode, TemplateData, TextEdit, TypeAndName,
};

/// Runs the doc type checks on PHP sources.
#[derive(Debug, Clone, Default)]
pub struct Checker {
    strict: bool,
}

impl Checker {
    pub fn new(config: &Config) -> Self {
        Self {
            strict: config.strict,
        }
    }

    /// In strict mode internal failures are returned as errors instead of
    /// a single file-level diagnostic.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Check one PHP source text.
    ///
    /// Outside strict mode a fatal failure (a parser panic, a fix that
    /// would move line breaks) discards the file's diagnostics and
    /// reports a single `phpdoc_type_parse` error at the start of the
    /// file instead.
    pub fn check_source(&self, source: &str) -> Result<Vec<Diagnostic>, CheckError> {
        match parser::check_php(source) {
            Ok(diagnostics) => Ok(diagnostics),
            Err(err) if self.strict => Err(err),
            Err(err) => {
                warn!(%err, "PHPDoc type checks were not performed");
                Ok(vec![diagnostics::file_level_diagnostic()])
            }
        }
    }

    /// Read and check a file.  I/O errors are always returned.
    pub fn check_file(&self, path: &Path) -> Result<FileReport, CheckError> {
        let source = fs::read_to_string(path).map_err(|source| CheckError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "checking");
        let diagnostics = self.check_source(&source)?;
        Ok(FileReport {
            path: path.to_path_buf(),
            diagnostics,
        })
    }

    /// Check `source` and apply every style fix.
    ///
    /// Returns the fixed text together with the diagnostics found in the
    /// original text.
    pub fn fix_source(&self, source: &str) -> Result<(String, Vec<Diagnostic>), CheckError> {
        let diagnostics = self.check_source(source)?;
        let fixed = diagnostics::apply_fixes(source, &diagnostics);
        Ok((fixed, diagnostics))
    }

    /// The class-likes declared in `source` with their inheritance edges.
    pub fn artifacts(&self, source: &str) -> Result<ArtifactRegistry, CheckError> {
        parser::artifacts_of(source)
    }
}
