//! Error types.
//!
//! Two tiers are kept apart on purpose:
//!
//! - [`ParseError`] is raised by the doc-type grammar while trying a
//!   production.  It never escapes a field: the caller rewinds the
//!   tokenizer to its checkpoint and records the field as undetermined.
//! - [`CheckError`] is an internal-consistency failure for a whole file
//!   (a fix that would move line breaks, a parser panic, I/O).  The
//!   [`Checker`](crate::Checker) turns it into a single file-level
//!   diagnostic unless strict mode asks for it to be propagated.

use std::path::PathBuf;

use thiserror::Error;

/// A recoverable failure inside the type grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unexpected end of type")]
    UnexpectedEnd,

    #[error("expected \"{expected}\", saw \"{found}\"")]
    Expected { expected: String, found: String },

    #[error("expected type, saw end")]
    ExpectedType,

    #[error("unrecognised type \"{0}\"")]
    Unrecognised(String),

    #[error("union inside an intersection is not in disjunctive normal form")]
    NonDnf,

    #[error("intersection can only be used with objects, saw \"{0}\"")]
    IntersectionNonObject(String),

    #[error("expected int {bound}, saw \"{found}\"")]
    IntRangeBound { bound: &'static str, found: String },

    #[error("invalid int mask \"{0}\"")]
    InvalidIntMask(String),

    #[error("class-string type \"{0}\" isn't a class")]
    ClassStringNotClass(String),

    #[error("lists cannot have keys specified")]
    ListWithKey,

    #[error("invalid array key \"{0}\"")]
    InvalidArrayKey(String),

    #[error("non-empty arrays cannot have shapes")]
    NonEmptyShape,

    #[error("invalid object key")]
    InvalidObjectKey,

    #[error("can't get key or value of non-iterable \"{0}\"")]
    NotIterable(String),

    #[error("class name \"{0}\" has a trailing backslash")]
    TrailingBackslash(String),

    #[error("no space after type")]
    NoSpaceAfterType,

    #[error("no space after name")]
    NoSpaceAfterName,

    #[error("expected variable, saw \"{0}\"")]
    ExpectedVariable(String),

    #[error("expected template name, saw \"{0}\"")]
    ExpectedTemplateName(String),

    #[error("type nested more than {0} levels deep")]
    TooDeep(usize),
}

/// A fatal failure while checking one file.
#[derive(Debug, Error)]
pub enum CheckError {
    /// A style fix would add or remove a line break inside a tag.
    #[error("replacement for {tag} spans {replacement} line(s) but the tag spans {original}")]
    FixLineMismatch {
        tag: String,
        original: usize,
        replacement: usize,
    },

    /// A non-empty replacement line maps onto an empty tag line, or the
    /// other way round.
    #[error("replacement for {tag} does not match the tag's line layout at line {line}")]
    FixLineLayout { tag: String, line: usize },

    /// The PHP parser panicked on this input.
    #[error("PHP parser panicked")]
    ParserPanicked,

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("failed to render report: {0}")]
    Render(#[from] serde_json::Error),
}
