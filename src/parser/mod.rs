/// PHP parsing and declaration walking.
///
/// This module parses PHP source text with the mago_syntax parser and
/// walks the resulting AST twice:
///
/// - [`artifacts`]: collect the inheritance edges of every class-like
///   declared in the file, so the type comparator knows the local class
///   hierarchy.
/// - [`declarations`]: attach doc comments to the declarations they
///   document and check their `@param`, `@return`, `@var`, `@template`
///   and `@property` tags against the native signature.
///
/// [`use_statements`] turns `use` imports into scope aliases for both
/// passes.
mod artifacts;
mod declarations;
mod use_statements;

use std::panic;

use bumpalo::Bump;
use mago_span::HasSpan;
use mago_syntax::ast::*;
use mago_syntax::parser::parse_file_content;
use tracing::{debug, error};

use crate::diagnostics::Diagnostic;
use crate::docblock::DocComment;
use crate::doctype::PhpDocTypeParser;
use crate::error::CheckError;
use crate::types::ArtifactRegistry;

pub(crate) use artifacts::collect_artifacts;

use declarations::DeclarationWalker;

/// The file's comments, indexed for doc comment attachment.
pub(crate) struct CommentIndex<'a> {
    pub trivias: &'a [Trivia<'a>],
    pub content: &'a str,
}

impl<'a> CommentIndex<'a> {
    /// The doc comment that documents `node`, if any.
    ///
    /// Ordinary comments may separate the two.  Code may not, and neither
    /// may a second doc comment: only the closest one is attached.
    pub fn attached_to(&self, node: &impl HasSpan) -> Option<&'a Trivia<'a>> {
        let start = node.span().start.offset;
        let before = self.trivias.partition_point(|t| t.span.start.offset < start);

        let mut boundary = start as usize;
        for trivia in self.trivias[..before].iter().rev() {
            let between = self.content.get(trivia.span.end.offset as usize..boundary)?;
            if !between.trim().is_empty() {
                return None;
            }
            if matches!(trivia.kind, TriviaKind::DocBlockComment) {
                return Some(trivia);
            }
            boundary = trivia.span.start.offset as usize;
        }
        None
    }

    /// Every doc comment in the file, in source order.
    pub fn doc_comments(&self) -> impl Iterator<Item = &'a Trivia<'a>> + use<'a> {
        self.trivias
            .iter()
            .filter(|t| matches!(t.kind, TriviaKind::DocBlockComment))
    }

    /// Split a doc comment trivia into tags.
    pub fn parse_comment(&self, trivia: &Trivia<'_>) -> DocComment {
        DocComment::parse(trivia.value, trivia.span.start.offset as usize)
    }
}

/// A native type hint as the signature text the doc type is compared with.
///
/// Keywords keep their source spelling; the type parser lowercases them.
pub(crate) fn hint_text(hint: &Hint) -> String {
    match hint {
        Hint::Nullable(nullable) => format!("?{}", hint_text(nullable.hint)),
        Hint::Union(union) => format!("{}|{}", hint_text(union.left), hint_text(union.right)),
        Hint::Intersection(both) => format!("{}&{}", hint_text(both.left), hint_text(both.right)),
        Hint::Parenthesized(group) => format!("({})", hint_text(group.hint)),
        Hint::Identifier(name) => name.value().to_string(),
        Hint::Void(word)
        | Hint::Never(word)
        | Hint::Float(word)
        | Hint::Bool(word)
        | Hint::Integer(word)
        | Hint::String(word)
        | Hint::Object(word)
        | Hint::Mixed(word)
        | Hint::Iterable(word) => word.value.to_string(),
        Hint::Null(keyword)
        | Hint::True(keyword)
        | Hint::False(keyword)
        | Hint::Array(keyword)
        | Hint::Callable(keyword)
        | Hint::Static(keyword)
        | Hint::Self_(keyword)
        | Hint::Parent(keyword) => keyword.value.to_string(),
    }
}

/// Native parameter as signature text: `<hint> [&][...]$name [= <default>]`.
///
/// Untyped parameters get `mixed`.  The default value is copied from the
/// source, so `= null` can widen the type to nullable.
pub(crate) fn native_parameter_text(param: &FunctionLikeParameter<'_>, content: &str) -> String {
    let mut text = match &param.hint {
        Some(hint) => hint_text(hint),
        None => "mixed".to_string(),
    };
    text.push(' ');
    if param.ampersand.is_some() {
        text.push('&');
    }
    if param.ellipsis.is_some() {
        text.push_str("...");
    }
    text.push_str(param.variable.name);
    if let Some(default) = &param.default_value {
        let span = default.value.span();
        if let Some(value) = content.get(span.start.offset as usize..span.end.offset as usize) {
            text.push_str(" = ");
            text.push_str(value.trim());
        }
    }
    text
}

/// Parse `content` and run both passes over it.
///
/// The mago parser can panic on some malformed input; the whole parse and
/// walk is wrapped in `catch_unwind` so a panic becomes
/// [`CheckError::ParserPanicked`] instead of taking the process down.
pub(crate) fn check_php(content: &str) -> Result<Vec<Diagnostic>, CheckError> {
    let result = panic::catch_unwind(panic::AssertUnwindSafe(|| {
        let arena = Bump::new();
        let file_id = mago_database::file::FileId::new("input.php");
        let program = parse_file_content(&arena, file_id, content);

        let comments = CommentIndex {
            trivias: program.trivia.as_slice(),
            content,
        };

        let artifacts = collect_artifacts(program.statements.iter());
        debug!(class_likes = artifacts.len(), "artifact pass done");

        let type_parser = PhpDocTypeParser::new(artifacts);
        DeclarationWalker::new(&comments, &type_parser).run(program.statements.iter())
    }));

    match result {
        Ok(checked) => checked,
        Err(_) => {
            error!("parser panicked while checking file");
            Err(CheckError::ParserPanicked)
        }
    }
}

/// Run only the artifact pass over `content`.
pub(crate) fn artifacts_of(content: &str) -> Result<ArtifactRegistry, CheckError> {
    panic::catch_unwind(panic::AssertUnwindSafe(|| {
        let arena = Bump::new();
        let file_id = mago_database::file::FileId::new("input.php");
        let program = parse_file_content(&arena, file_id, content);
        collect_artifacts(program.statements.iter())
    }))
    .map_err(|_| {
        error!("parser panicked while collecting artifacts");
        CheckError::ParserPanicked
    })
}
