//! PHPDoc type parsing and comparison.
//!
//! [`PhpDocTypeParser`] parses the PHPStan / Psalm flavoured type syntax
//! found in doc tags (and in native PHP signatures, which are a subset)
//! into a normalized type string: `|`-separated union members, each an
//! `&`-separated intersection of atomic types, sorted and deduplicated.
//! Class names come out fully qualified with a leading `\`.
//!
//! It also decides whether one normalized type is compatible with
//! (narrower than or equal to) another, using the built-in PHP class
//! hierarchy plus the class-likes discovered in the current file.
//!
//! # Submodules
//!
//! - [`lexer`]: lazy, rewindable tokenizer.
//! - `grammar`: the recursive-descent productions.
//! - `tidy`: union / intersection normalization.
//! - [`supertypes`]: built-in hierarchy, supertype closure, comparison.

pub mod lexer;
pub mod supertypes;

mod grammar;
mod tidy;

use tracing::trace;

use crate::error::ParseError;
use crate::scope::Scope;
use crate::types::{ArtifactRegistry, FieldsToExtract, PassMode, TemplateData, TypeAndName};

use grammar::Grammar;

/// Parses doc types against one file's artifact registry.
///
/// Every call starts from a fresh tokenizer and correction list, so one
/// parser can be reused for every tag in a file.
#[derive(Debug, Clone, Default)]
pub struct PhpDocTypeParser {
    artifacts: ArtifactRegistry,
}

impl PhpDocTypeParser {
    pub fn new(artifacts: ArtifactRegistry) -> Self {
        Self { artifacts }
    }

    pub fn artifacts(&self) -> &ArtifactRegistry {
        &self.artifacts
    }

    /// Parse a type, optionally followed by pass markers and a variable
    /// name, from the start of `text`.
    ///
    /// `default_wide` picks what unresolvable fragments (`key-of<…>`,
    /// `Foo::CONST`…) become: `mixed` for native signatures so they never
    /// cause false mismatches, `never` for doc types so they never match
    /// everything.
    ///
    /// Each field is attempted independently; a malformed one is reported
    /// as `None` and parsing resumes where that field started.
    pub fn parse_type_and_name(
        &self,
        scope: Option<&Scope>,
        text: &str,
        fields: FieldsToExtract,
        default_wide: bool,
    ) -> TypeAndName {
        let root;
        let scope = match scope {
            Some(scope) => scope,
            None => {
                root = Scope::root();
                &root
            }
        };
        let mut grammar = Grammar::new(text, scope, &self.artifacts, default_wide);

        let checkpoint = grammar.lexer.checkpoint();
        let mut ty = match parse_delimited_type(&mut grammar) {
            Ok(ty) => Some(ty),
            Err(err) => {
                trace!(%err, text, "type not parsed");
                grammar.lexer.rewind(checkpoint);
                None
            }
        };

        let mut pass_mode = PassMode::None;
        if fields >= FieldsToExtract::WithPassMode {
            let by_reference = grammar.lexer.eat("&");
            let splat = grammar.lexer.eat("...");
            pass_mode = PassMode::from_markers(by_reference, splat);
        }

        let mut name = None;
        if fields >= FieldsToExtract::TypeAndName {
            let checkpoint = grammar.lexer.checkpoint();
            match self.parse_name(&mut grammar, fields, &mut ty) {
                Ok(parsed) => name = Some(parsed),
                Err(err) => {
                    trace!(%err, text, "name not parsed");
                    grammar.lexer.rewind(checkpoint);
                }
            }
        }

        let remainder = grammar.lexer.rest_from(0).trim().to_string();
        let fixed = ty.as_ref().and_then(|_| grammar.lexer.fixed());
        TypeAndName {
            ty,
            pass_mode,
            name,
            remainder,
            fixed,
        }
    }

    /// Parse `Name [of|as Bound]` from a `@template` tag.
    pub fn parse_template(&self, scope: Option<&Scope>, text: &str) -> TemplateData {
        let root;
        let scope = match scope {
            Some(scope) => scope,
            None => {
                root = Scope::root();
                &root
            }
        };
        let mut grammar = Grammar::new(text, scope, &self.artifacts, false);

        let checkpoint = grammar.lexer.checkpoint();
        let name = match parse_template_name(&mut grammar) {
            Ok(name) => Some(name),
            Err(err) => {
                trace!(%err, text, "template name not parsed");
                grammar.lexer.rewind(checkpoint);
                None
            }
        };

        let ty = if matches!(grammar.lexer.next(0), Some("of") | Some("as")) {
            grammar.lexer.skip();
            let checkpoint = grammar.lexer.checkpoint();
            match parse_delimited_type(&mut grammar) {
                Ok(ty) => Some(ty),
                Err(err) => {
                    trace!(%err, text, "template bound not parsed");
                    grammar.lexer.rewind(checkpoint);
                    None
                }
            }
        } else {
            Some("mixed".to_string())
        };

        let remainder = grammar.lexer.rest_from(0).trim().to_string();
        let fixed = ty.as_ref().and_then(|_| grammar.lexer.fixed());
        TemplateData {
            ty,
            name,
            remainder,
            fixed,
        }
    }

    /// Whether `narrow` is compatible with `wide`.
    ///
    /// See [`supertypes::compare_types`].
    pub fn compare_types(&self, wide: Option<&str>, narrow: Option<&str>) -> bool {
        supertypes::compare_types(&self.artifacts, wide, narrow)
    }

    /// Transitive supertypes of one atomic type.
    pub fn super_types(&self, atomic: &str) -> Vec<String> {
        supertypes::super_types(&self.artifacts, atomic)
    }

    fn parse_name(
        &self,
        grammar: &mut Grammar<'_, '_>,
        fields: FieldsToExtract,
        ty: &mut Option<String>,
    ) -> Result<String, ParseError> {
        let lexer = &mut grammar.lexer;
        let name = match lexer.next(0) {
            Some(token) if token.starts_with('$') => lexer.consume(None)?.to_string(),
            other => return Err(ParseError::ExpectedVariable(other.unwrap_or_default().to_string())),
        };

        let with_default = fields >= FieldsToExtract::WithDefault;
        if !(with_default && lexer.next(0) == Some("=")) && !lexer.at_field_end() {
            return Err(ParseError::NoSpaceAfterName);
        }

        // Legacy implicit nullable: `T $x = null`.
        if with_default
            && lexer.next(0) == Some("=")
            && lexer.next(1).is_some_and(|t| t.eq_ignore_ascii_case("null"))
            && lexer.rest_from(1).trim().eq_ignore_ascii_case("null")
            && let Some(current) = ty.as_deref()
            && current != "mixed"
        {
            let members = current
                .split('|')
                .map(str::to_string)
                .chain(std::iter::once("null".to_string()))
                .collect();
            *ty = Some(tidy::tidy_union(&self.artifacts, members).join("|"));
        }

        Ok(name)
    }
}

/// A type followed by a field delimiter.
fn parse_delimited_type(grammar: &mut Grammar<'_, '_>) -> Result<String, ParseError> {
    let ty = grammar.parse_any_type(false)?;
    if !grammar.lexer.at_field_end() {
        return Err(ParseError::NoSpaceAfterType);
    }
    Ok(ty)
}

fn parse_template_name(grammar: &mut Grammar<'_, '_>) -> Result<String, ParseError> {
    let lexer = &mut grammar.lexer;
    let name = match lexer.next(0) {
        Some(token)
            if token
                .bytes()
                .next()
                .is_some_and(|b| b.is_ascii_alphabetic() || b == b'_') =>
        {
            lexer.consume(None)?.to_string()
        }
        other => {
            return Err(ParseError::ExpectedTemplateName(
                other.unwrap_or_default().to_string(),
            ));
        }
    };
    if !lexer.at_field_end() {
        return Err(ParseError::NoSpaceAfterName);
    }
    Ok(name)
}
