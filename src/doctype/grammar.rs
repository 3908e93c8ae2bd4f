//! Recursive-descent productions of the doc type grammar.
//!
//! ```text
//! AnyType    := ConditionalType | '?' SingleType | Intersection ('|' Intersection)*
//! ConditionalType := $var 'is' AnyType '?' AnyType ':' AnyType   (inside brackets only)
//! Intersection := SingleType ('&' SingleType)*
//! SingleType := ( '(' AnyType ')' | BasicType ) ('[' ']')*
//! ```
//!
//! Every production returns the normalized type string or a
//! [`ParseError`].  Rolling back after an error is the caller's job.

use crate::error::ParseError;
use crate::scope::Scope;
use crate::types::ArtifactRegistry;

use super::lexer::{Tokenizer, is_float_literal, is_int_literal, is_string_literal};
use super::supertypes::{compare_types, super_types};
use super::tidy::{tidy_intersection, tidy_union};

/// Parser state for one text.
pub(crate) struct Grammar<'p, 'a> {
    pub lexer: Tokenizer<'a>,
    scope: &'p Scope,
    artifacts: &'p ArtifactRegistry,
    /// Unresolvable fragments become `mixed` when set, `never` otherwise.
    wide: bool,
    depth: usize,
}

/// Nesting limit for `parse_any_type` / `parse_basic_type` frames.
const MAX_DEPTH: usize = 64;

const INT_KEYWORDS: &[&str] = &[
    "int",
    "integer",
    "positive-int",
    "negative-int",
    "non-positive-int",
    "non-negative-int",
    "int-mask",
    "int-mask-of",
];

const STRING_KEYWORDS: &[&str] = &[
    "string",
    "class-string",
    "numeric-string",
    "literal-string",
    "non-empty-string",
    "non-falsy-string",
    "truthy-string",
];

/// A bare word usable as a shape key (`name`, `_id`, `key2`).
fn is_shape_word(token: &str) -> bool {
    let mut bytes = token.bytes();
    bytes
        .next()
        .is_some_and(|b| b.is_ascii_alphabetic() || b == b'_')
        && bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

impl<'p, 'a> Grammar<'p, 'a> {
    pub fn new(text: &'a str, scope: &'p Scope, artifacts: &'p ArtifactRegistry, wide: bool) -> Self {
        Self {
            lexer: Tokenizer::new(text),
            scope,
            artifacts,
            wide,
            depth: 0,
        }
    }

    /// Run a nested production, failing once `MAX_DEPTH` frames are open.
    fn nested<T>(
        &mut self,
        production: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_DEPTH {
            return Err(ParseError::TooDeep(MAX_DEPTH));
        }
        self.depth += 1;
        let result = production(self);
        self.depth -= 1;
        result
    }

    fn unresolved(&self) -> String {
        if self.wide { "mixed" } else { "never" }.to_string()
    }

    fn compare(&self, wide: &str, narrow: &str) -> bool {
        compare_types(self.artifacts, Some(wide), Some(narrow))
    }

    fn is_object(&self, ty: &str) -> bool {
        super_types(self.artifacts, ty).iter().any(|s| s == "object")
    }

    fn expect(&mut self, token: &str) -> Result<&'a str, ParseError> {
        self.lexer.consume(Some(token))
    }

    /// A `&` followed by one of these marks a by-reference parameter, not
    /// an intersection.
    fn ampersand_is_reference(&mut self) -> bool {
        match self.lexer.next(1) {
            None | Some("...") | Some("=") | Some(",") | Some(")") => true,
            Some(token) => token.starts_with('$'),
        }
    }

    pub fn parse_any_type(&mut self, in_brackets: bool) -> Result<String, ParseError> {
        self.nested(|grammar| grammar.any_type(in_brackets))
    }

    fn any_type(&mut self, in_brackets: bool) -> Result<String, ParseError> {
        let members: Vec<String> = if in_brackets
            && self.lexer.next(0).is_some_and(|t| t.starts_with('$'))
            && self.lexer.next(1) == Some("is")
        {
            self.lexer.consume(None)?;
            self.expect("is")?;
            self.parse_any_type(false)?;
            self.expect("?")?;
            let then_type = self.parse_any_type(false)?;
            self.expect(":")?;
            let else_type = self.parse_any_type(false)?;
            then_type
                .split('|')
                .chain(else_type.split('|'))
                .map(str::to_string)
                .collect()
        } else if self.lexer.next(0) == Some("?") {
            self.expect("?")?;
            let single = self.parse_single_type()?;
            single
                .split('|')
                .map(str::to_string)
                .chain(std::iter::once("null".to_string()))
                .collect()
        } else {
            let mut members = Vec::new();
            loop {
                let mut union_instead: Option<String> = None;
                let mut intersection: Vec<String> = Vec::new();
                loop {
                    let single = self.parse_single_type()?;
                    if single.contains('|') {
                        intersection.push(self.unresolved());
                        union_instead = Some(single);
                    } else {
                        intersection.extend(single.split('&').map(str::to_string));
                    }
                    if self.lexer.next(0) == Some("&") && !self.ampersand_is_reference() {
                        self.expect("&")?;
                    } else {
                        break;
                    }
                }
                match union_instead {
                    Some(_) if intersection.len() > 1 => return Err(ParseError::NonDnf),
                    Some(union) => members.extend(union.split('|').map(str::to_string)),
                    None => {
                        let intersection = tidy_intersection(self.artifacts, intersection)?;
                        members.push(intersection.join("&"));
                    }
                }
                if !self.lexer.eat("|") {
                    break;
                }
            }
            members
        };

        Ok(tidy_union(self.artifacts, members).join("|"))
    }

    pub fn parse_single_type(&mut self) -> Result<String, ParseError> {
        let mut ty = if self.lexer.next(0) == Some("(") {
            self.expect("(")?;
            let inner = self.parse_any_type(true)?;
            self.expect(")")?;
            inner
        } else {
            self.parse_basic_type()?
        };
        while self.lexer.next(0) == Some("[") && self.lexer.next(1) == Some("]") {
            self.expect("[")?;
            self.expect("]")?;
            ty = "array".to_string();
        }
        Ok(ty)
    }

    pub fn parse_basic_type(&mut self) -> Result<String, ParseError> {
        self.nested(Self::basic_type)
    }

    fn basic_type(&mut self) -> Result<String, ParseError> {
        let Some(next) = self.lexer.next(0) else {
            return Err(ParseError::ExpectedType);
        };
        let lower = next.to_ascii_lowercase();

        let ty = match lower.as_str() {
            "bool" | "boolean" | "true" | "false" => {
                self.lexer
                    .correct(if lower == "boolean" { "bool" } else { lower.as_str() });
                self.lexer.consume(None)?;
                "bool".to_string()
            }
            l if INT_KEYWORDS.contains(&l) || is_int_literal(next) => self.parse_int(&lower)?,
            "float" | "double" => {
                self.lexer.correct("float");
                self.lexer.consume(None)?;
                "float".to_string()
            }
            _ if is_float_literal(next) => {
                self.lexer.consume(None)?;
                "float".to_string()
            }
            l if STRING_KEYWORDS.contains(&l) || is_string_literal(next) => {
                if !is_string_literal(next) {
                    self.lexer.correct(&lower);
                }
                let string_type = self.lexer.consume(None)?.to_ascii_lowercase();
                if string_type == "class-string" && self.lexer.next(0) == Some("<") {
                    self.expect("<")?;
                    let class = self.parse_basic_type()?;
                    if !self.compare("object", &class) {
                        return Err(ParseError::ClassStringNotClass(class));
                    }
                    self.expect(">")?;
                }
                "string".to_string()
            }
            "callable-string" => {
                self.lexer.correct(&lower);
                self.lexer.consume(None)?;
                "callable-string".to_string()
            }
            "array" | "non-empty-array" | "list" | "non-empty-list" => self.parse_array(&lower)?,
            "object" => {
                self.lexer.correct(&lower);
                self.lexer.consume(None)?;
                if self.lexer.next(0) == Some("{") {
                    self.parse_object_shape()?;
                }
                "object".to_string()
            }
            "never" | "never-return" | "never-returns" | "no-return" => {
                self.lexer.correct("never");
                self.lexer.consume(None)?;
                "never".to_string()
            }
            "resource" | "null" | "void" | "mixed" | "array-key" | "scalar" => {
                self.lexer.correct(&lower);
                self.lexer.consume(None)?;
                lower.clone()
            }
            "self" => {
                self.lexer.correct(&lower);
                self.lexer.consume(None)?;
                self.scope.resolve_self()
            }
            "parent" => {
                self.lexer.correct(&lower);
                self.lexer.consume(None)?;
                self.scope.resolve_parent()
            }
            "static" | "$this" => {
                self.lexer.correct("static");
                self.lexer.consume(None)?;
                self.scope.resolve_static()
            }
            _ if lower == "callable" || self.scope.resolve_doc_name(next) == "\\Closure" => {
                self.parse_callable(&lower)?
            }
            "iterable" => {
                self.lexer.correct(&lower);
                self.lexer.consume(None)?;
                if self.lexer.next(0) == Some("<") {
                    self.expect("<")?;
                    self.parse_any_type(false)?;
                    if self.lexer.eat(",") {
                        self.parse_any_type(false)?;
                    }
                    self.expect(">")?;
                }
                "iterable".to_string()
            }
            "key-of" | "value-of" => {
                self.lexer.correct(&lower);
                self.lexer.consume(None)?;
                self.expect("<")?;
                let iterable = self.parse_any_type(false)?;
                if !(self.compare("iterable", &iterable) || self.compare("object", &iterable)) {
                    return Err(ParseError::NotIterable(iterable));
                }
                self.expect(">")?;
                self.unresolved()
            }
            _ if next
                .as_bytes()
                .first()
                .is_some_and(|&b| b.is_ascii_alphabetic() || b == b'_' || b == b'\\')
                && !next.contains('-')
                && !next.contains("\\\\") =>
            {
                let name = self.lexer.consume(None)?;
                if name.ends_with('\\') {
                    return Err(ParseError::TrailingBackslash(name.to_string()));
                }
                self.scope.resolve_doc_name(name)
            }
            _ => return Err(ParseError::Unrecognised(next.to_string())),
        };

        self.parse_object_suffix(ty)
    }

    /// `<…>` generic arguments or a `::CONST` / `::PREFIX_*` / `::*`
    /// reference after an object type.
    fn parse_object_suffix(&mut self, ty: String) -> Result<String, ParseError> {
        match self.lexer.next(0) {
            Some("<") if self.is_object(&ty) => {
                self.expect("<")?;
                loop {
                    self.parse_any_type(false)?;
                    if !self.lexer.eat(",") {
                        break;
                    }
                }
                self.expect(">")?;
                Ok(ty)
            }
            Some("::") if self.is_object(&ty) => {
                self.expect("::")?;
                let have_constant = self
                    .lexer
                    .next(0)
                    .and_then(|t| t.bytes().next())
                    .is_some_and(|b| b.is_ascii_alphabetic() || b == b'_');
                if have_constant {
                    self.lexer.consume(None)?;
                }
                if !have_constant || self.lexer.next(0) == Some("*") {
                    self.expect("*")?;
                }
                Ok(self.unresolved())
            }
            _ => Ok(ty),
        }
    }

    fn parse_int(&mut self, lower: &str) -> Result<String, ParseError> {
        self.lexer
            .correct(if lower == "integer" { "int" } else { lower });
        let int_type = self.lexer.consume(None)?.to_ascii_lowercase();

        if matches!(int_type.as_str(), "int" | "integer") && self.lexer.next(0) == Some("<") {
            self.expect("<")?;
            self.parse_int_bound("min")?;
            self.expect(",")?;
            self.parse_int_bound("max")?;
            self.expect(">")?;
        } else if int_type == "int-mask" {
            self.expect("<")?;
            loop {
                self.parse_int_mask_member()?;
                if !self.lexer.eat(",") {
                    break;
                }
            }
            self.expect(">")?;
        } else if int_type == "int-mask-of" {
            self.expect("<")?;
            self.parse_int_mask_member()?;
            self.expect(">")?;
        }
        Ok("int".to_string())
    }

    fn parse_int_bound(&mut self, bound: &'static str) -> Result<(), ParseError> {
        match self.lexer.next(0) {
            Some(t) if t.eq_ignore_ascii_case(bound) || is_int_literal(t) => {
                self.lexer.consume(None)?;
                Ok(())
            }
            found => Err(ParseError::IntRangeBound {
                bound,
                found: found.unwrap_or_default().to_string(),
            }),
        }
    }

    fn parse_int_mask_member(&mut self) -> Result<(), ParseError> {
        let mask = self.parse_basic_type()?;
        if !self.compare("int", &mask) {
            return Err(ParseError::InvalidIntMask(mask));
        }
        Ok(())
    }

    fn parse_array(&mut self, lower: &str) -> Result<String, ParseError> {
        self.lexer.correct(lower);
        let array_type = self.lexer.consume(None)?.to_ascii_lowercase();
        let is_list = matches!(array_type.as_str(), "list" | "non-empty-list");
        let is_non_empty = array_type.starts_with("non-empty-");

        match self.lexer.next(0) {
            Some("<") => {
                self.expect("<")?;
                let first = self.parse_any_type(false)?;
                if self.lexer.next(0) == Some(",") {
                    if is_list {
                        return Err(ParseError::ListWithKey);
                    }
                    if !self.compare("array-key", &first) {
                        return Err(ParseError::InvalidArrayKey(first));
                    }
                    self.expect(",")?;
                    self.parse_any_type(false)?;
                }
                self.expect(">")?;
            }
            Some("{") => {
                if is_non_empty {
                    return Err(ParseError::NonEmptyShape);
                }
                self.expect("{")?;
                loop {
                    let keyed = self.lexer.next(0).is_some_and(|k| {
                        is_shape_word(k) || is_string_literal(k) || is_int_literal(k)
                    }) && (self.lexer.next(1) == Some(":")
                        || (self.lexer.next(1) == Some("?") && self.lexer.next(2) == Some(":")));
                    if keyed {
                        self.lexer.consume(None)?;
                        self.lexer.eat("?");
                        self.expect(":")?;
                    }
                    self.parse_any_type(false)?;
                    if !self.lexer.eat(",") {
                        break;
                    }
                }
                self.expect("}")?;
            }
            _ => {}
        }
        Ok("array".to_string())
    }

    fn parse_object_shape(&mut self) -> Result<(), ParseError> {
        self.expect("{")?;
        loop {
            match self.lexer.next(0) {
                Some(key) if is_shape_word(key) || is_string_literal(key) => {
                    self.lexer.consume(None)?;
                }
                _ => return Err(ParseError::InvalidObjectKey),
            }
            self.lexer.eat("?");
            self.expect(":")?;
            self.parse_any_type(false)?;
            if !self.lexer.eat(",") {
                break;
            }
        }
        self.expect("}")?;
        Ok(())
    }

    /// `callable` or a name resolving to `\Closure`, optionally with a signature
    /// `(T1, T2 &$b, T3 ...$c, T4 =): R`.
    fn parse_callable(&mut self, lower: &str) -> Result<String, ParseError> {
        if lower == "callable" {
            self.lexer.correct(lower);
        }
        let callable_type = self.lexer.consume(None)?;
        if self.lexer.next(0) == Some("(") {
            self.expect("(")?;
            while self.lexer.next(0) != Some(")") {
                self.parse_any_type(false)?;
                self.lexer.eat("&");
                self.lexer.eat("...");
                self.lexer.eat("=");
                if self.lexer.next(0).is_some_and(|t| t.starts_with('$')) {
                    self.lexer.consume(None)?;
                }
                if self.lexer.next(0) != Some(")") {
                    self.expect(",")?;
                }
            }
            self.expect(")")?;
            self.expect(":")?;
            if self.lexer.next(0) == Some("?") {
                self.parse_any_type(false)?;
            } else {
                self.parse_single_type()?;
            }
        }
        Ok(if callable_type.eq_ignore_ascii_case("callable") {
            "callable".to_string()
        } else {
            "\\Closure".to_string()
        })
    }
}
