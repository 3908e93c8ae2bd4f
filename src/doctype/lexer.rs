//! Tokenizer for doc type text.
//!
//! Tokens are scanned lazily and memoized, so looking ahead any number of
//! tokens and rewinding to a checkpoint never rescans the text.  Token
//! classes, tried in order:
//!
//! 1. identifier / keyword: starts with a letter, `_`, `$` or `\`, then
//!    letters, digits and `_` (plus `-` and `\` unless it is a `$`
//!    variable);
//! 2. number: a digit, or `-` followed by a digit, then digits, `_` and at
//!    most one `.`;
//! 3. quoted string: `'…'` or `"…"`, backslash escapes the next byte; an
//!    unterminated string reads as end of input;
//! 4. `...` and `::`;
//! 5. any other single character.

use crate::error::ParseError;
use crate::types::Replacement;

/// One scanned token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    /// Byte offset where the token starts (after skipped whitespace).
    pub start: usize,
    /// Byte offset just past the token.
    pub end: usize,
    /// The token text; `None` at end of input.
    pub text: Option<&'a str>,
}

/// Saved tokenizer position, see [`Tokenizer::checkpoint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    cursor: usize,
    replacements: usize,
}

/// Lazy, rewindable token stream over one doc type text.
#[derive(Debug)]
pub struct Tokenizer<'a> {
    text: &'a str,
    tokens: Vec<Token<'a>>,
    cursor: usize,
    replacements: Vec<Replacement>,
}

/// `ctype_space` semantics: includes vertical tab and form feed.
fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

/// True for an integer literal token (`12`, `-3`, `1_000`).
pub fn is_int_literal(token: &str) -> bool {
    let digits = token.strip_prefix('-').unwrap_or(token);
    digits.as_bytes().first().is_some_and(u8::is_ascii_digit) && !token.contains('.')
}

/// True for a decimal literal token (`1.5`, `-0.25`).
pub fn is_float_literal(token: &str) -> bool {
    let digits = token.strip_prefix('-').unwrap_or(token);
    digits.as_bytes().first().is_some_and(u8::is_ascii_digit) && token.contains('.')
}

/// True for a quoted string token.
pub fn is_string_literal(token: &str) -> bool {
    token.starts_with('\'') || token.starts_with('"')
}

impl<'a> Tokenizer<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            tokens: Vec::new(),
            cursor: 0,
            replacements: Vec::new(),
        }
    }

    /// The text being tokenized.
    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Text of the token `lookahead` positions past the current one.
    pub fn next(&mut self, lookahead: usize) -> Option<&'a str> {
        self.token(lookahead).text
    }

    /// The token `lookahead` positions past the current one.
    pub fn token(&mut self, lookahead: usize) -> Token<'a> {
        let index = self.cursor + lookahead;
        while self.tokens.len() <= index {
            let start = self.tokens.last().map_or(0, |t| t.end);
            let token = self.scan(start);
            self.tokens.push(token);
        }
        self.tokens[index]
    }

    /// Consume the current token, checking it against `expected`
    /// (ASCII case-insensitively) when given.
    pub fn consume(&mut self, expected: Option<&str>) -> Result<&'a str, ParseError> {
        let Some(current) = self.next(0) else {
            return Err(ParseError::UnexpectedEnd);
        };
        if let Some(expected) = expected
            && !current.eq_ignore_ascii_case(expected)
        {
            return Err(ParseError::Expected {
                expected: expected.to_string(),
                found: current.to_string(),
            });
        }
        self.cursor += 1;
        Ok(current)
    }

    /// Consume the current token if it is exactly `text`.
    pub fn eat(&mut self, text: &str) -> bool {
        if self.next(0) == Some(text) {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    /// Step past the current token, if any.
    pub fn skip(&mut self) {
        if self.next(0).is_some() {
            self.cursor += 1;
        }
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            cursor: self.cursor,
            replacements: self.replacements.len(),
        }
    }

    /// Return to a checkpoint, dropping corrections recorded since.
    pub fn rewind(&mut self, checkpoint: Checkpoint) {
        self.cursor = checkpoint.cursor;
        self.replacements.truncate(checkpoint.replacements);
    }

    /// Record that the current token should be spelled `canonical`.
    pub fn correct(&mut self, canonical: &str) {
        let token = self.token(0);
        if let Some(text) = token.text
            && text != canonical
        {
            self.replacements.push(Replacement {
                pos: token.start,
                len: text.len(),
                replacement: canonical.to_string(),
            });
        }
    }

    pub fn replacements(&self) -> &[Replacement] {
        &self.replacements
    }

    /// The whole text with all corrections applied, or `None` if there
    /// were none.
    pub fn fixed(&self) -> Option<String> {
        if self.replacements.is_empty() {
            return None;
        }
        let mut fixed = self.text.to_string();
        for fix in self.replacements.iter().rev() {
            fixed.replace_range(fix.pos..fix.pos + fix.len, &fix.replacement);
        }
        Some(fixed)
    }

    /// Whether the current token is preceded by whitespace.
    pub fn preceded_by_space(&mut self) -> bool {
        let start = self.token(0).start;
        start > 0 && is_space(self.text.as_bytes()[start - 1])
    }

    /// The delimiter check after a type or name: end of input, a
    /// whitespace gap, or one of `, ; : .`.
    pub fn at_field_end(&mut self) -> bool {
        match self.next(0) {
            None => true,
            Some(",") | Some(";") | Some(":") | Some(".") => true,
            Some(_) => self.preceded_by_space(),
        }
    }

    /// Source text from the start of the token `lookahead` positions ahead.
    pub fn rest_from(&mut self, lookahead: usize) -> &'a str {
        let start = self.token(lookahead).start;
        &self.text[start..]
    }

    fn scan(&self, from: usize) -> Token<'a> {
        let bytes = self.text.as_bytes();
        let len = bytes.len();
        let mut start = from;
        while start < len && is_space(bytes[start]) {
            start += 1;
        }
        if start >= len {
            return Token {
                start,
                end: start,
                text: None,
            };
        }

        let first = bytes[start];
        let at = |i: usize| bytes.get(i).copied();
        let mut unterminated = false;

        let end = if first.is_ascii_alphabetic() || matches!(first, b'_' | b'$' | b'\\') {
            let mut end = start + 1;
            while let Some(c) = at(end) {
                let continues = c.is_ascii_alphanumeric()
                    || c == b'_'
                    || (first != b'$' && (c == b'-' || c == b'\\'));
                if !continues {
                    break;
                }
                end += 1;
            }
            end
        } else if first.is_ascii_digit()
            || (first == b'-' && at(start + 1).is_some_and(|c| c.is_ascii_digit()))
        {
            let mut have_point = false;
            let mut end = start + 1;
            while let Some(c) = at(end) {
                if c.is_ascii_digit() || c == b'_' {
                    end += 1;
                } else if c == b'.' && !have_point {
                    have_point = true;
                    end += 1;
                } else {
                    break;
                }
            }
            end
        } else if first == b'"' || first == b'\'' {
            let mut end = start + 1;
            loop {
                match at(end) {
                    None => {
                        unterminated = true;
                        end = len;
                        break;
                    }
                    Some(c) if c == first => {
                        end += 1;
                        break;
                    }
                    Some(b'\\') if end + 1 < len => end += 2,
                    Some(_) => end += 1,
                }
            }
            end
        } else if self.text[start..].starts_with("...") {
            start + 3
        } else if self.text[start..].starts_with("::") {
            start + 2
        } else {
            // Whole character, so multi-byte input slices cleanly.
            start + self.text[start..].chars().next().map_or(1, char::len_utf8)
        };

        let end = end.min(len);
        let text = if unterminated {
            None
        } else {
            self.text.get(start..end)
        };
        Token { start, end, text }
    }
}
