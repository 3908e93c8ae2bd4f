use std::collections::HashMap;

/// Inheritance edges of a class-like declaration discovered in pass 1.
///
/// All names are fully qualified (leading `\`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Artifact {
    /// The parent class, if any.
    pub extends: Option<String>,
    /// Implemented interfaces (or, for an interface, the interfaces it
    /// extends).  Order is irrelevant.
    pub implements: Vec<String>,
}

impl Artifact {
    pub fn new(extends: Option<&str>, implements: &[&str]) -> Self {
        Self {
            extends: extends.map(str::to_string),
            implements: implements.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Immediate supertypes in discovery order.
    pub fn supers(&self) -> impl Iterator<Item = &str> {
        self.extends
            .as_deref()
            .into_iter()
            .chain(self.implements.iter().map(String::as_str))
    }
}

/// Fully-qualified class-like name → its inheritance edges.
///
/// Built once per file by the artifact pass and read-only afterwards.
pub type ArtifactRegistry = HashMap<String, Artifact>;

/// How much of a tag or signature text to parse beyond the bare type.
///
/// The variants are ordered: each level includes everything the
/// previous one extracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FieldsToExtract {
    /// `@return`, `@var`, native return and property types.
    TypeOnly,
    /// `@property` tags.
    TypeAndName,
    /// `@param` tags (`&` and `...` before the name).
    WithPassMode,
    /// Native parameters, where `= null` widens the type.
    WithDefault,
}

/// Reference / variadic markers in front of a parameter name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PassMode {
    #[default]
    None,
    ByReference,
    Splat,
    ByReferenceAndSplat,
}

impl PassMode {
    pub fn from_markers(by_reference: bool, splat: bool) -> Self {
        match (by_reference, splat) {
            (false, false) => PassMode::None,
            (true, false) => PassMode::ByReference,
            (false, true) => PassMode::Splat,
            (true, true) => PassMode::ByReferenceAndSplat,
        }
    }

    pub fn is_splat(self) -> bool {
        matches!(self, PassMode::Splat | PassMode::ByReferenceAndSplat)
    }

    pub fn is_by_reference(self) -> bool {
        matches!(self, PassMode::ByReference | PassMode::ByReferenceAndSplat)
    }
}

/// Result of [`PhpDocTypeParser::parse_type_and_name`](crate::doctype::PhpDocTypeParser::parse_type_and_name).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeAndName {
    /// The normalized type, or `None` when it was missing or malformed.
    pub ty: Option<String>,
    pub pass_mode: PassMode,
    /// The variable name including `$`, when requested and well formed.
    pub name: Option<String>,
    /// Trimmed text following the last field that was consumed.
    pub remainder: String,
    /// The whole input with canonical spellings applied, when any
    /// differed.  Only produced when a type was parsed.
    pub fixed: Option<String>,
}

/// Result of [`PhpDocTypeParser::parse_template`](crate::doctype::PhpDocTypeParser::parse_template).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateData {
    /// The bound, `mixed` when none was given.
    pub ty: Option<String>,
    pub name: Option<String>,
    pub remainder: String,
    pub fixed: Option<String>,
}

/// A spelling correction recorded while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    /// Byte offset into the parsed text.
    pub pos: usize,
    /// Byte length of the original token.
    pub len: usize,
    pub replacement: String,
}

/// A single edit to the source file.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TextEdit {
    /// Byte offset of the replaced span.
    pub offset: usize,
    /// Byte length of the replaced span.
    pub len: usize,
    pub replacement: String,
}
