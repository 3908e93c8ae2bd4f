//! Check results and their rendering.
//!
//! Every verdict of the declaration pass becomes a [`Diagnostic`] with a
//! stable [`DiagnosticCode`].  Style warnings carry the text edits that
//! rewrite the offending tag in canonical spelling; [`apply_fixes`]
//! writes them back into the source.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::error::CheckError;
use crate::types::TextEdit;
use crate::util::offset_to_position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

/// Stable identifier of a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCode {
    PhpdocTypeParse,
    PhpdocClassPropType,
    PhpdocClassPropName,
    PhpdocClassPropTypeStyle,
    PhpdocTemplateName,
    PhpdocTemplateType,
    PhpdocTemplateTypeStyle,
    PhpdocFunParamCount,
    PhpdocFunParamType,
    PhpdocFunParamName,
    PhpdocFunParamNameMismatch,
    PhpdocFunParamTypeMismatch,
    PhpdocFunParamTypeStyle,
    PhpdocFunParamPassSplatMismatch,
    PhpdocFunRetMultiple,
    PhpdocFunRetType,
    PhpdocFunRetTypeMismatch,
    PhpdocFunRetTypeStyle,
    PhpdocVarType,
    PhpdocVarTypeMismatch,
    PhpdocVarTypeStyle,
}

impl DiagnosticCode {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticCode::PhpdocTypeParse => "phpdoc_type_parse",
            DiagnosticCode::PhpdocClassPropType => "phpdoc_class_prop_type",
            DiagnosticCode::PhpdocClassPropName => "phpdoc_class_prop_name",
            DiagnosticCode::PhpdocClassPropTypeStyle => "phpdoc_class_prop_type_style",
            DiagnosticCode::PhpdocTemplateName => "phpdoc_template_name",
            DiagnosticCode::PhpdocTemplateType => "phpdoc_template_type",
            DiagnosticCode::PhpdocTemplateTypeStyle => "phpdoc_template_type_style",
            DiagnosticCode::PhpdocFunParamCount => "phpdoc_fun_param_count",
            DiagnosticCode::PhpdocFunParamType => "phpdoc_fun_param_type",
            DiagnosticCode::PhpdocFunParamName => "phpdoc_fun_param_name",
            DiagnosticCode::PhpdocFunParamNameMismatch => "phpdoc_fun_param_name_mismatch",
            DiagnosticCode::PhpdocFunParamTypeMismatch => "phpdoc_fun_param_type_mismatch",
            DiagnosticCode::PhpdocFunParamTypeStyle => "phpdoc_fun_param_type_style",
            DiagnosticCode::PhpdocFunParamPassSplatMismatch => {
                "phpdoc_fun_param_pass_splat_mismatch"
            }
            DiagnosticCode::PhpdocFunRetMultiple => "phpdoc_fun_ret_multiple",
            DiagnosticCode::PhpdocFunRetType => "phpdoc_fun_ret_type",
            DiagnosticCode::PhpdocFunRetTypeMismatch => "phpdoc_fun_ret_type_mismatch",
            DiagnosticCode::PhpdocFunRetTypeStyle => "phpdoc_fun_ret_type_style",
            DiagnosticCode::PhpdocVarType => "phpdoc_var_type",
            DiagnosticCode::PhpdocVarTypeMismatch => "phpdoc_var_type_mismatch",
            DiagnosticCode::PhpdocVarTypeStyle => "phpdoc_var_type_style",
        }
    }

    /// Look a code up by its snake_case name.
    pub fn from_name(name: &str) -> Option<Self> {
        ALL_CODES.iter().copied().find(|code| code.as_str() == name)
    }

    pub fn severity(self) -> Severity {
        match self {
            DiagnosticCode::PhpdocClassPropTypeStyle
            | DiagnosticCode::PhpdocTemplateTypeStyle
            | DiagnosticCode::PhpdocFunParamTypeStyle
            | DiagnosticCode::PhpdocFunParamPassSplatMismatch
            | DiagnosticCode::PhpdocFunRetTypeStyle
            | DiagnosticCode::PhpdocVarTypeStyle => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

const ALL_CODES: &[DiagnosticCode] = &[
    DiagnosticCode::PhpdocTypeParse,
    DiagnosticCode::PhpdocClassPropType,
    DiagnosticCode::PhpdocClassPropName,
    DiagnosticCode::PhpdocClassPropTypeStyle,
    DiagnosticCode::PhpdocTemplateName,
    DiagnosticCode::PhpdocTemplateType,
    DiagnosticCode::PhpdocTemplateTypeStyle,
    DiagnosticCode::PhpdocFunParamCount,
    DiagnosticCode::PhpdocFunParamType,
    DiagnosticCode::PhpdocFunParamName,
    DiagnosticCode::PhpdocFunParamNameMismatch,
    DiagnosticCode::PhpdocFunParamTypeMismatch,
    DiagnosticCode::PhpdocFunParamTypeStyle,
    DiagnosticCode::PhpdocFunParamPassSplatMismatch,
    DiagnosticCode::PhpdocFunRetMultiple,
    DiagnosticCode::PhpdocFunRetType,
    DiagnosticCode::PhpdocFunRetTypeMismatch,
    DiagnosticCode::PhpdocFunRetTypeStyle,
    DiagnosticCode::PhpdocVarType,
    DiagnosticCode::PhpdocVarTypeMismatch,
    DiagnosticCode::PhpdocVarTypeStyle,
];

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message of the file-level diagnostic emitted when checking aborts.
pub const FILE_LEVEL_MESSAGE: &str =
    "The PHPDoc type checker failed to parse the file.  PHPDoc type checks were not performed.";

/// One check verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub severity: Severity,
    pub message: String,
    /// Byte offset into the source.
    pub offset: usize,
    /// 1-based line.
    pub line: usize,
    /// 1-based column, in characters.
    pub column: usize,
    /// Edits that resolve a style warning.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<Vec<TextEdit>>,
}

impl Diagnostic {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Collects diagnostics for one source text, filling in positions.
pub struct Reporter<'s> {
    source: &'s str,
    diagnostics: Vec<Diagnostic>,
}

impl<'s> Reporter<'s> {
    pub fn new(source: &'s str) -> Self {
        Self {
            source,
            diagnostics: Vec::new(),
        }
    }

    /// Record a diagnostic with the code's default severity.
    pub fn report(&mut self, code: DiagnosticCode, offset: usize, message: impl Into<String>) {
        self.push(code, offset, message.into(), None);
    }

    /// Record a style warning with its fix.
    pub fn report_fixable(
        &mut self,
        code: DiagnosticCode,
        offset: usize,
        message: impl Into<String>,
        fix: Vec<TextEdit>,
    ) {
        self.push(code, offset, message.into(), Some(fix));
    }

    fn push(
        &mut self,
        code: DiagnosticCode,
        offset: usize,
        message: String,
        fix: Option<Vec<TextEdit>>,
    ) {
        let (line, column) = offset_to_position(self.source, offset);
        self.diagnostics.push(Diagnostic {
            code,
            severity: code.severity(),
            message,
            offset,
            line,
            column,
            fix,
        });
    }

    /// The collected diagnostics in source order.
    pub fn finish(mut self) -> Vec<Diagnostic> {
        self.diagnostics.sort_by_key(|d| d.offset);
        self.diagnostics
    }
}

/// The single diagnostic standing in for a file whose checks aborted.
pub fn file_level_diagnostic() -> Diagnostic {
    Diagnostic {
        code: DiagnosticCode::PhpdocTypeParse,
        severity: Severity::Error,
        message: FILE_LEVEL_MESSAGE.to_string(),
        offset: 0,
        line: 1,
        column: 1,
        fix: None,
    }
}

// ─── Fix application ────────────────────────────────────────────────────────

/// Apply every fix carried by `diagnostics` to `source`.
///
/// Edits are applied back to front so earlier offsets stay valid.  An
/// edit overlapping one already applied is dropped.
pub fn apply_fixes(source: &str, diagnostics: &[Diagnostic]) -> String {
    let mut edits: Vec<&TextEdit> = diagnostics
        .iter()
        .filter_map(|d| d.fix.as_ref())
        .flatten()
        .collect();
    edits.sort_by(|a, b| b.offset.cmp(&a.offset).then(b.len.cmp(&a.len)));

    let mut fixed = source.to_string();
    let mut applied_from = usize::MAX;
    for edit in edits {
        let end = edit.offset + edit.len;
        if end > applied_from || end > fixed.len() {
            continue;
        }
        if !fixed.is_char_boundary(edit.offset) || !fixed.is_char_boundary(end) {
            continue;
        }
        fixed.replace_range(edit.offset..end, &edit.replacement);
        applied_from = edit.offset;
    }
    fixed
}

// ─── Rendering ──────────────────────────────────────────────────────────────

/// Diagnostics of one checked file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub diagnostics: Vec<Diagnostic>,
}

impl FileReport {
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    /// One `path:line:col: severity[code]: message` line per diagnostic.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for d in &self.diagnostics {
            out.push_str(&format!(
                "{}:{}:{}: {}[{}]: {}\n",
                self.path.display(),
                d.line,
                d.column,
                d.severity,
                d.code,
                d.message
            ));
        }
        out
    }
}

/// Render all reports as a JSON array.
///
/// Fails when a path isn't valid UTF-8.
pub fn render_json(reports: &[FileReport]) -> Result<String, CheckError> {
    Ok(serde_json::to_string_pretty(reports)?)
}
