//! Lexical resolution context.
//!
//! A [`Scope`] is a plain value.  Entering a namespace block, class body,
//! function or parameter list derives a child by cloning and overriding
//! only what changes, so `use` imports and `@template` bindings added in
//! a child never leak back to the parent.

use std::collections::HashMap;

/// Names visible at a point in the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    /// Empty for the global namespace, otherwise `\`-prefixed without a
    /// trailing backslash (e.g. `\App\Models`).
    pub namespace: String,
    /// Class import alias → fully-qualified name.
    pub uses: HashMap<String, String>,
    /// Template name → bound type, innermost binding wins.
    pub templates: HashMap<String, String>,
    /// Fully-qualified name of the enclosing class-like, for `self`.
    pub classname: Option<String>,
    /// Fully-qualified name of its parent, for `parent`.
    pub parentname: Option<String>,
}

impl Scope {
    /// The scope at the top of a file.
    pub fn root() -> Self {
        Self::default()
    }

    /// Child scope inside `namespace <name>`.
    pub fn in_namespace(&self, name: &str) -> Self {
        Self {
            namespace: normalize_namespace(name),
            ..self.clone()
        }
    }

    /// Child scope for a class-like body.
    pub fn in_class(&self, classname: Option<String>, parentname: Option<String>) -> Self {
        Self {
            classname,
            parentname,
            ..self.clone()
        }
    }

    /// Child scope for a function, method, closure or parameter list.
    pub fn child(&self) -> Self {
        self.clone()
    }

    pub fn add_use(&mut self, alias: impl Into<String>, fqn: impl Into<String>) {
        self.uses.insert(alias.into(), fqn.into());
    }

    pub fn bind_template(&mut self, name: impl Into<String>, bound: impl Into<String>) {
        self.templates.insert(name.into(), bound.into());
    }

    /// Qualify a name being *declared* in this scope (class, interface…).
    pub fn qualify(&self, short_name: &str) -> String {
        format!("{}\\{}", self.namespace, short_name)
    }

    /// Resolve a class name as written in a doc type.
    ///
    /// A leading `\` means the name is already fully qualified.  Otherwise
    /// an exact `use` alias wins, then an active template, then the name is
    /// prefixed with the current namespace.
    pub fn resolve_doc_name(&self, name: &str) -> String {
        if name.starts_with('\\') {
            return name.to_string();
        }
        if let Some(fqn) = self.uses.get(name) {
            return fqn.clone();
        }
        if let Some(bound) = self.templates.get(name) {
            return bound.clone();
        }
        self.qualify(name)
    }

    /// Resolve a class reference in code (`extends`, `implements`).
    ///
    /// Like [`resolve_doc_name`](Self::resolve_doc_name) but without
    /// templates, and a qualified name whose first segment is an imported
    /// alias is expanded through that import.
    pub fn resolve_code_name(&self, name: &str) -> String {
        if name.starts_with('\\') {
            return name.to_string();
        }
        if let Some(fqn) = self.uses.get(name) {
            return fqn.clone();
        }
        if let Some((first, rest)) = name.split_once('\\')
            && let Some(fqn) = self.uses.get(first)
        {
            return format!("{}\\{}", fqn, rest);
        }
        self.qualify(name)
    }

    /// `self` in a doc type.
    pub fn resolve_self(&self) -> String {
        self.classname.clone().unwrap_or_else(|| "self".to_string())
    }

    /// `parent` in a doc type.
    pub fn resolve_parent(&self) -> String {
        self.parentname.clone().unwrap_or_else(|| "parent".to_string())
    }

    /// `static` / `$this` in a doc type: `static(\Class)` when bound.
    pub fn resolve_static(&self) -> String {
        match &self.classname {
            Some(class) => format!("static({})", class),
            None => "static".to_string(),
        }
    }
}

/// Normalize a namespace name to `\A\B` form (or empty).
pub fn normalize_namespace(name: &str) -> String {
    let trimmed = name.trim().trim_end_matches('\\');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('\\') {
        trimmed.to_string()
    } else {
        format!("\\{}", trimmed)
    }
}
