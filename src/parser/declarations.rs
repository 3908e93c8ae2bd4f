/// Pass 2: doc comment checks.
///
/// Walks the AST carrying a [`Scope`], attaches each doc comment to the
/// declaration that directly follows it, and compares the documented
/// types with the native ones.  Every verdict goes to a [`Reporter`].
///
/// A doc comment is consumed by at most one declaration.  Comments left
/// over after the walk (inline `/** @var Foo $x */` annotations, or
/// comments in front of something that isn't a declaration) are checked
/// for `@var` tags only, in the innermost scope that encloses them.
use std::collections::HashSet;

use mago_span::HasSpan;
use mago_syntax::ast::*;
use tracing::{debug, trace};

use crate::diagnostics::{Diagnostic, DiagnosticCode, Reporter};
use crate::docblock::{DocComment, DocTag, fix_comment_tag};
use crate::doctype::PhpDocTypeParser;
use crate::error::CheckError;
use crate::scope::Scope;
use crate::types::FieldsToExtract;

use super::use_statements::register_use_items;
use super::{CommentIndex, hint_text, native_parameter_text};

const PROPERTY_TAGS: &[&str] = &["@property", "@property-read", "@property-write"];

/// Source range whose lone doc comments resolve names in `scope`.
struct Region {
    start: usize,
    end: usize,
    scope: Scope,
}

/// Body of a function-like declaration.
enum Body<'b> {
    None,
    Statements(&'b [Statement<'b>]),
    Expression(&'b Expression<'b>),
}

pub(crate) struct DeclarationWalker<'c, 'a> {
    comments: &'c CommentIndex<'a>,
    parser: &'c PhpDocTypeParser,
    reporter: Reporter<'a>,
    /// Start offsets of doc comments already attached to a declaration.
    consumed: HashSet<usize>,
    regions: Vec<Region>,
}

impl<'c, 'a> DeclarationWalker<'c, 'a> {
    pub fn new(comments: &'c CommentIndex<'a>, parser: &'c PhpDocTypeParser) -> Self {
        Self {
            comments,
            parser,
            reporter: Reporter::new(comments.content),
            consumed: HashSet::new(),
            regions: Vec::new(),
        }
    }

    /// Walk the whole program and return the diagnostics in source order.
    pub fn run<'b>(
        mut self,
        statements: impl Iterator<Item = &'b Statement<'b>>,
    ) -> Result<Vec<Diagnostic>, CheckError> {
        let mut scope = Scope::root();
        self.walk_statements(statements, &mut scope)?;
        self.regions.push(Region {
            start: 0,
            end: usize::MAX,
            scope,
        });
        self.check_lone_comments()?;
        debug!(consumed = self.consumed.len(), "declaration pass done");
        Ok(self.reporter.finish())
    }

    // ─── Doc comment attachment ─────────────────────────────────────────────

    /// The unconsumed doc comment attached to `node`, marking it consumed.
    fn take_docblock(&mut self, node: &impl HasSpan) -> Option<DocComment> {
        let trivia = self.comments.attached_to(node)?;
        let offset = trivia.span.start.offset as usize;
        if !self.consumed.insert(offset) {
            return None;
        }
        Some(self.comments.parse_comment(trivia))
    }

    fn push_region(&mut self, node: &impl HasSpan, scope: Scope) {
        let span = node.span();
        self.regions.push(Region {
            start: span.start.offset as usize,
            end: span.end.offset as usize,
            scope,
        });
    }

    /// The innermost recorded scope enclosing `offset`.
    fn scope_at(&self, offset: usize) -> Scope {
        self.regions
            .iter()
            .filter(|r| r.start <= offset && offset < r.end)
            .min_by_key(|r| r.end - r.start)
            .map(|r| r.scope.clone())
            .unwrap_or_default()
    }

    fn check_lone_comments(&mut self) -> Result<(), CheckError> {
        let lone: Vec<DocComment> = self
            .comments
            .doc_comments()
            .filter(|t| !self.consumed.contains(&(t.span.start.offset as usize)))
            .map(|t| self.comments.parse_comment(t))
            .filter(|doc| doc.has_tag("@var"))
            .collect();
        for doc in lone {
            let scope = self.scope_at(doc.offset);
            self.check_vars(&doc, None, &scope)?;
        }
        Ok(())
    }

    // ─── Statements ─────────────────────────────────────────────────────────

    fn walk_statements<'b>(
        &mut self,
        statements: impl Iterator<Item = &'b Statement<'b>>,
        scope: &mut Scope,
    ) -> Result<(), CheckError> {
        for statement in statements {
            self.walk_statement(statement, scope)?;
        }
        Ok(())
    }

    fn walk_statement<'b>(
        &mut self,
        statement: &'b Statement<'b>,
        scope: &mut Scope,
    ) -> Result<(), CheckError> {
        match statement {
            Statement::Namespace(namespace) => {
                let name = namespace.name.as_ref().map_or("", |ident| ident.value());
                let mut inner = Scope::root().in_namespace(name);
                self.walk_statements(namespace.statements().iter(), &mut inner)?;
                self.push_region(namespace, inner);
            }
            Statement::Use(use_stmt) => register_use_items(&use_stmt.items, scope),
            Statement::Class(class) => {
                let parent = class
                    .extends
                    .as_ref()
                    .and_then(|ext| ext.types.first())
                    .map(|ident| scope.resolve_code_name(ident.value()));
                self.walk_class_like(
                    class,
                    Some(class.name.value),
                    parent,
                    class.members.iter(),
                    scope,
                )?;
            }
            Statement::Interface(iface) => {
                self.walk_class_like(
                    iface,
                    Some(iface.name.value),
                    None,
                    iface.members.iter(),
                    scope,
                )?;
            }
            Statement::Trait(trait_def) => {
                self.walk_class_like(
                    trait_def,
                    Some(trait_def.name.value),
                    None,
                    trait_def.members.iter(),
                    scope,
                )?;
            }
            Statement::Enum(enum_def) => {
                self.walk_class_like(
                    enum_def,
                    Some(enum_def.name.value),
                    None,
                    enum_def.members.iter(),
                    scope,
                )?;
            }
            Statement::Function(func) => {
                self.walk_function_like(
                    func,
                    &func.parameter_list,
                    func.return_type_hint.as_ref().map(|rth| &rth.hint),
                    Body::Statements(func.body.statements.as_slice()),
                    scope,
                )?;
            }
            // Control-flow headers and bodies, expression statements.
            _ => self.walk_children(Node::Statement(statement), scope)?,
        }
        Ok(())
    }

    // ─── Class-likes ────────────────────────────────────────────────────────

    /// Walk a class-like body.  Anonymous classes have no `name`, so
    /// `self` stays unresolved inside them.
    fn walk_class_like<'b>(
        &mut self,
        node: &impl HasSpan,
        name: Option<&str>,
        parent: Option<String>,
        members: impl Iterator<Item = &'b ClassLikeMember<'b>>,
        scope: &Scope,
    ) -> Result<(), CheckError> {
        let mut class_scope = scope.in_class(name.map(|name| scope.qualify(name)), parent);

        if let Some(doc) = self.take_docblock(node) {
            self.check_templates(&doc, &mut class_scope)?;
            self.check_properties(&doc, &class_scope)?;
        }

        for member in members {
            self.walk_member(member, &class_scope)?;
        }

        self.push_region(node, class_scope);
        Ok(())
    }

    fn walk_member<'b>(
        &mut self,
        member: &'b ClassLikeMember<'b>,
        scope: &Scope,
    ) -> Result<(), CheckError> {
        match member {
            ClassLikeMember::Method(method) => {
                let body = match &method.body {
                    MethodBody::Concrete(block) => Body::Statements(block.statements.as_slice()),
                    MethodBody::Abstract(_) => Body::None,
                };
                self.walk_function_like(
                    method,
                    &method.parameter_list,
                    method.return_type_hint.as_ref().map(|rth| &rth.hint),
                    body,
                    scope,
                )?;
            }
            ClassLikeMember::Property(property) => {
                if let Some(doc) = self.take_docblock(member) {
                    let native = property.hint().map(hint_text);
                    self.check_vars(&doc, native.as_deref(), scope)?;
                }
                self.walk_children(Node::ClassLikeMember(member), scope)?;
            }
            ClassLikeMember::Constant(_) => {
                if let Some(doc) = self.take_docblock(member) {
                    self.check_vars(&doc, None, scope)?;
                }
                self.walk_children(Node::ClassLikeMember(member), scope)?;
            }
            ClassLikeMember::EnumCase(_) | ClassLikeMember::TraitUse(_) => {
                self.walk_children(Node::ClassLikeMember(member), scope)?;
            }
        }
        Ok(())
    }

    // ─── Function-likes ─────────────────────────────────────────────────────

    fn walk_function_like<'b>(
        &mut self,
        node: &impl HasSpan,
        parameters: &'b FunctionLikeParameterList<'b>,
        return_hint: Option<&'b Hint<'b>>,
        body: Body<'b>,
        scope: &Scope,
    ) -> Result<(), CheckError> {
        let mut fn_scope = scope.child();

        if let Some(doc) = self.take_docblock(node) {
            self.check_templates(&doc, &mut fn_scope)?;
            self.check_params(&doc, parameters, &fn_scope)?;
            self.check_return(&doc, return_hint, &fn_scope)?;
        }

        for param in parameters.parameters.iter() {
            if param.is_promoted_property()
                && let Some(doc) = self.take_docblock(param)
            {
                let native = param.hint.as_ref().map(hint_text);
                self.check_vars(&doc, native.as_deref(), &fn_scope)?;
            }
            // Defaults may hold closures.
            if let Some(default) = &param.default_value {
                self.walk_expression(&default.value, &fn_scope)?;
            }
        }

        match body {
            Body::Statements(statements) => {
                let mut body_scope = fn_scope.child();
                self.walk_statements(statements.iter(), &mut body_scope)?;
            }
            Body::Expression(expression) => self.walk_expression(expression, &fn_scope)?,
            Body::None => {}
        }

        self.push_region(node, fn_scope);
        Ok(())
    }

    // ─── Expressions ────────────────────────────────────────────────────────

    fn walk_expression<'b>(
        &mut self,
        expr: &'b Expression<'b>,
        scope: &Scope,
    ) -> Result<(), CheckError> {
        self.walk_node(Node::Expression(expr), scope)
    }

    /// Find the function-likes and anonymous classes below `node`.
    ///
    /// Anything else is only descended into, so a closure is found
    /// wherever it sits: call targets and arguments, `if` / `foreach`
    /// headers, `yield`, `match` arms, attribute arguments.
    fn walk_node<'b>(&mut self, node: Node<'b, 'b>, scope: &Scope) -> Result<(), CheckError> {
        match node {
            Node::Closure(closure) => self.walk_function_like(
                closure,
                &closure.parameter_list,
                closure.return_type_hint.as_ref().map(|rth| &rth.hint),
                Body::Statements(closure.body.statements.as_slice()),
                scope,
            ),
            Node::ArrowFunction(arrow) => self.walk_function_like(
                arrow,
                &arrow.parameter_list,
                arrow.return_type_hint.as_ref().map(|rth| &rth.hint),
                Body::Expression(arrow.expression),
                scope,
            ),
            Node::AnonymousClass(class) => {
                // Constructor arguments are evaluated outside the class.
                if let Some(arguments) = &class.argument_list {
                    self.walk_node(Node::ArgumentList(arguments), scope)?;
                }
                let parent = class
                    .extends
                    .as_ref()
                    .and_then(|ext| ext.types.first())
                    .map(|ident| scope.resolve_code_name(ident.value()));
                self.walk_class_like(class, None, parent, class.members.iter(), scope)
            }
            Node::Statement(statement) => self.walk_statement(statement, &mut scope.clone()),
            _ => self.walk_children(node, scope),
        }
    }

    fn walk_children<'b>(&mut self, node: Node<'b, 'b>, scope: &Scope) -> Result<(), CheckError> {
        for child in node.children() {
            self.walk_node(child, scope)?;
        }
        Ok(())
    }

    // ─── Tag checks ─────────────────────────────────────────────────────────

    /// Bind `@template` tags into `scope`, reporting malformed ones.
    ///
    /// A template whose bound can't be parsed is bound to `never`, so
    /// nothing documented with it compares as compatible.
    fn check_templates(&mut self, doc: &DocComment, scope: &mut Scope) -> Result<(), CheckError> {
        for tag in doc.tags("@template") {
            let data = self.parser.parse_template(Some(&*scope), &tag.content);
            let Some(name) = data.name else {
                self.reporter.report(
                    DiagnosticCode::PhpdocTemplateName,
                    tag.offset,
                    "PHPDoc template name missing or malformed",
                );
                continue;
            };
            match data.ty {
                None => {
                    self.reporter.report(
                        DiagnosticCode::PhpdocTemplateType,
                        tag.offset,
                        "PHPDoc template type missing or malformed",
                    );
                    scope.bind_template(name, "never");
                }
                Some(ty) => {
                    trace!(template = %name, bound = %ty, "template bound");
                    scope.bind_template(name, ty);
                    if let Some(fixed) = data.fixed {
                        self.report_style(
                            DiagnosticCode::PhpdocTemplateTypeStyle,
                            tag,
                            "PHPDoc template type doesn't conform to recommended style",
                            &fixed,
                        )?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Check `@property`, `@property-read` and `@property-write` tags.
    fn check_properties(&mut self, doc: &DocComment, scope: &Scope) -> Result<(), CheckError> {
        for tag_name in PROPERTY_TAGS {
            for tag in doc.tags(tag_name) {
                let data = self.parser.parse_type_and_name(
                    Some(scope),
                    &tag.content,
                    FieldsToExtract::TypeAndName,
                    false,
                );
                if data.ty.is_none() {
                    self.reporter.report(
                        DiagnosticCode::PhpdocClassPropType,
                        tag.offset,
                        "PHPDoc class property type missing or malformed",
                    );
                } else if data.name.is_none() {
                    self.reporter.report(
                        DiagnosticCode::PhpdocClassPropName,
                        tag.offset,
                        "PHPDoc class property name missing or malformed",
                    );
                } else if let Some(fixed) = data.fixed {
                    self.report_style(
                        DiagnosticCode::PhpdocClassPropTypeStyle,
                        tag,
                        "PHPDoc class property type doesn't conform to recommended style",
                        &fixed,
                    )?;
                }
            }
        }
        Ok(())
    }

    /// Check `@param` tags against the native parameter list.
    ///
    /// Tags are matched to parameters by position.  A name mismatch stops
    /// the comparison for that tag, since the tags may just be out of
    /// order.  Tags past the last native parameter are only checked for
    /// form.
    fn check_params(
        &mut self,
        doc: &DocComment,
        parameters: &FunctionLikeParameterList<'_>,
        scope: &Scope,
    ) -> Result<(), CheckError> {
        let natives: Vec<String> = parameters
            .parameters
            .iter()
            .map(|param| native_parameter_text(param, self.comments.content))
            .collect();
        let tags = doc.tags("@param");

        if tags.len() != natives.len() {
            self.reporter.report(
                DiagnosticCode::PhpdocFunParamCount,
                doc.offset,
                "PHPDoc number of function @param tags doesn't match actual number of parameters",
            );
        }

        for (index, tag) in tags.iter().enumerate() {
            let number = index + 1;
            let documented = self.parser.parse_type_and_name(
                Some(scope),
                &tag.content,
                FieldsToExtract::WithPassMode,
                false,
            );
            if documented.ty.is_none() {
                self.reporter.report(
                    DiagnosticCode::PhpdocFunParamType,
                    tag.offset,
                    format!("PHPDoc function parameter {number} type missing or malformed"),
                );
                continue;
            }
            let Some(documented_name) = documented.name.as_deref() else {
                self.reporter.report(
                    DiagnosticCode::PhpdocFunParamName,
                    tag.offset,
                    format!("PHPDoc function parameter {number} name missing or malformed"),
                );
                continue;
            };
            let Some(native_text) = natives.get(index) else {
                continue;
            };

            let native = self.parser.parse_type_and_name(
                Some(scope),
                native_text,
                FieldsToExtract::WithDefault,
                true,
            );
            if native.name.as_deref() != Some(documented_name) {
                self.reporter.report(
                    DiagnosticCode::PhpdocFunParamNameMismatch,
                    tag.offset,
                    format!("PHPDoc function parameter {number} name mismatch"),
                );
                continue;
            }

            if !self
                .parser
                .compare_types(native.ty.as_deref(), documented.ty.as_deref())
            {
                trace!(
                    native = ?native.ty,
                    documented = ?documented.ty,
                    "parameter type mismatch"
                );
                self.reporter.report(
                    DiagnosticCode::PhpdocFunParamTypeMismatch,
                    tag.offset,
                    format!("PHPDoc function parameter {number} type mismatch"),
                );
            } else if let Some(fixed) = &documented.fixed {
                self.report_style(
                    DiagnosticCode::PhpdocFunParamTypeStyle,
                    tag,
                    format!(
                        "PHPDoc function parameter {number} type doesn't conform to recommended style"
                    ),
                    fixed,
                )?;
            }

            if native.pass_mode.is_splat() != documented.pass_mode.is_splat() {
                self.reporter.report(
                    DiagnosticCode::PhpdocFunParamPassSplatMismatch,
                    tag.offset,
                    format!("PHPDoc function parameter {number} splat mismatch"),
                );
            }
        }
        Ok(())
    }

    /// Check `@return` tags against the native return type (`mixed` when
    /// there is none).
    fn check_return(
        &mut self,
        doc: &DocComment,
        return_hint: Option<&Hint<'_>>,
        scope: &Scope,
    ) -> Result<(), CheckError> {
        let tags = doc.tags("@return");
        if let Some(second) = tags.get(1) {
            self.reporter.report(
                DiagnosticCode::PhpdocFunRetMultiple,
                second.offset,
                "PHPDoc multiple function @return tags--Put in one tag, separated by vertical bars |",
            );
        }
        if tags.is_empty() {
            return Ok(());
        }

        let native = match return_hint {
            Some(hint) => {
                self.parser
                    .parse_type_and_name(
                        Some(scope),
                        &hint_text(hint),
                        FieldsToExtract::TypeOnly,
                        true,
                    )
                    .ty
            }
            None => Some("mixed".to_string()),
        };

        for tag in tags {
            let documented = self.parser.parse_type_and_name(
                Some(scope),
                &tag.content,
                FieldsToExtract::TypeOnly,
                false,
            );
            if documented.ty.is_none() {
                self.reporter.report(
                    DiagnosticCode::PhpdocFunRetType,
                    tag.offset,
                    "PHPDoc function return type missing or malformed",
                );
            } else if !self
                .parser
                .compare_types(native.as_deref(), documented.ty.as_deref())
            {
                self.reporter.report(
                    DiagnosticCode::PhpdocFunRetTypeMismatch,
                    tag.offset,
                    "PHPDoc function return type mismatch",
                );
            } else if let Some(fixed) = &documented.fixed {
                self.report_style(
                    DiagnosticCode::PhpdocFunRetTypeStyle,
                    tag,
                    "PHPDoc function return type doesn't conform to recommended style",
                    fixed,
                )?;
            }
        }
        Ok(())
    }

    /// Check `@var` tags against a native property type (`mixed` when
    /// there is none).
    fn check_vars(
        &mut self,
        doc: &DocComment,
        native: Option<&str>,
        scope: &Scope,
    ) -> Result<(), CheckError> {
        let tags = doc.tags("@var");
        if tags.is_empty() {
            return Ok(());
        }

        let wide = match native {
            Some(text) => {
                self.parser
                    .parse_type_and_name(Some(scope), text, FieldsToExtract::TypeOnly, true)
                    .ty
            }
            None => Some("mixed".to_string()),
        };

        for tag in tags {
            let documented = self.parser.parse_type_and_name(
                Some(scope),
                &tag.content,
                FieldsToExtract::TypeOnly,
                false,
            );
            if documented.ty.is_none() {
                self.reporter.report(
                    DiagnosticCode::PhpdocVarType,
                    tag.offset,
                    "PHPDoc var type missing or malformed",
                );
            } else if !self
                .parser
                .compare_types(wide.as_deref(), documented.ty.as_deref())
            {
                self.reporter.report(
                    DiagnosticCode::PhpdocVarTypeMismatch,
                    tag.offset,
                    "PHPDoc var type mismatch",
                );
            } else if let Some(fixed) = &documented.fixed {
                self.report_style(
                    DiagnosticCode::PhpdocVarTypeStyle,
                    tag,
                    "PHPDoc var type doesn't conform to recommended style",
                    fixed,
                )?;
            }
        }
        Ok(())
    }

    fn report_style(
        &mut self,
        code: DiagnosticCode,
        tag: &DocTag,
        message: impl Into<String>,
        fixed: &str,
    ) -> Result<(), CheckError> {
        let edits = fix_comment_tag(tag, fixed)?;
        self.reporter
            .report_fixable(code, tag.offset, message, edits);
        Ok(())
    }
}
