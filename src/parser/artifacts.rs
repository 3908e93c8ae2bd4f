/// Pass 1: class-like inheritance edges.
///
/// Walks the whole file once before any doc comment is checked, so a
/// class may be referenced in a doc type above its declaration.  Class
/// declarations nested in functions, methods and closures are collected
/// too.
use mago_syntax::ast::*;

use crate::scope::Scope;
use crate::types::{Artifact, ArtifactRegistry};

use super::use_statements::register_use_items;

/// Collect every class, interface, trait and enum declared in
/// `statements`, keyed by fully-qualified name.
pub(crate) fn collect_artifacts<'b>(
    statements: impl Iterator<Item = &'b Statement<'b>>,
) -> ArtifactRegistry {
    let mut registry = ArtifactRegistry::new();
    let mut scope = Scope::root();
    collect_from_statements(statements, &mut scope, &mut registry);
    registry
}

fn collect_from_statements<'b>(
    statements: impl Iterator<Item = &'b Statement<'b>>,
    scope: &mut Scope,
    registry: &mut ArtifactRegistry,
) {
    for statement in statements {
        collect_from_statement(statement, scope, registry);
    }
}

fn collect_from_statement<'b>(
    statement: &'b Statement<'b>,
    scope: &mut Scope,
    registry: &mut ArtifactRegistry,
) {
    match statement {
        Statement::Namespace(namespace) => {
            let name = namespace.name.as_ref().map_or("", |ident| ident.value());
            let mut inner = Scope::root().in_namespace(name);
            collect_from_statements(namespace.statements().iter(), &mut inner, registry);
            return;
        }
        Statement::Use(use_stmt) => {
            register_use_items(&use_stmt.items, scope);
            return;
        }
        Statement::Class(class) => {
            let extends = class
                .extends
                .as_ref()
                .and_then(|ext| ext.types.first())
                .map(|ident| scope.resolve_code_name(ident.value()));
            let implements = class
                .implements
                .as_ref()
                .map(|imp| {
                    imp.types
                        .iter()
                        .map(|ident| scope.resolve_code_name(ident.value()))
                        .collect()
                })
                .unwrap_or_default();
            registry.insert(
                scope.qualify(class.name.value),
                Artifact {
                    extends,
                    implements,
                },
            );
        }
        Statement::Interface(iface) => {
            // An interface may extend several interfaces; they are all
            // supertypes, none of them a parent class.
            let implements = iface
                .extends
                .as_ref()
                .map(|ext| {
                    ext.types
                        .iter()
                        .map(|ident| scope.resolve_code_name(ident.value()))
                        .collect()
                })
                .unwrap_or_default();
            registry.insert(
                scope.qualify(iface.name.value),
                Artifact {
                    extends: None,
                    implements,
                },
            );
        }
        Statement::Trait(trait_def) => {
            registry.insert(scope.qualify(trait_def.name.value), Artifact::default());
        }
        Statement::Enum(enum_def) => {
            let mut implements: Vec<String> = enum_def
                .implements
                .as_ref()
                .map(|imp| {
                    imp.types
                        .iter()
                        .map(|ident| scope.resolve_code_name(ident.value()))
                        .collect()
                })
                .unwrap_or_default();
            // Enums implicitly implement UnitEnum or BackedEnum.
            let implicit = if enum_def.backing_type_hint.is_some() {
                "\\BackedEnum"
            } else {
                "\\UnitEnum"
            };
            implements.push(implicit.to_string());
            registry.insert(
                scope.qualify(enum_def.name.value),
                Artifact {
                    extends: None,
                    implements,
                },
            );
        }
        _ => {}
    }

    // Bodies, members and expressions may declare more class-likes.
    for child in Node::Statement(statement).children() {
        collect_from_node(child, scope, registry);
    }
}

fn collect_from_node<'b>(node: Node<'b, 'b>, scope: &Scope, registry: &mut ArtifactRegistry) {
    match node {
        Node::Statement(statement) => {
            collect_from_statement(statement, &mut scope.clone(), registry)
        }
        _ => {
            for child in node.children() {
                collect_from_node(child, scope, registry);
            }
        }
    }
}
