//! The program pass: imports, then every class and interface, then
//! top-level code.
//!
//! A class is checked in a fixed order so later stages see the results of
//! earlier ones: the super class first, then the class's own hierarchy,
//! members and overrides, then accessor lowering, bodies, constructors and
//! inheritance consistency.

use ets_ast::NodeIndex;
use ets_ast::node::NodeKind;
use ets_common::diagnostics::diagnostic_codes;
use tracing::{debug, info_span};

use crate::state::CheckerState;
use crate::types::{ObjectFlags, TypeId};

impl<'a> CheckerState<'a> {
    /// Check a bound program rooted at `root`.
    pub fn check_program(&mut self, root: NodeIndex) {
        let _span = info_span!("check_program", file = %self.ctx.file_name).entered();
        let arena = self.ctx.arena;
        let Some(program) = arena.get_program(root) else {
            return;
        };
        let statements = program.statements.clone();

        for &statement in &statements {
            if let Some(NodeKind::ImportDecl(import)) = arena.kind(statement)
                && import.language != ets_common::Language::Ets
                && !self.ctx.options.allows_dynamic_language(import.language)
            {
                let language = import.language.tag();
                self.error_at_node(statement, diagnostic_codes::UNSUPPORTED_DYNAMIC_LANGUAGE, &[language]);
            }
        }

        for &statement in &statements {
            match arena.kind(statement) {
                Some(NodeKind::ClassDecl(_)) => {
                    let ty = self.type_of_class_like(statement);
                    self.check_class(ty);
                }
                Some(NodeKind::InterfaceDecl(_)) => {
                    let ty = self.type_of_class_like(statement);
                    self.check_interface(ty);
                }
                _ => {}
            }
        }

        for &statement in &statements {
            match arena.kind(statement) {
                Some(
                    NodeKind::ClassDecl(_)
                    | NodeKind::InterfaceDecl(_)
                    | NodeKind::ImportDecl(_)
                    | NodeKind::TypeAliasDecl(_),
                ) => {}
                Some(NodeKind::FunctionDecl(_)) => {
                    if let Some(var) = self.ctx.binder.decl_variable(statement) {
                        self.type_of_variable(var);
                    }
                    self.check_statement(statement);
                }
                _ => self.check_statement(statement),
            }
        }
        debug!(
            diagnostics = self.ctx.diagnostics.len(),
            edits = self.ctx.edits.len(),
            "program checked"
        );
    }

    /// Check one class declaration. Runs once per class.
    pub fn check_class(&mut self, class: TypeId) {
        let Some(object) = self.ctx.types.object(class) else {
            return;
        };
        if !object.is_class() || object.decl.is_none() || !self.ctx.checked_classes.insert(class) {
            return;
        }
        let decl = object.decl;
        let flags = object.flags;
        let _span = info_span!("check_class", name = %object.name).entered();

        if let Some(super_ty) = self.super_type_of(class)
            && self.ctx.types.object(super_ty).is_some_and(|o| o.decl.is_some())
        {
            let super_base = self.generic_base_of(super_ty);
            self.check_class(super_base);
        }
        if flags.contains(ObjectFlags::FINAL | ObjectFlags::ABSTRACT) {
            self.error_at_node(decl, diagnostic_codes::FINAL_AND_ABSTRACT, &[]);
        }
        self.resolve_interfaces(class);
        self.resolve_type_parameters(class);
        self.resolve_members(class);
        for iface in self.interfaces_of(class) {
            let base = self.generic_base_of(iface);
            self.check_interface(base);
        }

        if !flags.contains(ObjectFlags::FUNCTIONAL) {
            self.validate_overriding(class);
        }
        self.transform_properties(class);
        self.check_member_bodies(decl);
        self.check_inner_class_members(decl);
        self.create_async_proxy_methods(class);
        self.check_constructors(class);
        self.check_valid_inheritance(class);
        self.check_const_fields(class);
        self.check_accessor_consistency(decl);
        self.check_invoke_legitimacy(class);
    }

    /// Check one interface declaration. Runs once per interface.
    pub fn check_interface(&mut self, iface: TypeId) {
        let Some(object) = self.ctx.types.object(iface) else {
            return;
        };
        if !object.is_interface() || object.decl.is_none() || !self.ctx.checked_classes.insert(iface) {
            return;
        }
        let decl = object.decl;
        self.resolve_interfaces(iface);
        self.resolve_type_parameters(iface);
        self.resolve_members(iface);
        self.check_member_bodies(decl);
        self.check_accessor_consistency(decl);
        self.check_invoke_legitimacy(iface);
    }

    /// Field initializers, method and accessor bodies, and nested
    /// declarations.
    fn check_member_bodies(&mut self, decl: NodeIndex) {
        let arena = self.ctx.arena;
        let members = match arena.kind(decl) {
            Some(NodeKind::ClassDecl(class)) => &class.members,
            Some(NodeKind::InterfaceDecl(iface)) => &iface.members,
            _ => return,
        };
        for &member in members {
            match arena.kind(member) {
                Some(NodeKind::ClassProperty(property)) => {
                    if property.initializer.is_some() {
                        self.check_expression(property.initializer);
                    }
                }
                Some(NodeKind::Method(method)) => {
                    if method.function.body.is_some() {
                        self.check_statement(method.function.body);
                    }
                }
                Some(NodeKind::ClassDecl(_)) => {
                    let ty = self.type_of_class_like(member);
                    self.check_class(ty);
                }
                Some(NodeKind::InterfaceDecl(_)) => {
                    let ty = self.type_of_class_like(member);
                    self.check_interface(ty);
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/class_checker_tests.rs"]
mod tests;
