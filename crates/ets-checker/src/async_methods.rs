//! Async method lowering and inner-class member restrictions.
//!
//! An async method with a body is split in two: a synthetic implementation
//! method `<name>$asyncimpl` that takes over the parameters and body and
//! returns `Object`, and the original method, which keeps its signature,
//! becomes `native` and loses its body. Overloads of one name share one
//! implementation variable.

use ets_ast::node::{MethodKind, NodeKind};
use ets_ast::{AstEdit, ClassTarget, ModifierFlags, NodeIndex, SyntheticMember};
use ets_binder::{MemberTable, VariableFlags};
use ets_common::diagnostics::diagnostic_codes;
use indexmap::IndexMap;
use smallvec::SmallVec;
use tracing::debug;

use crate::state::CheckerState;
use crate::types::{FunctionType, ObjectFlags, SignatureData, SignatureFlags, SignatureId, TypeData, TypeId};

pub const ASYNC_IMPL_SUFFIX: &str = "$asyncimpl";

#[must_use]
pub fn async_impl_name(method: &str) -> String {
    format!("{method}{ASYNC_IMPL_SUFFIX}")
}

#[must_use]
pub fn is_async_impl_name(name: &str) -> bool {
    name.len() > ASYNC_IMPL_SUFFIX.len() && name.ends_with(ASYNC_IMPL_SUFFIX)
}

/// Async overloads of one method name.
struct AsyncGroup {
    is_static: bool,
    access: VariableFlags,
    decls: SmallVec<[NodeIndex; 1]>,
}

impl<'a> CheckerState<'a> {
    /// Synthesize the implementation methods of the async methods declared
    /// in `class`. Runs once per class.
    pub fn create_async_proxy_methods(&mut self, class: TypeId) {
        let Some(object) = self.ctx.types.object(class) else {
            return;
        };
        if object.flags.contains(ObjectFlags::ASYNC_PROXIES_CREATED) || object.decl.is_none() {
            return;
        }
        let decl = object.decl;
        if let Some(object) = self.ctx.types.object_mut(class) {
            object.flags |= ObjectFlags::ASYNC_PROXIES_CREATED;
        }
        self.resolve_members(class);

        let arena = self.ctx.arena;
        let Some(NodeKind::ClassDecl(data)) = arena.kind(decl) else {
            return;
        };
        let mut groups: IndexMap<String, AsyncGroup> = IndexMap::new();
        for &member in &data.members {
            let Some(method) = arena.get_method(member) else {
                continue;
            };
            if method.kind != MethodKind::Method
                || !method.modifiers.contains(ModifierFlags::ASYNC)
                || method.function.body.is_none()
            {
                continue;
            }
            let is_static = method.modifiers.contains(ModifierFlags::STATIC);
            let access = self
                .ctx
                .binder
                .decl_variable(member)
                .map(|var| {
                    self.ctx.binder.get(var).flags
                        & (VariableFlags::PUBLIC | VariableFlags::PRIVATE | VariableFlags::PROTECTED)
                })
                .unwrap_or_default();
            groups
                .entry(async_impl_name(&method.name))
                .or_insert_with(|| AsyncGroup {
                    is_static,
                    access,
                    decls: SmallVec::new(),
                })
                .decls
                .push(member);
        }

        for (impl_name, group) in groups {
            self.add_async_impl(class, decl, &impl_name, &group);
        }
    }

    fn add_async_impl(&mut self, class: TypeId, class_decl: NodeIndex, impl_name: &str, group: &AsyncGroup) {
        let mut flags = VariableFlags::METHOD | VariableFlags::SYNTHETIC | group.access;
        if group.is_static {
            flags |= VariableFlags::STATIC;
        }
        let first = group.decls.first().copied().unwrap_or(NodeIndex::NONE);
        let var = self.ctx.binder.add_synthetic_variable(impl_name, first, flags);

        let mut signatures: SmallVec<[SignatureId; 2]> = SmallVec::new();
        for &source in &group.decls {
            let source_sig = self.signature_of_function(source, class);
            let data = self.ctx.types.signature(source_sig).clone();
            signatures.push(self.ctx.types.alloc_signature(SignatureData {
                owner: class,
                name: impl_name.to_string(),
                return_type: TypeId::OBJECT,
                flags: data.flags | SignatureFlags::SYNTHETIC,
                ..data
            }));
            self.ctx.types.signature_mut(source_sig).flags |= SignatureFlags::NATIVE;
            self.ctx.async_impls.insert(source, var);

            self.ctx.edits.push(AstEdit::AddMember {
                class: ClassTarget::Existing(class_decl),
                member: SyntheticMember::TakeOverMethod {
                    source,
                    name: impl_name.to_string(),
                    return_type: "Object".to_string(),
                    remove_modifiers: ModifierFlags::ASYNC,
                },
            });
            self.ctx.edits.push(AstEdit::AddModifiers {
                node: source,
                modifiers: ModifierFlags::NATIVE,
            });
        }

        let impl_type = self.ctx.types.alloc(TypeData::Function(FunctionType {
            name: impl_name.to_string(),
            signatures,
            extension_accessor: false,
        }));
        self.ctx.variable_types.insert(var, impl_type);
        if let Some(object) = self.ctx.types.object_mut(class) {
            object
                .properties_mut(MemberTable::method(group.is_static))
                .insert(impl_name.to_string(), var);
        }
        debug!(name = %impl_name, overloads = group.decls.len(), "created async implementation");
    }

    // =========================================================================
    // Inner classes
    // =========================================================================

    /// A class nested in a class body without `static` may declare neither
    /// static methods nor mutable static fields.
    pub fn check_inner_class_members(&mut self, class_decl: NodeIndex) {
        let arena = self.ctx.arena;
        let Some(NodeKind::ClassDecl(data)) = arena.kind(class_decl) else {
            return;
        };
        if data.modifiers.contains(ModifierFlags::STATIC)
            || !matches!(arena.kind(arena.parent(class_decl)), Some(NodeKind::ClassDecl(_)))
        {
            return;
        }
        let Some(scope) = self.ctx.binder.class_scope(class_decl) else {
            return;
        };
        let mut reports: Vec<(NodeIndex, u32)> = Vec::new();
        for &var in scope.table(MemberTable::StaticMethod).values() {
            for &decl in &self.ctx.binder.get(var).declarations {
                reports.push((decl, diagnostic_codes::INNER_CLASS_STATIC_METHOD));
            }
        }
        for &var in scope.table(MemberTable::StaticField).values() {
            let variable = self.ctx.binder.get(var);
            if !variable.has_flags(VariableFlags::READONLY) {
                reports.push((variable.decl(), diagnostic_codes::INNER_CLASS_MUTABLE_STATIC_FIELD));
            }
        }
        for (decl, code) in reports {
            self.error_at_node(decl, code, &[]);
        }
    }
}

#[cfg(test)]
#[path = "../tests/async_methods_tests.rs"]
mod tests;
