//! Subtyping and signature compatibility.

use crate::state::CheckerState;
use crate::type_graph::TypeMapping;
use crate::types::{SignatureFlags, SignatureId, TypeData, TypeId};

impl<'a> CheckerState<'a> {
    /// Nominal subtyping. The error type relates to everything so that one
    /// error does not cascade.
    pub fn is_subtype(&mut self, source: TypeId, target: TypeId) -> bool {
        self.is_subtype_at_depth(source, target, 0)
    }

    fn is_subtype_at_depth(&mut self, source: TypeId, target: TypeId, depth: usize) -> bool {
        if source == target || source.is_error() || target.is_error() {
            return true;
        }
        if depth > ets_common::limits::MAX_HIERARCHY_DEPTH {
            return false;
        }
        let source_data = self.ctx.types.get(source).clone();
        let target_data = self.ctx.types.get(target).clone();

        if let TypeData::Union(members) = &source_data {
            return members.iter().all(|&m| self.is_subtype_at_depth(m, target, depth + 1));
        }
        if let TypeData::Union(members) = &target_data {
            return members.iter().any(|&m| self.is_subtype_at_depth(source, m, depth + 1));
        }

        match (&source_data, &target_data) {
            (_, TypeData::Dynamic(_)) => true,
            (TypeData::TypeParameter(tp), _) => self.is_subtype_at_depth(tp.constraint, target, depth + 1),
            (TypeData::NonNullish(inner) | TypeData::Utility { inner, .. }, _) => {
                let inner = *inner;
                let stripped = self.ctx.types.non_nullish(inner);
                self.is_subtype_at_depth(stripped, target, depth + 1)
            }
            (_, TypeData::Utility { inner, .. }) => self.is_subtype_at_depth(source, *inner, depth + 1),
            (TypeData::Object(_) | TypeData::Function(_), _) if target == TypeId::OBJECT => true,
            (TypeData::Object(source_object), TypeData::Object(_)) => {
                if !target_data_is_interface(&target_data) {
                    if !source_object.is_class() {
                        return false;
                    }
                    return self.is_descendant_of(source, target);
                }
                self.implements_interface(source, target)
            }
            (TypeData::Function(_), TypeData::Function(_)) => self.is_function_subtype(source, target),
            _ => false,
        }
    }

    /// Whether `source` (class or interface) reaches interface `target`.
    fn implements_interface(&mut self, source: TypeId, target: TypeId) -> bool {
        if source == target {
            return true;
        }
        self.all_interfaces(source).contains(&target)
    }

    fn is_function_subtype(&mut self, source: TypeId, target: TypeId) -> bool {
        let (Some(&source_sig), Some(&target_sig)) = (
            self.signatures_of(source).first(),
            self.signatures_of(target).first(),
        ) else {
            return false;
        };
        let source_data = self.ctx.types.signature(source_sig).clone();
        let target_data = self.ctx.types.signature(target_sig).clone();
        if source_data.explicit_params().len() != target_data.explicit_params().len() {
            return false;
        }
        for (s, t) in source_data.explicit_params().iter().zip(target_data.explicit_params()) {
            if !self.is_subtype(t.ty, s.ty) {
                return false;
            }
        }
        self.is_subtype(source_data.return_type, target_data.return_type)
    }

    /// Whether `implementation` overrides `declared` once `declared` is seen
    /// through `mapping`: same accessor kind, identical parameter types and a
    /// covariant (or identical) return type.
    pub fn is_override_compatible(
        &mut self,
        implementation: SignatureId,
        implementation_mapping: &TypeMapping,
        declared: SignatureId,
        declared_mapping: &TypeMapping,
    ) -> bool {
        let implementation = self.substitute_signature(implementation, implementation_mapping);
        let declared = self.substitute_signature(declared, declared_mapping);
        let impl_data = self.ctx.types.signature(implementation).clone();
        let decl_data = self.ctx.types.signature(declared).clone();

        let accessor_kind = SignatureFlags::GETTER_OR_SETTER;
        if impl_data.flags & accessor_kind != decl_data.flags & accessor_kind {
            return false;
        }
        if impl_data.params.len() != decl_data.params.len() {
            return false;
        }
        let params_match = impl_data
            .params
            .iter()
            .zip(&decl_data.params)
            .all(|(a, b)| self.same_type(a.ty, b.ty));
        if !params_match {
            return false;
        }
        self.is_subtype(impl_data.return_type, decl_data.return_type)
    }

    /// Whether two parameter lists are override-equivalent, ignoring returns.
    pub fn same_parameters(&mut self, a: SignatureId, b: SignatureId) -> bool {
        let a = self.ctx.types.signature(a).clone();
        let b = self.ctx.types.signature(b).clone();
        a.params.len() == b.params.len() && a.params.iter().zip(&b.params).all(|(x, y)| self.same_type(x.ty, y.ty))
    }

    /// Identity, treating method type parameters at the same position as equal.
    fn same_type(&self, a: TypeId, b: TypeId) -> bool {
        if a == b || a.is_error() || b.is_error() {
            return true;
        }
        match (self.ctx.types.get(a), self.ctx.types.get(b)) {
            (TypeData::TypeParameter(x), TypeData::TypeParameter(y)) => {
                let (px, py) = (self.ctx.arena.parent(x.decl), self.ctx.arena.parent(y.decl));
                let method_owned = |p| self.ctx.arena.get_method(p).is_some();
                method_owned(px) && method_owned(py) && self.type_param_position(x.decl) == self.type_param_position(y.decl)
            }
            _ => false,
        }
    }

    fn type_param_position(&self, decl: ets_ast::NodeIndex) -> Option<usize> {
        let owner = self.ctx.arena.parent(decl);
        self.ctx
            .arena
            .get_function(owner)
            .and_then(|f| f.type_params.iter().position(|&p| p == decl))
    }
}

fn target_data_is_interface(data: &TypeData) -> bool {
    matches!(data, TypeData::Object(object) if object.is_interface())
}

#[cfg(test)]
#[path = "../tests/relations_tests.rs"]
mod tests;
