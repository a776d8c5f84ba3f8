//! Abstract obligations and override validation.
//!
//! Every class and interface owes the abstract signatures it declares or
//! inherits. A concrete class must discharge each of them, either with an
//! override-compatible method somewhere in its class chain, with a default
//! method of an interface, or (for accessor obligations) with a field that
//! gets accessors generated for it.

use std::rc::Rc;

use ets_ast::{ModifierFlags, NodeIndex};
use ets_binder::{MemberTable, VariableFlags};
use ets_common::diagnostics::diagnostic_codes;
use ets_common::limits::MAX_HIERARCHY_DEPTH;
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::members::FoundProperty;
use crate::state::CheckerState;
use crate::type_graph::TypeMapping;
use crate::types::{Facet, FacetState, ObjectFlags, PropertySearchFlags, SignatureFlags, SignatureId, TypeId};

/// One abstract signature and the type it was declared through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Obligation {
    pub sig: SignatureId,
    /// Declaring class or interface, instantiated as seen from the owner.
    pub via: TypeId,
}

/// Abstract signatures a type owes, by name, in declaration order.
#[derive(Clone, Debug, Default)]
pub struct AbstractObligations {
    pub functions: IndexMap<String, SmallVec<[Obligation; 2]>>,
    /// Interfaces and classes whose obligations are already merged in.
    pub inherited_from: FxHashSet<TypeId>,
}

impl AbstractObligations {
    #[must_use]
    pub fn len(&self) -> usize {
        self.functions.values().map(SmallVec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Obligation)> + '_ {
        self.functions
            .iter()
            .flat_map(|(name, list)| list.iter().map(move |&ob| (name.as_str(), ob)))
    }

    fn push(&mut self, name: &str, obligation: Obligation) {
        let list = self.functions.entry(name.to_string()).or_default();
        if !list.iter().any(|o| o.sig == obligation.sig) {
            list.push(obligation);
        }
    }

    fn merge(&mut self, other: &AbstractObligations) {
        for (name, obligation) in other.iter() {
            self.push(name, obligation);
        }
        self.inherited_from.extend(other.inherited_from.iter().copied());
    }
}

/// Text of a declaration category in inheritance diagnostics.
fn declaration_kind(table: MemberTable) -> &'static str {
    match table {
        MemberTable::InstanceField | MemberTable::StaticField => "field",
        MemberTable::InstanceMethod | MemberTable::StaticMethod => "method",
        MemberTable::InstanceDecl | MemberTable::StaticDecl => "class",
    }
}

impl<'a> CheckerState<'a> {
    // =========================================================================
    // Obligations
    // =========================================================================

    /// Abstract obligations of `ty`, computed once per type.
    pub fn abstract_obligations(&mut self, ty: TypeId) -> Rc<AbstractObligations> {
        if let Some(cached) = self.ctx.obligations.get(&ty) {
            return Rc::clone(cached);
        }
        let state = self.run_facet(ty, Facet::AbstractObligations, |state| {
            let obligations = state.compute_obligations(ty);
            state.ctx.obligations.insert(ty, Rc::new(obligations));
            true
        });
        if state == FacetState::InProgress {
            // Re-entered through a cyclic hierarchy; the cycle is reported by
            // super or interface resolution.
            return Rc::new(AbstractObligations::default());
        }
        self.ctx.obligations.get(&ty).map(Rc::clone).unwrap_or_default()
    }

    fn compute_obligations(&mut self, ty: TypeId) -> AbstractObligations {
        let mut result = AbstractObligations::default();
        if !self.ctx.types.is_object(ty) {
            return result;
        }
        self.resolve_members(ty);

        let own: Vec<(String, FoundProperty)> = self
            .ctx
            .types
            .object(ty)
            .map(|o| {
                o.properties(MemberTable::InstanceMethod)
                    .iter()
                    .map(|(name, &variable)| {
                        let found = FoundProperty {
                            variable,
                            table: MemberTable::InstanceMethod,
                            view: ty,
                        };
                        (name.clone(), found)
                    })
                    .collect()
            })
            .unwrap_or_default();
        for (name, found) in own {
            let member_ty = self.type_of_member(found);
            for sig in self.signatures_of(member_ty) {
                let data = self.ctx.types.signature(sig);
                if data.has(SignatureFlags::ABSTRACT) && !data.has(SignatureFlags::PRIVATE | SignatureFlags::STATIC) {
                    result.push(&name, Obligation { sig, via: ty });
                }
            }
        }

        if let Some(super_ty) = self.super_type_of(ty)
            && self.ctx.types.object(super_ty).is_some_and(|o| o.flags.contains(ObjectFlags::ABSTRACT))
        {
            let inherited = self.abstract_obligations(super_ty);
            result.merge(&inherited);
            result.inherited_from.insert(super_ty);
        }
        for iface in self.interfaces_of(ty) {
            if !result.inherited_from.insert(iface) {
                trace!(iface = iface.0, "interface already contributed");
                continue;
            }
            let inherited = self.abstract_obligations(iface);
            result.merge(&inherited);
        }
        debug!(ty = ty.0, count = result.len(), "abstract obligations");
        result
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Check that a concrete class discharges every obligation it inherits.
    /// Runs once per class.
    pub fn validate_overriding(&mut self, class: TypeId) {
        let Some(object) = self.ctx.types.object(class) else {
            return;
        };
        if !object.is_class() || object.flags.contains(ObjectFlags::OVERRIDES_VALIDATED) {
            return;
        }
        let is_abstract = object.flags.contains(ObjectFlags::ABSTRACT);
        let decl = object.decl;
        if let Some(object) = self.ctx.types.object_mut(class) {
            object.flags |= ObjectFlags::OVERRIDES_VALIDATED;
        }
        if is_abstract {
            return;
        }

        let obligations = self.abstract_obligations(class);
        for (name, obligation) in obligations.iter() {
            if self.is_discharged(class, name, obligation) {
                continue;
            }
            self.report_missing_override(class, decl, name, obligation);
            if !self.ctx.options.report_all_missing_overrides {
                break;
            }
        }
        self.check_interface_collisions(class, decl);
    }

    fn is_discharged(&mut self, class: TypeId, name: &str, obligation: Obligation) -> bool {
        self.implemented_in_class_chain(class, name, obligation)
            || self.implemented_by_default(class, name, obligation)
            || self.implemented_by_own_field(class, name, obligation)
            || self.implemented_by_inherited_field(class, name, obligation)
    }

    /// A concrete override-compatible method in the class or its supers.
    fn implemented_in_class_chain(&mut self, class: TypeId, name: &str, obligation: Obligation) -> bool {
        let empty = TypeMapping::default();
        let mut current = Some(class);
        let mut depth = 0;
        while let Some(ty) = current {
            depth += 1;
            if depth > ets_common::limits::MAX_HIERARCHY_DEPTH {
                break;
            }
            if let Some(found) = self.find_own_property(ty, name, PropertySearchFlags::SEARCH_INSTANCE_METHOD) {
                let member_ty = self.type_of_member(found);
                for sig in self.signatures_of(member_ty) {
                    if self.ctx.types.signature(sig).has(SignatureFlags::ABSTRACT) {
                        continue;
                    }
                    if self.is_override_compatible(sig, &empty, obligation.sig, &empty) {
                        return true;
                    }
                }
            }
            current = self.super_type_of(ty);
        }
        false
    }

    /// A default method of an interface below the obligation's declarer.
    /// When several interfaces provide one, the most specific must be unique.
    fn implemented_by_default(&mut self, class: TypeId, name: &str, obligation: Obligation) -> bool {
        let empty = TypeMapping::default();
        let mut providers: SmallVec<[TypeId; 2]> = SmallVec::new();
        for iface in self.all_interfaces(class) {
            if !self.is_subtype(iface, obligation.via) {
                continue;
            }
            let Some(found) = self.find_own_property(iface, name, PropertySearchFlags::SEARCH_INSTANCE_METHOD) else {
                continue;
            };
            let member_ty = self.type_of_member(found);
            for sig in self.signatures_of(member_ty) {
                if self.ctx.types.signature(sig).has(SignatureFlags::DEFAULT)
                    && self.is_override_compatible(sig, &empty, obligation.sig, &empty)
                {
                    providers.push(iface);
                    break;
                }
            }
        }
        match providers.len() {
            0 => false,
            1 => true,
            _ => {
                let candidates = providers.clone();
                candidates
                    .iter()
                    .any(|&p| providers.iter().all(|&q| self.is_subtype(p, q)))
            }
        }
    }

    /// Value type an accessor obligation reads or writes.
    fn accessor_value_type(&self, obligation: Obligation) -> Option<(TypeId, ModifierFlags)> {
        let data = self.ctx.types.signature(obligation.sig);
        if data.has(SignatureFlags::GETTER) {
            Some((data.return_type, ModifierFlags::GETTER))
        } else if data.has(SignatureFlags::SETTER) {
            Some((data.explicit_params().first().map_or(TypeId::ERROR, |p| p.ty), ModifierFlags::SETTER))
        } else {
            None
        }
    }

    fn field_fits_accessor(&mut self, field: FoundProperty, value: TypeId, kind: ModifierFlags) -> bool {
        let readonly = self.ctx.binder.get(field.variable).has_flags(VariableFlags::READONLY);
        let field_ty = self.type_of_member(field);
        if kind == ModifierFlags::SETTER {
            !readonly && self.is_subtype(value, field_ty)
        } else {
            self.is_subtype(field_ty, value)
        }
    }

    /// An own instance field named like the accessor.
    fn implemented_by_own_field(&mut self, class: TypeId, name: &str, obligation: Obligation) -> bool {
        let Some((value, kind)) = self.accessor_value_type(obligation) else {
            return false;
        };
        let Some(found) = self.find_own_property(class, name, PropertySearchFlags::SEARCH_INSTANCE_FIELD) else {
            return false;
        };
        if !self.field_fits_accessor(found, value, kind) {
            return false;
        }
        *self.ctx.accessor_marks.entry(found.variable).or_default() |= kind;
        trace!(%name, ?kind, "field implements accessor");
        true
    }

    /// A field of a super class, promoted into a synthetic override field of
    /// `class`.
    fn implemented_by_inherited_field(&mut self, class: TypeId, name: &str, obligation: Obligation) -> bool {
        let Some((value, kind)) = self.accessor_value_type(obligation) else {
            return false;
        };
        let mut current = self.super_type_of(class);
        let mut depth = 0;
        while let Some(ty) = current {
            depth += 1;
            if depth > ets_common::limits::MAX_HIERARCHY_DEPTH {
                return false;
            }
            if let Some(found) = self.find_own_property(ty, name, PropertySearchFlags::SEARCH_INSTANCE_FIELD) {
                if !self.field_fits_accessor(found, value, kind) {
                    return false;
                }
                let variable = self.super_owner_field(class, name, found);
                *self.ctx.accessor_marks.entry(variable).or_default() |= kind | ModifierFlags::SUPER_OWNER;
                return true;
            }
            current = self.super_type_of(ty);
        }
        false
    }

    /// Synthetic field of `class` standing for the inherited `source` field.
    fn super_owner_field(&mut self, class: TypeId, name: &str, source: FoundProperty) -> ets_binder::VariableId {
        let key = (class, name.to_string());
        if let Some(&variable) = self.ctx.super_owner_fields.get(&key) {
            return variable;
        }
        let source_decl = self.ctx.binder.get(source.variable).decl();
        let ty = self.type_of_member(source);
        let variable = self.ctx.binder.add_synthetic_variable(
            name,
            source_decl,
            VariableFlags::PROPERTY | VariableFlags::PUBLIC | VariableFlags::SYNTHETIC,
        );
        self.ctx.variable_types.insert(variable, ty);
        if let Some(object) = self.ctx.types.object_mut(class) {
            object
                .properties_mut(MemberTable::InstanceField)
                .insert(name.to_string(), variable);
        }
        self.ctx.super_owner_fields.insert(key, variable);
        debug!(%name, class = class.0, "synthetic super-owner field");
        variable
    }

    fn report_missing_override(&mut self, class: TypeId, decl: NodeIndex, name: &str, obligation: Obligation) {
        let class_name = self.format_type(class);
        let declarer = self.format_type(obligation.via);
        let data = self.ctx.types.signature(obligation.sig).clone();
        if data.has(SignatureFlags::GETTER) {
            self.error_at_node(decl, diagnostic_codes::MISSING_GETTER, &[&class_name, name, &declarer]);
        } else if data.has(SignatureFlags::SETTER) {
            self.error_at_node(decl, diagnostic_codes::MISSING_SETTER, &[&class_name, name, &declarer]);
        } else {
            let params = self.ctx.types.display_params(&data);
            self.error_at_node(
                decl,
                diagnostic_codes::MISSING_OVERRIDE,
                &[&class_name, name, &params, &declarer],
            );
        }
    }

    /// Same-named members of unrelated interfaces must agree. Between a
    /// sub-interface and its super interface, the sub-interface's declaration
    /// must shadow the other on every inheritance path from the class.
    fn check_interface_collisions(&mut self, class: TypeId, decl: NodeIndex) {
        let interfaces = self.all_interfaces(class);
        for (i, &first) in interfaces.iter().enumerate() {
            for &second in &interfaces[i + 1..] {
                if self.is_subtype(first, second) {
                    self.check_shadowed_pair(class, decl, first, second);
                } else if self.is_subtype(second, first) {
                    self.check_shadowed_pair(class, decl, second, first);
                } else {
                    self.check_interface_pair(decl, first, second);
                }
            }
        }
    }

    fn check_shadowed_pair(&mut self, class: TypeId, decl: NodeIndex, sub: TypeId, sup: TypeId) {
        let names = self.own_method_names(sub);
        let search = PropertySearchFlags::SEARCH_INSTANCE_METHOD;
        for name in names {
            let (Some(a), Some(b)) = (
                self.find_own_property(sub, &name, search),
                self.find_own_property(sup, &name, search),
            ) else {
                continue;
            };
            let (a_ty, b_ty) = (self.type_of_member(a), self.type_of_member(b));
            if !self.shares_parameters(a_ty, b_ty) || self.shadowed_on_every_path(class, sup, &name, 0) {
                continue;
            }
            trace!(%name, sub = sub.0, sup = sup.0, "declaration reachable around its override");
            let (sub_name, sup_name) = (self.format_type(sub), self.format_type(sup));
            self.error_at_node(
                decl,
                diagnostic_codes::INTERFACE_METHOD_COLLISION,
                &[&name, &sup_name, &sub_name],
            );
        }
    }

    /// Whether every inheritance path from `from` up to `target` passes
    /// through a type that redeclares the instance method `name`.
    fn shadowed_on_every_path(&mut self, from: TypeId, target: TypeId, name: &str, depth: usize) -> bool {
        if depth > MAX_HIERARCHY_DEPTH {
            return true;
        }
        let mut parents = self.interfaces_of(from);
        parents.extend(self.super_type_of(from));
        let mut reaches = false;
        for parent in parents {
            if parent == target {
                return false;
            }
            if !self.is_subtype(parent, target) {
                continue;
            }
            reaches = true;
            let redeclares = self
                .find_own_property(parent, name, PropertySearchFlags::SEARCH_INSTANCE_METHOD)
                .is_some();
            if !redeclares && !self.shadowed_on_every_path(parent, target, name, depth + 1) {
                return false;
            }
        }
        reaches
    }

    fn own_method_names(&mut self, ty: TypeId) -> Vec<String> {
        self.resolve_members(ty);
        self.ctx
            .types
            .object(ty)
            .map(|o| o.properties(MemberTable::InstanceMethod).keys().cloned().collect())
            .unwrap_or_default()
    }

    fn shares_parameters(&mut self, a: TypeId, b: TypeId) -> bool {
        for sig_a in self.signatures_of(a) {
            for sig_b in self.signatures_of(b) {
                if self.same_parameters(sig_a, sig_b) {
                    return true;
                }
            }
        }
        false
    }

    fn check_interface_pair(&mut self, decl: NodeIndex, first: TypeId, second: TypeId) {
        self.resolve_members(second);
        for name in self.own_method_names(first) {
            let search = PropertySearchFlags::SEARCH_INSTANCE_METHOD;
            let (Some(a), Some(b)) = (
                self.find_own_property(first, &name, search),
                self.find_own_property(second, &name, search),
            ) else {
                continue;
            };
            let (a_ty, b_ty) = (self.type_of_member(a), self.type_of_member(b));
            if self.signatures_collide(a_ty, b_ty) {
                let (first_name, second_name) = (self.format_type(first), self.format_type(second));
                self.error_at_node(
                    decl,
                    diagnostic_codes::INTERFACE_METHOD_COLLISION,
                    &[&name, &first_name, &second_name],
                );
            }
        }
    }

    /// Signatures with equal parameters collide unless one overrides the other
    /// and neither is static.
    fn signatures_collide(&mut self, a: TypeId, b: TypeId) -> bool {
        let empty = TypeMapping::default();
        for sig_a in self.signatures_of(a) {
            for sig_b in self.signatures_of(b) {
                if !self.same_parameters(sig_a, sig_b) {
                    continue;
                }
                let any_static = self.ctx.types.signature(sig_a).has(SignatureFlags::STATIC)
                    || self.ctx.types.signature(sig_b).has(SignatureFlags::STATIC);
                let compatible = self.is_override_compatible(sig_a, &empty, sig_b, &empty)
                    || self.is_override_compatible(sig_b, &empty, sig_a, &empty);
                if any_static || !compatible {
                    return true;
                }
            }
        }
        false
    }

    // =========================================================================
    // Declaration-kind compatibility
    // =========================================================================

    /// A member may not be inherited as a field from one side and as a method
    /// (or nested class) from the other.
    pub fn check_valid_inheritance(&mut self, class: TypeId) {
        self.resolve_members(class);
        let Some(object) = self.ctx.types.object(class) else {
            return;
        };
        let own: Vec<(MemberTable, String, ets_binder::VariableId)> = MemberTable::ALL
            .into_iter()
            .flat_map(|table| {
                object
                    .properties(table)
                    .iter()
                    .map(move |(name, &var)| (table, name.clone(), var))
            })
            .collect();

        let mut bases: SmallVec<[TypeId; 4]> = SmallVec::new();
        if let Some(super_ty) = self.super_type_of(class) {
            bases.push(super_ty);
        }
        bases.extend(self.interfaces_of(class));

        for (table, name, variable) in own {
            if self.ctx.binder.get(variable).has_flags(VariableFlags::SYNTHETIC) {
                continue;
            }
            let is_static = table.is_static();
            for &base in &bases {
                let mut search = PropertySearchFlags::SEARCH_IN_BASE | PropertySearchFlags::SEARCH_IN_INTERFACES;
                search |= if is_static {
                    PropertySearchFlags::SEARCH_STATIC
                } else {
                    PropertySearchFlags::SEARCH_INSTANCE
                };
                let Some(inherited) = self.find_property(base, &name, search) else {
                    continue;
                };
                if declaration_kind(inherited.table) == declaration_kind(table) {
                    continue;
                }
                let own_found = FoundProperty {
                    variable,
                    table,
                    view: class,
                };
                if self.accessor_matches_field(own_found, inherited) {
                    continue;
                }
                let decl = self.ctx.binder.get(variable).decl();
                let base_kind = if self.ctx.types.is_interface(base) { "interface" } else { "class" };
                let base_name = self.format_type(base);
                let inherited_decl = self.ctx.binder.get(inherited.variable).decl();
                self.error_with_related(
                    decl,
                    diagnostic_codes::INHERITED_WITH_DIFFERENT_DECLARATION,
                    &[base_kind, &base_name, declaration_kind(inherited.table), &name],
                    inherited_decl,
                    "Inherited declaration is here.",
                );
                break;
            }
        }
    }

    /// A field against an accessor of the same value type is an
    /// implementation, not a conflict.
    fn accessor_matches_field(&mut self, a: FoundProperty, b: FoundProperty) -> bool {
        let (field, accessor) = match (declaration_kind(a.table), declaration_kind(b.table)) {
            ("field", "method") => (a, b),
            ("method", "field") => (b, a),
            _ => return false,
        };
        let accessor_ty = self.type_of_member(accessor);
        let signatures = self.signatures_of(accessor_ty);
        if signatures.is_empty() || signatures.iter().any(|&s| !self.ctx.types.signature(s).is_accessor()) {
            return false;
        }
        let field_ty = self.type_of_member(field);
        signatures.iter().all(|&s| {
            let data = self.ctx.types.signature(s);
            let value = if data.has(SignatureFlags::GETTER) {
                data.return_type
            } else {
                data.explicit_params().first().map_or(TypeId::ERROR, |p| p.ty)
            };
            value == field_ty || value.is_error() || field_ty.is_error()
        })
    }

    // =========================================================================
    // Invoke legitimacy
    // =========================================================================

    /// A type may not have both a static `$_invoke` and a static
    /// `$_instantiate`, counting inherited ones.
    pub fn check_invoke_legitimacy(&mut self, ty: TypeId) -> FacetState {
        self.run_facet(ty, Facet::InvokeLegitimacy, |state| {
            let search = PropertySearchFlags::SEARCH_STATIC_METHOD
                | PropertySearchFlags::SEARCH_IN_BASE
                | PropertySearchFlags::SEARCH_IN_INTERFACES;
            let invoke = state.find_property(ty, "$_invoke", search);
            let instantiate = state.find_property(ty, "$_instantiate", search);
            if invoke.is_none() || instantiate.is_none() {
                return true;
            }
            let decl = state.ctx.types.object(ty).map_or(NodeIndex::NONE, |o| o.decl);
            let name = state.format_type(ty);
            state.error_at_node(
                decl,
                diagnostic_codes::INVOKE_AND_INSTANTIATE,
                &["$_invoke", "$_instantiate", &name],
            );
            false
        })
    }
}

#[cfg(test)]
#[path = "../tests/overriding_tests.rs"]
mod tests;
