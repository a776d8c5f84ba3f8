//! Member access resolution.
//!
//! `resolve_member` answers "what does `obj.name` refer to" for one access
//! site. The answer depends on the syntactic role of the site (call target,
//! assignment target, plain read, ...), on whether `obj` denotes a type or a
//! value, and on extension functions and accessors visible at the site.
//! Results are memoized per access site, so repeated queries are pure and
//! report nothing new.

use ets_ast::NodeIndex;
use ets_ast::node::{AssignOp, MethodKind, NodeKind};
use ets_binder::{VariableFlags, VariableId};
use ets_common::diagnostics::diagnostic_codes;
use smallvec::SmallVec;
use tracing::trace;

use crate::members::FoundProperty;
use crate::state::CheckerState;
use crate::types::{PropertySearchFlags, SignatureFlags, TypeData, TypeId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResolvedMemberKind {
    Property,
    ExtensionFunction,
    ExtensionAccessor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedMember {
    pub kind: ResolvedMemberKind,
    pub variable: VariableId,
    /// Member type as seen from the target (type arguments applied).
    pub ty: TypeId,
}

/// What the object expression of an access denotes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ReceiverKind {
    /// A class, interface, namespace or enum name, or an alias of a class or
    /// interface. Only static members are visible.
    TypeName,
    /// `this`, a local binding or an interface-typed name.
    InstanceOnly,
    /// Any other value; both halves are searched.
    Any,
}

/// How an access site uses the member.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessRole {
    /// `obj.m(...)`
    CallTarget,
    /// `obj.m.x`
    MemberObject,
    /// `-obj.m`, `obj.m + 1`
    Operand,
    /// `obj.m++`
    Update,
    /// `obj.m = v`
    Assign,
    /// `obj.m += v`
    CompoundAssign,
    /// `let f: (int) => void = obj.m`
    FunctionalValue,
    Read,
}

impl AccessRole {
    /// Member categories this role may refer to, before static/instance
    /// selection.
    #[must_use]
    pub fn search_flags(self) -> PropertySearchFlags {
        use PropertySearchFlags as F;
        let flags = match self {
            AccessRole::CallTarget | AccessRole::FunctionalValue => F::SEARCH_METHOD | F::SEARCH_FIELD | F::IS_FUNCTIONAL,
            AccessRole::MemberObject => F::SEARCH_FIELD | F::SEARCH_DECL | F::SEARCH_METHOD | F::IS_GETTER,
            AccessRole::Operand => F::SEARCH_FIELD | F::SEARCH_METHOD | F::IS_GETTER,
            AccessRole::Update | AccessRole::CompoundAssign => {
                F::SEARCH_FIELD | F::SEARCH_METHOD | F::IS_GETTER | F::IS_SETTER
            }
            AccessRole::Assign => F::SEARCH_FIELD | F::SEARCH_METHOD | F::IS_SETTER,
            AccessRole::Read => F::SEARCH_FIELD | F::SEARCH_METHOD | F::SEARCH_DECL | F::IS_GETTER,
        };
        flags | F::SEARCH_IN_BASE | F::SEARCH_IN_INTERFACES
    }

    #[must_use]
    pub const fn writes(self) -> bool {
        matches!(self, AccessRole::Assign | AccessRole::CompoundAssign | AccessRole::Update)
    }

    #[must_use]
    pub const fn reads(self) -> bool {
        !matches!(self, AccessRole::Assign)
    }
}

/// An extension visible at an access site.
#[derive(Clone, Copy, Debug)]
struct ExtensionCandidate {
    variable: VariableId,
    ty: TypeId,
    is_accessor: bool,
}

impl<'a> CheckerState<'a> {
    /// Resolve the member named at `access` (a `Member` node) on `target`.
    ///
    /// Returns an empty list when nothing applies; the reason has then been
    /// reported.
    pub fn resolve_member(&mut self, access: NodeIndex, target: TypeId) -> Vec<ResolvedMember> {
        if let Some(cached) = self.ctx.member_results.get(&access) {
            return cached.clone();
        }
        let result = self.compute_member_resolution(access, target);
        trace!(access = access.0, results = result.len(), "resolved member");
        self.ctx.member_results.insert(access, result.clone());
        result
    }

    /// Role of a member expression derived from its parent.
    pub fn access_role(&mut self, access: NodeIndex) -> AccessRole {
        let arena = self.ctx.arena;
        let parent = arena.parent(access);
        match arena.kind(parent) {
            Some(NodeKind::Call(call)) if call.callee == access => AccessRole::CallTarget,
            Some(NodeKind::Member(member)) if member.object == access => AccessRole::MemberObject,
            Some(NodeKind::Assign(assign)) if assign.left == access => {
                if assign.op == AssignOp::Assign {
                    AccessRole::Assign
                } else {
                    AccessRole::CompoundAssign
                }
            }
            Some(NodeKind::Assign(assign)) if assign.right == access => {
                let left = assign.left;
                let left_ty = self.check_expression(left);
                if self.ctx.types.function(left_ty).is_some() {
                    AccessRole::FunctionalValue
                } else {
                    AccessRole::Read
                }
            }
            Some(NodeKind::VarDecl(var)) if var.initializer == access && var.type_annotation.is_some() => {
                let declared = self.resolve_type_node(var.type_annotation);
                if self.ctx.types.function(declared).is_some() {
                    AccessRole::FunctionalValue
                } else {
                    AccessRole::Read
                }
            }
            Some(NodeKind::Update(_)) => AccessRole::Update,
            Some(NodeKind::Unary(_) | NodeKind::Binary(_)) => AccessRole::Operand,
            _ => AccessRole::Read,
        }
    }

    /// Variable the object expression of a member access refers to.
    fn receiver_variable(&self, object: NodeIndex) -> Option<VariableId> {
        match self.ctx.arena.kind(object) {
            Some(NodeKind::Identifier(_)) => self.ctx.binder.resolved(object),
            Some(NodeKind::Member(_)) => self
                .ctx
                .member_results
                .get(&object)
                .and_then(|r| r.first())
                .map(|r| r.variable),
            _ => None,
        }
    }

    /// Which half of the member tables an access on `object` may search.
    fn receiver_kind(&mut self, object: NodeIndex, target: TypeId) -> ReceiverKind {
        let arena = self.ctx.arena;
        let variable = self.receiver_variable(object);
        if let Some(var) = variable {
            let flags = self.ctx.binder.get(var).flags;
            if flags.intersects(
                VariableFlags::CLASS | VariableFlags::INTERFACE | VariableFlags::NAMESPACE | VariableFlags::ENUM_LITERAL,
            ) {
                return ReceiverKind::TypeName;
            }
            if flags.contains(VariableFlags::TYPE_ALIAS) {
                let alias_decl = self.ctx.binder.get(var).decl();
                let aliased = self.resolve_alias(alias_decl);
                if self.ctx.types.object(aliased).is_some_and(|o| o.is_class() || o.is_interface()) {
                    return ReceiverKind::TypeName;
                }
            }
        }
        let instance_only = match arena.kind(object) {
            Some(NodeKind::This) => true,
            Some(NodeKind::Identifier(_)) => {
                self.ctx.types.is_interface(target)
                    || variable.is_some_and(|v| matches!(arena.kind(self.ctx.binder.get(v).decl()), Some(NodeKind::VarDecl(_))))
            }
            _ => false,
        };
        if instance_only { ReceiverKind::InstanceOnly } else { ReceiverKind::Any }
    }

    fn compute_member_resolution(&mut self, access: NodeIndex, target: TypeId) -> Vec<ResolvedMember> {
        let Some(member) = self.ctx.arena.get_member(access) else {
            return Vec::new();
        };
        let (object, name) = (member.object, member.property.clone());
        if target.is_error() {
            return Vec::new();
        }

        let role = self.access_role(access);
        let receiver = self.receiver_kind(object, target);
        let type_denoting = receiver == ReceiverKind::TypeName;
        let mut flags = role.search_flags();
        match receiver {
            ReceiverKind::TypeName => flags &= !PropertySearchFlags::SEARCH_INSTANCE,
            ReceiverKind::InstanceOnly => flags &= !PropertySearchFlags::SEARCH_STATIC,
            ReceiverKind::Any => {}
        }

        let apparent = self.apparent_type(target);
        if let Some(language) = self.ctx.types.dynamic_language(apparent) {
            let variable = self.dynamic_property(apparent, &name);
            trace!(%name, %language, "dynamic property");
            return vec![ResolvedMember {
                kind: ResolvedMemberKind::Property,
                variable,
                ty: apparent,
            }];
        }

        let found = self.lookup_on_apparent(apparent, &name, flags);
        let extension = if type_denoting {
            None
        } else {
            self.find_extension(access, &name, apparent)
        };

        let in_call = role == AccessRole::CallTarget;
        let result = match (found, extension) {
            (Some((found, ty)), None) => {
                self.validate_property(access, found, ty, role, flags);
                vec![property_result(found, ty)]
            }
            (Some((found, ty)), Some(ext)) if !ext.is_accessor => {
                let is_method = self.has_plain_method(ty);
                if is_method && self.ctx.options.warn_extension_shadowing {
                    let owner = self.format_type(found.view);
                    self.warning_at_node(access, diagnostic_codes::EXTENSION_SHADOWED, &[&name, &owner]);
                }
                self.validate_property(access, found, ty, role, flags);
                if in_call {
                    vec![
                        property_result(found, ty),
                        ResolvedMember {
                            kind: ResolvedMemberKind::ExtensionFunction,
                            variable: ext.variable,
                            ty: ext.ty,
                        },
                    ]
                } else {
                    vec![property_result(found, ty)]
                }
            }
            (Some((found, ty)), Some(_)) => {
                if self.ctx.options.warn_extension_shadowing {
                    let owner = self.format_type(found.view);
                    self.warning_at_node(access, diagnostic_codes::EXTENSION_SHADOWED, &[&name, &owner]);
                }
                self.validate_property(access, found, ty, role, flags);
                vec![property_result(found, ty)]
            }
            (None, Some(ext)) if !ext.is_accessor => {
                if in_call {
                    vec![ResolvedMember {
                        kind: ResolvedMemberKind::ExtensionFunction,
                        variable: ext.variable,
                        ty: ext.ty,
                    }]
                } else {
                    self.report_missing_member(access, &name, apparent, flags);
                    Vec::new()
                }
            }
            (None, Some(ext)) => {
                if in_call {
                    self.error_at_node(access, diagnostic_codes::EXTENSION_ACCESSOR_CALLED, &[&name]);
                    return Vec::new();
                }
                self.validate_accessor_use(access, ext.ty, role);
                vec![ResolvedMember {
                    kind: ResolvedMemberKind::ExtensionAccessor,
                    variable: ext.variable,
                    ty: ext.ty,
                }]
            }
            (None, None) => {
                self.report_missing_member(access, &name, apparent, flags);
                Vec::new()
            }
        };
        result
    }

    /// Look `name` up on an apparent type. Unions must have the member on
    /// every non-nullish constituent; the result type is the union of theirs.
    fn lookup_on_apparent(
        &mut self,
        apparent: TypeId,
        name: &str,
        flags: PropertySearchFlags,
    ) -> Option<(FoundProperty, TypeId)> {
        match self.ctx.types.get(apparent).clone() {
            TypeData::Object(_) => {
                let found = self.find_property(apparent, name, flags)?;
                let ty = self.type_of_member(found);
                Some((found, ty))
            }
            TypeData::Union(members) => {
                let mut first: Option<FoundProperty> = None;
                let mut types: SmallVec<[TypeId; 4]> = SmallVec::new();
                for member in members {
                    if self.ctx.types.is_nullish(member) {
                        continue;
                    }
                    let (found, ty) = self.lookup_on_apparent(member, name, flags)?;
                    first.get_or_insert(found);
                    types.push(ty);
                }
                let ty = self.ctx.types.union(&types);
                first.map(|found| (found, ty))
            }
            _ => None,
        }
    }

    fn report_missing_member(&mut self, access: NodeIndex, name: &str, apparent: TypeId, flags: PropertySearchFlags) {
        let type_name = self.format_type(apparent);
        let swapped = flags.with_swapped_staticness();
        if self.lookup_on_apparent(apparent, name, swapped).is_some() {
            if flags.searches_static() {
                self.error_at_node(access, diagnostic_codes::IS_INSTANCE_PROPERTY, &[name, &type_name]);
            } else {
                self.error_at_node(access, diagnostic_codes::IS_STATIC_PROPERTY, &[name, &type_name]);
            }
            return;
        }
        self.error_at_node(access, diagnostic_codes::PROPERTY_DOES_NOT_EXIST, &[name, &type_name]);
    }

    // =========================================================================
    // Validation
    // =========================================================================

    fn validate_property(
        &mut self,
        access: NodeIndex,
        found: FoundProperty,
        ty: TypeId,
        role: AccessRole,
        flags: PropertySearchFlags,
    ) {
        let variable_flags = self.ctx.binder.get(found.variable).flags;
        if variable_flags.contains(VariableFlags::METHOD) && self.ctx.types.function(ty).is_some() {
            if self.is_field_backed_accessor(found.variable) {
                // Still a field inside its own class.
                if variable_flags.contains(VariableFlags::READONLY) && role.writes() {
                    self.validate_readonly_assignment(access, found.variable);
                }
                return;
            }
            let has_accessors = self.has_signature_with(ty, SignatureFlags::GETTER_OR_SETTER);
            if self.has_plain_method(ty) && !has_accessors {
                if role != AccessRole::CallTarget && !flags.contains(PropertySearchFlags::IS_FUNCTIONAL) {
                    self.error_at_node(access, diagnostic_codes::METHOD_USED_IN_WRONG_CONTEXT, &[]);
                }
                return;
            }
            if has_accessors {
                self.validate_accessor_use(access, ty, role);
            }
            return;
        }
        if variable_flags.contains(VariableFlags::READONLY) && role.writes() {
            self.validate_readonly_assignment(access, found.variable);
        }
    }

    /// Reads need a getter, writes need a setter.
    fn validate_accessor_use(&mut self, access: NodeIndex, ty: TypeId, role: AccessRole) {
        if role.reads() && role != AccessRole::CallTarget && !self.has_signature_with(ty, SignatureFlags::GETTER) {
            self.error_at_node(access, diagnostic_codes::CANNOT_READ_WRITEONLY, &[]);
        }
        if role.writes() && !self.has_signature_with(ty, SignatureFlags::SETTER) {
            self.error_at_node(access, diagnostic_codes::CANNOT_ASSIGN_READONLY, &[]);
        }
    }

    /// A readonly field may only be assigned in a constructor (or static
    /// block, for static fields) of its own class, and only when it has no
    /// initializer.
    fn validate_readonly_assignment(&mut self, access: NodeIndex, variable: VariableId) {
        let var = self.ctx.binder.get(variable);
        let (decl, is_static, initialized, name) = (
            var.decl(),
            var.is_static(),
            var.flags.contains(VariableFlags::INITIALIZED),
            var.name.clone(),
        );
        let arena = self.ctx.arena;
        let declaring_class = arena.parent(decl);
        let function = arena.enclosing_function(access);
        let in_initializer = arena.get_method(function).is_some_and(|m| {
            let expected = if is_static { MethodKind::StaticBlock } else { MethodKind::Constructor };
            m.kind == expected && arena.parent(function) == declaring_class
        });
        if !in_initializer {
            self.error_at_node(access, diagnostic_codes::CANNOT_ASSIGN_READONLY, &[]);
        } else if initialized {
            self.error_at_node(access, diagnostic_codes::READONLY_FIELD_ALREADY_INITIALIZED, &[&name]);
        }
    }

    // =========================================================================
    // Extensions
    // =========================================================================

    /// Extension function or accessor named `name` applicable to `receiver`,
    /// looked for in global functions, global fields, then the nearest
    /// enclosing function scope.
    fn find_extension(&mut self, access: NodeIndex, name: &str, receiver: TypeId) -> Option<ExtensionCandidate> {
        let mut candidates: SmallVec<[VariableId; 3]> = SmallVec::new();
        if let Some(global) = self.ctx.binder.find_global(name) {
            let flags = self.ctx.binder.get(global).flags;
            if flags.contains(VariableFlags::METHOD) {
                candidates.insert(0, global);
            } else if flags.contains(VariableFlags::PROPERTY) {
                candidates.push(global);
            }
        }
        if let Some(scope) = self.ctx.binder.enclosing_function_scope(self.ctx.arena, access)
            && let Some(local) = self.ctx.binder.lookup(scope, name)
            && self.ctx.binder.get(local).has_flags(VariableFlags::LOCAL)
        {
            candidates.push(local);
        }

        for variable in candidates {
            let ty = self.type_of_variable(variable);
            let Some(function) = self.ctx.types.function(ty) else {
                continue;
            };
            let is_accessor = function.extension_accessor;
            let signatures = function.signatures.clone();
            for sig in signatures {
                let data = self.ctx.types.signature(sig);
                if !data.has(SignatureFlags::EXTENSION) {
                    continue;
                }
                let Some(receiver_param) = data.params.first().map(|p| p.ty) else {
                    continue;
                };
                if self.is_subtype(receiver, receiver_param) {
                    return Some(ExtensionCandidate {
                        variable,
                        ty,
                        is_accessor,
                    });
                }
            }
        }
        None
    }

    // =========================================================================
    // Dynamic properties
    // =========================================================================

    /// Property of a dynamically typed value: one synthesized variable per
    /// (type, name), typed dynamically.
    pub fn dynamic_property(&mut self, dynamic: TypeId, name: &str) -> VariableId {
        let key = (dynamic, name.to_string());
        if let Some(&variable) = self.ctx.dynamic_properties.get(&key) {
            return variable;
        }
        let variable = self
            .ctx
            .binder
            .add_synthetic_variable(name, NodeIndex::NONE, VariableFlags::PROPERTY | VariableFlags::PUBLIC);
        self.ctx.variable_types.insert(variable, dynamic);
        self.ctx.dynamic_properties.insert(key, variable);
        variable
    }

    /// Value type of a resolved member in a non-call position: the getter
    /// type for accessors, the member type otherwise.
    pub fn member_value_type(&self, member: &ResolvedMember) -> TypeId {
        let Some(function) = self.ctx.types.function(member.ty) else {
            return member.ty;
        };
        for &sig in &function.signatures {
            let data = self.ctx.types.signature(sig);
            if data.has(SignatureFlags::GETTER) {
                return data.return_type;
            }
        }
        for &sig in &function.signatures {
            let data = self.ctx.types.signature(sig);
            if data.has(SignatureFlags::SETTER) {
                return data.explicit_params().first().map_or(TypeId::ERROR, |p| p.ty);
            }
        }
        member.ty
    }
}

fn property_result(found: FoundProperty, ty: TypeId) -> ResolvedMember {
    ResolvedMember {
        kind: ResolvedMemberKind::Property,
        variable: found.variable,
        ty,
    }
}

#[cfg(test)]
#[path = "../tests/member_resolution_tests.rs"]
mod tests;
