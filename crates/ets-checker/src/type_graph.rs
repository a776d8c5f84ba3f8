//! Type graph construction.
//!
//! Object types are created on first reference and their facets (super type,
//! interface set, type parameters) are resolved lazily. Each facet runs under
//! a resolution guard: re-entering a facet that is still in progress is a
//! cycle, which is reported once and settled with a fallback.

use ets_ast::node::NodeKind;
use ets_ast::{ModifierFlags, NodeIndex};
use ets_common::diagnostics::diagnostic_codes;
use indexmap::IndexSet;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::state::CheckerState;
use crate::type_nodes::is_reserved_type_name;
use crate::types::{
    Facet, FacetState, ObjectFlags, ObjectKind, ObjectType, TypeData, TypeId, TypeParameter,
};

/// Substitution from type parameters to arguments.
pub type TypeMapping = FxHashMap<TypeId, TypeId>;

/// Entry on a facet resolution stack; popped when the scope ends, including
/// on unwind.
struct FacetScope<'s, 'a> {
    state: &'s mut CheckerState<'a>,
    ty: TypeId,
    facet: Facet,
}

impl<'s, 'a> FacetScope<'s, 'a> {
    fn enter(state: &'s mut CheckerState<'a>, ty: TypeId, facet: Facet) -> Self {
        state.ctx.resolution_stacks[facet.index()].push(ty);
        Self { state, ty, facet }
    }
}

impl Drop for FacetScope<'_, '_> {
    fn drop(&mut self) {
        let popped = self.state.ctx.resolution_stacks[self.facet.index()].pop();
        debug_assert_eq!(popped, Some(self.ty), "unbalanced {:?} resolution stack", self.facet);
    }
}

impl<'a> CheckerState<'a> {
    // =========================================================================
    // Facet guard
    // =========================================================================

    /// Run `compute` for `facet` of `ty` unless already settled.
    ///
    /// Returns the facet state after the call. `InProgress` means the caller
    /// re-entered a facet under resolution, i.e. found a cycle.
    pub(crate) fn run_facet(
        &mut self,
        ty: TypeId,
        facet: Facet,
        compute: impl FnOnce(&mut Self) -> bool,
    ) -> FacetState {
        let Some(object) = self.ctx.types.object(ty) else {
            return FacetState::Resolved;
        };
        match object.facets.get(facet) {
            FacetState::Unresolved => {}
            state => return state,
        }
        self.set_facet(ty, facet, FacetState::InProgress);
        let ok = {
            let mut scope = FacetScope::enter(self, ty, facet);
            compute(&mut *scope.state)
        };
        let state = if ok { FacetState::Resolved } else { FacetState::Failed };
        self.set_facet(ty, facet, state);
        state
    }

    fn set_facet(&mut self, ty: TypeId, facet: Facet, state: FacetState) {
        if let Some(object) = self.ctx.types.object_mut(ty) {
            object.facets.set(facet, state);
        }
    }

    #[must_use]
    pub fn facet_state(&self, ty: TypeId, facet: Facet) -> FacetState {
        self.ctx
            .types
            .object(ty)
            .map_or(FacetState::Resolved, |o| o.facets.get(facet))
    }

    fn report_cycle(&mut self, at: NodeIndex, involved: TypeId) {
        let name = self.format_type(involved);
        debug!(%name, "inheritance cycle");
        self.error_at_node(at, diagnostic_codes::CYCLIC_INHERITANCE, &[&name]);
    }

    // =========================================================================
    // Declared types
    // =========================================================================

    /// Object type of a class or interface declaration.
    pub fn type_of_class_like(&mut self, decl: NodeIndex) -> TypeId {
        if let Some(&ty) = self.ctx.decl_types.get(&decl) {
            return ty;
        }
        let object = match self.ctx.arena.kind(decl) {
            Some(NodeKind::ClassDecl(class)) => {
                let mut flags = ObjectFlags::empty();
                if class.modifiers.contains(ModifierFlags::ABSTRACT) {
                    flags |= ObjectFlags::ABSTRACT;
                }
                if class.modifiers.contains(ModifierFlags::FINAL) {
                    flags |= ObjectFlags::FINAL;
                }
                if class.modifiers.contains(ModifierFlags::DECLARE) {
                    flags |= ObjectFlags::DECLARE;
                }
                if class.modifiers.contains(ModifierFlags::FUNCTIONAL) {
                    flags |= ObjectFlags::FUNCTIONAL;
                }
                if class.is_struct {
                    flags |= ObjectFlags::STRUCT;
                }
                ObjectType::new(&class.name, ObjectKind::Class, decl, flags)
            }
            Some(NodeKind::InterfaceDecl(iface)) => {
                let mut flags = ObjectFlags::ABSTRACT;
                if iface.modifiers.contains(ModifierFlags::DECLARE) {
                    flags |= ObjectFlags::DECLARE;
                }
                ObjectType::new(&iface.name, ObjectKind::Interface, decl, flags)
            }
            _ => return TypeId::ERROR,
        };
        let ty = self.ctx.types.alloc_object(object);
        trace!(name = %self.ctx.types.display(ty), ty = ty.0, "created object type");
        self.ctx.decl_types.insert(decl, ty);
        ty
    }

    /// Type of a type-parameter declaration, creating the owner's parameters
    /// on demand.
    pub(crate) fn type_of_type_param(&mut self, decl: NodeIndex) -> TypeId {
        if let Some(&ty) = self.ctx.decl_types.get(&decl) {
            return ty;
        }
        let owner = self.ctx.arena.parent(decl);
        match self.ctx.arena.kind(owner) {
            Some(NodeKind::ClassDecl(_) | NodeKind::InterfaceDecl(_)) => {
                let owner_ty = self.type_of_class_like(owner);
                self.resolve_type_parameters(owner_ty);
            }
            _ => self.resolve_local_type_params(owner),
        }
        self.ctx.decl_types.get(&decl).copied().unwrap_or(TypeId::ERROR)
    }

    // =========================================================================
    // Super type
    // =========================================================================

    /// Super type of `ty`, resolving it first. `None` for interfaces and the
    /// root object type.
    pub fn super_type_of(&mut self, ty: TypeId) -> Option<TypeId> {
        self.resolve_super(ty);
        self.ctx.types.object(ty).and_then(|o| o.super_type)
    }

    pub fn resolve_super(&mut self, ty: TypeId) -> FacetState {
        self.run_facet(ty, Facet::Super, |state| state.compute_super(ty))
    }

    fn compute_super(&mut self, ty: TypeId) -> bool {
        let Some(object) = self.ctx.types.object(ty) else {
            return true;
        };
        if let Some(base) = object.original_base {
            self.resolve_super(base);
            let base_super = self.ctx.types.object(base).and_then(|o| o.super_type);
            let mapping = self.type_mapping(ty);
            let super_type = base_super.map(|s| self.substitute(s, &mapping));
            if let Some(object) = self.ctx.types.object_mut(ty) {
                object.super_type = super_type;
            }
            return true;
        }
        if object.is_interface() {
            return true;
        }
        let decl = object.decl;
        let class_name = object.name.clone();
        let Some(class) = self.ctx.arena.get_class(decl) else {
            return true;
        };
        let super_node = class.super_class;
        if super_node.is_none() {
            self.set_super(ty, TypeId::OBJECT);
            return true;
        }

        if let Some(type_ref) = self.ctx.arena.get_type_ref(super_node)
            && is_reserved_type_name(&type_ref.name)
        {
            let name = type_ref.name.clone();
            self.error_at_node(super_node, diagnostic_codes::RESERVED_NAME_AS_SUPER_TYPE, &[&name]);
            self.set_super(ty, TypeId::OBJECT);
            return false;
        }

        let super_ty = self.resolve_type_node(super_node);
        if super_ty.is_error() {
            self.set_super(ty, TypeId::OBJECT);
            return false;
        }
        let Some(super_object) = self.ctx.types.object(super_ty) else {
            self.error_at_node(super_node, diagnostic_codes::SUPER_TYPE_NOT_EXTENSIBLE, &[&class_name]);
            self.set_super(ty, TypeId::OBJECT);
            return false;
        };
        if !super_object.is_class() {
            self.error_at_node(super_node, diagnostic_codes::SUPER_TYPE_NOT_EXTENSIBLE, &[&class_name]);
            self.set_super(ty, TypeId::OBJECT);
            return false;
        }
        let super_flags = super_object.flags;
        let super_base = super_object.generic_base(super_ty);

        // Walk up first so that a cycle is seen from inside the loop.
        if self.resolve_super(super_base) == FacetState::InProgress {
            self.report_cycle(super_node, super_base);
            self.set_super(ty, TypeId::OBJECT);
            return false;
        }

        let mut ok = true;
        if super_flags.contains(ObjectFlags::STRUCT) {
            let name = self.format_type(super_ty);
            self.error_at_node(super_node, diagnostic_codes::STRUCT_NOT_EXTENSIBLE, &[&name]);
            ok = false;
        }
        if super_flags.contains(ObjectFlags::FINAL) {
            // Still linked so that member lookup keeps working.
            self.error_at_node(super_node, diagnostic_codes::CANNOT_INHERIT_FINAL, &[]);
            ok = false;
        }
        debug!(class = %class_name, super_type = %self.format_type(super_ty), "resolved super type");
        self.set_super(ty, super_ty);
        ok
    }

    fn set_super(&mut self, ty: TypeId, super_ty: TypeId) {
        if let Some(object) = self.ctx.types.object_mut(ty) {
            object.super_type = Some(super_ty);
        }
    }

    // =========================================================================
    // Interfaces
    // =========================================================================

    /// Directly implemented (or extended) interfaces, in declaration order.
    pub fn interfaces_of(&mut self, ty: TypeId) -> Vec<TypeId> {
        self.resolve_interfaces(ty);
        self.ctx
            .types
            .object(ty)
            .map(|o| o.interfaces.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn resolve_interfaces(&mut self, ty: TypeId) -> FacetState {
        self.run_facet(ty, Facet::Interfaces, |state| state.compute_interfaces(ty))
    }

    fn compute_interfaces(&mut self, ty: TypeId) -> bool {
        let Some(object) = self.ctx.types.object(ty) else {
            return true;
        };
        if let Some(base) = object.original_base {
            self.resolve_interfaces(base);
            let base_ifaces: Vec<TypeId> = self
                .ctx
                .types
                .object(base)
                .map(|o| o.interfaces.iter().copied().collect())
                .unwrap_or_default();
            let mapping = self.type_mapping(ty);
            let ifaces: IndexSet<TypeId> = base_ifaces.into_iter().map(|i| self.substitute(i, &mapping)).collect();
            if let Some(object) = self.ctx.types.object_mut(ty) {
                object.interfaces = ifaces;
            }
            return true;
        }

        let decl = object.decl;
        let nodes: Vec<NodeIndex> = match self.ctx.arena.kind(decl) {
            Some(NodeKind::ClassDecl(class)) => class.implements.clone(),
            Some(NodeKind::InterfaceDecl(iface)) => iface.extends.clone(),
            _ => return true,
        };

        let mut ok = true;
        let mut interfaces: IndexSet<TypeId> = IndexSet::new();
        let mut first_node_of: FxHashMap<TypeId, NodeIndex> = FxHashMap::default();
        let mut repeated_bases: FxHashSet<TypeId> = FxHashSet::default();
        let mut conflicting_bases: FxHashSet<TypeId> = FxHashSet::default();

        for node in nodes {
            let iface = self.resolve_type_node(node);
            if iface.is_error() {
                ok = false;
                continue;
            }
            let Some(iface_object) = self.ctx.types.object(iface) else {
                self.error_at_node(node, diagnostic_codes::INTERFACE_EXPECTED, &[]);
                ok = false;
                continue;
            };
            if !iface_object.is_interface() {
                self.error_at_node(node, diagnostic_codes::INTERFACE_EXPECTED, &[]);
                ok = false;
                continue;
            }
            let generic_base = iface_object.generic_base(iface);

            if self.resolve_interfaces(generic_base) == FacetState::InProgress {
                self.report_cycle(node, generic_base);
                ok = false;
                continue;
            }

            if interfaces.contains(&iface) {
                self.error_at_node(node, diagnostic_codes::REPEATED_INTERFACE, &[]);
                repeated_bases.insert(generic_base);
                ok = false;
                continue;
            }
            first_node_of.insert(iface, node);
            interfaces.insert(iface);
        }

        // Two instantiations of one generic interface. Reported once per base,
        // and not at all when the base was already reported as repeated.
        let list: Vec<TypeId> = interfaces.iter().copied().collect();
        for (i, &later) in list.iter().enumerate() {
            let later_base = self.generic_base_of(later);
            if repeated_bases.contains(&later_base) || conflicting_bases.contains(&later_base) {
                continue;
            }
            let conflicts = list[..i]
                .iter()
                .any(|&earlier| earlier != later && self.generic_base_of(earlier) == later_base);
            if conflicts {
                conflicting_bases.insert(later_base);
                let name = self.ctx.types.object(later_base).map(|o| o.name.clone()).unwrap_or_default();
                let at = first_node_of.get(&later).copied().unwrap_or(decl);
                self.error_at_node(at, diagnostic_codes::CONFLICTING_GENERIC_INTERFACE, &[&name]);
                ok = false;
            }
        }

        trace!(ty = ty.0, count = interfaces.len(), "resolved interfaces");
        if let Some(object) = self.ctx.types.object_mut(ty) {
            object.interfaces = interfaces;
        }
        ok
    }

    #[must_use]
    pub(crate) fn generic_base_of(&self, ty: TypeId) -> TypeId {
        self.ctx.types.object(ty).map_or(ty, |o| o.generic_base(ty))
    }

    /// Every interface reachable from `ty` through supers and interfaces,
    /// nearest first, each listed once.
    pub fn all_interfaces(&mut self, ty: TypeId) -> Vec<TypeId> {
        let mut seen: IndexSet<TypeId> = IndexSet::new();
        let mut queue: Vec<TypeId> = Vec::new();
        let mut current = Some(ty);
        while let Some(class) = current {
            queue.extend(self.interfaces_of(class));
            current = self.super_type_of(class);
        }
        let mut next = 0;
        while next < queue.len() {
            let iface = queue[next];
            next += 1;
            if seen.insert(iface) {
                let parents = self.interfaces_of(iface);
                queue.extend(parents);
            }
        }
        seen.into_iter().collect()
    }

    // =========================================================================
    // Type parameters
    // =========================================================================

    /// Declared type parameters of a class or interface type.
    pub fn type_params_of(&mut self, ty: TypeId) -> Vec<TypeId> {
        self.resolve_type_parameters(ty);
        self.ctx.types.object(ty).map(|o| o.type_params.clone()).unwrap_or_default()
    }

    pub fn resolve_type_parameters(&mut self, ty: TypeId) -> FacetState {
        self.run_facet(ty, Facet::TypeParams, |state| state.compute_type_parameters(ty))
    }

    fn compute_type_parameters(&mut self, ty: TypeId) -> bool {
        let Some(object) = self.ctx.types.object(ty) else {
            return true;
        };
        if object.original_base.is_some() {
            return true;
        }
        let decl = object.decl;
        let params: Vec<NodeIndex> = match self.ctx.arena.kind(decl) {
            Some(NodeKind::ClassDecl(class)) => class.type_params.clone(),
            Some(NodeKind::InterfaceDecl(iface)) => iface.type_params.clone(),
            _ => return true,
        };
        if params.is_empty() {
            return true;
        }

        // Phase 1: placeholders, so that constraints can mention siblings.
        let (param_types, mut ok) = self.create_type_param_placeholders(&params);
        if let Some(object) = self.ctx.types.object_mut(ty) {
            object.type_params = param_types;
        }

        // Phase 2: real constraints and defaults.
        ok &= self.resolve_type_param_constraints(&params);
        ok
    }

    /// Type parameters of a method, function or alias. Not facet-guarded:
    /// nothing outside the declaration can reach them.
    pub(crate) fn resolve_local_type_params(&mut self, owner: NodeIndex) {
        let params: Vec<NodeIndex> = match self.ctx.arena.kind(owner) {
            Some(NodeKind::Method(m)) => m.function.type_params.clone(),
            Some(NodeKind::FunctionDecl(f)) => f.function.type_params.clone(),
            Some(NodeKind::ArrowFunction(f)) => f.type_params.clone(),
            Some(NodeKind::TypeAliasDecl(a)) => a.type_params.clone(),
            _ => return,
        };
        if params.is_empty() || self.ctx.decl_types.contains_key(&params[0]) {
            return;
        }
        self.create_type_param_placeholders(&params);
        self.resolve_type_param_constraints(&params);
    }

    fn create_type_param_placeholders(&mut self, params: &[NodeIndex]) -> (Vec<TypeId>, bool) {
        let mut ok = true;
        let mut seen: FxHashSet<String> = FxHashSet::default();
        let mut types = Vec::with_capacity(params.len());
        for &param in params {
            let Some(data) = self.ctx.arena.get_type_param(param) else {
                continue;
            };
            let name = data.name.clone();
            if !seen.insert(name.clone()) {
                self.error_at_node(param, diagnostic_codes::DUPLICATE_TYPE_PARAMETER, &[&name]);
                ok = false;
            }
            let ty = self.ctx.types.alloc(TypeData::TypeParameter(TypeParameter {
                name,
                decl: param,
                constraint: TypeId::NULLISH_OBJECT,
                default: None,
            }));
            self.ctx.decl_types.insert(param, ty);
            types.push(ty);
        }
        (types, ok)
    }

    fn resolve_type_param_constraints(&mut self, params: &[NodeIndex]) -> bool {
        let mut ok = true;
        let position: FxHashMap<String, usize> = params
            .iter()
            .enumerate()
            .filter_map(|(i, &p)| self.ctx.arena.get_type_param(p).map(|d| (d.name.clone(), i)))
            .collect();

        // Syntax scan: defaults may only mention earlier parameters, and a
        // constraint that is a bare sibling reference must not loop.
        for (i, &param) in params.iter().enumerate() {
            let Some(data) = self.ctx.arena.get_type_param(param) else {
                continue;
            };
            for name in self.referenced_names(data.default) {
                if position.get(&name).is_some_and(|&j| j >= i) {
                    self.error_at_node(param, diagnostic_codes::TYPE_PARAMETER_USED_BEFORE_DEFINED, &[&name]);
                    ok = false;
                }
            }
        }
        let mut circular = vec![false; params.len()];
        for (i, flag) in circular.iter_mut().enumerate() {
            let mut visited = FxHashSet::default();
            let mut current = i;
            while let Some(next) = self.bare_sibling_constraint(params[current], &position) {
                if next == i {
                    *flag = true;
                    break;
                }
                if !visited.insert(next) {
                    break;
                }
                current = next;
            }
        }
        for (i, &param) in params.iter().enumerate() {
            if circular[i] {
                let name = self.ctx.arena.name_of(param).unwrap_or_default().to_string();
                self.error_at_node(param, diagnostic_codes::CIRCULAR_CONSTRAINT, &[&name]);
                ok = false;
            }
        }

        let mut resolved = vec![false; params.len()];
        for i in 0..params.len() {
            ok &= self.resolve_type_param_at(params, i, &position, &circular, &mut resolved);
        }
        ok
    }

    /// Resolve parameter `i`, resolving siblings its constraint names first.
    fn resolve_type_param_at(
        &mut self,
        params: &[NodeIndex],
        i: usize,
        position: &FxHashMap<String, usize>,
        circular: &[bool],
        resolved: &mut [bool],
    ) -> bool {
        if resolved[i] {
            return true;
        }
        resolved[i] = true;
        let param = params[i];
        let Some(data) = self.ctx.arena.get_type_param(param) else {
            return true;
        };
        let (constraint_node, default_node) = (data.constraint, data.default);
        let Some(&param_ty) = self.ctx.decl_types.get(&param) else {
            return true;
        };

        let mut ok = true;
        if constraint_node.is_some() && !circular[i] {
            for name in self.referenced_names(constraint_node) {
                if let Some(&j) = position.get(&name)
                    && j != i
                {
                    ok &= self.resolve_type_param_at(params, j, position, circular, resolved);
                }
            }
            let constraint = self.resolve_type_node(constraint_node);
            let constraint = if self.is_primitive(constraint) {
                self.error_at_node(constraint_node, diagnostic_codes::EXTENDS_CONSTRAINT_NOT_OBJECT, &[]);
                ok = false;
                TypeId::NULLISH_OBJECT
            } else if constraint.is_error() {
                ok = false;
                TypeId::NULLISH_OBJECT
            } else {
                constraint
            };
            if let Some(tp) = self.ctx.types.type_param_mut(param_ty) {
                tp.constraint = constraint;
            }
        }
        if default_node.is_some() {
            let default = self.resolve_type_node(default_node);
            if let Some(tp) = self.ctx.types.type_param_mut(param_ty) {
                tp.default = Some(default);
            }
        }
        ok
    }

    /// Sibling index when a constraint is exactly a reference to a sibling.
    fn bare_sibling_constraint(&self, param: NodeIndex, position: &FxHashMap<String, usize>) -> Option<usize> {
        let constraint = self.ctx.arena.get_type_param(param)?.constraint;
        let type_ref = self.ctx.arena.get_type_ref(constraint)?;
        if !type_ref.type_args.is_empty() {
            return None;
        }
        position.get(&type_ref.name).copied()
    }

    /// Names of all type references inside a type node.
    fn referenced_names(&self, node: NodeIndex) -> SmallVec<[String; 2]> {
        let mut names = SmallVec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            let Some(kind) = self.ctx.arena.kind(current) else {
                continue;
            };
            if let NodeKind::TypeRef(type_ref) = kind {
                names.push(type_ref.name.clone());
            }
            stack.extend(kind.children());
        }
        names
    }

    // =========================================================================
    // Instantiation and substitution
    // =========================================================================

    /// `base<args>`, identity-unique per argument list.
    pub fn instantiate(&mut self, base: TypeId, args: &[TypeId]) -> TypeId {
        if args.is_empty() {
            return base;
        }
        let key: SmallVec<[TypeId; 2]> = args.iter().copied().collect();
        if let Some(&ty) = self.ctx.instantiations.get(&(base, key.clone())) {
            return ty;
        }
        let Some(base_object) = self.ctx.types.object(base) else {
            return TypeId::ERROR;
        };
        let mut object = ObjectType::new(&base_object.name, base_object.kind, base_object.decl, base_object.flags);
        object.flags -= ObjectFlags::MEMBERS_RESOLVED | ObjectFlags::OVERRIDES_VALIDATED;
        object.type_args = args.to_vec();
        object.original_base = Some(base);
        object.facets.set(Facet::TypeParams, FacetState::Resolved);
        let ty = self.ctx.types.alloc_object(object);
        self.ctx.instantiations.insert((base, key), ty);
        trace!(base = base.0, ty = ty.0, "new instantiation");
        ty
    }

    /// Mapping from the generic base's parameters to `view`'s arguments.
    pub fn type_mapping(&mut self, view: TypeId) -> TypeMapping {
        let Some(object) = self.ctx.types.object(view) else {
            return TypeMapping::default();
        };
        let Some(base) = object.original_base else {
            return TypeMapping::default();
        };
        let args = object.type_args.clone();
        let params = self.type_params_of(base);
        params.into_iter().zip(args).collect()
    }

    pub fn substitute(&mut self, ty: TypeId, mapping: &TypeMapping) -> TypeId {
        if mapping.is_empty() {
            return ty;
        }
        match self.ctx.types.get(ty).clone() {
            TypeData::TypeParameter(_) => mapping.get(&ty).copied().unwrap_or(ty),
            TypeData::Object(object) => {
                let Some(base) = object.original_base else {
                    return ty;
                };
                let args: Vec<TypeId> = object.type_args.iter().map(|&a| self.substitute(a, mapping)).collect();
                if args == object.type_args {
                    return ty;
                }
                self.instantiate(base, &args)
            }
            TypeData::Union(members) => {
                let members: SmallVec<[TypeId; 4]> = members.iter().map(|&m| self.substitute(m, mapping)).collect();
                self.ctx.types.union(&members)
            }
            TypeData::NonNullish(inner) => {
                let inner = self.substitute(inner, mapping);
                self.ctx.types.non_nullish(inner)
            }
            TypeData::Utility { kind, inner } => {
                let inner = self.substitute(inner, mapping);
                self.ctx.types.utility(kind, inner)
            }
            TypeData::Function(function) => self.substitute_function(ty, &function, mapping),
            _ => ty,
        }
    }

    // =========================================================================
    // Apparent type
    // =========================================================================

    /// The type whose members an access on `ty` sees: type parameters become
    /// their constraint, wrappers are unwrapped.
    pub fn apparent_type(&mut self, ty: TypeId) -> TypeId {
        if let Some(&apparent) = self.ctx.apparent_types.get(&ty) {
            return apparent;
        }
        let apparent = match self.ctx.types.get(ty).clone() {
            TypeData::TypeParameter(tp) => {
                if tp.constraint == ty {
                    TypeId::OBJECT
                } else {
                    self.apparent_type(tp.constraint)
                }
            }
            TypeData::NonNullish(inner) => {
                let inner = self.apparent_type(inner);
                self.ctx.types.non_nullish(inner)
            }
            TypeData::Utility { inner, .. } => self.apparent_type(inner),
            TypeData::Union(members) => {
                let members: SmallVec<[TypeId; 4]> = members.iter().map(|&m| self.apparent_type(m)).collect();
                self.ctx.types.union(&members)
            }
            _ => ty,
        };
        // Placeholder constraints are still being resolved; don't pin them.
        if !self.is_pending_type_param(ty) {
            self.ctx.apparent_types.insert(ty, apparent);
        }
        apparent
    }

    fn is_pending_type_param(&self, ty: TypeId) -> bool {
        let Some(tp) = self.ctx.types.type_param(ty) else {
            return false;
        };
        tp.constraint == TypeId::NULLISH_OBJECT
            && self
                .ctx
                .arena
                .get_type_param(tp.decl)
                .is_some_and(|d| d.constraint.is_some())
    }

    // =========================================================================
    // Ancestry
    // =========================================================================

    /// Whether class `ty` is `ancestor` or extends it, directly or not.
    pub fn is_descendant_of(&mut self, ty: TypeId, ancestor: TypeId) -> bool {
        let mut current = Some(ty);
        let mut depth = 0;
        while let Some(class) = current {
            if class == ancestor {
                return true;
            }
            depth += 1;
            if depth > ets_common::limits::MAX_HIERARCHY_DEPTH {
                return false;
            }
            current = self.super_type_of(class);
        }
        false
    }

    /// Nearest class both `a` and `b` descend from.
    pub fn closest_common_ancestor(&mut self, a: TypeId, b: TypeId) -> TypeId {
        if !self.ctx.types.is_class(a) || !self.ctx.types.is_class(b) {
            return TypeId::OBJECT;
        }
        let mut current = Some(a);
        while let Some(candidate) = current {
            if self.is_descendant_of(b, candidate) {
                return candidate;
            }
            current = self.super_type_of(candidate);
        }
        TypeId::OBJECT
    }
}

#[cfg(test)]
#[path = "../tests/type_graph_tests.rs"]
mod tests;
