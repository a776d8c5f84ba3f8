//! Member tables, variable types and signatures.

use ets_ast::node::{MethodKind, NodeKind};
use ets_ast::{ModifierFlags, NodeIndex};
use ets_binder::{MemberTable, VariableFlags, VariableId};
use smallvec::{SmallVec, smallvec};
use tracing::trace;

use crate::state::CheckerState;
use crate::type_graph::TypeMapping;
use crate::types::{
    FunctionType, ObjectFlags, ParamInfo, PropertySearchFlags, SignatureData, SignatureFlags, SignatureId,
    TypeData, TypeId,
};

/// A member found by a table search, with the object type it was found
/// through. The view carries the type arguments of generic ancestors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FoundProperty {
    pub variable: VariableId,
    pub table: MemberTable,
    pub view: TypeId,
}

impl<'a> CheckerState<'a> {
    // =========================================================================
    // Member tables
    // =========================================================================

    /// Fill the property tables of a declared class or interface from its
    /// binder scope. Instantiations share the tables of their base.
    pub fn resolve_members(&mut self, ty: TypeId) {
        let Some(object) = self.ctx.types.object(ty) else {
            return;
        };
        if object.flags.contains(ObjectFlags::MEMBERS_RESOLVED) {
            return;
        }
        let source = object.original_base;
        let decl = object.decl;
        if let Some(base) = source {
            self.resolve_members(base);
        }

        let mut tables: Vec<(MemberTable, String, VariableId)> = Vec::new();
        match source {
            Some(base) => {
                if let Some(base_object) = self.ctx.types.object(base) {
                    for table in MemberTable::ALL {
                        for (name, &var) in base_object.properties(table) {
                            tables.push((table, name.clone(), var));
                        }
                    }
                }
            }
            None => {
                if let Some(scope) = self.ctx.binder.class_scope(decl) {
                    tables.extend(scope.iter().map(|(table, name, var)| (table, name.to_string(), var)));
                }
            }
        }

        let constructors = self.ctx.binder.class_scope(decl).map(|s| s.constructors.clone()).unwrap_or_default();
        if let Some(object) = self.ctx.types.object_mut(ty) {
            for (table, name, var) in tables {
                object.properties_mut(table).entry(name).or_insert(var);
            }
            object.flags |= ObjectFlags::MEMBERS_RESOLVED;
        }
        trace!(ty = ty.0, "resolved member tables");

        if source.is_none() {
            self.resolve_construct_signatures(ty, &constructors);
        }
    }

    fn resolve_construct_signatures(&mut self, ty: TypeId, constructors: &[NodeIndex]) {
        let Some(object) = self.ctx.types.object(ty) else {
            return;
        };
        if !object.is_class() || !object.construct_signatures.is_empty() {
            return;
        }
        let name = object.name.clone();
        let mut signatures: Vec<SignatureId> = constructors
            .iter()
            .map(|&ctor| self.signature_of_function(ctor, ty))
            .collect();
        if signatures.is_empty() {
            // Implicit default constructor.
            signatures.push(self.ctx.types.alloc_signature(SignatureData {
                owner: ty,
                name,
                params: Vec::new(),
                return_type: TypeId::VOID,
                min_arg_count: 0,
                flags: SignatureFlags::CONSTRUCT | SignatureFlags::SYNTHETIC,
                decl: NodeIndex::NONE,
                type_params: Vec::new(),
            }));
        }
        if let Some(object) = self.ctx.types.object_mut(ty) {
            object.construct_signatures = signatures;
        }
    }

    /// Construct signatures of a class, resolving members first.
    pub fn construct_signatures_of(&mut self, ty: TypeId) -> Vec<SignatureId> {
        let base = self.generic_base_of(ty);
        self.resolve_members(base);
        self.ctx
            .types
            .object(base)
            .map(|o| o.construct_signatures.clone())
            .unwrap_or_default()
    }

    // =========================================================================
    // Property search
    // =========================================================================

    /// Search `ty` for `name` following `flags`: own fields, then methods and
    /// accessors, then nested declarations, then the super chain, then
    /// interfaces.
    pub fn find_property(&mut self, ty: TypeId, name: &str, flags: PropertySearchFlags) -> Option<FoundProperty> {
        self.find_property_at_depth(ty, name, flags, 0)
    }

    fn find_property_at_depth(
        &mut self,
        ty: TypeId,
        name: &str,
        flags: PropertySearchFlags,
        depth: usize,
    ) -> Option<FoundProperty> {
        if depth > ets_common::limits::MAX_HIERARCHY_DEPTH || !self.ctx.types.is_object(ty) {
            return None;
        }
        self.resolve_members(ty);
        if let Some(found) = self.find_own_property(ty, name, flags) {
            return Some(found);
        }
        if flags.contains(PropertySearchFlags::SEARCH_IN_BASE)
            && let Some(super_ty) = self.super_type_of(ty)
            && let Some(found) = self.find_property_at_depth(super_ty, name, flags, depth + 1)
        {
            return Some(found);
        }
        if flags.contains(PropertySearchFlags::SEARCH_IN_INTERFACES) {
            for iface in self.interfaces_of(ty) {
                if let Some(found) = self.find_property_at_depth(iface, name, flags, depth + 1) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Search only the tables of `ty` itself.
    pub fn find_own_property(&mut self, ty: TypeId, name: &str, flags: PropertySearchFlags) -> Option<FoundProperty> {
        self.resolve_members(ty);
        let object = self.ctx.types.object(ty)?;
        let order = [
            (PropertySearchFlags::SEARCH_INSTANCE_FIELD, MemberTable::InstanceField),
            (PropertySearchFlags::SEARCH_STATIC_FIELD, MemberTable::StaticField),
            (PropertySearchFlags::SEARCH_INSTANCE_METHOD, MemberTable::InstanceMethod),
            (PropertySearchFlags::SEARCH_STATIC_METHOD, MemberTable::StaticMethod),
            (PropertySearchFlags::SEARCH_INSTANCE_DECL, MemberTable::InstanceDecl),
            (PropertySearchFlags::SEARCH_STATIC_DECL, MemberTable::StaticDecl),
        ];
        order.into_iter().find_map(|(flag, table)| {
            if !flags.contains(flag) {
                return None;
            }
            object.property(table, name).map(|variable| FoundProperty {
                variable,
                table,
                view: ty,
            })
        })
    }

    /// Type of a member as seen through `view`.
    pub fn type_of_member(&mut self, found: FoundProperty) -> TypeId {
        let declared = self.type_of_variable(found.variable);
        let mapping = self.type_mapping(found.view);
        self.substitute(declared, &mapping)
    }

    // =========================================================================
    // Variable types
    // =========================================================================

    /// Type of a binder variable, memoized.
    pub fn type_of_variable(&mut self, var: VariableId) -> TypeId {
        if let Some(&ty) = self.ctx.variable_types.get(&var) {
            return ty;
        }
        // Placeholder against self-referential initializers.
        self.ctx.variable_types.insert(var, TypeId::ERROR);
        let ty = self.compute_variable_type(var);
        self.ctx.variable_types.insert(var, ty);
        ty
    }

    fn compute_variable_type(&mut self, var: VariableId) -> TypeId {
        let variable = self.ctx.binder.get(var);
        let flags = variable.flags;
        let name = variable.name.clone();
        let declarations: SmallVec<[NodeIndex; 2]> = variable.declarations.iter().copied().collect();
        let decl = variable.decl();
        let arena = self.ctx.arena;

        if flags.contains(VariableFlags::DYNAMIC_IMPORT) {
            let language = match arena.kind(decl) {
                Some(NodeKind::ImportDecl(import)) => import.language,
                _ => ets_common::Language::Js,
            };
            return self.ctx.types.dynamic(language);
        }

        match arena.kind(decl) {
            Some(NodeKind::ClassDecl(_) | NodeKind::InterfaceDecl(_)) => self.type_of_class_like(decl),
            Some(NodeKind::TypeParam(_)) => self.type_of_type_param(decl),
            Some(NodeKind::TypeAliasDecl(_)) => self.resolve_alias(decl),
            Some(NodeKind::ClassProperty(prop)) => {
                let (annotation, initializer) = (prop.type_annotation, prop.initializer);
                let owner = self.owner_type_of_member(decl);
                if self.ctx.types.is_interface(owner) {
                    return self.interface_property_type(var, decl, owner);
                }
                if annotation.is_some() {
                    self.resolve_type_node(annotation)
                } else if initializer.is_some() {
                    self.check_expression(initializer)
                } else {
                    TypeId::ERROR
                }
            }
            Some(NodeKind::Method(_)) => {
                let owner = self.owner_type_of_member(decl);
                let signatures: SmallVec<[SignatureId; 2]> = declarations
                    .iter()
                    .map(|&d| self.signature_of_function(d, owner))
                    .collect();
                self.ctx.types.alloc(TypeData::Function(FunctionType {
                    name,
                    signatures,
                    extension_accessor: false,
                }))
            }
            Some(NodeKind::FunctionDecl(_)) => {
                let mut extension_accessor = false;
                let signatures: SmallVec<[SignatureId; 2]> = declarations
                    .iter()
                    .map(|&d| {
                        if let Some(f) = arena.get_function_decl(d) {
                            extension_accessor |= f.function.receiver.is_some()
                                && matches!(f.kind, MethodKind::Getter | MethodKind::Setter);
                        }
                        self.signature_of_function(d, TypeId::GLOBAL)
                    })
                    .collect();
                self.ctx.types.alloc(TypeData::Function(FunctionType {
                    name,
                    signatures,
                    extension_accessor,
                }))
            }
            Some(NodeKind::Parameter(param)) => self.annotation_or(param.type_annotation, TypeId::ERROR),
            Some(NodeKind::VarDecl(var_decl)) => {
                let (annotation, initializer) = (var_decl.type_annotation, var_decl.initializer);
                if annotation.is_some() {
                    self.resolve_type_node(annotation)
                } else if initializer.is_some() {
                    self.check_expression(initializer)
                } else {
                    TypeId::ERROR
                }
            }
            _ => TypeId::ERROR,
        }
    }

    /// Class or interface type declaring a member node.
    pub(crate) fn owner_type_of_member(&mut self, member: NodeIndex) -> TypeId {
        let parent = self.ctx.arena.parent(member);
        match self.ctx.arena.kind(parent) {
            Some(NodeKind::ClassDecl(_) | NodeKind::InterfaceDecl(_)) => self.type_of_class_like(parent),
            _ => TypeId::GLOBAL,
        }
    }

    /// An interface property is a getter, plus a setter unless readonly.
    fn interface_property_type(&mut self, var: VariableId, decl: NodeIndex, owner: TypeId) -> TypeId {
        let Some(prop) = self.ctx.arena.get_property(decl) else {
            return TypeId::ERROR;
        };
        let (name, annotation, modifiers) = (prop.name.clone(), prop.type_annotation, prop.modifiers);
        let value_type = self.annotation_or(annotation, TypeId::ERROR);
        let mut signatures: SmallVec<[SignatureId; 2]> = smallvec![self.ctx.types.alloc_signature(SignatureData {
            owner,
            name: name.clone(),
            params: Vec::new(),
            return_type: value_type,
            min_arg_count: 0,
            flags: SignatureFlags::GETTER | SignatureFlags::ABSTRACT,
            decl,
            type_params: Vec::new(),
        })];
        if !modifiers.contains(ModifierFlags::READONLY) {
            signatures.push(self.ctx.types.alloc_signature(SignatureData {
                owner,
                name: name.clone(),
                params: vec![ParamInfo {
                    name: "value".to_string(),
                    ty: value_type,
                }],
                return_type: TypeId::VOID,
                min_arg_count: 1,
                flags: SignatureFlags::SETTER | SignatureFlags::ABSTRACT,
                decl,
                type_params: Vec::new(),
            }));
        }
        trace!(var = var.0, %name, "interface property accessors");
        self.ctx.types.alloc(TypeData::Function(FunctionType {
            name,
            signatures,
            extension_accessor: false,
        }))
    }

    // =========================================================================
    // Signatures
    // =========================================================================

    /// Signature of a method, constructor, function declaration or arrow,
    /// memoized per declaration.
    pub fn signature_of_function(&mut self, decl: NodeIndex, owner: TypeId) -> SignatureId {
        if let Some(&sig) = self.ctx.signature_of_decl.get(&decl) {
            return sig;
        }
        let arena = self.ctx.arena;
        let (name, kind, modifiers, function) = match arena.kind(decl) {
            Some(NodeKind::Method(m)) => (m.name.clone(), m.kind, m.modifiers, m.function.clone()),
            Some(NodeKind::FunctionDecl(f)) => (f.name.clone(), f.kind, f.modifiers, f.function.clone()),
            Some(NodeKind::ArrowFunction(f)) => ("lambda".to_string(), MethodKind::Method, ModifierFlags::empty(), f.clone()),
            _ => {
                debug_assert!(false, "node {} has no signature", decl.0);
                return self.ctx.types.alloc_signature(SignatureData {
                    owner: TypeId::GLOBAL,
                    name: String::new(),
                    params: Vec::new(),
                    return_type: TypeId::ERROR,
                    min_arg_count: 0,
                    flags: SignatureFlags::empty(),
                    decl,
                    type_params: Vec::new(),
                });
            }
        };
        self.resolve_local_type_params(decl);
        let type_params: Vec<TypeId> = function
            .type_params
            .iter()
            .filter_map(|p| self.ctx.decl_types.get(p).copied())
            .collect();

        let owner_is_interface = self.ctx.types.is_interface(owner);
        let mut flags = SignatureFlags::empty();
        match kind {
            MethodKind::Constructor => flags |= SignatureFlags::CONSTRUCT,
            MethodKind::Getter => flags |= SignatureFlags::GETTER,
            MethodKind::Setter => flags |= SignatureFlags::SETTER,
            MethodKind::Method | MethodKind::StaticBlock => {}
        }
        if modifiers.contains(ModifierFlags::STATIC) {
            flags |= SignatureFlags::STATIC;
        }
        if modifiers.contains(ModifierFlags::PRIVATE) {
            flags |= SignatureFlags::PRIVATE;
        }
        if modifiers.contains(ModifierFlags::PROTECTED) {
            flags |= SignatureFlags::PROTECTED;
        }
        if modifiers.contains(ModifierFlags::FINAL) {
            flags |= SignatureFlags::FINAL;
        }
        if modifiers.contains(ModifierFlags::NATIVE) {
            flags |= SignatureFlags::NATIVE;
        }
        if modifiers.contains(ModifierFlags::ABSTRACT) {
            flags |= SignatureFlags::ABSTRACT;
        }
        if owner_is_interface && !flags.contains(SignatureFlags::STATIC) {
            if function.body.is_some() {
                flags |= SignatureFlags::DEFAULT;
            } else {
                flags |= SignatureFlags::ABSTRACT;
            }
        }

        let mut params = Vec::with_capacity(function.params.len() + 1);
        let mut min_arg_count = 0;
        if function.receiver.is_some() {
            flags |= SignatureFlags::EXTENSION;
            let receiver = self.resolve_type_node(function.receiver);
            params.push(ParamInfo {
                name: "this".to_string(),
                ty: receiver,
            });
            min_arg_count += 1;
        }
        for &param in &function.params {
            let Some(data) = arena.get_parameter(param) else {
                continue;
            };
            let (param_name, annotation, optional) = (data.name.clone(), data.type_annotation, data.optional);
            let ty = self.annotation_or(annotation, TypeId::ERROR);
            if !optional {
                min_arg_count += 1;
            }
            params.push(ParamInfo { name: param_name, ty });
        }
        let return_type = self.annotation_or(function.return_type, TypeId::VOID);

        let sig = self.ctx.types.alloc_signature(SignatureData {
            owner,
            name,
            params,
            return_type,
            min_arg_count,
            flags,
            decl,
            type_params,
        });
        self.ctx.signature_of_decl.insert(decl, sig);
        sig
    }

    /// Function type for an annotation like `(int) => void`.
    pub(crate) fn create_function_type_from_parts(&mut self, name: &str, params: &[TypeId], return_type: TypeId) -> TypeId {
        let params = params
            .iter()
            .enumerate()
            .map(|(i, &ty)| ParamInfo {
                name: format!("p{i}"),
                ty,
            })
            .collect::<Vec<_>>();
        let min_arg_count = params.len();
        let sig = self.ctx.types.alloc_signature(SignatureData {
            owner: TypeId::GLOBAL,
            name: name.to_string(),
            params,
            return_type,
            min_arg_count,
            flags: SignatureFlags::empty(),
            decl: NodeIndex::NONE,
            type_params: Vec::new(),
        });
        self.ctx.types.alloc(TypeData::Function(FunctionType {
            name: name.to_string(),
            signatures: smallvec![sig],
            extension_accessor: false,
        }))
    }

    /// Copy of a function type with every signature substituted. Returns `ty`
    /// itself when nothing changes.
    pub(crate) fn substitute_function(&mut self, ty: TypeId, function: &FunctionType, mapping: &TypeMapping) -> TypeId {
        let mut changed = false;
        let mut signatures: SmallVec<[SignatureId; 2]> = SmallVec::new();
        for &sig in &function.signatures {
            let substituted = self.substitute_signature(sig, mapping);
            changed |= substituted != sig;
            signatures.push(substituted);
        }
        if !changed {
            return ty;
        }
        self.ctx.types.alloc(TypeData::Function(FunctionType {
            name: function.name.clone(),
            signatures,
            extension_accessor: function.extension_accessor,
        }))
    }

    pub(crate) fn substitute_signature(&mut self, sig: SignatureId, mapping: &TypeMapping) -> SignatureId {
        let data = self.ctx.types.signature(sig).clone();
        let params: Vec<ParamInfo> = data
            .params
            .iter()
            .map(|p| ParamInfo {
                name: p.name.clone(),
                ty: self.substitute(p.ty, mapping),
            })
            .collect();
        let return_type = self.substitute(data.return_type, mapping);
        if return_type == data.return_type && params.iter().zip(&data.params).all(|(a, b)| a.ty == b.ty) {
            return sig;
        }
        self.ctx.types.alloc_signature(SignatureData {
            params,
            return_type,
            ..data
        })
    }

    /// Signatures of a function-typed member.
    #[must_use]
    pub fn signatures_of(&self, ty: TypeId) -> SmallVec<[SignatureId; 2]> {
        self.ctx.types.function(ty).map(|f| f.signatures.clone()).unwrap_or_default()
    }

    /// Whether the function type has a signature with any of `flags`.
    #[must_use]
    pub fn has_signature_with(&self, ty: TypeId, flags: SignatureFlags) -> bool {
        self.signatures_of(ty)
            .iter()
            .any(|&s| self.ctx.types.signature(s).has(flags))
    }

    /// Whether the function type has an ordinary (non-accessor) signature.
    #[must_use]
    pub fn has_plain_method(&self, ty: TypeId) -> bool {
        self.signatures_of(ty)
            .iter()
            .any(|&s| !self.ctx.types.signature(s).is_accessor())
    }
}
