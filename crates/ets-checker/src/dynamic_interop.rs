//! Bridges to dynamically typed foreign code.
//!
//! A call or `new` on a dynamic value is lowered to a static native method
//! on a synthetic class per (language, call kind). Methods are keyed by the
//! mangled argument signature and synthesized at most once. Dynamic values
//! assigned to a functional interface are wrapped in a synthetic lambda
//! object class, one per invoke signature shape.

use ets_ast::node::{MethodKind, NodeKind};
use ets_ast::{AstEdit, ClassTarget, ModifierFlags, NodeIndex, SyntheticMember};
use ets_binder::{MemberTable, VariableFlags, VariableId};
use ets_common::Language;
use ets_common::diagnostics::diagnostic_codes;
use smallvec::smallvec;
use tracing::{debug, trace};

use crate::context::DynamicCallKey;
use crate::state::CheckerState;
use crate::types::{
    Facet, FacetState, FunctionType, ObjectFlags, ObjectKind, ObjectType, ParamInfo, SignatureData, SignatureFlags,
    SignatureId, TypeData, TypeId,
};

const CALL_METHOD: &str = "call";
const NEW_METHOD: &str = "instantiate";

impl<'a> CheckerState<'a> {
    /// Signature of the bridge method for a dynamic call (`is_construct`
    /// false) or `new` (true) with `callee` and `args`.
    pub fn resolve_dynamic_call(
        &mut self,
        callee: NodeIndex,
        args: &[NodeIndex],
        language: Language,
        is_construct: bool,
    ) -> SignatureId {
        let dynamic = self.ctx.types.dynamic(language);
        let arg_types: Vec<TypeId> = args
            .iter()
            .map(|&arg| {
                if matches!(self.ctx.arena.kind(arg), Some(NodeKind::ArrowFunction(_))) {
                    self.check_expression(arg);
                    dynamic
                } else {
                    self.check_expression(arg)
                }
            })
            .collect();
        let by_name = self.has_qualified_name(callee);

        let mut signature = String::from(if is_construct { "dynnew" } else { "dyncall" });
        for &ty in &arg_types {
            signature.push('-');
            signature.push_str(&self.ctx.types.assembler_name(ty));
        }
        if !by_name {
            signature.push_str("-byvalue");
        }
        let key = DynamicCallKey {
            language,
            is_construct,
            signature,
        };
        if let Some(&sig) = self.ctx.dynamic_call_cache.get(&key) {
            trace!(key = %key.signature, "dynamic call cache hit");
            return sig;
        }

        let class = self.dynamic_class(language, is_construct);
        let mut params = vec![ParamInfo {
            name: "obj".to_string(),
            ty: dynamic,
        }];
        if by_name {
            params.push(ParamInfo {
                name: "qname_start".to_string(),
                ty: TypeId::INT,
            });
            params.push(ParamInfo {
                name: "qname_len".to_string(),
                ty: TypeId::INT,
            });
        } else if !is_construct {
            params.push(ParamInfo {
                name: "this_value".to_string(),
                ty: dynamic,
            });
        }
        for (i, &ty) in arg_types.iter().enumerate() {
            params.push(ParamInfo {
                name: format!("p{i}"),
                ty,
            });
        }

        let method_name = if is_construct { NEW_METHOD } else { CALL_METHOD };
        let edit_params = params
            .iter()
            .map(|p| (p.name.clone(), self.ctx.types.edit_text(p.ty)))
            .collect();
        let min_arg_count = params.len();
        let sig = self.ctx.types.alloc_signature(SignatureData {
            owner: class,
            name: method_name.to_string(),
            params,
            return_type: dynamic,
            min_arg_count,
            flags: SignatureFlags::STATIC | SignatureFlags::NATIVE | SignatureFlags::SYNTHETIC,
            decl: NodeIndex::NONE,
            type_params: Vec::new(),
        });
        self.add_bridge_overload(class, method_name, sig);

        let class_name = self.format_type(class);
        self.ctx.edits.push(AstEdit::AddMember {
            class: ClassTarget::Synthetic(class_name),
            member: SyntheticMember::Method {
                name: method_name.to_string(),
                kind: MethodKind::Method,
                params: edit_params,
                return_type: self.ctx.types.edit_text(dynamic),
                modifiers: ModifierFlags::PUBLIC | ModifierFlags::STATIC | ModifierFlags::NATIVE,
            },
        });
        self.ctx.dynamic_syntheses += 1;
        self.validate_overriding(class);
        debug!(key = %key.signature, %language, is_construct, "synthesized dynamic bridge");
        self.ctx.dynamic_call_cache.insert(key, sig);
        sig
    }

    /// Whether the callee names a member path rooted at a dynamic import,
    /// so the runtime can look it up by name.
    fn has_qualified_name(&self, callee: NodeIndex) -> bool {
        let arena = self.ctx.arena;
        let variable = match arena.kind(callee) {
            Some(NodeKind::TypeRef(type_ref)) => {
                let first = type_ref.name.split('.').next().unwrap_or_default();
                self.ctx.binder.resolved(callee).or_else(|| self.ctx.binder.find_global(first))
            }
            Some(NodeKind::Identifier(_)) => self.ctx.binder.resolved(callee),
            Some(NodeKind::Member(_)) => {
                let root = arena.member_chain_root(callee);
                match arena.kind(root) {
                    Some(NodeKind::Identifier(_)) => self.ctx.binder.resolved(root),
                    _ => None,
                }
            }
            _ => None,
        };
        variable.is_some_and(|v| self.ctx.binder.get(v).has_flags(VariableFlags::DYNAMIC_IMPORT))
    }

    /// Backing class for bridge methods of one language and call kind.
    fn dynamic_class(&mut self, language: Language, is_construct: bool) -> TypeId {
        if let Some(&class) = self.ctx.dynamic_classes.get(&(language, is_construct)) {
            return class;
        }
        let name = format!("{}{}", language.tag(), if is_construct { "New" } else { "Call" });
        let class = self.synthetic_class(&name, ObjectFlags::DYNAMIC_BRIDGE | ObjectFlags::FINAL, None);
        self.ctx.edits.push(AstEdit::AddClass {
            name,
            super_class: None,
            implements: Vec::new(),
            modifiers: ModifierFlags::FINAL,
        });
        self.ctx.dynamic_classes.insert((language, is_construct), class);
        class
    }

    /// A class with no declaration: super is the root object type, the
    /// type graph facets are settled up front.
    fn synthetic_class(&mut self, name: &str, flags: ObjectFlags, implements: Option<TypeId>) -> TypeId {
        let mut object = ObjectType::new(name, ObjectKind::Class, NodeIndex::NONE, flags | ObjectFlags::MEMBERS_RESOLVED);
        object.super_type = Some(TypeId::OBJECT);
        if let Some(iface) = implements {
            object.interfaces.insert(iface);
        }
        for facet in [Facet::Super, Facet::Interfaces, Facet::TypeParams] {
            object.facets.set(facet, FacetState::Resolved);
        }
        self.ctx.types.alloc_object(object)
    }

    /// Add `sig` to the overload set of the static method `name` of `class`.
    fn add_bridge_overload(&mut self, class: TypeId, name: &str, sig: SignatureId) {
        let existing = self
            .ctx
            .types
            .object(class)
            .and_then(|o| o.property(MemberTable::StaticMethod, name));
        let variable = match existing {
            Some(variable) => variable,
            None => {
                let flags = VariableFlags::METHOD | VariableFlags::STATIC | VariableFlags::PUBLIC | VariableFlags::SYNTHETIC;
                let variable = self.ctx.binder.add_synthetic_variable(name, NodeIndex::NONE, flags);
                if let Some(object) = self.ctx.types.object_mut(class) {
                    object
                        .properties_mut(MemberTable::StaticMethod)
                        .insert(name.to_string(), variable);
                }
                variable
            }
        };
        let mut signatures = self
            .ctx
            .variable_types
            .get(&variable)
            .and_then(|&ty| self.ctx.types.function(ty))
            .map(|f| f.signatures.clone())
            .unwrap_or_default();
        signatures.push(sig);
        let ty = self.ctx.types.alloc(TypeData::Function(FunctionType {
            name: name.to_string(),
            signatures,
            extension_accessor: false,
        }));
        self.ctx.variable_types.insert(variable, ty);
    }

    // =========================================================================
    // Lambda objects
    // =========================================================================

    /// Constructor of the lambda object class adapting a dynamic callable to
    /// functional interface `iface`. `None` when `iface` is not functional;
    /// that is reported at `at`.
    pub fn resolve_lambda_object(&mut self, iface: TypeId, language: Language, at: NodeIndex) -> Option<SignatureId> {
        let Some(invoke) = self.functional_invoke(iface) else {
            let name = self.format_type(iface);
            self.error_at_node(at, diagnostic_codes::NOT_A_FUNCTIONAL_INTERFACE, &[&name]);
            return None;
        };
        let data = self.ctx.types.signature(invoke.1).clone();
        let iface_name = self.format_type(iface);
        // One class per interface: it implements exactly that interface.
        let mut class_name = String::from("LambdaObject-");
        class_name.extend(iface_name.chars().map(|c| if c.is_alphanumeric() { c } else { '_' }));
        for param in data.explicit_params() {
            class_name.push('-');
            class_name.push_str(&self.ctx.types.assembler_name(param.ty));
        }
        if let Some(&ctor) = self.ctx.lambda_object_cache.get(&class_name) {
            trace!(%class_name, "lambda object cache hit");
            return Some(ctor);
        }

        let dynamic = self.ctx.types.dynamic(language);
        let class = self.synthetic_class(&class_name, ObjectFlags::DYNAMIC_BRIDGE | ObjectFlags::FINAL, Some(iface));

        let field = self.ctx.binder.add_synthetic_variable(
            "jsvalue_lambda",
            NodeIndex::NONE,
            VariableFlags::PROPERTY | VariableFlags::PUBLIC | VariableFlags::SYNTHETIC,
        );
        self.ctx.variable_types.insert(field, dynamic);

        let ctor = self.ctx.types.alloc_signature(SignatureData {
            owner: class,
            name: class_name.clone(),
            params: vec![ParamInfo {
                name: "lambda".to_string(),
                ty: dynamic,
            }],
            return_type: TypeId::VOID,
            min_arg_count: 1,
            flags: SignatureFlags::CONSTRUCT | SignatureFlags::SYNTHETIC,
            decl: NodeIndex::NONE,
            type_params: Vec::new(),
        });
        let invoke_sig = self.ctx.types.alloc_signature(SignatureData {
            owner: class,
            flags: SignatureFlags::NATIVE | SignatureFlags::SYNTHETIC,
            decl: NodeIndex::NONE,
            ..data.clone()
        });
        let invoke_var = self.ctx.binder.add_synthetic_variable(
            &invoke.0,
            NodeIndex::NONE,
            VariableFlags::METHOD | VariableFlags::PUBLIC | VariableFlags::SYNTHETIC,
        );
        let invoke_ty = self.ctx.types.alloc(TypeData::Function(FunctionType {
            name: invoke.0.clone(),
            signatures: smallvec![invoke_sig],
            extension_accessor: false,
        }));
        self.ctx.variable_types.insert(invoke_var, invoke_ty);
        if let Some(object) = self.ctx.types.object_mut(class) {
            object
                .properties_mut(MemberTable::InstanceField)
                .insert("jsvalue_lambda".to_string(), field);
            object
                .properties_mut(MemberTable::InstanceMethod)
                .insert(invoke.0.clone(), invoke_var);
            object.construct_signatures = vec![ctor];
        }
        self.validate_overriding(class);

        let value_text = self.ctx.types.edit_text(dynamic);
        let params = data
            .explicit_params()
            .iter()
            .map(|p| (p.name.clone(), self.ctx.types.edit_text(p.ty)))
            .collect();
        let return_text = self.ctx.types.edit_text(data.return_type);
        self.ctx.edits.push(AstEdit::AddClass {
            name: class_name.clone(),
            super_class: None,
            implements: vec![iface_name],
            modifiers: ModifierFlags::FINAL,
        });
        let target = ClassTarget::Synthetic(class_name.clone());
        self.ctx.edits.extend([
            AstEdit::AddMember {
                class: target.clone(),
                member: SyntheticMember::Field {
                    name: "jsvalue_lambda".to_string(),
                    type_text: value_text.clone(),
                    modifiers: ModifierFlags::PUBLIC,
                },
            },
            AstEdit::AddMember {
                class: target.clone(),
                member: SyntheticMember::Method {
                    name: "constructor".to_string(),
                    kind: MethodKind::Constructor,
                    params: vec![("lambda".to_string(), value_text)],
                    return_type: "void".to_string(),
                    modifiers: ModifierFlags::PUBLIC,
                },
            },
            AstEdit::AddMember {
                class: target,
                member: SyntheticMember::Method {
                    name: invoke.0,
                    kind: MethodKind::Method,
                    params,
                    return_type: return_text,
                    modifiers: ModifierFlags::PUBLIC | ModifierFlags::NATIVE,
                },
            },
        ]);
        debug!(%class_name, "synthesized lambda object");
        self.ctx.lambda_object_cache.insert(class_name, ctor);
        Some(ctor)
    }

    /// The single abstract method of a functional interface, by name.
    fn functional_invoke(&mut self, iface: TypeId) -> Option<(String, SignatureId)> {
        if !self.ctx.types.is_interface(iface) {
            return None;
        }
        let obligations = self.abstract_obligations(iface);
        let mut found = None;
        for (name, obligation) in obligations.iter() {
            if self.ctx.types.signature(obligation.sig).is_accessor() || found.is_some() {
                return None;
            }
            found = Some((name.to_string(), obligation.sig));
        }
        found
    }

    /// Variable of a synthesized bridge method, for tests and lowering.
    pub fn bridge_method(&self, language: Language, is_construct: bool) -> Option<VariableId> {
        let class = *self.ctx.dynamic_classes.get(&(language, is_construct))?;
        let name = if is_construct { NEW_METHOD } else { CALL_METHOD };
        self.ctx.types.object(class)?.property(MemberTable::StaticMethod, name)
    }
}

#[cfg(test)]
#[path = "../tests/dynamic_interop_tests.rs"]
mod tests;
