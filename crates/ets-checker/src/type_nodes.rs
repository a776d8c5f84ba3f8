//! Resolution of type annotation nodes to types.

use ets_ast::NodeIndex;
use ets_ast::node::NodeKind;
use ets_binder::{MemberTable, VariableFlags, VariableId};
use ets_common::Language;
use ets_common::diagnostics::diagnostic_codes;
use smallvec::SmallVec;
use tracing::trace;

use crate::state::CheckerState;
use crate::types::{TypeData, TypeId, UtilityKind};

/// Names that denote checker-provided types rather than declarations.
fn builtin_type(name: &str) -> Option<TypeId> {
    Some(match name {
        "void" => TypeId::VOID,
        "boolean" => TypeId::BOOLEAN,
        "byte" => TypeId::BYTE,
        "char" => TypeId::CHAR,
        "short" => TypeId::SHORT,
        "int" => TypeId::INT,
        "long" => TypeId::LONG,
        "float" => TypeId::FLOAT,
        "double" | "number" => TypeId::DOUBLE,
        "string" | "String" => TypeId::STRING,
        "Object" | "object" => TypeId::OBJECT,
        "null" => TypeId::NULL,
        "undefined" => TypeId::UNDEFINED,
        _ => return None,
    })
}

pub(crate) fn utility_kind(name: &str) -> Option<UtilityKind> {
    match name {
        "Partial" => Some(UtilityKind::Partial),
        "Required" => Some(UtilityKind::Required),
        "Readonly" => Some(UtilityKind::Readonly),
        _ => None,
    }
}

/// Utility and builtin generic names that may not be used as a super type.
pub(crate) fn is_reserved_type_name(name: &str) -> bool {
    matches!(
        name,
        "Partial" | "Required" | "Readonly" | "Record" | "Awaited" | "ReturnType" | "FixedArray"
    )
}

impl<'a> CheckerState<'a> {
    /// Type denoted by an annotation. `NONE` yields the error type.
    pub fn resolve_type_node(&mut self, node: NodeIndex) -> TypeId {
        if let Some(&ty) = self.ctx.node_types.get(&node) {
            return ty;
        }
        let arena = self.ctx.arena;
        let Some(kind) = arena.kind(node) else {
            return TypeId::ERROR;
        };
        let ty = match kind {
            NodeKind::TypeRef(type_ref) => {
                let args = type_ref.type_args.clone();
                self.resolve_type_reference(node, &type_ref.name, &args)
            }
            NodeKind::UnionTypeNode(members) => {
                let members: SmallVec<[TypeId; 4]> = members.iter().map(|&m| self.resolve_type_node(m)).collect();
                self.ctx.types.union(&members)
            }
            NodeKind::FunctionTypeNode(function) => {
                let params: Vec<TypeId> = function.params.iter().map(|&p| self.resolve_type_node(p)).collect();
                let return_type = self.resolve_type_node(function.return_type);
                self.create_function_type_from_parts("", &params, return_type)
            }
            _ => TypeId::ERROR,
        };
        self.ctx.node_types.insert(node, ty);
        ty
    }

    /// Annotation type, or `fallback` when there is no annotation.
    pub(crate) fn annotation_or(&mut self, node: NodeIndex, fallback: TypeId) -> TypeId {
        if node.is_none() { fallback } else { self.resolve_type_node(node) }
    }

    fn resolve_type_reference(&mut self, node: NodeIndex, name: &str, args: &[NodeIndex]) -> TypeId {
        if let Some(kind) = utility_kind(name)
            && args.len() == 1
        {
            let inner = self.resolve_type_node(args[0]);
            return self.ctx.types.utility(kind, inner);
        }

        let variable = self.ctx.binder.resolved(node).or_else(|| self.resolve_qualified_name(name));
        let Some(variable) = variable else {
            if let Some(builtin) = builtin_type(name) {
                return builtin;
            }
            if name == "JSValue" {
                return self.ctx.types.dynamic(Language::Js);
            }
            if is_reserved_type_name(name) {
                return TypeId::OBJECT;
            }
            self.error_at_node(node, diagnostic_codes::CANNOT_FIND_TYPE, &[name]);
            return TypeId::ERROR;
        };

        let flags = self.ctx.binder.get(variable).flags;
        let decl = self.ctx.binder.get(variable).decl();
        if flags.intersects(VariableFlags::CLASS_OR_INTERFACE) {
            let base = self.type_of_class_like(decl);
            return self.instantiate_reference(node, base, args);
        }
        if flags.contains(VariableFlags::TYPE_PARAMETER) {
            return self.type_of_type_param(decl);
        }
        if flags.contains(VariableFlags::TYPE_ALIAS) {
            return self.resolve_alias(decl);
        }
        if flags.contains(VariableFlags::DYNAMIC_IMPORT) {
            return self.type_of_variable(variable);
        }
        self.error_at_node(node, diagnostic_codes::CANNOT_FIND_TYPE, &[name]);
        TypeId::ERROR
    }

    /// `Outer.Inner`: first segment through global scope, the rest through
    /// nested declaration tables.
    fn resolve_qualified_name(&mut self, name: &str) -> Option<VariableId> {
        let mut segments = name.split('.');
        let first = segments.next()?;
        let mut current = self.ctx.binder.find_global(first)?;
        let mut matched_any = false;
        for segment in segments {
            // Anything below a dynamic import is dynamic.
            if self.ctx.binder.get(current).has_flags(VariableFlags::DYNAMIC_IMPORT) {
                return Some(current);
            }
            let decl = self.ctx.binder.get(current).decl();
            current = self.ctx.binder.class_scope(decl)?.find(MemberTable::StaticDecl, segment)?;
            matched_any = true;
        }
        // Plain names that the binder left unresolved stay unresolved.
        matched_any.then_some(current)
    }

    pub(crate) fn resolve_alias(&mut self, decl: NodeIndex) -> TypeId {
        if let Some(&ty) = self.ctx.decl_types.get(&decl) {
            return ty;
        }
        let Some(alias) = self.ctx.arena.get_type_alias(decl) else {
            return TypeId::ERROR;
        };
        let type_node = alias.type_node;
        // Guard against `type A = A`.
        self.ctx.decl_types.insert(decl, TypeId::ERROR);
        let ty = self.resolve_type_node(type_node);
        self.ctx.decl_types.insert(decl, ty);
        ty
    }

    /// Apply written type arguments to a generic declaration type.
    fn instantiate_reference(&mut self, node: NodeIndex, base: TypeId, arg_nodes: &[NodeIndex]) -> TypeId {
        if base.is_error() {
            return base;
        }
        let params = self.type_params_of(base);
        if arg_nodes.is_empty() {
            if params.is_empty() {
                return base;
            }
            // Raw reference: defaults, else constraints.
            let args: Vec<TypeId> = params
                .iter()
                .map(|&p| {
                    self.ctx
                        .types
                        .type_param(p)
                        .map_or(TypeId::NULLISH_OBJECT, |tp| tp.default.unwrap_or(tp.constraint))
                })
                .collect();
            return self.instantiate(base, &args);
        }
        let args: Vec<TypeId> = arg_nodes.iter().map(|&a| self.resolve_type_node(a)).collect();
        if args.len() != params.len() {
            let name = self.format_type(base);
            self.error_at_node(
                node,
                diagnostic_codes::WRONG_TYPE_ARGUMENT_COUNT,
                &[&name, &params.len().to_string(), &args.len().to_string()],
            );
            return TypeId::ERROR;
        }
        trace!(base = base.0, ?args, "instantiating type reference");
        self.instantiate(base, &args)
    }

    /// Whether `ty` is a primitive other than the error type.
    #[must_use]
    pub(crate) fn is_primitive(&self, ty: TypeId) -> bool {
        matches!(self.ctx.types.get(ty), TypeData::Primitive(_))
    }
}
