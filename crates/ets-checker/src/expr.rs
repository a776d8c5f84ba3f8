//! Expression and statement checking.
//!
//! Computes just enough of each expression's type to drive member
//! resolution, constructor matching and dynamic-interop synthesis. Results
//! are memoized per node.

use ets_ast::NodeIndex;
use ets_ast::node::{BinaryOp, Literal, NodeKind, UnaryOp};
use ets_common::diagnostics::diagnostic_codes;
use ets_common::limits::{STACK_GROW_SIZE, STACK_RED_ZONE};
use smallvec::SmallVec;
use tracing::trace;

use crate::state::CheckerState;
use crate::types::{FunctionType, SignatureId, TypeData, TypeId};

impl<'a> CheckerState<'a> {
    /// Type of an expression node.
    pub fn check_expression(&mut self, idx: NodeIndex) -> TypeId {
        if let Some(&ty) = self.ctx.node_types.get(&idx) {
            return ty;
        }
        // Placeholder so a self-referential expression settles on ERROR.
        self.ctx.node_types.insert(idx, TypeId::ERROR);
        let ty = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.compute_expression_type(idx));
        self.ctx.node_types.insert(idx, ty);
        ty
    }

    fn compute_expression_type(&mut self, idx: NodeIndex) -> TypeId {
        let arena = self.ctx.arena;
        let Some(kind) = arena.kind(idx) else {
            return TypeId::ERROR;
        };
        match kind {
            NodeKind::Literal(literal) => match literal {
                Literal::Int(_) => TypeId::INT,
                Literal::Double(_) => TypeId::DOUBLE,
                Literal::String(_) => TypeId::STRING,
                Literal::Bool(_) => TypeId::BOOLEAN,
                Literal::Null => TypeId::NULL,
                Literal::Undefined => TypeId::UNDEFINED,
            },
            NodeKind::Identifier(_) => match self.ctx.binder.resolved(idx) {
                Some(var) => self.type_of_variable(var),
                None => TypeId::ERROR,
            },
            NodeKind::This => {
                let class = arena.enclosing_class(idx);
                if class.is_none() {
                    return TypeId::ERROR;
                }
                self.type_of_class_like(class)
            }
            NodeKind::Super => {
                let class = arena.enclosing_class(idx);
                if class.is_none() {
                    return TypeId::ERROR;
                }
                let class_ty = self.type_of_class_like(class);
                self.super_type_of(class_ty).unwrap_or(TypeId::ERROR)
            }
            NodeKind::Member(member) => {
                let object_ty = self.check_expression(member.object);
                if object_ty.is_error() {
                    return TypeId::ERROR;
                }
                let results = self.resolve_member(idx, object_ty);
                let Some(first) = results.first() else {
                    return TypeId::ERROR;
                };
                if arena.is_call_callee(idx) {
                    first.ty
                } else {
                    self.member_value_type(first)
                }
            }
            NodeKind::Call(call) => self.check_call(idx, call.callee, &call.args),
            NodeKind::New(new) => self.check_new(idx, new.type_ref, &new.args),
            NodeKind::Assign(assign) => {
                let (left, right) = (assign.left, assign.right);
                let left_ty = self.check_expression(left);
                let right_ty = self.check_expression(right);
                self.convert_dynamic_to_interface(left_ty, right_ty, right);
                left_ty
            }
            NodeKind::Binary(binary) => {
                let (op, left, right) = (binary.op, binary.left, binary.right);
                let left_ty = self.check_expression(left);
                let right_ty = self.check_expression(right);
                self.binary_result(op, left_ty, right_ty)
            }
            NodeKind::Unary(unary) => {
                let (op, operand) = (unary.op, unary.operand);
                let operand_ty = self.check_expression(operand);
                if op == UnaryOp::Not { TypeId::BOOLEAN } else { operand_ty }
            }
            NodeKind::Update(update) => self.check_expression(update.operand),
            NodeKind::Conditional(cond) => {
                let (test, consequent, alternate) = (cond.test, cond.consequent, cond.alternate);
                self.check_expression(test);
                let a = self.check_expression(consequent);
                let b = self.check_expression(alternate);
                self.conditional_result(a, b)
            }
            NodeKind::As(as_data) => {
                let type_node = as_data.type_node;
                self.check_expression(as_data.expr);
                self.resolve_type_node(type_node)
            }
            NodeKind::NonNull(inner) => {
                let inner_ty = self.check_expression(*inner);
                self.ctx.types.non_nullish(inner_ty)
            }
            NodeKind::Typeof(inner) => {
                self.check_expression(*inner);
                TypeId::STRING
            }
            NodeKind::ArrayLiteral(elements) => {
                for &element in elements {
                    self.check_expression(element);
                }
                TypeId::OBJECT
            }
            NodeKind::ObjectLiteral(properties) => {
                for &property in properties {
                    if let Some(NodeKind::PropertyAssignment(assignment)) = arena.kind(property) {
                        self.check_expression(assignment.value);
                    }
                }
                TypeId::OBJECT
            }
            NodeKind::ArrowFunction(function) => {
                let sig = self.signature_of_function(idx, TypeId::GLOBAL);
                if function.body.is_some() {
                    self.check_statement(function.body);
                }
                let mut signatures = SmallVec::new();
                signatures.push(sig);
                self.ctx.types.alloc(TypeData::Function(FunctionType {
                    name: "lambda".to_string(),
                    signatures,
                    extension_accessor: false,
                }))
            }
            _ => TypeId::ERROR,
        }
    }

    // =========================================================================
    // Calls
    // =========================================================================

    fn check_call(&mut self, call: NodeIndex, callee: NodeIndex, args: &[NodeIndex]) -> TypeId {
        let arena = self.ctx.arena;
        if matches!(arena.kind(callee), Some(NodeKind::This | NodeKind::Super)) {
            for &arg in args {
                self.check_expression(arg);
            }
            return TypeId::VOID;
        }
        let callee_ty = self.check_expression(callee);
        if let Some(language) = self.ctx.types.dynamic_language(callee_ty) {
            let sig = self.resolve_dynamic_call(callee, args, language, false);
            return self.ctx.types.signature(sig).return_type;
        }
        for &arg in args {
            self.check_expression(arg);
        }

        let candidates: SmallVec<[SignatureId; 4]> = if matches!(arena.kind(callee), Some(NodeKind::Member(_))) {
            let results = self.ctx.member_results.get(&callee).cloned().unwrap_or_default();
            results.iter().flat_map(|r| self.signatures_of(r.ty)).collect()
        } else {
            self.signatures_of(callee_ty).into_iter().collect()
        };
        let chosen = candidates
            .iter()
            .copied()
            .find(|&sig| self.ctx.types.signature(sig).accepts_arity(args.len()))
            .or_else(|| candidates.first().copied());
        trace!(call = call.0, candidates = candidates.len(), "call resolution");
        chosen.map_or(TypeId::ERROR, |sig| self.ctx.types.signature(sig).return_type)
    }

    fn check_new(&mut self, new: NodeIndex, type_ref: NodeIndex, args: &[NodeIndex]) -> TypeId {
        let ty = self.resolve_type_node(type_ref);
        if let Some(language) = self.ctx.types.dynamic_language(ty) {
            let sig = self.resolve_dynamic_call(type_ref, args, language, true);
            return self.ctx.types.signature(sig).return_type;
        }
        for &arg in args {
            self.check_expression(arg);
        }
        if !self.ctx.types.is_class(ty) {
            return ty;
        }
        let signatures = self.construct_signatures_of(ty);
        let accepted = signatures
            .iter()
            .any(|&sig| self.ctx.types.signature(sig).accepts_arity(args.len()));
        if !accepted {
            let name = self.format_type(ty);
            self.error_at_node(new, diagnostic_codes::NO_MATCHING_CONSTRUCTOR, &[&name, &args.len().to_string()]);
        }
        ty
    }

    /// A dynamic value flowing into a functional interface goes through a
    /// lambda object.
    fn convert_dynamic_to_interface(&mut self, target: TypeId, source: TypeId, at: NodeIndex) {
        let Some(language) = self.ctx.types.dynamic_language(source) else {
            return;
        };
        if self.ctx.types.is_interface(target) {
            self.resolve_lambda_object(target, language, at);
        }
    }

    // =========================================================================
    // Operators
    // =========================================================================

    fn binary_result(&mut self, op: BinaryOp, left: TypeId, right: TypeId) -> TypeId {
        if op.is_comparison() {
            return TypeId::BOOLEAN;
        }
        if let Some(language) = self
            .ctx
            .types
            .dynamic_language(left)
            .or_else(|| self.ctx.types.dynamic_language(right))
        {
            return self.ctx.types.dynamic(language);
        }
        if op == BinaryOp::Add && (left == TypeId::STRING || right == TypeId::STRING) {
            return TypeId::STRING;
        }
        let numeric = |ty| self.ctx.types.primitive(ty).is_some_and(|p| p.is_numeric());
        if numeric(left) && numeric(right) {
            // Numeric ids are ordered by width.
            return left.max(right);
        }
        TypeId::ERROR
    }

    fn conditional_result(&mut self, a: TypeId, b: TypeId) -> TypeId {
        if a == b {
            return a;
        }
        if self.ctx.types.is_class(a) && self.ctx.types.is_class(b) {
            return self.closest_common_ancestor(a, b);
        }
        self.ctx.types.union(&[a, b])
    }

    // =========================================================================
    // Statements
    // =========================================================================

    pub fn check_statement(&mut self, idx: NodeIndex) {
        let arena = self.ctx.arena;
        let Some(kind) = arena.kind(idx) else {
            return;
        };
        match kind {
            NodeKind::Block(statements) => {
                stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
                    for &statement in statements {
                        self.check_statement(statement);
                    }
                });
            }
            NodeKind::ExprStatement(expr) => {
                self.check_expression(*expr);
            }
            NodeKind::VarDecl(var) => {
                let (annotation, initializer) = (var.type_annotation, var.initializer);
                if initializer.is_some() {
                    let init_ty = self.check_expression(initializer);
                    if annotation.is_some() {
                        let declared = self.resolve_type_node(annotation);
                        self.convert_dynamic_to_interface(declared, init_ty, initializer);
                    }
                }
                if let Some(variable) = self.ctx.binder.decl_variable(idx) {
                    self.type_of_variable(variable);
                }
            }
            NodeKind::If(data) => {
                let (test, consequent, alternate) = (data.test, data.consequent, data.alternate);
                self.check_expression(test);
                self.check_statement(consequent);
                if alternate.is_some() {
                    self.check_statement(alternate);
                }
            }
            NodeKind::While(data) => {
                let (test, body) = (data.test, data.body);
                self.check_expression(test);
                self.check_statement(body);
            }
            NodeKind::Return(value) => {
                if value.is_some() {
                    self.check_expression(*value);
                }
            }
            NodeKind::ClassDecl(_) => {
                let ty = self.type_of_class_like(idx);
                self.check_class(ty);
            }
            NodeKind::InterfaceDecl(_) => {
                let ty = self.type_of_class_like(idx);
                self.check_interface(ty);
            }
            NodeKind::FunctionDecl(decl) => {
                if decl.function.body.is_some() {
                    self.check_statement(decl.function.body);
                }
            }
            _ => {
                self.check_expression(idx);
            }
        }
    }
}
