//! Initialization of readonly and const fields without initializers.
//!
//! The check is flow-insensitive: a constructor (or the static blocks, for
//! static fields) must contain exactly one direct assignment to each such
//! field, wherever it appears in the body. A constructor that delegates with
//! `this(...)` must contain none.

use ets_ast::node::{AssignOp, NodeKind};
use ets_ast::{NodeArena, NodeIndex};
use ets_binder::{MemberTable, VariableFlags, VariableId};
use ets_common::diagnostics::diagnostic_codes;
use ets_common::limits::MAX_EXPR_CHECK_DEPTH;
use tracing::trace;

use crate::constructor_checker::ConstructorStart;
use crate::state::CheckerState;
use crate::types::{ObjectFlags, TypeId};

/// Field whose initialization is being checked.
#[derive(Clone, Copy, Debug)]
struct FieldTarget<'n> {
    variable: VariableId,
    name: &'n str,
    is_static: bool,
    class_variable: Option<VariableId>,
}

impl<'a> CheckerState<'a> {
    pub fn check_const_fields(&mut self, class: TypeId) {
        let Some(object) = self.ctx.types.object(class) else {
            return;
        };
        if !object.is_class() || object.flags.contains(ObjectFlags::INITIALIZERS_CHECKED) {
            return;
        }
        let decl = object.decl;
        if let Some(object) = self.ctx.types.object_mut(class) {
            object.flags |= ObjectFlags::INITIALIZERS_CHECKED;
        }
        let Some(scope) = self.ctx.binder.class_scope(decl) else {
            return;
        };
        let constructors = scope.constructors.clone();
        let static_blocks = scope.static_blocks.clone();
        let mut instance_fields = Vec::new();
        let mut static_fields = Vec::new();
        for table in [MemberTable::InstanceField, MemberTable::StaticField] {
            for (name, &var) in scope.table(table) {
                if self.ctx.binder.get(var).has_flags(VariableFlags::EXPLICIT_INIT_REQUIRED) {
                    let entry = (name.clone(), var);
                    if table.is_static() {
                        static_fields.push(entry);
                    } else {
                        instance_fields.push(entry);
                    }
                }
            }
        }
        if instance_fields.is_empty() && static_fields.is_empty() {
            return;
        }
        let class_variable = self.ctx.binder.decl_variable(decl);

        for (name, var) in &instance_fields {
            let target = FieldTarget {
                variable: *var,
                name,
                is_static: false,
                class_variable,
            };
            if constructors.is_empty() {
                let field_decl = self.ctx.binder.get(*var).decl();
                self.error_at_node(field_decl, diagnostic_codes::MAYBE_MISSING_INIT, &[name]);
                continue;
            }
            for &ctor in &constructors {
                let assignments = self.field_assignments(&[ctor], target);
                if matches!(self.constructor_start(ctor), ConstructorStart::This(_)) {
                    // The delegated-to constructor already initialized the field.
                    for &assignment in &assignments {
                        self.error_at_node(assignment, diagnostic_codes::MAYBE_DOUBLE_INIT, &[name]);
                    }
                    continue;
                }
                self.report_initializations(ctor, name, &assignments);
            }
        }

        for (name, var) in &static_fields {
            let target = FieldTarget {
                variable: *var,
                name,
                is_static: true,
                class_variable,
            };
            let assignments = self.field_assignments(&static_blocks, target);
            let field_decl = self.ctx.binder.get(*var).decl();
            self.report_initializations(field_decl, name, &assignments);
        }
    }

    fn report_initializations(&mut self, missing_at: NodeIndex, name: &str, assignments: &[NodeIndex]) {
        trace!(%name, count = assignments.len(), "field initializations");
        if assignments.is_empty() {
            self.error_at_node(missing_at, diagnostic_codes::MAYBE_MISSING_INIT, &[name]);
            return;
        }
        for &extra in &assignments[1..] {
            self.error_at_node(extra, diagnostic_codes::MAYBE_DOUBLE_INIT, &[name]);
        }
    }

    /// Direct assignments to the field in the bodies of `functions`, in
    /// traversal order.
    fn field_assignments(&self, functions: &[NodeIndex], target: FieldTarget<'_>) -> Vec<NodeIndex> {
        let arena = self.ctx.arena;
        let mut found = Vec::new();
        for &function in functions {
            if let Some(data) = arena.get_function(function) {
                self.collect_field_assignments(arena, data.body, target, &mut found, 0);
            }
        }
        found
    }

    fn collect_field_assignments(
        &self,
        arena: &NodeArena,
        node: NodeIndex,
        target: FieldTarget<'_>,
        found: &mut Vec<NodeIndex>,
        depth: usize,
    ) {
        if depth > MAX_EXPR_CHECK_DEPTH {
            return;
        }
        let Some(kind) = arena.kind(node) else {
            return;
        };
        match kind {
            NodeKind::ArrowFunction(_) | NodeKind::ClassDecl(_) => return,
            NodeKind::Assign(assign) if assign.op == AssignOp::Assign && self.refers_to_field(arena, assign.left, target) => {
                found.push(node);
            }
            _ => {}
        }
        for child in kind.children() {
            self.collect_field_assignments(arena, child, target, found, depth + 1);
        }
    }

    fn refers_to_field(&self, arena: &NodeArena, expr: NodeIndex, target: FieldTarget<'_>) -> bool {
        match arena.kind(expr) {
            Some(NodeKind::Identifier(_)) => self.ctx.binder.resolved(expr) == Some(target.variable),
            Some(NodeKind::Member(member)) if member.property == target.name => match arena.kind(member.object) {
                Some(NodeKind::This) => !target.is_static,
                Some(NodeKind::Identifier(_)) => {
                    target.is_static
                        && target.class_variable.is_some()
                        && self.ctx.binder.resolved(member.object) == target.class_variable
                }
                _ => false,
            },
            _ => false,
        }
    }
}

#[cfg(test)]
#[path = "../tests/const_fields_tests.rs"]
mod tests;
