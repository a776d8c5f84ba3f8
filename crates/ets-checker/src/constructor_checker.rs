//! Constructor checks: super calls, `this(...)` delegation and the use of
//! `this`/`super` before the object exists.

use ets_ast::NodeIndex;
use ets_ast::node::NodeKind;
use ets_common::diagnostics::diagnostic_codes;
use ets_common::limits::{MAX_EXPR_CHECK_DEPTH, STACK_GROW_SIZE, STACK_RED_ZONE};
use rustc_hash::FxHashSet;
use tracing::{debug, trace};

use crate::state::CheckerState;
use crate::types::{ObjectFlags, PropertySearchFlags, SignatureFlags, TypeId};

/// How a constructor body starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConstructorStart {
    /// `this(...)`; the call node.
    This(NodeIndex),
    /// `super(...)`; the call node.
    Super(NodeIndex),
    /// Neither; `super()` is implied.
    Implicit,
}

impl<'a> CheckerState<'a> {
    /// Classify the first statement of a constructor body.
    pub fn constructor_start(&self, ctor: NodeIndex) -> ConstructorStart {
        let arena = self.ctx.arena;
        let Some(function) = arena.get_function(ctor) else {
            return ConstructorStart::Implicit;
        };
        let Some(&first) = arena.block_statements(function.body).first() else {
            return ConstructorStart::Implicit;
        };
        let Some(NodeKind::ExprStatement(expr)) = arena.kind(first) else {
            return ConstructorStart::Implicit;
        };
        let Some(call) = arena.get_call(*expr) else {
            return ConstructorStart::Implicit;
        };
        match arena.kind(call.callee) {
            Some(NodeKind::This) => ConstructorStart::This(*expr),
            Some(NodeKind::Super) => ConstructorStart::Super(*expr),
            _ => ConstructorStart::Implicit,
        }
    }

    /// Whether the class's super type declares a parameterless constructor.
    /// A constructor whose parameters all have defaults does not count.
    fn super_has_default_constructor(&mut self, class: TypeId) -> bool {
        let Some(super_ty) = self.super_type_of(class) else {
            return true;
        };
        if super_ty.is_error() {
            return true;
        }
        let signatures = self.construct_signatures_of(super_ty);
        signatures.is_empty() || signatures.iter().any(|&s| self.ctx.types.signature(s).params.is_empty())
    }

    /// Check every constructor of a class. Runs once per class; ambient
    /// (`declare`) classes have no bodies to check.
    pub fn check_constructors(&mut self, class: TypeId) {
        let Some(object) = self.ctx.types.object(class) else {
            return;
        };
        if !object.is_class() || object.flags.contains(ObjectFlags::CONSTRUCTORS_CHECKED) {
            return;
        }
        let (decl, declared) = (object.decl, object.flags.contains(ObjectFlags::DECLARE));
        if let Some(object) = self.ctx.types.object_mut(class) {
            object.flags |= ObjectFlags::CONSTRUCTORS_CHECKED;
        }
        if declared {
            return;
        }
        let constructors = self
            .ctx
            .binder
            .class_scope(decl)
            .map(|s| s.constructors.clone())
            .unwrap_or_default();

        let super_has_default = self.super_has_default_constructor(class);
        if constructors.is_empty() {
            if !super_has_default {
                self.error_at_node(decl, diagnostic_codes::MUST_CALL_SUPER_CONSTRUCTOR, &[]);
            }
            return;
        }

        for &ctor in &constructors {
            let has_body = self.ctx.arena.get_function(ctor).is_some_and(|f| f.body.is_some());
            if !has_body {
                continue;
            }
            let start = self.constructor_start(ctor);
            trace!(ctor = ctor.0, ?start, "constructor start");
            match start {
                ConstructorStart::This(call) => {
                    self.check_constructor_args(call);
                    self.check_constructor_chain(class, ctor, &constructors);
                }
                ConstructorStart::Super(call) => {
                    self.check_constructor_args(call);
                    self.check_super_call_arity(class, call);
                }
                ConstructorStart::Implicit => {
                    if super_has_default {
                        let sig = self.signature_of_function(ctor, class);
                        self.ctx.types.signature_mut(sig).flags |= SignatureFlags::IMPLICIT_SUPER_CALL_NEEDED;
                        self.ctx.implicit_super_calls.push(ctor);
                    } else {
                        self.error_at_node(ctor, diagnostic_codes::MUST_CALL_SUPER_CONSTRUCTOR, &[]);
                    }
                }
            }
            self.check_late_constructor_calls(ctor, start);
        }
    }

    fn check_super_call_arity(&mut self, class: TypeId, call: NodeIndex) {
        let Some(super_ty) = self.super_type_of(class) else {
            return;
        };
        let arg_count = self.ctx.arena.get_call(call).map_or(0, |c| c.args.len());
        let signatures = self.construct_signatures_of(super_ty);
        if signatures.is_empty() || signatures.iter().any(|&s| self.ctx.types.signature(s).accepts_arity(arg_count)) {
            return;
        }
        let name = self.format_type(super_ty);
        self.error_at_node(
            call,
            diagnostic_codes::NO_MATCHING_CONSTRUCTOR,
            &[&name, &arg_count.to_string()],
        );
    }

    /// Follow `this(...)` delegation from `start`. A chain that comes back to
    /// `start` is recursive.
    fn check_constructor_chain(&mut self, class: TypeId, start: NodeIndex, constructors: &[NodeIndex]) {
        let mut visited = FxHashSet::default();
        visited.insert(start);
        let mut current = start;
        let max_depth = self.ctx.options.max_constructor_chain_depth;
        for _ in 0..max_depth {
            let ConstructorStart::This(call) = self.constructor_start(current) else {
                return;
            };
            let arg_count = self.ctx.arena.get_call(call).map_or(0, |c| c.args.len());
            let target = constructors.iter().copied().find(|&ctor| {
                let sig = self.signature_of_function(ctor, class);
                self.ctx.types.signature(sig).accepts_arity(arg_count)
            });
            let Some(target) = target else {
                if current == start {
                    let name = self.format_type(class);
                    self.error_at_node(
                        call,
                        diagnostic_codes::NO_MATCHING_CONSTRUCTOR,
                        &[&name, &arg_count.to_string()],
                    );
                }
                return;
            };
            if target == start {
                let ConstructorStart::This(first_call) = self.constructor_start(start) else {
                    return;
                };
                debug!(ctor = start.0, "recursive constructor delegation");
                self.error_at_node(first_call, diagnostic_codes::RECURSIVE_CONSTRUCTOR_INVOCATION, &[]);
                return;
            }
            if !visited.insert(target) {
                // A cycle not through `start`; its members report it.
                return;
            }
            current = target;
        }
    }

    // =========================================================================
    // Argument and statement scans
    // =========================================================================

    /// `this` and `super` may not be used in the arguments of the leading
    /// constructor call.
    fn check_constructor_args(&mut self, call: NodeIndex) {
        let args = self.ctx.arena.get_call(call).map(|c| c.args.clone()).unwrap_or_default();
        for arg in args {
            self.scan_constructor_arg(arg, 0);
        }
    }

    fn scan_constructor_arg(&mut self, expr: NodeIndex, depth: usize) {
        if depth > MAX_EXPR_CHECK_DEPTH {
            return;
        }
        let arena = self.ctx.arena;
        let Some(kind) = arena.kind(expr) else {
            return;
        };
        match kind {
            NodeKind::This => self.error_at_node(expr, diagnostic_codes::THIS_OR_SUPER_IN_CONSTRUCTOR, &["this"]),
            NodeKind::Super => self.error_at_node(expr, diagnostic_codes::THIS_OR_SUPER_IN_CONSTRUCTOR, &["super"]),
            NodeKind::ArrowFunction(_) | NodeKind::ClassDecl(_) => {}
            NodeKind::Member(member) => {
                let object = member.object;
                let keyword = match arena.kind(object) {
                    Some(NodeKind::This) => "this",
                    Some(NodeKind::Super) => "super",
                    _ => {
                        self.scan_constructor_arg(object, depth + 1);
                        return;
                    }
                };
                if !self.is_static_member_of(object, &member.property) {
                    self.error_at_node(expr, diagnostic_codes::THIS_OR_SUPER_IN_CONSTRUCTOR, &[keyword]);
                }
            }
            _ => {
                let children = kind.children();
                stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
                    for child in children {
                        self.scan_constructor_arg(child, depth + 1);
                    }
                });
            }
        }
    }

    /// Whether `name` on the class behind `this`/`super` is a static member.
    /// Static members exist before the object does.
    fn is_static_member_of(&mut self, receiver: NodeIndex, name: &str) -> bool {
        let receiver_ty = self.check_expression(receiver);
        if receiver_ty.is_error() {
            return false;
        }
        let flags = PropertySearchFlags::SEARCH_ALL
            | PropertySearchFlags::SEARCH_IN_BASE
            | PropertySearchFlags::SEARCH_IN_INTERFACES;
        self.find_property(receiver_ty, name, flags).is_some_and(|found| found.table.is_static())
    }

    /// `this(...)` and `super(...)` anywhere but the first statement.
    fn check_late_constructor_calls(&mut self, ctor: NodeIndex, start: ConstructorStart) {
        let arena = self.ctx.arena;
        let Some(function) = arena.get_function(ctor) else {
            return;
        };
        let statements = arena.block_statements(function.body);
        let skip = usize::from(!matches!(start, ConstructorStart::Implicit));
        let mut late_calls = Vec::new();
        for &stmt in statements.iter().skip(skip) {
            collect_constructor_calls(arena, stmt, &mut late_calls, 0);
        }
        // Arguments of the leading call are statements' children too.
        if let ConstructorStart::This(call) | ConstructorStart::Super(call) = start
            && let Some(data) = arena.get_call(call)
        {
            for &arg in &data.args {
                collect_constructor_calls(arena, arg, &mut late_calls, 0);
            }
        }
        for (call, keyword) in late_calls {
            self.error_at_node(call, diagnostic_codes::CONSTRUCTOR_CALL_MUST_BE_FIRST, &[keyword]);
        }
    }
}

fn collect_constructor_calls(
    arena: &ets_ast::NodeArena,
    node: NodeIndex,
    out: &mut Vec<(NodeIndex, &'static str)>,
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
        NodeKind::Call(call) => match arena.kind(call.callee) {
            Some(NodeKind::This) => out.push((node, "this")),
            Some(NodeKind::Super) => out.push((node, "super")),
            _ => {}
        },
        _ => {}
    }
    for child in kind.children() {
        collect_constructor_calls(arena, child, out, depth + 1);
    }
}

#[cfg(test)]
#[path = "../tests/constructor_checker_tests.rs"]
mod tests;
