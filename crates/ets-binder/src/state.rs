//! Binder state and accessors.

use ets_ast::{NodeArena, NodeIndex};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smallvec::smallvec;
use tracing::debug;

use crate::{ClassScope, Scope, ScopeId, ScopeKind, Variable, VariableFlags, VariableId};

#[derive(Debug)]
pub struct BinderState {
    pub(crate) variables: Vec<Variable>,
    pub(crate) scopes: Vec<Scope>,
    pub(crate) class_scopes: FxHashMap<NodeIndex, ClassScope>,
    /// Scope opened by a declaration or function node.
    pub(crate) node_scopes: FxHashMap<NodeIndex, ScopeId>,
    /// Identifier and type-reference nodes to the variable they name.
    pub(crate) resolved: FxHashMap<NodeIndex, VariableId>,
    /// Declaration nodes to the variable they declare.
    pub(crate) decl_variables: FxHashMap<NodeIndex, VariableId>,
    pub(crate) global: ScopeId,
}

impl Default for BinderState {
    fn default() -> Self {
        Self::new()
    }
}

impl BinderState {
    #[must_use]
    pub fn new() -> Self {
        let mut binder = Self {
            variables: Vec::new(),
            scopes: Vec::new(),
            class_scopes: FxHashMap::default(),
            node_scopes: FxHashMap::default(),
            resolved: FxHashMap::default(),
            decl_variables: FxHashMap::default(),
            global: ScopeId(0),
        };
        binder.global = binder.new_scope(ScopeKind::Global, None, NodeIndex::NONE);
        binder
    }

    /// Bind a whole program.
    pub fn bind_program(&mut self, arena: &NodeArena, root: NodeIndex) {
        let Some(program) = arena.get_program(root) else {
            return;
        };
        debug!(file = %program.file_name, statements = program.statements.len(), "binding program");
        let statements = program.statements.clone();
        for &stmt in &statements {
            self.declare_top_level(arena, stmt);
        }
        for &stmt in &statements {
            self.bind_top_level(arena, stmt);
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[must_use]
    pub fn global_scope(&self) -> ScopeId {
        self.global
    }

    #[must_use]
    pub fn get(&self, id: VariableId) -> &Variable {
        &self.variables[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: VariableId) -> &mut Variable {
        &mut self.variables[id.0 as usize]
    }

    #[must_use]
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    #[must_use]
    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0 as usize]
    }

    /// Variable named by an identifier or type-reference node.
    #[must_use]
    pub fn resolved(&self, node: NodeIndex) -> Option<VariableId> {
        self.resolved.get(&node).copied()
    }

    /// Variable declared by a declaration node.
    #[must_use]
    pub fn decl_variable(&self, decl: NodeIndex) -> Option<VariableId> {
        self.decl_variables.get(&decl).copied()
    }

    #[must_use]
    pub fn class_scope(&self, decl: NodeIndex) -> Option<&ClassScope> {
        self.class_scopes.get(&decl)
    }

    pub fn class_scope_mut(&mut self, decl: NodeIndex) -> Option<&mut ClassScope> {
        self.class_scopes.get_mut(&decl)
    }

    /// Scope opened by `node` (class, interface, function, method, arrow).
    #[must_use]
    pub fn scope_of(&self, node: NodeIndex) -> Option<ScopeId> {
        self.node_scopes.get(&node).copied()
    }

    /// Look `name` up starting at `scope` and walking outwards.
    #[must_use]
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<VariableId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = self.scope(id);
            if let Some(&var) = scope.bindings.get(name) {
                return Some(var);
            }
            current = scope.parent;
        }
        None
    }

    #[must_use]
    pub fn find_global(&self, name: &str) -> Option<VariableId> {
        self.scope(self.global).bindings.get(name).copied()
    }

    /// Global bindings whose flags intersect `flags`.
    pub fn globals_with(&self, flags: VariableFlags) -> impl Iterator<Item = VariableId> + '_ {
        self.scope(self.global)
            .bindings
            .values()
            .copied()
            .filter(move |&v| self.get(v).has_flags(flags))
    }

    /// Innermost function scope whose node encloses `node`.
    #[must_use]
    pub fn enclosing_function_scope(&self, arena: &NodeArena, node: NodeIndex) -> Option<ScopeId> {
        let mut func = arena.enclosing_function(node);
        while func.is_some() {
            if let Some(scope) = self.scope_of(func) {
                return Some(scope);
            }
            func = arena.enclosing_function(func);
        }
        None
    }

    /// Create a variable that has no binding in any scope. Used by the checker
    /// for interop properties and generated members.
    pub fn add_synthetic_variable(&mut self, name: &str, decl: NodeIndex, flags: VariableFlags) -> VariableId {
        let id = VariableId(self.variables.len() as u32);
        let declarations = if decl.is_some() { smallvec![decl] } else { smallvec![] };
        self.variables.push(Variable {
            name: name.to_string(),
            declarations,
            flags: flags | VariableFlags::SYNTHETIC,
            scope: self.global,
        });
        id
    }

    // =========================================================================
    // Construction helpers
    // =========================================================================

    pub(crate) fn new_scope(&mut self, kind: ScopeKind, parent: Option<ScopeId>, node: NodeIndex) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            kind,
            parent,
            node,
            bindings: IndexMap::new(),
        });
        if node.is_some() {
            self.node_scopes.insert(node, id);
        }
        id
    }

    pub(crate) fn new_variable(&mut self, name: &str, decl: NodeIndex, flags: VariableFlags, scope: ScopeId) -> VariableId {
        let id = VariableId(self.variables.len() as u32);
        self.variables.push(Variable {
            name: name.to_string(),
            declarations: smallvec![decl],
            flags,
            scope,
        });
        self.decl_variables.insert(decl, id);
        id
    }

    /// Declare `name` in `scope`, merging into an existing binding (overloads,
    /// accessor pairs) when one exists.
    pub(crate) fn declare(&mut self, scope: ScopeId, name: &str, decl: NodeIndex, flags: VariableFlags) -> VariableId {
        if let Some(&existing) = self.scopes[scope.0 as usize].bindings.get(name) {
            let var = &mut self.variables[existing.0 as usize];
            var.declarations.push(decl);
            var.flags |= flags;
            self.decl_variables.insert(decl, existing);
            return existing;
        }
        let id = self.new_variable(name, decl, flags, scope);
        self.scopes[scope.0 as usize].bindings.insert(name.to_string(), id);
        id
    }
}

#[cfg(test)]
#[path = "../tests/binder_tests.rs"]
mod tests;
