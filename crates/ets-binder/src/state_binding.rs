//! Declaration and reference binding.

use ets_ast::node::{MethodKind, NodeKind, VarKind};
use ets_ast::{ModifierFlags, NodeArena, NodeIndex};
use tracing::trace;

use crate::{BinderState, ClassScope, MemberTable, ScopeId, ScopeKind, VariableFlags, VariableId};

fn access_flags(modifiers: ModifierFlags) -> VariableFlags {
    if modifiers.contains(ModifierFlags::PRIVATE) {
        VariableFlags::PRIVATE
    } else if modifiers.contains(ModifierFlags::PROTECTED) {
        VariableFlags::PROTECTED
    } else {
        VariableFlags::PUBLIC
    }
}

fn var_kind_flags(kind: VarKind) -> VariableFlags {
    match kind {
        VarKind::Let => VariableFlags::LET,
        VarKind::Const => VariableFlags::CONST,
    }
}

impl BinderState {
    // =========================================================================
    // Top level
    // =========================================================================

    /// Hoist a top-level declaration into the global scope.
    pub(crate) fn declare_top_level(&mut self, arena: &NodeArena, stmt: NodeIndex) {
        let global = self.global;
        let Some(kind) = arena.kind(stmt) else {
            return;
        };
        match kind {
            NodeKind::ClassDecl(class) => {
                self.declare(global, &class.name, stmt, VariableFlags::CLASS | access_flags(class.modifiers));
            }
            NodeKind::InterfaceDecl(iface) => {
                self.declare(global, &iface.name, stmt, VariableFlags::INTERFACE | VariableFlags::PUBLIC);
            }
            NodeKind::TypeAliasDecl(alias) => {
                self.declare(global, &alias.name, stmt, VariableFlags::TYPE_ALIAS | VariableFlags::PUBLIC);
            }
            NodeKind::FunctionDecl(func) => {
                self.declare(
                    global,
                    &func.name,
                    stmt,
                    VariableFlags::METHOD | VariableFlags::STATIC | VariableFlags::PUBLIC,
                );
            }
            NodeKind::ImportDecl(import) => {
                for name in &import.names {
                    let id = self.new_variable(
                        name,
                        stmt,
                        VariableFlags::PROPERTY
                            | VariableFlags::STATIC
                            | VariableFlags::CONST
                            | VariableFlags::INITIALIZED
                            | VariableFlags::DYNAMIC_IMPORT,
                        global,
                    );
                    self.scopes[global.0 as usize].bindings.insert(name.clone(), id);
                }
            }
            NodeKind::VarDecl(var) => {
                let mut flags = VariableFlags::PROPERTY | VariableFlags::STATIC | var_kind_flags(var.kind);
                if var.initializer.is_some() {
                    flags |= VariableFlags::INITIALIZED;
                }
                self.declare(global, &var.name, stmt, flags);
            }
            _ => {}
        }
    }

    pub(crate) fn bind_top_level(&mut self, arena: &NodeArena, stmt: NodeIndex) {
        let global = self.global;
        match arena.kind(stmt) {
            Some(NodeKind::ClassDecl(_) | NodeKind::InterfaceDecl(_)) => self.bind_class_like(arena, stmt, global),
            Some(NodeKind::TypeAliasDecl(alias)) => {
                let tp_scope = self.new_scope(ScopeKind::TypeParams, Some(global), NodeIndex::NONE);
                self.declare_type_params(arena, &alias.type_params, tp_scope);
                self.bind_node(arena, alias.type_node, tp_scope);
            }
            Some(NodeKind::FunctionDecl(_)) => self.bind_function(arena, stmt, global),
            Some(NodeKind::VarDecl(var)) => {
                self.bind_node(arena, var.type_annotation, global);
                self.bind_node(arena, var.initializer, global);
            }
            Some(NodeKind::ImportDecl(_)) | None => {}
            Some(_) => self.bind_node(arena, stmt, global),
        }
    }

    fn declare_type_params(&mut self, arena: &NodeArena, params: &[NodeIndex], scope: ScopeId) {
        for &param in params {
            if let Some(data) = arena.get_type_param(param) {
                // Duplicates are diagnosed by the checker; keep the first binding.
                if self.scope(scope).bindings.contains_key(&data.name) {
                    self.new_variable(&data.name, param, VariableFlags::TYPE_PARAMETER, scope);
                    continue;
                }
                self.declare(scope, &data.name, param, VariableFlags::TYPE_PARAMETER);
            }
        }
        for &param in params {
            if let Some(data) = arena.get_type_param(param) {
                self.bind_node(arena, data.constraint, scope);
                self.bind_node(arena, data.default, scope);
            }
        }
    }

    // =========================================================================
    // Classes and interfaces
    // =========================================================================

    fn bind_class_like(&mut self, arena: &NodeArena, decl: NodeIndex, parent: ScopeId) {
        let (type_params, heritage, members, is_interface, is_declared) = match arena.kind(decl) {
            Some(NodeKind::ClassDecl(c)) => {
                let mut heritage: Vec<NodeIndex> = c.super_class.into_option().into_iter().collect();
                heritage.extend(c.implements.iter().copied());
                (
                    c.type_params.clone(),
                    heritage,
                    c.members.clone(),
                    false,
                    c.modifiers.contains(ModifierFlags::DECLARE),
                )
            }
            Some(NodeKind::InterfaceDecl(i)) => (i.type_params.clone(), i.extends.clone(), i.members.clone(), true, true),
            _ => return,
        };

        let tp_scope = self.new_scope(ScopeKind::TypeParams, Some(parent), NodeIndex::NONE);
        self.declare_type_params(arena, &type_params, tp_scope);
        for &base in &heritage {
            self.bind_node(arena, base, tp_scope);
        }

        let class_scope_id = self.new_scope(ScopeKind::Class, Some(tp_scope), decl);
        self.class_scopes.insert(decl, ClassScope::new(Some(tp_scope)));

        for &member in &members {
            self.declare_member(arena, decl, class_scope_id, member, is_interface, is_declared);
        }
        for &member in &members {
            match arena.kind(member) {
                Some(NodeKind::ClassProperty(prop)) => {
                    self.bind_node(arena, prop.type_annotation, class_scope_id);
                    self.bind_node(arena, prop.initializer, class_scope_id);
                }
                Some(NodeKind::Method(_)) => self.bind_function(arena, member, class_scope_id),
                Some(NodeKind::ClassDecl(_) | NodeKind::InterfaceDecl(_)) => {
                    self.bind_class_like(arena, member, class_scope_id);
                }
                _ => {}
            }
        }
    }

    fn declare_member(
        &mut self,
        arena: &NodeArena,
        class: NodeIndex,
        class_scope_id: ScopeId,
        member: NodeIndex,
        is_interface: bool,
        is_declared: bool,
    ) {
        let Some(kind) = arena.kind(member) else {
            return;
        };
        match kind {
            NodeKind::ClassProperty(prop) => {
                let is_static = prop.modifiers.contains(ModifierFlags::STATIC);
                if is_interface {
                    // Interface properties are accessor declarations.
                    let flags = VariableFlags::METHOD | VariableFlags::PUBLIC;
                    self.declare_in_table(class, class_scope_id, MemberTable::method(is_static), &prop.name, member, flags);
                    return;
                }
                let mut flags = VariableFlags::PROPERTY | access_flags(prop.modifiers);
                if is_static {
                    flags |= VariableFlags::STATIC;
                }
                if prop.modifiers.contains(ModifierFlags::CONST) {
                    flags |= VariableFlags::CONST | VariableFlags::READONLY;
                }
                if prop.modifiers.contains(ModifierFlags::READONLY) {
                    flags |= VariableFlags::READONLY;
                }
                if prop.initializer.is_some() {
                    flags |= VariableFlags::INITIALIZED;
                } else if flags.contains(VariableFlags::READONLY) && !is_declared {
                    flags |= VariableFlags::EXPLICIT_INIT_REQUIRED;
                }
                self.declare_in_table(class, class_scope_id, MemberTable::field(is_static), &prop.name, member, flags);
            }
            NodeKind::Method(method) => match method.kind {
                MethodKind::Constructor => {
                    if let Some(scope) = self.class_scopes.get_mut(&class) {
                        scope.constructors.push(member);
                    }
                }
                MethodKind::StaticBlock => {
                    if let Some(scope) = self.class_scopes.get_mut(&class) {
                        scope.static_blocks.push(member);
                    }
                }
                MethodKind::Method | MethodKind::Getter | MethodKind::Setter => {
                    let is_static = method.modifiers.contains(ModifierFlags::STATIC);
                    let mut flags = VariableFlags::METHOD | access_flags(method.modifiers);
                    if is_static {
                        flags |= VariableFlags::STATIC;
                    }
                    self.declare_in_table(class, class_scope_id, MemberTable::method(is_static), &method.name, member, flags);
                }
            },
            NodeKind::ClassDecl(nested) => {
                let flags = VariableFlags::CLASS | VariableFlags::STATIC | access_flags(nested.modifiers);
                self.declare_in_table(class, class_scope_id, MemberTable::StaticDecl, &nested.name, member, flags);
            }
            NodeKind::InterfaceDecl(nested) => {
                let flags = VariableFlags::INTERFACE | VariableFlags::STATIC | VariableFlags::PUBLIC;
                self.declare_in_table(class, class_scope_id, MemberTable::StaticDecl, &nested.name, member, flags);
            }
            _ => {}
        }
    }

    fn declare_in_table(
        &mut self,
        class: NodeIndex,
        class_scope_id: ScopeId,
        table: MemberTable,
        name: &str,
        decl: NodeIndex,
        flags: VariableFlags,
    ) -> VariableId {
        let existing = self.class_scopes.get(&class).and_then(|s| s.find(table, name));
        if let Some(existing) = existing {
            let var = self.get_mut(existing);
            var.declarations.push(decl);
            var.flags |= flags;
            self.decl_variables.insert(decl, existing);
            return existing;
        }
        let id = self.new_variable(name, decl, flags, class_scope_id);
        if let Some(scope) = self.class_scopes.get_mut(&class) {
            scope.table_mut(table).insert(name.to_string(), id);
        }
        // Static members are reachable unqualified from inside the class body.
        if table.is_static() {
            self.scopes[class_scope_id.0 as usize]
                .bindings
                .entry(name.to_string())
                .or_insert(id);
        }
        trace!(name, ?table, "declared member");
        id
    }

    // =========================================================================
    // Functions and bodies
    // =========================================================================

    fn bind_function(&mut self, arena: &NodeArena, func: NodeIndex, parent: ScopeId) {
        let Some(data) = arena.get_function(func) else {
            return;
        };
        let mut outer = parent;
        if !data.type_params.is_empty() {
            outer = self.new_scope(ScopeKind::TypeParams, Some(parent), NodeIndex::NONE);
            self.declare_type_params(arena, &data.type_params, outer);
        }
        self.bind_node(arena, data.receiver, outer);

        let scope = self.new_scope(ScopeKind::Function, Some(outer), func);
        for &param in &data.params {
            if let Some(p) = arena.get_parameter(param) {
                self.bind_node(arena, p.type_annotation, scope);
                self.declare(
                    scope,
                    &p.name,
                    param,
                    VariableFlags::PARAMETER | VariableFlags::LOCAL | VariableFlags::INITIALIZED,
                );
            }
        }
        self.bind_node(arena, data.return_type, scope);
        self.bind_node(arena, data.body, scope);
    }

    /// Bind references inside a statement, expression or type node.
    pub(crate) fn bind_node(&mut self, arena: &NodeArena, idx: NodeIndex, scope: ScopeId) {
        let Some(kind) = arena.kind(idx) else {
            return;
        };
        match kind {
            NodeKind::Identifier(name) => {
                if let Some(var) = self.lookup(scope, name) {
                    self.resolved.insert(idx, var);
                }
            }
            NodeKind::TypeRef(type_ref) => {
                if let Some(var) = self.lookup(scope, &type_ref.name) {
                    self.resolved.insert(idx, var);
                }
                for &arg in &type_ref.type_args {
                    self.bind_node(arena, arg, scope);
                }
            }
            NodeKind::VarDecl(var) => {
                self.bind_node(arena, var.type_annotation, scope);
                self.bind_node(arena, var.initializer, scope);
                let mut flags = VariableFlags::LOCAL | var_kind_flags(var.kind);
                if var.initializer.is_some() {
                    flags |= VariableFlags::INITIALIZED;
                }
                self.declare(scope, &var.name, idx, flags);
            }
            NodeKind::ArrowFunction(_) => self.bind_function(arena, idx, scope),
            NodeKind::ClassDecl(class) => {
                let flags = VariableFlags::CLASS | VariableFlags::LOCAL | access_flags(class.modifiers);
                self.declare(scope, &class.name, idx, flags);
                self.bind_class_like(arena, idx, scope);
            }
            _ => {
                for child in kind.children() {
                    self.bind_node(arena, child, scope);
                }
            }
        }
    }
}
