//! Scopes and class member tables.

use indexmap::IndexMap;
use ets_ast::NodeIndex;

use crate::VariableId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    TypeParams,
    Class,
    Function,
}

#[derive(Clone, Debug)]
pub struct Scope {
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    /// Node that opened the scope (`NONE` for the global scope).
    pub node: NodeIndex,
    pub bindings: IndexMap<String, VariableId>,
}

/// The six member partitions of a class or interface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MemberTable {
    InstanceField,
    StaticField,
    InstanceMethod,
    StaticMethod,
    InstanceDecl,
    StaticDecl,
}

impl MemberTable {
    pub const ALL: [MemberTable; 6] = [
        MemberTable::InstanceField,
        MemberTable::StaticField,
        MemberTable::InstanceMethod,
        MemberTable::StaticMethod,
        MemberTable::InstanceDecl,
        MemberTable::StaticDecl,
    ];

    #[must_use]
    pub const fn is_static(self) -> bool {
        matches!(
            self,
            MemberTable::StaticField | MemberTable::StaticMethod | MemberTable::StaticDecl
        )
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn field(is_static: bool) -> MemberTable {
        if is_static { MemberTable::StaticField } else { MemberTable::InstanceField }
    }

    #[must_use]
    pub const fn method(is_static: bool) -> MemberTable {
        if is_static { MemberTable::StaticMethod } else { MemberTable::InstanceMethod }
    }
}

/// Member tables of one class or interface declaration.
#[derive(Clone, Debug, Default)]
pub struct ClassScope {
    tables: [IndexMap<String, VariableId>; 6],
    /// Constructor declarations in source order.
    pub constructors: Vec<NodeIndex>,
    /// Static initializer blocks in source order.
    pub static_blocks: Vec<NodeIndex>,
    /// Scope holding the declaration's type parameters.
    pub type_param_scope: Option<crate::ScopeId>,
}

impl ClassScope {
    /// Empty member tables whose type parameters live in `type_param_scope`.
    #[must_use]
    pub fn new(type_param_scope: Option<crate::ScopeId>) -> Self {
        Self {
            type_param_scope,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn table(&self, table: MemberTable) -> &IndexMap<String, VariableId> {
        &self.tables[table.index()]
    }

    pub fn table_mut(&mut self, table: MemberTable) -> &mut IndexMap<String, VariableId> {
        &mut self.tables[table.index()]
    }

    #[must_use]
    pub fn find(&self, table: MemberTable, name: &str) -> Option<VariableId> {
        self.table(table).get(name).copied()
    }

    /// Every member variable with the table it lives in.
    pub fn iter(&self) -> impl Iterator<Item = (MemberTable, &str, VariableId)> + '_ {
        MemberTable::ALL.into_iter().flat_map(move |table| {
            self.table(table)
                .iter()
                .map(move |(name, &var)| (table, name.as_str(), var))
        })
    }
}
