//! Flat node storage.
//!
//! Nodes are appended bottom-up: children first, then the parent. Adding a
//! node links the parent pointer of each of its children, so a finished tree
//! always has consistent `parent` links.

use ets_common::Span;
use smallvec::SmallVec;

use crate::node::*;
use crate::NodeIndex;

#[derive(Clone, Debug, Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    #[must_use]
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append a node and adopt its children.
    pub fn add(&mut self, kind: NodeKind, span: Span) -> NodeIndex {
        let idx = NodeIndex(self.nodes.len() as u32);
        for child in kind.children() {
            if let Some(node) = self.nodes.get_mut(child.0 as usize) {
                node.parent = idx;
            }
        }
        self.nodes.push(Node {
            kind,
            span,
            parent: NodeIndex::NONE,
        });
        idx
    }

    /// Replace the payload of an existing node, adopting the new children.
    pub fn replace_kind(&mut self, idx: NodeIndex, kind: NodeKind) {
        for child in kind.children() {
            if let Some(node) = self.nodes.get_mut(child.0 as usize) {
                node.parent = idx;
            }
        }
        if let Some(node) = self.nodes.get_mut(idx.0 as usize) {
            node.kind = kind;
        }
    }

    #[inline]
    #[must_use]
    pub fn get(&self, idx: NodeIndex) -> Option<&Node> {
        if idx.is_none() {
            return None;
        }
        self.nodes.get(idx.0 as usize)
    }

    #[inline]
    pub fn get_mut(&mut self, idx: NodeIndex) -> Option<&mut Node> {
        if idx.is_none() {
            return None;
        }
        self.nodes.get_mut(idx.0 as usize)
    }

    #[inline]
    #[must_use]
    pub fn kind(&self, idx: NodeIndex) -> Option<&NodeKind> {
        self.get(idx).map(|n| &n.kind)
    }

    #[inline]
    #[must_use]
    pub fn parent(&self, idx: NodeIndex) -> NodeIndex {
        self.get(idx).map_or(NodeIndex::NONE, |n| n.parent)
    }

    #[inline]
    #[must_use]
    pub fn span(&self, idx: NodeIndex) -> Span {
        self.get(idx).map_or(Span::SYNTHETIC, |n| n.span)
    }

    #[must_use]
    pub fn children(&self, idx: NodeIndex) -> SmallVec<[NodeIndex; 4]> {
        self.kind(idx).map(NodeKind::children).unwrap_or_default()
    }

    #[must_use]
    pub fn name_of(&self, idx: NodeIndex) -> Option<&str> {
        self.kind(idx).and_then(NodeKind::name)
    }

    // =========================================================================
    // Typed accessors
    // =========================================================================

    #[must_use]
    pub fn get_program(&self, idx: NodeIndex) -> Option<&ProgramData> {
        match self.kind(idx)? {
            NodeKind::Program(p) => Some(p),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_class(&self, idx: NodeIndex) -> Option<&ClassData> {
        match self.kind(idx)? {
            NodeKind::ClassDecl(c) => Some(c),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_interface(&self, idx: NodeIndex) -> Option<&InterfaceData> {
        match self.kind(idx)? {
            NodeKind::InterfaceDecl(i) => Some(i),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_function_decl(&self, idx: NodeIndex) -> Option<&FunctionDeclData> {
        match self.kind(idx)? {
            NodeKind::FunctionDecl(f) => Some(f),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_type_alias(&self, idx: NodeIndex) -> Option<&TypeAliasData> {
        match self.kind(idx)? {
            NodeKind::TypeAliasDecl(a) => Some(a),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_type_param(&self, idx: NodeIndex) -> Option<&TypeParamData> {
        match self.kind(idx)? {
            NodeKind::TypeParam(t) => Some(t),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_property(&self, idx: NodeIndex) -> Option<&PropertyData> {
        match self.kind(idx)? {
            NodeKind::ClassProperty(p) => Some(p),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_method(&self, idx: NodeIndex) -> Option<&MethodData> {
        match self.kind(idx)? {
            NodeKind::Method(m) => Some(m),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_parameter(&self, idx: NodeIndex) -> Option<&ParameterData> {
        match self.kind(idx)? {
            NodeKind::Parameter(p) => Some(p),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_type_ref(&self, idx: NodeIndex) -> Option<&TypeRefData> {
        match self.kind(idx)? {
            NodeKind::TypeRef(t) => Some(t),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_member(&self, idx: NodeIndex) -> Option<&MemberData> {
        match self.kind(idx)? {
            NodeKind::Member(m) => Some(m),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_call(&self, idx: NodeIndex) -> Option<&CallData> {
        match self.kind(idx)? {
            NodeKind::Call(c) => Some(c),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_identifier(&self, idx: NodeIndex) -> Option<&str> {
        match self.kind(idx)? {
            NodeKind::Identifier(name) => Some(name),
            _ => None,
        }
    }

    /// Function payload of methods, function declarations and arrows.
    #[must_use]
    pub fn get_function(&self, idx: NodeIndex) -> Option<&FunctionData> {
        match self.kind(idx)? {
            NodeKind::Method(m) => Some(&m.function),
            NodeKind::FunctionDecl(f) => Some(&f.function),
            NodeKind::ArrowFunction(f) => Some(f),
            _ => None,
        }
    }

    /// Statements of a `Block`; empty for anything else.
    #[must_use]
    pub fn block_statements(&self, idx: NodeIndex) -> &[NodeIndex] {
        match self.kind(idx) {
            Some(NodeKind::Block(stmts)) => stmts,
            _ => &[],
        }
    }

    /// Iterate all node indices in insertion order.
    pub fn indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        (0..self.nodes.len() as u32).map(NodeIndex)
    }
}

#[cfg(test)]
#[path = "../tests/arena_tests.rs"]
mod tests;
