//! Structural queries over a finished arena.
//!
//! These answer "where is this node" questions by walking parent links. The
//! checker derives access roles from them.

use crate::node::{MethodKind, NodeKind};
use crate::{NodeArena, NodeIndex};

impl NodeArena {
    /// Nearest ancestor (excluding `idx`) satisfying `pred`.
    pub fn find_ancestor(&self, idx: NodeIndex, pred: impl Fn(&NodeKind) -> bool) -> NodeIndex {
        let mut current = self.parent(idx);
        while let Some(node) = self.get(current) {
            if pred(&node.kind) {
                return current;
            }
            current = node.parent;
        }
        NodeIndex::NONE
    }

    /// Innermost method, function declaration or arrow function containing `idx`.
    #[must_use]
    pub fn enclosing_function(&self, idx: NodeIndex) -> NodeIndex {
        self.find_ancestor(idx, |k| {
            matches!(k, NodeKind::Method(_) | NodeKind::FunctionDecl(_) | NodeKind::ArrowFunction(_))
        })
    }

    /// Innermost class declaration containing `idx`.
    #[must_use]
    pub fn enclosing_class(&self, idx: NodeIndex) -> NodeIndex {
        self.find_ancestor(idx, |k| matches!(k, NodeKind::ClassDecl(_)))
    }

    /// Whether `idx` sits inside a constructor of `class` (not nested in an
    /// arrow function).
    #[must_use]
    pub fn is_in_constructor_of(&self, idx: NodeIndex, class: NodeIndex) -> bool {
        let func = self.enclosing_function(idx);
        match self.get_method(func) {
            Some(m) if m.kind == MethodKind::Constructor => self.parent(func) == class,
            _ => false,
        }
    }

    /// Whether `idx` is the callee of its parent call expression.
    #[must_use]
    pub fn is_call_callee(&self, idx: NodeIndex) -> bool {
        self.get_call(self.parent(idx)).is_some_and(|c| c.callee == idx)
    }

    /// Root object expression of a member chain (`a` for `a.b.c`).
    #[must_use]
    pub fn member_chain_root(&self, idx: NodeIndex) -> NodeIndex {
        let mut current = idx;
        while let Some(member) = self.get_member(current) {
            current = member.object;
        }
        current
    }

    /// Whether the whole subtree rooted at `idx` contains a node matching `pred`.
    pub fn subtree_contains(&self, idx: NodeIndex, pred: &impl Fn(&NodeKind) -> bool) -> bool {
        let Some(node) = self.get(idx) else {
            return false;
        };
        if pred(&node.kind) {
            return true;
        }
        node.kind
            .children()
            .into_iter()
            .any(|child| self.subtree_contains(child, pred))
    }

    /// Program root reached from any node.
    #[must_use]
    pub fn program_of(&self, idx: NodeIndex) -> NodeIndex {
        let mut current = idx;
        loop {
            let parent = self.parent(current);
            if parent.is_none() {
                return current;
            }
            current = parent;
        }
    }
}
