use crate::node::*;
use crate::{AstBuilder, ModifierFlags, NodeIndex};

#[test]
fn adding_parent_links_children() {
    let mut b = AstBuilder::new();
    let value = b.int(1);
    let stmt = b.assign_this("x", value);
    let ctor = b.constructor().body(vec![stmt]).build();
    let class = b.class("A").member(ctor).build();
    let (arena, root) = b.finish(vec![class]);

    assert_eq!(arena.parent(class), root);
    assert_eq!(arena.parent(ctor), class);
    assert_eq!(arena.enclosing_class(value), class);
    assert_eq!(arena.enclosing_function(value), ctor);
    assert!(arena.is_in_constructor_of(value, class));
    assert_eq!(arena.program_of(value), root);
}

#[test]
fn callee_and_member_chain_queries() {
    let mut b = AstBuilder::new();
    let a = b.ident("a");
    let ab = b.member(a, "b");
    let abc = b.member(ab, "c");
    let call = b.call(abc, vec![]);
    let stmt = b.expr_stmt(call);
    let (arena, _) = b.finish(vec![stmt]);

    assert!(arena.is_call_callee(abc));
    assert!(!arena.is_call_callee(ab));
    assert_eq!(arena.member_chain_root(abc), a);
    assert!(arena.subtree_contains(stmt, &|k| matches!(k, NodeKind::Identifier(n) if n == "a")));
}

#[test]
fn type_text_builds_generic_and_union_nodes() {
    let mut b = AstBuilder::new();
    let ty = b.ty("Map<K, Box<V>> | null");
    let (arena, _) = b.finish(vec![]);

    let Some(NodeKind::UnionTypeNode(members)) = arena.kind(ty) else {
        panic!("expected union type node, got {:?}", arena.kind(ty));
    };
    assert_eq!(members.len(), 2);
    let map = arena.get_type_ref(members[0]).expect("first member is a type ref");
    assert_eq!(map.name, "Map");
    assert_eq!(map.type_args.len(), 2);
    assert_eq!(
        crate::type_text::type_to_text(&arena, ty),
        "Map<K, Box<V>> | null"
    );
}

#[test]
fn missing_optional_children_are_none() {
    let mut b = AstBuilder::new();
    let field = b.field("x", "int").readonly().build();
    let (arena, _) = b.finish(vec![]);

    let prop = arena.get_property(field).expect("field node");
    assert!(prop.initializer.is_none());
    assert!(prop.modifiers.contains(ModifierFlags::READONLY));
    assert_eq!(arena.children(field).len(), 1);
    assert!(arena.get(NodeIndex::NONE).is_none());
}
