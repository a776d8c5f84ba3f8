use super::*;
use crate::test_support::{Fixture, count_code};
use crate::types::PropertySearchFlags;
use ets_ast::AstBuilder;
use ets_common::diagnostic_codes as c;

/// `interface HasName { name: string }`
fn has_name(b: &mut AstBuilder) -> NodeIndex {
    let name = b.field("name", "string").build();
    b.interface("HasName").member(name).build()
}

#[test]
fn field_implementing_a_property_becomes_an_accessor_pair() {
    let mut b = AstBuilder::new();
    let iface = has_name(&mut b);
    let init = b.string("x");
    let field = b.field("name", "string").init(init).build();
    let class = b.class("Person").implements("HasName").member(field).build();
    let mut f = Fixture::new(b, vec![iface, class]);
    let root = f.root;
    let mut checker = f.checker();
    checker.check_program(root);

    assert!(checker.diagnostics().is_empty());
    let edits = checker.take_edits();
    assert_eq!(edits.len(), 1);
    let AstEdit::ReplaceMember { class: target, member, with } = &edits[0] else {
        panic!("expected a member replacement, got {:?}", edits[0]);
    };
    assert_eq!((*target, *member), (class, field));
    assert_eq!(with.len(), 3);
    assert!(matches!(
        &with[0],
        SyntheticMember::Field { name, .. } if *name == backing_field_name("name")
    ));
    assert!(matches!(&with[1], SyntheticMember::Method { kind: MethodKind::Getter, .. }));
    assert!(matches!(&with[2], SyntheticMember::Method { kind: MethodKind::Setter, .. }));

    // Marks are consumed; a second pass generates nothing.
    let person = checker.type_of_class_like(class);
    checker.transform_properties(person);
    assert!(checker.take_edits().is_empty());
}

#[test]
fn generated_accessors_replace_the_field_in_member_tables() {
    let mut b = AstBuilder::new();
    let iface = has_name(&mut b);
    let init = b.string("x");
    let field = b.field("name", "string").init(init).build();
    let class = b.class("Person").implements("HasName").member(field).build();
    let mut f = Fixture::new(b, vec![iface, class]);
    let root = f.root;
    let mut checker = f.checker();
    checker.check_program(root);

    let person = checker.type_of_class_like(class);
    let method = checker.find_own_property(person, "name", PropertySearchFlags::SEARCH_INSTANCE_METHOD);
    assert!(method.is_some());
    let backing = checker.find_own_property(
        person,
        &backing_field_name("name"),
        PropertySearchFlags::SEARCH_INSTANCE_FIELD,
    );
    assert!(backing.is_some());
    assert!(
        checker
            .find_own_property(person, "name", PropertySearchFlags::SEARCH_INSTANCE_FIELD)
            .is_none()
    );
}

#[test]
fn readonly_property_gets_only_a_getter() {
    let mut b = AstBuilder::new();
    let id = b.field("id", "int").readonly().build();
    let iface = b.interface("HasId").member(id).build();
    let one = b.int(1);
    let field = b.field("id", "int").readonly().init(one).build();
    let class = b.class("Item").implements("HasId").member(field).build();
    let mut f = Fixture::new(b, vec![iface, class]);
    let root = f.root;
    let mut checker = f.checker();
    checker.check_program(root);

    assert!(checker.diagnostics().is_empty());
    let edits = checker.take_edits();
    let AstEdit::ReplaceMember { with, .. } = &edits[0] else {
        panic!("expected a member replacement, got {:?}", edits[0]);
    };
    assert_eq!(with.len(), 2);
}

#[test]
fn non_public_field_cannot_implement_a_property() {
    let mut b = AstBuilder::new();
    let iface = has_name(&mut b);
    let init = b.string("x");
    let field = b.field("name", "string").private_().init(init).build();
    let class = b.class("Person").implements("HasName").member(field).build();
    let mut f = Fixture::new(b, vec![iface, class]);

    let diags = f.check();
    assert_eq!(count_code(&diags, c::NON_PUBLIC_INTERFACE_PROPERTY), 1);
    assert_eq!(diags.len(), 1);
}

#[test]
fn inherited_field_is_copied_into_the_implementing_class() {
    let mut b = AstBuilder::new();
    let iface = has_name(&mut b);
    let init = b.string("x");
    let field = b.field("name", "string").init(init).build();
    let base = b.class("Base").member(field).build();
    let derived = b.class("Derived").extends("Base").implements("HasName").build();
    let mut f = Fixture::new(b, vec![iface, base, derived]);
    let root = f.root;
    let mut checker = f.checker();
    checker.check_program(root);

    assert!(checker.diagnostics().is_empty());
    let edits = checker.take_edits();
    assert_eq!(edits.len(), 1);
    let AstEdit::AddMember { class, member } = &edits[0] else {
        panic!("expected an added member, got {:?}", edits[0]);
    };
    assert_eq!(*class, ClassTarget::Existing(derived));
    let SyntheticMember::CopyOfField { source, add_modifiers } = member else {
        panic!("expected a field copy, got {member:?}");
    };
    assert_eq!(*source, field);
    assert!(add_modifiers.contains(ModifierFlags::SUPER_OWNER));
    assert!(add_modifiers.contains(ModifierFlags::GETTER));
}

#[test]
fn accessor_groups_are_consistent() {
    let mut b = AstBuilder::new();
    let zero = b.int(0);
    let ret = b.ret(zero);
    let a_getter = b.getter("a", "int").body(vec![ret]).build();
    let a_method = b.method("a").returns("void").body(vec![]).build();
    let zero = b.int(0);
    let ret = b.ret(zero);
    let b_first = b.getter("b", "int").body(vec![ret]).build();
    let zero = b.int(0);
    let ret = b.ret(zero);
    let b_second = b.getter("b", "int").body(vec![ret]).build();
    let zero = b.int(0);
    let ret = b.ret(zero);
    let c_getter = b.getter("c", "int").private_().body(vec![ret]).build();
    let c_setter = b.setter("c", "int").body(vec![]).build();
    let class = b
        .class("Widget")
        .members([a_getter, a_method, b_first, b_second, c_getter, c_setter])
        .build();
    let mut f = Fixture::new(b, vec![class]);

    let diags = f.check();
    assert_eq!(count_code(&diags, c::METHOD_SAME_NAME_AS_ACCESSOR), 1);
    assert_eq!(count_code(&diags, c::DUPLICATE_ACCESSOR), 1);
    assert_eq!(count_code(&diags, c::ACCESSOR_MODIFIERS_MISMATCH), 1);
}

#[test]
fn static_and_instance_accessors_are_separate_groups() {
    let mut b = AstBuilder::new();
    let zero = b.int(0);
    let ret = b.ret(zero);
    let instance = b.getter("v", "int").body(vec![ret]).build();
    let zero = b.int(0);
    let ret = b.ret(zero);
    let static_getter = b.getter("v", "int").static_().body(vec![ret]).build();
    let class = b.class("Widget").members([instance, static_getter]).build();
    let mut f = Fixture::new(b, vec![class]);

    assert_eq!(count_code(&f.check(), c::DUPLICATE_ACCESSOR), 0);
}
