use super::*;
use crate::test_support::Fixture;
use ets_ast::AstBuilder;

#[test]
fn classes_relate_to_their_ancestors_only() {
    let mut b = AstBuilder::new();
    let shape = b.interface("Shape").build();
    let base = b.class("Base").implements("Shape").build();
    let derived = b.class("Derived").extends("Base").build();
    let other = b.class("Other").build();
    let mut f = Fixture::new(b, vec![shape, base, derived, other]);
    let mut checker = f.checker();

    let shape = checker.type_of_class_like(shape);
    let base = checker.type_of_class_like(base);
    let derived = checker.type_of_class_like(derived);
    let other = checker.type_of_class_like(other);
    assert!(checker.is_subtype(derived, base));
    assert!(checker.is_subtype(derived, shape));
    assert!(checker.is_subtype(derived, TypeId::OBJECT));
    assert!(!checker.is_subtype(base, derived));
    assert!(!checker.is_subtype(other, base));
    assert!(!checker.is_subtype(other, shape));
    assert!(!checker.is_subtype(shape, base));
}

#[test]
fn unions_and_errors() {
    let mut b = AstBuilder::new();
    let class = b.class("Box").build();
    let mut f = Fixture::new(b, vec![class]);
    let mut checker = f.checker();

    let nullable_int = checker.ctx.types.union(&[TypeId::INT, TypeId::NULL]);
    assert!(checker.is_subtype(TypeId::INT, nullable_int));
    assert!(checker.is_subtype(TypeId::NULL, nullable_int));
    assert!(!checker.is_subtype(nullable_int, TypeId::INT));
    assert!(!checker.is_subtype(TypeId::INT, TypeId::STRING));

    let boxed = checker.type_of_class_like(class);
    assert!(checker.is_subtype(TypeId::ERROR, boxed));
    assert!(checker.is_subtype(boxed, TypeId::ERROR));
}

#[test]
fn everything_flows_into_dynamic() {
    let mut b = AstBuilder::new();
    let class = b.class("Box").build();
    let mut f = Fixture::new(b, vec![class]);
    let mut checker = f.checker();

    let dynamic = checker.ctx.types.dynamic(ets_common::Language::Js);
    let boxed = checker.type_of_class_like(class);
    assert!(checker.is_subtype(boxed, dynamic));
    assert!(checker.is_subtype(TypeId::INT, dynamic));
}
