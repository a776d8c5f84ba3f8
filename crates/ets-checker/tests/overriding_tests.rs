use super::*;
use crate::options::CheckerOptions;
use crate::test_support::{Fixture, count_code, messages};
use ets_ast::AstBuilder;
use ets_common::diagnostic_codes as c;

/// `abstract class A { abstract foo(x: int): void }`, `interface I { bar(): void }`
fn abstract_base_and_interface(b: &mut AstBuilder) -> Vec<NodeIndex> {
    let foo = b.method("foo").param("x", "int").returns("void").abstract_().build();
    let a = b.class("A").abstract_().member(foo).build();
    let bar = b.method("bar").returns("void").build();
    let i = b.interface("I").member(bar).build();
    vec![a, i]
}

#[test]
fn every_missing_override_is_reported() {
    let mut b = AstBuilder::new();
    let mut statements = abstract_base_and_interface(&mut b);
    statements.push(b.class("B").extends("A").implements("I").build());
    let mut f = Fixture::new(b, statements);

    let diags = f.check();
    assert_eq!(count_code(&diags, c::MISSING_OVERRIDE), 2);
    let messages = messages(&diags);
    assert!(messages.contains(&"B is not abstract and does not override abstract method foo(int) in A"));
    assert!(messages.contains(&"B is not abstract and does not override abstract method bar() in I"));
}

#[test]
fn first_missing_override_only_when_configured() {
    let mut b = AstBuilder::new();
    let mut statements = abstract_base_and_interface(&mut b);
    statements.push(b.class("B").extends("A").implements("I").build());
    let options = CheckerOptions {
        report_all_missing_overrides: false,
        ..CheckerOptions::default()
    };
    let mut f = Fixture::with_options(b, statements, options);

    let diags = f.check();
    assert_eq!(count_code(&diags, c::MISSING_OVERRIDE), 1);
    assert!(messages(&diags)[0].contains("foo(int) in A"));
}

#[test]
fn implementations_discharge_obligations() {
    let mut b = AstBuilder::new();
    let mut statements = abstract_base_and_interface(&mut b);
    let foo = b.method("foo").param("x", "int").returns("void").body(vec![]).build();
    let bar = b.method("bar").returns("void").body(vec![]).build();
    statements.push(b.class("B").extends("A").implements("I").member(foo).member(bar).build());
    let mut f = Fixture::new(b, statements);

    assert!(f.check().is_empty());
}

#[test]
fn abstract_classes_may_leave_obligations_open() {
    let mut b = AstBuilder::new();
    let mut statements = abstract_base_and_interface(&mut b);
    statements.push(b.class("B").abstract_().extends("A").implements("I").build());
    let mut f = Fixture::new(b, statements);

    assert!(f.check().is_empty());
}

#[test]
fn diamond_obligation_is_owed_once() {
    let mut b = AstBuilder::new();
    let run = b.method("run").returns("void").build();
    let top = b.interface("Top").member(run).build();
    let left = b.interface("Left").extends("Top").build();
    let right = b.interface("Right").extends("Top").build();
    let class = b.class("C").implements("Left").implements("Right").build();
    let mut f = Fixture::new(b, vec![top, left, right, class]);
    let mut checker = f.checker();

    let class_ty = checker.type_of_class_like(class);
    assert_eq!(checker.abstract_obligations(class_ty).len(), 1);
    checker.validate_overriding(class_ty);
    let diags = checker.take_diagnostics();
    assert_eq!(count_code(&diags, c::MISSING_OVERRIDE), 1);
    assert!(messages(&diags)[0].ends_with("run() in Top"));
}

#[test]
fn default_method_discharges_an_inherited_obligation() {
    let mut b = AstBuilder::new();
    let hello = b.method("hello").returns("void").build();
    let base = b.interface("Base").member(hello).build();
    let hello_default = b.method("hello").returns("void").body(vec![]).build();
    let friendly = b.interface("Friendly").extends("Base").member(hello_default).build();
    let class = b.class("C").implements("Friendly").build();
    let mut f = Fixture::new(b, vec![base, friendly, class]);

    assert!(f.check().is_empty());
}

#[test]
fn unrelated_interfaces_with_clashing_methods() {
    let mut b = AstBuilder::new();
    let m1 = b.method("m").param("x", "int").returns("void").build();
    let i1 = b.interface("I1").member(m1).build();
    let m2 = b.method("m").param("x", "int").returns("int").build();
    let i2 = b.interface("I2").member(m2).build();
    let m = b.method("m").param("x", "int").returns("void").body(vec![]).build();
    let class = b.class("C").implements("I1").implements("I2").member(m).build();
    let mut f = Fixture::new(b, vec![i1, i2, class]);

    let diags = f.check();
    assert_eq!(count_code(&diags, c::INTERFACE_METHOD_COLLISION), 1);
}

/// `interface Top { m(): void }`, `interface Left extends Top { m(): void {} }`
/// and `interface Right extends Top {}`.
fn diamond(b: &mut AstBuilder) -> Vec<NodeIndex> {
    let m = b.method("m").returns("void").build();
    let top = b.interface("Top").member(m).build();
    let m = b.method("m").returns("void").body(vec![]).build();
    let left = b.interface("Left").extends("Top").member(m).build();
    let right = b.interface("Right").extends("Top").build();
    vec![top, left, right]
}

#[test]
fn diamond_with_one_overriding_branch_collides() {
    let mut b = AstBuilder::new();
    let mut statements = diamond(&mut b);
    let m = b.method("m").returns("void").body(vec![]).build();
    let both = b.class("Both").implements("Left").implements("Right").member(m).build();
    let m = b.method("m").returns("void").body(vec![]).build();
    let one = b.class("One").implements("Left").member(m).build();
    statements.extend([both, one]);
    let mut f = Fixture::new(b, statements);

    let diags = f.check();
    assert_eq!(count_code(&diags, c::INTERFACE_METHOD_COLLISION), 1);
    let collision = diags.iter().find(|d| d.code == c::INTERFACE_METHOD_COLLISION).map(|d| d.start);
    assert_eq!(collision, Some(f.arena.span(both).start));
    assert!(messages(&diags).contains(&"Method 'm' is declared in Top and Left interfaces."));
}

#[test]
fn diamond_overridden_on_every_branch_is_fine() {
    let mut b = AstBuilder::new();
    let m = b.method("m").returns("void").build();
    let top = b.interface("Top").member(m).build();
    let m = b.method("m").returns("void").body(vec![]).build();
    let left = b.interface("Left").extends("Top").member(m).build();
    let m = b.method("m").returns("void").body(vec![]).build();
    let right = b.interface("Right").extends("Top").member(m).build();
    let m = b.method("m").returns("void").body(vec![]).build();
    let both = b.class("Both").implements("Left").implements("Right").member(m).build();
    let mut f = Fixture::new(b, vec![top, left, right, both]);

    assert_eq!(count_code(&f.check(), c::INTERFACE_METHOD_COLLISION), 0);
}

#[test]
fn field_and_method_of_one_name_conflict_across_inheritance() {
    let mut b = AstBuilder::new();
    let zero = b.int(0);
    let field = b.field("size", "int").init(zero).build();
    let a = b.class("A").member(field).build();
    let zero = b.int(0);
    let ret = b.ret(zero);
    let method = b.method("size").returns("int").body(vec![ret]).build();
    let bb = b.class("B").extends("A").member(method).build();
    let mut f = Fixture::new(b, vec![a, bb]);

    let diags = f.check();
    assert_eq!(count_code(&diags, c::INHERITED_WITH_DIFFERENT_DECLARATION), 1);
    let conflict = diags
        .iter()
        .find(|d| d.code == c::INHERITED_WITH_DIFFERENT_DECLARATION)
        .map(|d| d.related.clone())
        .unwrap_or_default();
    assert_eq!(conflict.len(), 1);
    assert_eq!(conflict[0].start, f.arena.span(field).start);
}

#[test]
fn invoke_and_instantiate_may_not_coexist() {
    let mut b = AstBuilder::new();
    let invoke = b.method("$_invoke").static_().returns("void").body(vec![]).build();
    let instantiate = b.method("$_instantiate").static_().returns("void").body(vec![]).build();
    let both = b.class("Both").member(invoke).member(instantiate).build();

    let invoke = b.method("$_invoke").static_().returns("void").body(vec![]).build();
    let base = b.class("Base").member(invoke).build();
    let instantiate = b.method("$_instantiate").static_().returns("void").body(vec![]).build();
    let derived = b.class("Derived").extends("Base").member(instantiate).build();
    let mut f = Fixture::new(b, vec![both, base, derived]);

    let diags = f.check();
    assert_eq!(count_code(&diags, c::INVOKE_AND_INSTANTIATE), 2);
}

#[test]
fn invoke_legitimacy_settles_once() {
    let mut b = AstBuilder::new();
    let invoke = b.method("$_invoke").static_().returns("void").body(vec![]).build();
    let instantiate = b.method("$_instantiate").static_().returns("void").body(vec![]).build();
    let both = b.class("Both").member(invoke).member(instantiate).build();
    let mut f = Fixture::new(b, vec![both]);
    let mut checker = f.checker();

    let ty = checker.type_of_class_like(both);
    assert_eq!(checker.check_invoke_legitimacy(ty), FacetState::Failed);
    assert_eq!(checker.check_invoke_legitimacy(ty), FacetState::Failed);
    assert_eq!(checker.diagnostics().len(), 1);
}
