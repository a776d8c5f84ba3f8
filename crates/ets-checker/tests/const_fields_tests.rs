use super::*;
use crate::test_support::{Fixture, count_code, messages};
use ets_ast::AstBuilder;
use ets_common::diagnostic_codes as c;

#[test]
fn readonly_field_without_any_constructor() {
    let mut b = AstBuilder::new();
    let field = b.field("x", "int").readonly().build();
    let class = b.class("A").member(field).build();
    let mut f = Fixture::new(b, vec![class]);

    let diags = f.check();
    assert_eq!(count_code(&diags, c::MAYBE_MISSING_INIT), 1);
    assert_eq!(diags[0].start, f.arena.span(field).start);
    assert!(messages(&diags).contains(&"Variable 'x' might not have been initialized"));
}

#[test]
fn constructor_that_skips_the_field() {
    let mut b = AstBuilder::new();
    let field = b.field("x", "int").readonly().build();
    let ctor = b.constructor().body(vec![]).build();
    let class = b.class("A").member(field).member(ctor).build();
    let mut f = Fixture::new(b, vec![class]);

    let diags = f.check();
    assert_eq!(count_code(&diags, c::MAYBE_MISSING_INIT), 1);
    assert_eq!(diags[0].start, f.arena.span(ctor).start);
}

#[test]
fn second_assignment_is_a_double_init() {
    let mut b = AstBuilder::new();
    let field = b.field("x", "int").readonly().build();
    let one = b.int(1);
    let first = b.assign_this("x", one);
    let two = b.int(2);
    let second = b.assign_this("x", two);
    let ctor = b.constructor().body(vec![first, second]).build();
    let class = b.class("A").member(field).member(ctor).build();
    let mut f = Fixture::new(b, vec![class]);

    let diags = f.check();
    assert_eq!(count_code(&diags, c::MAYBE_DOUBLE_INIT), 1);
    assert_eq!(count_code(&diags, c::MAYBE_MISSING_INIT), 0);
}

#[test]
fn assignments_inside_branches_still_count() {
    let mut b = AstBuilder::new();
    let field = b.field("x", "int").readonly().build();
    let one = b.int(1);
    let assign = b.assign_this("x", one);
    let test = b.bool(true);
    let branch = b.if_(test, vec![assign], None);
    let ctor = b.constructor().body(vec![branch]).build();
    let class = b.class("A").member(field).member(ctor).build();
    let mut f = Fixture::new(b, vec![class]);

    assert!(f.check().is_empty());
}

#[test]
fn delegating_constructors_are_exempt() {
    let mut b = AstBuilder::new();
    let field = b.field("x", "int").readonly().build();
    let one = b.int(1);
    let assign = b.assign_this("x", one);
    let main_ctor = b.constructor().body(vec![assign]).build();
    let delegate = b.this_call(vec![]);
    let other_ctor = b.constructor().param("v", "int").body(vec![delegate]).build();
    let class = b.class("A").member(field).member(main_ctor).member(other_ctor).build();
    let mut f = Fixture::new(b, vec![class]);

    assert!(f.check().is_empty());
}

#[test]
fn delegating_constructor_cannot_assign_again() {
    let mut b = AstBuilder::new();
    let field = b.field("x", "int").readonly().build();
    let one = b.int(1);
    let assign = b.assign_this("x", one);
    let main_ctor = b.constructor().body(vec![assign]).build();
    let delegate = b.this_call(vec![]);
    let target = b.this_member("x");
    let two = b.int(2);
    let again = b.assign(target, two);
    let again_stmt = b.expr_stmt(again);
    let other_ctor = b.constructor().param("v", "int").body(vec![delegate, again_stmt]).build();
    let class = b.class("A").member(field).member(main_ctor).member(other_ctor).build();
    let mut f = Fixture::new(b, vec![class]);

    let diags = f.check();
    assert_eq!(count_code(&diags, c::MAYBE_DOUBLE_INIT), 1);
    assert_eq!(count_code(&diags, c::MAYBE_MISSING_INIT), 0);
    let double = diags.iter().find(|d| d.code == c::MAYBE_DOUBLE_INIT).map(|d| d.start);
    assert_eq!(double, Some(f.arena.span(again).start));
}

#[test]
fn assignments_in_nested_lambdas_do_not_count() {
    let mut b = AstBuilder::new();
    let field = b.field("x", "int").readonly().build();
    let one = b.int(1);
    let assign = b.assign_this("x", one);
    let lambda = b.arrow(&[], Some("void"), vec![assign]);
    let keep = b.let_("f", None, lambda);
    let ctor = b.constructor().body(vec![keep]).build();
    let class = b.class("A").member(field).member(ctor).build();
    let mut f = Fixture::new(b, vec![class]);

    let diags = f.check();
    assert_eq!(count_code(&diags, c::MAYBE_MISSING_INIT), 1);
}

#[test]
fn static_readonly_fields_need_a_static_block() {
    let mut b = AstBuilder::new();
    let missing = b.field("s", "int").static_().readonly().build();
    let lonely = b.class("Lonely").member(missing).build();

    let field = b.field("s", "int").static_().readonly().build();
    let target = b.ident("Fine");
    let member = b.member(target, "s");
    let one = b.int(1);
    let assign = b.assign(member, one);
    let stmt = b.expr_stmt(assign);
    let block = b.static_block(vec![stmt]);
    let fine = b.class("Fine").member(field).member(block).build();

    let field = b.field("t", "int").static_().readonly().build();
    let target = b.ident("t");
    let one = b.int(1);
    let first = b.assign(target, one);
    let first = b.expr_stmt(first);
    let target = b.ident("t");
    let two = b.int(2);
    let second = b.assign(target, two);
    let second = b.expr_stmt(second);
    let block = b.static_block(vec![first, second]);
    let twice = b.class("Twice").member(field).member(block).build();
    let mut f = Fixture::new(b, vec![lonely, fine, twice]);

    let diags = f.check();
    assert_eq!(count_code(&diags, c::MAYBE_MISSING_INIT), 1);
    assert_eq!(count_code(&diags, c::MAYBE_DOUBLE_INIT), 1);
}

#[test]
fn declared_classes_are_not_checked() {
    let mut b = AstBuilder::new();
    let field = b.field("x", "int").readonly().build();
    let class = b.class("Ambient").declare().member(field).build();
    let mut f = Fixture::new(b, vec![class]);

    assert_eq!(count_code(&f.check(), c::MAYBE_MISSING_INIT), 0);
}
