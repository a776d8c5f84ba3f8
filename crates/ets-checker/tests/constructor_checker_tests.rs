use super::*;
use crate::options::CheckerOptions;
use crate::test_support::{Fixture, count_code, messages};
use ets_ast::AstBuilder;
use ets_common::diagnostic_codes as c;

/// `class A { constructor(x: int) {} }`
fn base_with_int_ctor(b: &mut AstBuilder) -> NodeIndex {
    let ctor = b.constructor().param("x", "int").body(vec![]).build();
    b.class("A").member(ctor).build()
}

#[test]
fn implicit_super_call_is_recorded() {
    let mut b = AstBuilder::new();
    let a = b.class("A").build();
    let one = b.int(1);
    let local = b.let_("x", None, one);
    let ctor = b.constructor().body(vec![local]).build();
    let derived = b.class("B").extends("A").member(ctor).build();
    let mut f = Fixture::new(b, vec![a, derived]);
    let root = f.root;
    let mut checker = f.checker();
    checker.check_program(root);

    assert!(checker.diagnostics().is_empty());
    assert_eq!(checker.ctx.implicit_super_calls, vec![ctor]);
    let b_ty = checker.type_of_class_like(derived);
    let sig = checker.signature_of_function(ctor, b_ty);
    assert!(checker.ctx.types.signature(sig).has(SignatureFlags::IMPLICIT_SUPER_CALL_NEEDED));
    assert_eq!(checker.constructor_start(ctor), ConstructorStart::Implicit);
}

#[test]
fn missing_super_call_is_reported_once_per_constructor() {
    let mut b = AstBuilder::new();
    let a = base_with_int_ctor(&mut b);
    let ctor = b.constructor().body(vec![]).build();
    let with_ctor = b.class("B").extends("A").member(ctor).build();
    let without_ctor = b.class("C").extends("A").build();
    let mut f = Fixture::new(b, vec![a, with_ctor, without_ctor]);

    let diags = f.check();
    assert_eq!(count_code(&diags, c::MUST_CALL_SUPER_CONSTRUCTOR), 2);
    assert_eq!(diags.len(), 2);
}

#[test]
fn explicit_super_call_must_match_a_constructor() {
    let mut b = AstBuilder::new();
    let a = base_with_int_ctor(&mut b);
    let call = b.super_call(vec![]);
    let ctor = b.constructor().body(vec![call]).build();
    let derived = b.class("B").extends("A").member(ctor).build();
    let one = b.int(1);
    let good_call = b.super_call(vec![one]);
    let good_ctor = b.constructor().body(vec![good_call]).build();
    let good = b.class("G").extends("A").member(good_ctor).build();
    let mut f = Fixture::new(b, vec![a, derived, good]);

    let diags = f.check();
    assert_eq!(count_code(&diags, c::NO_MATCHING_CONSTRUCTOR), 1);
    assert!(messages(&diags).contains(&"No matching constructor for 'A' with 0 argument(s)"));
}

#[test]
fn self_delegation_is_recursive() {
    let mut b = AstBuilder::new();
    let call = b.this_call(vec![]);
    let ctor = b.constructor().body(vec![call]).build();
    let class = b.class("R").member(ctor).build();
    let mut f = Fixture::new(b, vec![class]);

    let diags = f.check();
    assert_eq!(count_code(&diags, c::RECURSIVE_CONSTRUCTOR_INVOCATION), 1);
}

#[test]
fn mutual_delegation_is_reported_for_each_constructor() {
    let mut b = AstBuilder::new();
    let one = b.int(1);
    let to_second = b.this_call(vec![one]);
    let first = b.constructor().body(vec![to_second]).build();
    let to_first = b.this_call(vec![]);
    let second = b.constructor().param("x", "int").body(vec![to_first]).build();
    let class = b.class("R").member(first).member(second).build();
    let mut f = Fixture::new(b, vec![class]);

    let diags = f.check();
    assert_eq!(count_code(&diags, c::RECURSIVE_CONSTRUCTOR_INVOCATION), 2);
}

#[test]
fn delegation_depth_is_bounded_by_options() {
    let mut b = AstBuilder::new();
    let one = b.int(1);
    let to_second = b.this_call(vec![one]);
    let first = b.constructor().body(vec![to_second]).build();
    let to_first = b.this_call(vec![]);
    let second = b.constructor().param("x", "int").body(vec![to_first]).build();
    let class = b.class("R").member(first).member(second).build();
    let options = CheckerOptions {
        max_constructor_chain_depth: 1,
        ..CheckerOptions::default()
    };
    let mut f = Fixture::with_options(b, vec![class], options);

    assert_eq!(count_code(&f.check(), c::RECURSIVE_CONSTRUCTOR_INVOCATION), 0);
}

#[test]
fn delegation_to_a_missing_overload() {
    let mut b = AstBuilder::new();
    let one = b.int(1);
    let two = b.int(2);
    let call = b.this_call(vec![one, two]);
    let ctor = b.constructor().body(vec![call]).build();
    let class = b.class("R").member(ctor).build();
    let mut f = Fixture::new(b, vec![class]);

    let diags = f.check();
    assert_eq!(count_code(&diags, c::NO_MATCHING_CONSTRUCTOR), 1);
    assert_eq!(count_code(&diags, c::RECURSIVE_CONSTRUCTOR_INVOCATION), 0);
}

#[test]
fn this_is_not_allowed_in_leading_call_arguments() {
    let mut b = AstBuilder::new();
    let a = base_with_int_ctor(&mut b);
    let zero = b.int(0);
    let field = b.field("f", "int").init(zero).build();
    let arg = b.this_member("f");
    let call = b.super_call(vec![arg]);
    let ctor = b.constructor().body(vec![call]).build();
    let derived = b.class("B").extends("A").member(field).member(ctor).build();
    let mut f = Fixture::new(b, vec![a, derived]);

    let diags = f.check();
    assert_eq!(count_code(&diags, c::THIS_OR_SUPER_IN_CONSTRUCTOR), 1);
    assert!(messages(&diags).contains(&"Using this is not allowed in constructor"));
}

/// `class A { static s: int = 0; i: int = 0; constructor(x: int) {} }`
fn base_with_static_and_instance(b: &mut AstBuilder) -> NodeIndex {
    let zero = b.int(0);
    let s = b.field("s", "int").static_().init(zero).build();
    let zero = b.int(0);
    let i = b.field("i", "int").init(zero).build();
    let ctor = b.constructor().param("x", "int").body(vec![]).build();
    b.class("A").member(s).member(i).member(ctor).build()
}

#[test]
fn static_members_may_feed_the_leading_call() {
    let mut b = AstBuilder::new();
    let a = base_with_static_and_instance(&mut b);
    let sup = b.super_();
    let arg = b.member(sup, "s");
    let call = b.super_call(vec![arg]);
    let ctor = b.constructor().body(vec![call]).build();
    let derived = b.class("B").extends("A").member(ctor).build();
    let mut f = Fixture::new(b, vec![a, derived]);

    assert!(f.check().is_empty());
}

#[test]
fn instance_members_may_not_feed_the_leading_call() {
    let mut b = AstBuilder::new();
    let a = base_with_static_and_instance(&mut b);
    let sup = b.super_();
    let arg = b.member(sup, "i");
    let call = b.super_call(vec![arg]);
    let ctor = b.constructor().body(vec![call]).build();
    let derived = b.class("B").extends("A").member(ctor).build();
    let mut f = Fixture::new(b, vec![a, derived]);

    let diags = f.check();
    assert_eq!(count_code(&diags, c::THIS_OR_SUPER_IN_CONSTRUCTOR), 1);
    assert!(messages(&diags).contains(&"Using super is not allowed in constructor"));
}

#[test]
fn declared_classes_skip_constructor_checks() {
    let mut b = AstBuilder::new();
    let a = base_with_int_ctor(&mut b);
    let ambient = b.class("D").declare().extends("A").build();
    let mut f = Fixture::new(b, vec![a, ambient]);

    assert_eq!(count_code(&f.check(), c::MUST_CALL_SUPER_CONSTRUCTOR), 0);
}

#[test]
fn optional_parameters_do_not_make_a_default_constructor() {
    let mut b = AstBuilder::new();
    let base_ctor = b.constructor().optional_param("x", "int").body(vec![]).build();
    let a = b.class("A").member(base_ctor).build();
    let ctor = b.constructor().body(vec![]).build();
    let derived = b.class("B").extends("A").member(ctor).build();
    let mut f = Fixture::new(b, vec![a, derived]);
    let root = f.root;
    let mut checker = f.checker();
    checker.check_program(root);

    assert_eq!(count_code(checker.diagnostics(), c::MUST_CALL_SUPER_CONSTRUCTOR), 1);
    assert!(checker.ctx.implicit_super_calls.is_empty());
}

#[test]
fn constructor_calls_after_the_first_statement() {
    let mut b = AstBuilder::new();
    let a = b.class("A").build();
    let one = b.int(1);
    let local = b.let_("x", None, one);
    let late = b.super_call(vec![]);
    let ctor = b.constructor().body(vec![local, late]).build();
    let implicit = b.class("B").extends("A").member(ctor).build();

    let first = b.super_call(vec![]);
    let second = b.super_call(vec![]);
    let ctor = b.constructor().body(vec![first, second]).build();
    let explicit = b.class("C").extends("A").member(ctor).build();
    let mut f = Fixture::new(b, vec![a, implicit, explicit]);

    let diags = f.check();
    assert_eq!(count_code(&diags, c::CONSTRUCTOR_CALL_MUST_BE_FIRST), 2);
    assert!(messages(&diags).contains(&"Call to 'super' must be first statement in constructor"));
}

#[test]
fn new_expression_checks_constructor_arity() {
    let mut b = AstBuilder::new();
    let a = base_with_int_ctor(&mut b);
    let bad = b.new_("A", vec![]);
    let bad_stmt = b.expr_stmt(bad);
    let one = b.int(1);
    let good = b.new_("A", vec![one]);
    let good_stmt = b.expr_stmt(good);
    let main = b.function("main").body(vec![bad_stmt, good_stmt]).build();
    let mut f = Fixture::new(b, vec![a, main]);

    let diags = f.check();
    assert_eq!(count_code(&diags, c::NO_MATCHING_CONSTRUCTOR), 1);
}
