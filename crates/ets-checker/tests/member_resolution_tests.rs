use super::*;
use crate::options::CheckerOptions;
use crate::test_support::{Fixture, count_code, messages};
use ets_ast::AstBuilder;
use ets_common::Language;
use ets_common::diagnostic_codes as c;

/// `class Point { x: int = 0; move(): void {} }`
fn point(b: &mut AstBuilder) -> NodeIndex {
    let zero = b.int(0);
    let x = b.field("x", "int").init(zero).build();
    let mv = b.method("move").returns("void").body(vec![]).build();
    b.class("Point").member(x).member(mv).build()
}

/// `function main() { let p = new Point(); ...body }`
fn main_with(b: &mut AstBuilder, body: impl FnOnce(&mut AstBuilder) -> Vec<NodeIndex>) -> NodeIndex {
    let new_point = b.new_("Point", vec![]);
    let p = b.let_("p", None, new_point);
    let mut statements = vec![p];
    statements.extend(body(b));
    b.function("main").returns("void").body(statements).build()
}

#[test]
fn field_read_resolves_to_the_declaration() {
    let mut b = AstBuilder::new();
    let class = point(&mut b);
    let mut access = NodeIndex::NONE;
    let main = main_with(&mut b, |b| {
        let p = b.ident("p");
        access = b.member(p, "x");
        vec![b.expr_stmt(access)]
    });
    let mut f = Fixture::new(b, vec![class, main]);
    let root = f.root;
    let mut checker = f.checker();
    checker.check_program(root);

    assert!(checker.diagnostics().is_empty());
    let point_ty = checker.type_of_class_like(class);
    let resolved = checker.resolve_member(access, point_ty);
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].kind, ResolvedMemberKind::Property);
    assert_eq!(resolved[0].ty, TypeId::INT);
    assert_eq!(checker.ctx.binder.get(resolved[0].variable).name, "x");
}

#[test]
fn missing_member_names_the_type() {
    let mut b = AstBuilder::new();
    let class = point(&mut b);
    let main = main_with(&mut b, |b| {
        let p = b.ident("p");
        let access = b.member(p, "zzz");
        vec![b.expr_stmt(access)]
    });
    let mut f = Fixture::new(b, vec![class, main]);

    let diags = f.check();
    assert_eq!(count_code(&diags, c::PROPERTY_DOES_NOT_EXIST), 1);
    assert!(messages(&diags).contains(&"Property 'zzz' does not exist on type 'Point'"));
}

#[test]
fn static_and_instance_access_flip_is_explained() {
    let mut b = AstBuilder::new();
    let zero = b.int(0);
    let count = b.field("count", "int").static_().init(zero).build();
    let one = b.int(1);
    let total = b.field("total", "int").init(one).build();
    let counter = b.class("Counter").member(count).member(total).build();

    let new_counter = b.new_("Counter", vec![]);
    let local = b.let_("c", None, new_counter);
    let c_ident = b.ident("c");
    let instance_read = b.member(c_ident, "count");
    let instance_stmt = b.expr_stmt(instance_read);
    let class_ident = b.ident("Counter");
    let static_read = b.member(class_ident, "total");
    let static_stmt = b.expr_stmt(static_read);
    let class_ident = b.ident("Counter");
    let fine = b.member(class_ident, "count");
    let fine_stmt = b.expr_stmt(fine);
    let main = b
        .function("main")
        .body(vec![local, instance_stmt, static_stmt, fine_stmt])
        .build();
    let mut f = Fixture::new(b, vec![counter, main]);

    let diags = f.check();
    assert_eq!(count_code(&diags, c::IS_STATIC_PROPERTY), 1);
    assert_eq!(count_code(&diags, c::IS_INSTANCE_PROPERTY), 1);
    assert_eq!(diags.len(), 2);
    assert!(messages(&diags).contains(&"'count' is a static property of 'Counter'"));
}

#[test]
fn readonly_field_assignment_rules() {
    let mut b = AstBuilder::new();
    let a = b.string("a");
    let name = b.field("name", "string").readonly().init(a).build();
    let ctor_value = b.string("b");
    let in_ctor = b.assign_this("name", ctor_value);
    let ctor = b.constructor().body(vec![in_ctor]).build();
    let method_value = b.string("c");
    let in_method = b.assign_this("name", method_value);
    let rename = b.method("rename").returns("void").body(vec![in_method]).build();
    let config = b.class("Config").member(name).member(ctor).member(rename).build();
    let mut f = Fixture::new(b, vec![config]);

    let diags = f.check();
    assert_eq!(count_code(&diags, c::READONLY_FIELD_ALREADY_INITIALIZED), 1);
    assert_eq!(count_code(&diags, c::CANNOT_ASSIGN_READONLY), 1);
}

#[test]
fn method_as_value_needs_a_functional_target() {
    let mut b = AstBuilder::new();
    let class = point(&mut b);
    let main = main_with(&mut b, |b| {
        let p = b.ident("p");
        let bad = b.member(p, "move");
        let bad_decl = b.let_("f", None, bad);
        let p = b.ident("p");
        let good = b.member(p, "move");
        let good_decl = b.let_("g", Some("() => void"), good);
        vec![bad_decl, good_decl]
    });
    let mut f = Fixture::new(b, vec![class, main]);

    let diags = f.check();
    assert_eq!(count_code(&diags, c::METHOD_USED_IN_WRONG_CONTEXT), 1);
}

#[test]
fn extension_function_is_found_for_calls() {
    let mut b = AstBuilder::new();
    let class = point(&mut b);
    let zero = b.int(0);
    let ret = b.ret(zero);
    let len = b.function("len").receiver("Point").returns("int").body(vec![ret]).build();
    let mut callee = NodeIndex::NONE;
    let main = main_with(&mut b, |b| {
        let p = b.ident("p");
        let call = b.method_call(p, "len", vec![]);
        callee = b.arena().get_call(call).map_or(NodeIndex::NONE, |c| c.callee);
        vec![b.expr_stmt(call)]
    });
    let mut f = Fixture::new(b, vec![class, len, main]);
    let root = f.root;
    let mut checker = f.checker();
    checker.check_program(root);

    assert!(checker.diagnostics().is_empty());
    let point_ty = checker.type_of_class_like(class);
    let resolved = checker.resolve_member(callee, point_ty);
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].kind, ResolvedMemberKind::ExtensionFunction);
}

#[test]
fn method_shadows_extension_but_both_are_candidates() {
    let mut b = AstBuilder::new();
    let class = point(&mut b);
    let ext = b.function("move").receiver("Point").returns("void").body(vec![]).build();
    let mut callee = NodeIndex::NONE;
    let main = main_with(&mut b, |b| {
        let p = b.ident("p");
        let call = b.method_call(p, "move", vec![]);
        callee = b.arena().get_call(call).map_or(NodeIndex::NONE, |c| c.callee);
        vec![b.expr_stmt(call)]
    });
    let mut f = Fixture::new(b, vec![class, ext, main]);
    let root = f.root;
    let mut checker = f.checker();
    checker.check_program(root);

    assert_eq!(count_code(checker.diagnostics(), c::EXTENSION_SHADOWED), 1);
    let point_ty = checker.type_of_class_like(class);
    let kinds: Vec<ResolvedMemberKind> = checker
        .resolve_member(callee, point_ty)
        .iter()
        .map(|r| r.kind)
        .collect();
    assert_eq!(kinds, vec![ResolvedMemberKind::Property, ResolvedMemberKind::ExtensionFunction]);
}

#[test]
fn extension_shadowing_warning_can_be_disabled() {
    let mut b = AstBuilder::new();
    let class = point(&mut b);
    let ext = b.function("move").receiver("Point").returns("void").body(vec![]).build();
    let main = main_with(&mut b, |b| {
        let p = b.ident("p");
        let call = b.method_call(p, "move", vec![]);
        vec![b.expr_stmt(call)]
    });
    let options = CheckerOptions {
        warn_extension_shadowing: false,
        ..CheckerOptions::default()
    };
    let mut f = Fixture::with_options(b, vec![class, ext, main], options);

    assert!(f.check().is_empty());
}

#[test]
fn extension_accessors_are_read_not_called() {
    let mut b = AstBuilder::new();
    let class = point(&mut b);
    let zero = b.int(0);
    let ret = b.ret(zero);
    let size = b
        .function("size")
        .extension_getter("Point", "int")
        .body(vec![ret])
        .build();
    let mut read = NodeIndex::NONE;
    let main = main_with(&mut b, |b| {
        let p = b.ident("p");
        read = b.member(p, "size");
        let read_stmt = b.expr_stmt(read);
        let p = b.ident("p");
        let call = b.method_call(p, "size", vec![]);
        vec![read_stmt, b.expr_stmt(call)]
    });
    let mut f = Fixture::new(b, vec![class, size, main]);
    let root = f.root;
    let mut checker = f.checker();
    checker.check_program(root);

    assert_eq!(count_code(checker.diagnostics(), c::EXTENSION_ACCESSOR_CALLED), 1);
    assert_eq!(checker.diagnostics().len(), 1);
    let point_ty = checker.type_of_class_like(class);
    let resolved = checker.resolve_member(read, point_ty);
    assert_eq!(resolved[0].kind, ResolvedMemberKind::ExtensionAccessor);
    assert_eq!(checker.member_value_type(&resolved[0]), TypeId::INT);
}

#[test]
fn dynamic_properties_are_synthesized_once_per_name() {
    let mut b = AstBuilder::new();
    let import = b.import("./lib.js", Language::Js, &["lib"]);
    let lib = b.ident("lib");
    let first = b.member(lib, "foo");
    let first_stmt = b.expr_stmt(first);
    let lib = b.ident("lib");
    let second = b.member(lib, "foo");
    let second_stmt = b.expr_stmt(second);
    let main = b.function("main").body(vec![first_stmt, second_stmt]).build();
    let mut f = Fixture::new(b, vec![import, main]);
    let root = f.root;
    let mut checker = f.checker();
    checker.check_program(root);

    assert!(checker.diagnostics().is_empty());
    let dynamic = checker.ctx.types.dynamic(Language::Js);
    let a = checker.resolve_member(first, dynamic);
    let b = checker.resolve_member(second, dynamic);
    assert_eq!(a[0].variable, b[0].variable);
    assert_eq!(checker.ctx.types.dynamic_language(a[0].ty), Some(Language::Js));
    assert_eq!(checker.ctx.dynamic_properties.len(), 1);
}

#[test]
fn repeated_queries_are_memoized_and_silent() {
    let mut b = AstBuilder::new();
    let class = point(&mut b);
    let mut access = NodeIndex::NONE;
    let main = main_with(&mut b, |b| {
        let p = b.ident("p");
        access = b.member(p, "nope");
        vec![b.expr_stmt(access)]
    });
    let mut f = Fixture::new(b, vec![class, main]);
    let root = f.root;
    let mut checker = f.checker();
    checker.check_program(root);
    assert_eq!(checker.diagnostics().len(), 1);

    let point_ty = checker.type_of_class_like(class);
    assert!(checker.resolve_member(access, point_ty).is_empty());
    assert!(checker.resolve_member(access, point_ty).is_empty());
    assert_eq!(checker.diagnostics().len(), 1);
}

#[test]
fn alias_of_a_class_reaches_only_static_members() {
    let mut b = AstBuilder::new();
    let sm = b.method("sm").static_().returns("void").body(vec![]).build();
    let m = b.method("m").returns("void").body(vec![]).build();
    let class = b.class("A").member(sm).member(m).build();
    let alias = b.type_alias("Al", "A");
    let al = b.ident("Al");
    let static_call = b.method_call(al, "sm", vec![]);
    let static_stmt = b.expr_stmt(static_call);
    let al = b.ident("Al");
    let instance_call = b.method_call(al, "m", vec![]);
    let instance_stmt = b.expr_stmt(instance_call);
    let main = b.function("main").body(vec![static_stmt, instance_stmt]).build();
    let mut f = Fixture::new(b, vec![class, alias, main]);

    let diags = f.check();
    assert_eq!(diags.len(), 1);
    assert_eq!(count_code(&diags, c::IS_INSTANCE_PROPERTY), 1);
    assert!(messages(&diags).contains(&"'m' is an instance property of 'A'"));
}

#[test]
fn parameter_receiver_searches_both_halves() {
    let mut b = AstBuilder::new();
    let zero = b.int(0);
    let count = b.field("count", "int").static_().init(zero).build();
    let one = b.int(1);
    let total = b.field("total", "int").init(one).build();
    let counter = b.class("Counter").member(count).member(total).build();

    let param = b.ident("c");
    let static_read = b.member(param, "count");
    let static_stmt = b.expr_stmt(static_read);
    let param = b.ident("c");
    let instance_read = b.member(param, "total");
    let instance_stmt = b.expr_stmt(instance_read);
    let inspect = b
        .function("inspect")
        .param("c", "Counter")
        .body(vec![static_stmt, instance_stmt])
        .build();

    let new_counter = b.new_("Counter", vec![]);
    let local = b.let_("l", None, new_counter);
    let local_ref = b.ident("l");
    let local_read = b.member(local_ref, "count");
    let local_stmt = b.expr_stmt(local_read);
    let main = b.function("main").body(vec![local, local_stmt]).build();
    let mut f = Fixture::new(b, vec![counter, inspect, main]);
    let root = f.root;
    let mut checker = f.checker();
    checker.check_program(root);

    // Only the local binding is restricted to instance members.
    let diags = checker.diagnostics();
    assert_eq!(diags.len(), 1);
    assert_eq!(count_code(diags, c::IS_STATIC_PROPERTY), 1);
    assert_eq!(diags[0].start, checker.ctx.arena.span(local_read).start);

    let counter_ty = checker.type_of_class_like(counter);
    let resolved = checker.resolve_member(static_read, counter_ty);
    assert_eq!(resolved.len(), 1);
    assert!(checker.ctx.binder.get(resolved[0].variable).has_flags(ets_binder::VariableFlags::STATIC));
}
