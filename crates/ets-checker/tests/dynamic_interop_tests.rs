use super::*;
use crate::options::CheckerOptions;
use crate::test_support::{Fixture, count_code, messages};
use ets_ast::AstBuilder;
use ets_common::diagnostic_codes as c;

/// `import { lib } from "./lib.js"` followed by `function main() { ...body }`.
fn js_program(b: &mut AstBuilder, body: Vec<NodeIndex>) -> Vec<NodeIndex> {
    let import = b.import("./lib.js", Language::Js, &["lib"]);
    let main = b.function("main").body(body).build();
    vec![import, main]
}

fn call_foo(b: &mut AstBuilder) -> NodeIndex {
    let lib = b.ident("lib");
    let one = b.int(1);
    let call = b.method_call(lib, "foo", vec![one]);
    b.expr_stmt(call)
}

#[test]
fn identical_calls_share_one_bridge() {
    let mut b = AstBuilder::new();
    let first = call_foo(&mut b);
    let second = call_foo(&mut b);
    let statements = js_program(&mut b, vec![first, second]);
    let mut f = Fixture::new(b, statements);
    let root = f.root;
    let mut checker = f.checker();
    checker.check_program(root);

    assert!(checker.diagnostics().is_empty());
    assert_eq!(checker.ctx.dynamic_syntheses, 1);
    assert_eq!(checker.ctx.dynamic_call_cache.len(), 1);
    let key = checker.ctx.dynamic_call_cache.keys().next().map(|k| k.signature.clone());
    assert_eq!(key.as_deref(), Some("dyncall-i32"));
    assert!(checker.bridge_method(Language::Js, false).is_some());
    assert!(checker.bridge_method(Language::Js, true).is_none());

    let edits = checker.take_edits();
    assert_eq!(edits.len(), 2);
    assert!(matches!(&edits[0], AstEdit::AddClass { name, .. } if name == "JSCall"));
    assert!(matches!(
        &edits[1],
        AstEdit::AddMember { class: ClassTarget::Synthetic(class), .. } if class == "JSCall"
    ));
}

#[test]
fn repeated_resolution_returns_the_cached_signature() {
    let mut b = AstBuilder::new();
    let stmt = call_foo(&mut b);
    let statements = js_program(&mut b, vec![stmt]);
    let mut f = Fixture::new(b, statements);
    let root = f.root;
    let mut checker = f.checker();
    checker.check_program(root);

    let arena = checker.ctx.arena;
    let Some(NodeKind::ExprStatement(call)) = arena.kind(stmt) else {
        panic!("expected an expression statement");
    };
    let Some(data) = arena.get_call(*call) else {
        panic!("expected a call");
    };
    let first = checker.resolve_dynamic_call(data.callee, &data.args, Language::Js, false);
    let second = checker.resolve_dynamic_call(data.callee, &data.args, Language::Js, false);
    assert_eq!(first, second);
    assert_eq!(checker.ctx.dynamic_syntheses, 1);
}

#[test]
fn call_through_a_local_is_by_value() {
    let mut b = AstBuilder::new();
    let by_name = call_foo(&mut b);
    let lib = b.ident("lib");
    let handler = b.member(lib, "handler");
    let local = b.let_("h", None, handler);
    let h = b.ident("h");
    let one = b.int(1);
    let call = b.call(h, vec![one]);
    let by_value = b.expr_stmt(call);
    let statements = js_program(&mut b, vec![by_name, local, by_value]);
    let mut f = Fixture::new(b, statements);
    let root = f.root;
    let mut checker = f.checker();
    checker.check_program(root);

    assert!(checker.diagnostics().is_empty());
    assert_eq!(checker.ctx.dynamic_syntheses, 2);
    let mut keys: Vec<String> = checker.ctx.dynamic_call_cache.keys().map(|k| k.signature.clone()).collect();
    keys.sort();
    assert_eq!(keys, vec!["dyncall-i32", "dyncall-i32-byvalue"]);

    // Both bridges are overloads of one method on one class.
    let Some(bridge) = checker.bridge_method(Language::Js, false) else {
        panic!("bridge method missing");
    };
    let ty = checker.ctx.variable_types[&bridge];
    assert_eq!(checker.ctx.types.function(ty).map(|f| f.signatures.len()), Some(2));
}

#[test]
fn new_on_a_dynamic_type_uses_the_construct_bridge() {
    let mut b = AstBuilder::new();
    let one = b.int(1);
    let text = b.string("a");
    let new = b.new_("lib", vec![one, text]);
    let stmt = b.expr_stmt(new);
    let statements = js_program(&mut b, vec![stmt]);
    let mut f = Fixture::new(b, statements);
    let root = f.root;
    let mut checker = f.checker();
    checker.check_program(root);

    assert!(checker.diagnostics().is_empty());
    assert!(checker.bridge_method(Language::Js, true).is_some());
    let key = checker.ctx.dynamic_call_cache.keys().next().map(|k| (k.is_construct, k.signature.clone()));
    assert_eq!(key, Some((true, "dynnew-i32-std.core.String".to_string())));
    let result = checker.check_expression(new);
    assert_eq!(checker.ctx.types.dynamic_language(result), Some(Language::Js));
}

#[test]
fn dynamic_value_adapts_to_a_functional_interface() {
    let mut b = AstBuilder::new();
    let call = b.method("call").param("x", "int").returns("void").build();
    let callback = b.interface("Callback").member(call).build();
    let lib = b.ident("lib");
    let on_click = b.member(lib, "onClick");
    let first = b.let_("a", Some("Callback"), on_click);
    let lib = b.ident("lib");
    let on_hover = b.member(lib, "onHover");
    let second = b.let_("b", Some("Callback"), on_hover);
    let mut statements = js_program(&mut b, vec![first, second]);
    statements.insert(0, callback);
    let mut f = Fixture::new(b, statements);
    let root = f.root;
    let mut checker = f.checker();
    checker.check_program(root);

    assert!(checker.diagnostics().is_empty());
    assert_eq!(checker.ctx.lambda_object_cache.len(), 1);
    assert!(checker.ctx.lambda_object_cache.contains_key("LambdaObject-Callback-i32"));

    let edits = checker.take_edits();
    assert_eq!(edits.len(), 4);
    let AstEdit::AddClass { name, implements, .. } = &edits[0] else {
        panic!("expected a synthetic class, got {:?}", edits[0]);
    };
    assert_eq!(name, "LambdaObject-Callback-i32");
    assert_eq!(implements, &vec!["Callback".to_string()]);
    assert!(matches!(
        &edits[3],
        AstEdit::AddMember { member: SyntheticMember::Method { name, .. }, .. } if name == "call"
    ));
}

#[test]
fn interfaces_with_the_same_parameters_get_their_own_class() {
    let mut b = AstBuilder::new();
    let call = b.method("call").param("x", "int").returns("void").build();
    let callback = b.interface("Callback").member(call).build();
    let apply = b.method("apply").param("x", "int").returns("int").build();
    let mapper = b.interface("Mapper").member(apply).build();
    let lib = b.ident("lib");
    let on_click = b.member(lib, "onClick");
    let first = b.let_("a", Some("Callback"), on_click);
    let lib = b.ident("lib");
    let double = b.member(lib, "double");
    let second = b.let_("m", Some("Mapper"), double);
    let mut statements = js_program(&mut b, vec![first, second]);
    statements.splice(0..0, [callback, mapper]);
    let mut f = Fixture::new(b, statements);
    let root = f.root;
    let mut checker = f.checker();
    checker.check_program(root);

    assert!(checker.diagnostics().is_empty());
    let mut keys: Vec<&str> = checker.ctx.lambda_object_cache.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["LambdaObject-Callback-i32", "LambdaObject-Mapper-i32"]);

    let implemented: Vec<Vec<String>> = checker
        .take_edits()
        .into_iter()
        .filter_map(|edit| match edit {
            AstEdit::AddClass { implements, .. } => Some(implements),
            _ => None,
        })
        .collect();
    assert_eq!(implemented, vec![vec!["Callback".to_string()], vec!["Mapper".to_string()]]);
}

#[test]
fn non_functional_interface_cannot_wrap_a_dynamic_value() {
    let mut b = AstBuilder::new();
    let first = b.method("a").returns("void").build();
    let second = b.method("b").returns("void").build();
    let pair = b.interface("Pair").member(first).member(second).build();
    let lib = b.ident("lib");
    let value = b.member(lib, "value");
    let local = b.let_("p", Some("Pair"), value);
    let mut statements = js_program(&mut b, vec![local]);
    statements.insert(0, pair);
    let mut f = Fixture::new(b, statements);

    let diags = f.check();
    assert_eq!(count_code(&diags, c::NOT_A_FUNCTIONAL_INTERFACE), 1);
    assert!(messages(&diags).contains(&"Type 'Pair' is not a functional interface."));
}

#[test]
fn imports_from_disabled_languages_are_reported() {
    let mut b = AstBuilder::new();
    let import = b.import("./lib.ts", Language::Ts, &["lib"]);
    let mut f = Fixture::new(b, vec![import]);

    let diags = f.check();
    assert_eq!(count_code(&diags, c::UNSUPPORTED_DYNAMIC_LANGUAGE), 1);
    assert!(messages(&diags).contains(&"Dynamic imports from language 'TS' are not enabled."));
}

#[test]
fn enabled_languages_come_from_options() {
    let mut b = AstBuilder::new();
    let import = b.import("./lib.ts", Language::Ts, &["lib"]);
    let options = CheckerOptions {
        dynamic_languages: vec![Language::Js, Language::Ts],
        ..CheckerOptions::default()
    };
    let mut f = Fixture::with_options(b, vec![import], options);

    assert!(f.check().is_empty());
}
