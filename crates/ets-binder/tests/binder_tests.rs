use super::*;
use crate::{MemberTable, VariableFlags};
use ets_ast::AstBuilder;
use ets_common::Language;

#[test]
fn class_members_land_in_their_partitions() {
    let mut b = AstBuilder::new();
    let count = b.field("count", "int").static_().build();
    let name = b.field("name", "string").build();
    let run = b.method("run").body(vec![]).build();
    let create = b.method("create").static_().returns("Box").body(vec![]).build();
    let ctor = b.constructor().body(vec![]).build();
    let init = b.static_block(vec![]);
    let class = b.class("Box").members([count, name, run, create, ctor, init]).build();
    let (arena, root) = b.finish(vec![class]);

    let mut binder = BinderState::new();
    binder.bind_program(&arena, root);

    let scope = binder.class_scope(class).expect("class scope");
    assert!(scope.find(MemberTable::StaticField, "count").is_some());
    assert!(scope.find(MemberTable::InstanceField, "name").is_some());
    assert!(scope.find(MemberTable::InstanceMethod, "run").is_some());
    assert!(scope.find(MemberTable::StaticMethod, "create").is_some());
    assert!(scope.find(MemberTable::InstanceField, "count").is_none());
    assert_eq!(scope.constructors, vec![ctor]);
    assert_eq!(scope.static_blocks, vec![init]);

    let class_var = binder.find_global("Box").expect("class is global");
    assert!(binder.get(class_var).has_flags(VariableFlags::CLASS));
    assert_eq!(binder.decl_variable(class), Some(class_var));
}

#[test]
fn readonly_fields_without_initializer_require_explicit_init() {
    let mut b = AstBuilder::new();
    let one = b.int(1);
    let a = b.field("a", "int").readonly().build();
    let c = b.field("c", "int").const_().init(one).build();
    let class = b.class("K").members([a, c]).build();
    let (arena, root) = b.finish(vec![class]);

    let mut binder = BinderState::new();
    binder.bind_program(&arena, root);
    let scope = binder.class_scope(class).expect("class scope");

    let a_var = binder.get(scope.find(MemberTable::InstanceField, "a").expect("a"));
    assert!(a_var.flags.contains(VariableFlags::READONLY | VariableFlags::EXPLICIT_INIT_REQUIRED));
    let c_var = binder.get(scope.find(MemberTable::InstanceField, "c").expect("c"));
    assert!(c_var.flags.contains(VariableFlags::CONST | VariableFlags::INITIALIZED));
    assert!(!c_var.flags.contains(VariableFlags::EXPLICIT_INIT_REQUIRED));
}

#[test]
fn accessor_pair_shares_one_variable() {
    let mut b = AstBuilder::new();
    let get = b.getter("size", "int").body(vec![]).build();
    let set = b.setter("size", "int").body(vec![]).build();
    let class = b.class("S").members([get, set]).build();
    let (arena, root) = b.finish(vec![class]);

    let mut binder = BinderState::new();
    binder.bind_program(&arena, root);
    let scope = binder.class_scope(class).expect("class scope");
    let var = scope.find(MemberTable::InstanceMethod, "size").expect("size");
    assert_eq!(binder.get(var).declarations.as_slice(), &[get, set]);
    assert_eq!(binder.decl_variable(set), Some(var));
}

#[test]
fn identifiers_and_type_refs_resolve_through_scopes() {
    let mut b = AstBuilder::new();
    let x_ref = b.ident("x");
    let ret = b.ret(x_ref);
    let helper = b.ident("helper");
    let call = b.call(helper, vec![]);
    let call_stmt = b.expr_stmt(call);
    let method = b
        .method("id")
        .type_param("T")
        .param("x", "T")
        .returns("T")
        .body(vec![call_stmt, ret])
        .build();
    let class = b.class("Util").member(method).build();
    let helper_fn = b.function("helper").body(vec![]).build();
    let (arena, root) = b.finish(vec![class, helper_fn]);

    let mut binder = BinderState::new();
    binder.bind_program(&arena, root);

    let param = arena.get_function(method).expect("method").params[0];
    assert_eq!(binder.resolved(x_ref), binder.decl_variable(param));
    assert_eq!(binder.resolved(helper), binder.find_global("helper"));

    let param_type = arena.get_parameter(param).expect("param").type_annotation;
    let t_var = binder.resolved(param_type).expect("T resolves");
    assert!(binder.get(t_var).has_flags(VariableFlags::TYPE_PARAMETER));
}

#[test]
fn dynamic_imports_bind_globals() {
    let mut b = AstBuilder::new();
    let import = b.import("lib.js", Language::Js, &["A", "B"]);
    let (arena, root) = b.finish(vec![import]);

    let mut binder = BinderState::new();
    binder.bind_program(&arena, root);

    for name in ["A", "B"] {
        let var = binder.find_global(name).expect("import binding");
        assert!(binder.get(var).has_flags(VariableFlags::DYNAMIC_IMPORT));
        assert_eq!(binder.get(var).decl(), import);
    }
}

#[test]
fn synthetic_variables_are_unbound() {
    let mut binder = BinderState::new();
    let before = binder.variable_count();
    let var = binder.add_synthetic_variable("prop", ets_ast::NodeIndex::NONE, VariableFlags::PROPERTY);
    assert_eq!(binder.variable_count(), before + 1);
    assert!(binder.get(var).has_flags(VariableFlags::SYNTHETIC));
    assert!(binder.get(var).decl().is_none());
    assert!(binder.find_global("prop").is_none());
}

#[test]
fn class_type_parameters_live_in_the_class_type_param_scope() {
    let mut b = AstBuilder::new();
    let field = b.field("value", "T").build();
    let class = b.class("Box").type_param("T").member(field).build();
    let (arena, root) = b.finish(vec![class]);

    let mut binder = BinderState::new();
    binder.bind_program(&arena, root);

    let scope = binder.class_scope(class).expect("class scope");
    let tp_scope = scope.type_param_scope.expect("type parameter scope");
    assert_eq!(binder.scope(tp_scope).kind, crate::ScopeKind::TypeParams);
    let t_var = binder.lookup(tp_scope, "T").expect("T is declared");
    assert!(binder.get(t_var).has_flags(VariableFlags::TYPE_PARAMETER));
    assert!(scope.find(MemberTable::InstanceField, "value").is_some());
    assert!(scope.table(MemberTable::StaticField).is_empty());
}
