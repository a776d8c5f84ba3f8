use super::*;
use crate::AstBuilder;

#[test]
fn synthetic_class_receives_members_by_name() {
    let b = AstBuilder::new();
    let (mut arena, root) = b.finish(vec![]);

    let edits = vec![
        AstEdit::AddClass {
            name: "JSCall".to_string(),
            super_class: None,
            implements: vec![],
            modifiers: ModifierFlags::empty(),
        },
        AstEdit::AddMember {
            class: ClassTarget::Synthetic("JSCall".to_string()),
            member: SyntheticMember::Method {
                name: "dyncall-i32".to_string(),
                kind: MethodKind::Method,
                params: vec![("obj".to_string(), "JSValue".to_string())],
                return_type: "JSValue".to_string(),
                modifiers: ModifierFlags::STATIC | ModifierFlags::NATIVE,
            },
        },
    ];
    let applied = apply_edits(&mut arena, root, &edits).expect("edits apply");

    let class = applied.classes["JSCall"];
    assert_eq!(arena.parent(class), root);
    let data = arena.get_class(class).expect("synthetic class");
    assert_eq!(data.members, applied.members);
    let method = arena.get_method(data.members[0]).expect("bridge method");
    assert_eq!(method.function.params.len(), 1);
    assert!(method.modifiers.contains(ModifierFlags::NATIVE));
}

#[test]
fn replace_member_keeps_position_and_detaches_old_node() {
    let mut b = AstBuilder::new();
    let first = b.method("first").body(vec![]).build();
    let field = b.field("name", "string").build();
    let last = b.method("last").body(vec![]).build();
    let class = b.class("C").members([first, field, last]).build();
    let (mut arena, root) = b.finish(vec![class]);

    let accessors = vec![
        SyntheticMember::Method {
            name: "name".to_string(),
            kind: MethodKind::Getter,
            params: vec![],
            return_type: "string".to_string(),
            modifiers: ModifierFlags::empty(),
        },
        SyntheticMember::Method {
            name: "name".to_string(),
            kind: MethodKind::Setter,
            params: vec![("value".to_string(), "string".to_string())],
            return_type: "void".to_string(),
            modifiers: ModifierFlags::empty(),
        },
    ];
    let edits = vec![AstEdit::ReplaceMember {
        class,
        member: field,
        with: accessors,
    }];
    apply_edits(&mut arena, root, &edits).expect("edits apply");

    let members = &arena.get_class(class).expect("class").members;
    assert_eq!(members.len(), 4);
    assert_eq!(members[0], first);
    assert_eq!(members[3], last);
    assert!(arena.parent(field).is_none());
    let getter = arena.get_method(members[1]).expect("getter");
    assert_eq!(getter.kind, MethodKind::Getter);
}

#[test]
fn copied_field_drops_initializer_and_adds_modifiers() {
    let mut b = AstBuilder::new();
    let init = b.int(3);
    let field = b.field("size", "int").init(init).build();
    let base = b.class("Base").member(field).build();
    let derived = b.class("Derived").extends("Base").build();
    let (mut arena, root) = b.finish(vec![base, derived]);

    let edits = vec![AstEdit::AddMember {
        class: ClassTarget::Existing(derived),
        member: SyntheticMember::CopyOfField {
            source: field,
            add_modifiers: ModifierFlags::SUPER_OWNER | ModifierFlags::GETTER,
        },
    }];
    let applied = apply_edits(&mut arena, root, &edits).expect("edits apply");

    let copy = arena.get_property(applied.members[0]).expect("copied field");
    assert_eq!(copy.name, "size");
    assert!(copy.initializer.is_none());
    assert!(copy.modifiers.contains(ModifierFlags::SUPER_OWNER | ModifierFlags::GETTER));
    assert_eq!(arena.parent(applied.members[0]), derived);
}

#[test]
fn unknown_synthetic_class_is_an_error() {
    let b = AstBuilder::new();
    let (mut arena, root) = b.finish(vec![]);
    let edits = vec![AstEdit::AddMember {
        class: ClassTarget::Synthetic("Missing".to_string()),
        member: SyntheticMember::Field {
            name: "f".to_string(),
            type_text: "int".to_string(),
            modifiers: ModifierFlags::empty(),
        },
    }];
    assert_eq!(
        apply_edits(&mut arena, root, &edits).unwrap_err(),
        EditError::UnknownSyntheticClass("Missing".to_string())
    );
}

#[test]
fn taken_over_method_moves_body_and_parameters() {
    let mut b = AstBuilder::new();
    let x = b.ident("x");
    let ret = b.ret(x);
    let fetch = b
        .method("fetch")
        .param("x", "int")
        .returns("Promise<int>")
        .async_()
        .body(vec![ret])
        .build();
    let class = b.class("Loader").member(fetch).build();
    let (mut arena, root) = b.finish(vec![class]);
    let original = arena.get_method(fetch).cloned().expect("method");

    let edits = vec![
        AstEdit::AddMember {
            class: ClassTarget::Existing(class),
            member: SyntheticMember::TakeOverMethod {
                source: fetch,
                name: "fetch$asyncimpl".to_string(),
                return_type: "Object".to_string(),
                remove_modifiers: ModifierFlags::ASYNC,
            },
        },
        AstEdit::AddModifiers {
            node: fetch,
            modifiers: ModifierFlags::NATIVE,
        },
    ];
    let applied = apply_edits(&mut arena, root, &edits).expect("edits apply");

    let taken = applied.members[0];
    let taken_data = arena.get_method(taken).expect("impl method");
    assert_eq!(taken_data.name, "fetch$asyncimpl");
    assert_eq!(taken_data.function.body, original.function.body);
    assert_eq!(taken_data.function.params, original.function.params);
    assert!(!taken_data.modifiers.contains(ModifierFlags::ASYNC));
    assert_eq!(arena.parent(original.function.body), taken);
    assert_eq!(arena.parent(taken), class);

    let proxy = arena.get_method(fetch).expect("proxy");
    assert!(proxy.function.body.is_none());
    assert_eq!(proxy.function.params.len(), 1);
    assert_ne!(proxy.function.params, original.function.params);
    assert!(proxy.modifiers.contains(ModifierFlags::ASYNC | ModifierFlags::NATIVE));
    assert_eq!(arena.get_class(class).map(|c| c.members.len()), Some(2));
}
