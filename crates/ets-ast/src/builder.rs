//! Fluent AST construction.
//!
//! The builder stands in for the parser: tests and tools assemble programs
//! bottom-up, creating members first and then the declarations that own them.
//!
//! ```
//! use ets_ast::AstBuilder;
//!
//! let mut b = AstBuilder::new();
//! let foo = b.method("foo").abstract_().returns("void").build();
//! let a = b.class("A").abstract_().member(foo).build();
//! let (arena, root) = b.finish(vec![a]);
//! assert_eq!(arena.get_program(root).map(|p| p.statements.len()), Some(1));
//! ```

use ets_common::{Language, Span};

use crate::node::*;
use crate::type_text::parse_type;
use crate::{ModifierFlags, NodeArena, NodeIndex};

pub struct AstBuilder {
    arena: NodeArena,
    cursor: u32,
    file_name: String,
}

impl Default for AstBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AstBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::with_file_name("main.ets")
    }

    #[must_use]
    pub fn with_file_name(file_name: &str) -> Self {
        Self {
            arena: NodeArena::new(),
            cursor: 0,
            file_name: file_name.to_string(),
        }
    }

    #[must_use]
    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    fn next_span(&mut self, width: usize) -> Span {
        let start = self.cursor;
        let width = width.max(1) as u32;
        self.cursor += width + 1;
        Span::new(start, start + width)
    }

    /// Add an arbitrary node.
    pub fn node(&mut self, kind: NodeKind) -> NodeIndex {
        let width = kind.name().map_or(1, str::len);
        let span = self.next_span(width);
        self.arena.add(kind, span)
    }

    /// Type annotation from text (`int`, `Box<T>`, `A | null`, `(int) => void`).
    ///
    /// # Panics
    /// Panics on malformed type text.
    pub fn ty(&mut self, text: &str) -> NodeIndex {
        let span = self.next_span(text.len());
        match parse_type(&mut self.arena, text, span) {
            Some(idx) => idx,
            None => panic!("malformed type text `{text}`"),
        }
    }

    fn opt_ty(&mut self, text: Option<&str>) -> NodeIndex {
        text.map_or(NodeIndex::NONE, |t| self.ty(t))
    }

    /// Finish the program and hand out the arena.
    #[must_use]
    pub fn finish(mut self, statements: Vec<NodeIndex>) -> (NodeArena, NodeIndex) {
        let file_name = std::mem::take(&mut self.file_name);
        let root = self.node(NodeKind::Program(ProgramData {
            file_name,
            statements,
        }));
        (self.arena, root)
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    pub fn ident(&mut self, name: &str) -> NodeIndex {
        self.node(NodeKind::Identifier(name.to_string()))
    }

    pub fn this(&mut self) -> NodeIndex {
        self.node(NodeKind::This)
    }

    pub fn super_(&mut self) -> NodeIndex {
        self.node(NodeKind::Super)
    }

    pub fn int(&mut self, value: i64) -> NodeIndex {
        self.node(NodeKind::Literal(Literal::Int(value)))
    }

    pub fn double(&mut self, value: f64) -> NodeIndex {
        self.node(NodeKind::Literal(Literal::Double(value)))
    }

    pub fn string(&mut self, value: &str) -> NodeIndex {
        self.node(NodeKind::Literal(Literal::String(value.to_string())))
    }

    pub fn bool(&mut self, value: bool) -> NodeIndex {
        self.node(NodeKind::Literal(Literal::Bool(value)))
    }

    pub fn null(&mut self) -> NodeIndex {
        self.node(NodeKind::Literal(Literal::Null))
    }

    pub fn member(&mut self, object: NodeIndex, property: &str) -> NodeIndex {
        self.node(NodeKind::Member(MemberData {
            object,
            property: property.to_string(),
        }))
    }

    /// `this.name`
    pub fn this_member(&mut self, property: &str) -> NodeIndex {
        let this = self.this();
        self.member(this, property)
    }

    pub fn call(&mut self, callee: NodeIndex, args: Vec<NodeIndex>) -> NodeIndex {
        self.node(NodeKind::Call(CallData { callee, args }))
    }

    /// `object.method(args)`
    pub fn method_call(&mut self, object: NodeIndex, method: &str, args: Vec<NodeIndex>) -> NodeIndex {
        let callee = self.member(object, method);
        self.call(callee, args)
    }

    pub fn new_(&mut self, type_text: &str, args: Vec<NodeIndex>) -> NodeIndex {
        let type_ref = self.ty(type_text);
        self.node(NodeKind::New(NewData { type_ref, args }))
    }

    pub fn assign(&mut self, left: NodeIndex, right: NodeIndex) -> NodeIndex {
        self.compound_assign(AssignOp::Assign, left, right)
    }

    pub fn compound_assign(&mut self, op: AssignOp, left: NodeIndex, right: NodeIndex) -> NodeIndex {
        self.node(NodeKind::Assign(AssignData { op, left, right }))
    }

    pub fn binary(&mut self, op: BinaryOp, left: NodeIndex, right: NodeIndex) -> NodeIndex {
        self.node(NodeKind::Binary(BinaryData { op, left, right }))
    }

    pub fn unary(&mut self, op: UnaryOp, operand: NodeIndex) -> NodeIndex {
        self.node(NodeKind::Unary(UnaryData { op, operand }))
    }

    pub fn update(&mut self, op: UpdateOp, prefix: bool, operand: NodeIndex) -> NodeIndex {
        self.node(NodeKind::Update(UpdateData { op, prefix, operand }))
    }

    pub fn conditional(&mut self, test: NodeIndex, consequent: NodeIndex, alternate: NodeIndex) -> NodeIndex {
        self.node(NodeKind::Conditional(ConditionalData {
            test,
            consequent,
            alternate,
        }))
    }

    pub fn as_(&mut self, expr: NodeIndex, type_text: &str) -> NodeIndex {
        let type_node = self.ty(type_text);
        self.node(NodeKind::As(AsData { expr, type_node }))
    }

    pub fn non_null(&mut self, expr: NodeIndex) -> NodeIndex {
        self.node(NodeKind::NonNull(expr))
    }

    pub fn typeof_(&mut self, expr: NodeIndex) -> NodeIndex {
        self.node(NodeKind::Typeof(expr))
    }

    pub fn array(&mut self, elements: Vec<NodeIndex>) -> NodeIndex {
        self.node(NodeKind::ArrayLiteral(elements))
    }

    pub fn object(&mut self, properties: Vec<(&str, NodeIndex)>) -> NodeIndex {
        let props = properties
            .into_iter()
            .map(|(key, value)| {
                self.node(NodeKind::PropertyAssignment(PropertyAssignmentData {
                    key: key.to_string(),
                    value,
                }))
            })
            .collect();
        self.node(NodeKind::ObjectLiteral(props))
    }

    /// Arrow function with typed parameters and a block body.
    pub fn arrow(&mut self, params: &[(&str, &str)], return_type: Option<&str>, body: Vec<NodeIndex>) -> NodeIndex {
        let params = params.iter().map(|(name, ty)| self.param(name, ty, false)).collect();
        let return_type = self.opt_ty(return_type);
        let body = self.block(body);
        self.node(NodeKind::ArrowFunction(FunctionData {
            type_params: Vec::new(),
            params,
            return_type,
            body,
            receiver: NodeIndex::NONE,
        }))
    }

    /// Arrow function with a receiver, usable as an extension function when
    /// bound to a variable.
    pub fn extension_arrow(
        &mut self,
        receiver: &str,
        params: &[(&str, &str)],
        return_type: Option<&str>,
        body: Vec<NodeIndex>,
    ) -> NodeIndex {
        let receiver = self.ty(receiver);
        let params = params.iter().map(|(name, ty)| self.param(name, ty, false)).collect();
        let return_type = self.opt_ty(return_type);
        let body = self.block(body);
        self.node(NodeKind::ArrowFunction(FunctionData {
            type_params: Vec::new(),
            params,
            return_type,
            body,
            receiver,
        }))
    }

    fn param(&mut self, name: &str, ty: &str, optional: bool) -> NodeIndex {
        let type_annotation = self.ty(ty);
        self.node(NodeKind::Parameter(ParameterData {
            name: name.to_string(),
            type_annotation,
            optional,
        }))
    }

    // =========================================================================
    // Statements
    // =========================================================================

    pub fn expr_stmt(&mut self, expr: NodeIndex) -> NodeIndex {
        self.node(NodeKind::ExprStatement(expr))
    }

    pub fn block(&mut self, statements: Vec<NodeIndex>) -> NodeIndex {
        self.node(NodeKind::Block(statements))
    }

    /// `this.name = value;`
    pub fn assign_this(&mut self, property: &str, value: NodeIndex) -> NodeIndex {
        let target = self.this_member(property);
        let assign = self.assign(target, value);
        self.expr_stmt(assign)
    }

    /// `super(args);`
    pub fn super_call(&mut self, args: Vec<NodeIndex>) -> NodeIndex {
        let callee = self.super_();
        let call = self.call(callee, args);
        self.expr_stmt(call)
    }

    /// `this(args);`
    pub fn this_call(&mut self, args: Vec<NodeIndex>) -> NodeIndex {
        let callee = self.this();
        let call = self.call(callee, args);
        self.expr_stmt(call)
    }

    pub fn let_(&mut self, name: &str, type_text: Option<&str>, initializer: NodeIndex) -> NodeIndex {
        self.var(VarKind::Let, name, type_text, initializer)
    }

    pub fn const_(&mut self, name: &str, type_text: Option<&str>, initializer: NodeIndex) -> NodeIndex {
        self.var(VarKind::Const, name, type_text, initializer)
    }

    fn var(&mut self, kind: VarKind, name: &str, type_text: Option<&str>, initializer: NodeIndex) -> NodeIndex {
        let type_annotation = self.opt_ty(type_text);
        self.node(NodeKind::VarDecl(VarDeclData {
            name: name.to_string(),
            kind,
            type_annotation,
            initializer,
        }))
    }

    pub fn ret(&mut self, value: NodeIndex) -> NodeIndex {
        self.node(NodeKind::Return(value))
    }

    pub fn if_(&mut self, test: NodeIndex, consequent: Vec<NodeIndex>, alternate: Option<Vec<NodeIndex>>) -> NodeIndex {
        let consequent = self.block(consequent);
        let alternate = match alternate {
            Some(stmts) => self.block(stmts),
            None => NodeIndex::NONE,
        };
        self.node(NodeKind::If(IfData {
            test,
            consequent,
            alternate,
        }))
    }

    pub fn while_(&mut self, test: NodeIndex, body: Vec<NodeIndex>) -> NodeIndex {
        let body = self.block(body);
        self.node(NodeKind::While(WhileData { test, body }))
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    pub fn class(&mut self, name: &str) -> ClassBuilder<'_> {
        ClassBuilder {
            b: self,
            name: name.to_string(),
            type_params: Vec::new(),
            extends: None,
            implements: Vec::new(),
            members: Vec::new(),
            modifiers: ModifierFlags::empty(),
            is_struct: false,
        }
    }

    pub fn interface(&mut self, name: &str) -> InterfaceBuilder<'_> {
        InterfaceBuilder {
            b: self,
            name: name.to_string(),
            type_params: Vec::new(),
            extends: Vec::new(),
            members: Vec::new(),
            modifiers: ModifierFlags::empty(),
        }
    }

    pub fn method(&mut self, name: &str) -> MethodBuilder<'_> {
        MethodBuilder::new(self, name, MethodKind::Method)
    }

    pub fn constructor(&mut self) -> MethodBuilder<'_> {
        MethodBuilder::new(self, "constructor", MethodKind::Constructor)
    }

    pub fn getter(&mut self, name: &str, type_text: &str) -> MethodBuilder<'_> {
        MethodBuilder::new(self, name, MethodKind::Getter).returns(type_text)
    }

    pub fn setter(&mut self, name: &str, type_text: &str) -> MethodBuilder<'_> {
        MethodBuilder::new(self, name, MethodKind::Setter)
            .param("value", type_text)
            .returns("void")
    }

    pub fn static_block(&mut self, statements: Vec<NodeIndex>) -> NodeIndex {
        MethodBuilder::new(self, "<cctor>", MethodKind::StaticBlock)
            .static_()
            .body(statements)
            .build()
    }

    pub fn field(&mut self, name: &str, type_text: &str) -> FieldBuilder<'_> {
        FieldBuilder {
            b: self,
            name: name.to_string(),
            type_text: Some(type_text.to_string()),
            initializer: NodeIndex::NONE,
            modifiers: ModifierFlags::empty(),
        }
    }

    /// Field without a type annotation; its type comes from the initializer.
    pub fn untyped_field(&mut self, name: &str) -> FieldBuilder<'_> {
        FieldBuilder {
            b: self,
            name: name.to_string(),
            type_text: None,
            initializer: NodeIndex::NONE,
            modifiers: ModifierFlags::empty(),
        }
    }

    pub fn function(&mut self, name: &str) -> FunctionBuilder<'_> {
        FunctionBuilder {
            inner: MethodBuilder::new(self, name, MethodKind::Method),
            receiver: None,
        }
    }

    pub fn type_alias(&mut self, name: &str, type_text: &str) -> NodeIndex {
        let type_node = self.ty(type_text);
        self.node(NodeKind::TypeAliasDecl(TypeAliasData {
            name: name.to_string(),
            type_params: Vec::new(),
            type_node,
        }))
    }

    pub fn import(&mut self, source: &str, language: Language, names: &[&str]) -> NodeIndex {
        self.node(NodeKind::ImportDecl(ImportData {
            source: source.to_string(),
            language,
            names: names.iter().map(|n| (*n).to_string()).collect(),
        }))
    }

    fn type_params(&mut self, specs: &[TypeParamSpec]) -> Vec<NodeIndex> {
        specs
            .iter()
            .map(|spec| {
                let constraint = self.opt_ty(spec.constraint.as_deref());
                let default = self.opt_ty(spec.default.as_deref());
                self.node(NodeKind::TypeParam(TypeParamData {
                    name: spec.name.clone(),
                    constraint,
                    default,
                }))
            })
            .collect()
    }
}

#[derive(Clone, Debug)]
struct TypeParamSpec {
    name: String,
    constraint: Option<String>,
    default: Option<String>,
}

impl TypeParamSpec {
    fn new(name: &str, constraint: Option<&str>, default: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            constraint: constraint.map(str::to_string),
            default: default.map(str::to_string),
        }
    }
}

// =============================================================================
// Declaration builders
// =============================================================================

#[must_use = "call build() to add the declaration"]
pub struct ClassBuilder<'b> {
    b: &'b mut AstBuilder,
    name: String,
    type_params: Vec<TypeParamSpec>,
    extends: Option<String>,
    implements: Vec<String>,
    members: Vec<NodeIndex>,
    modifiers: ModifierFlags,
    is_struct: bool,
}

impl ClassBuilder<'_> {
    pub fn type_param(mut self, name: &str) -> Self {
        self.type_params.push(TypeParamSpec::new(name, None, None));
        self
    }

    pub fn type_param_with(mut self, name: &str, constraint: Option<&str>, default: Option<&str>) -> Self {
        self.type_params.push(TypeParamSpec::new(name, constraint, default));
        self
    }

    pub fn extends(mut self, type_text: &str) -> Self {
        self.extends = Some(type_text.to_string());
        self
    }

    pub fn implements(mut self, type_text: &str) -> Self {
        self.implements.push(type_text.to_string());
        self
    }

    pub fn member(mut self, member: NodeIndex) -> Self {
        self.members.push(member);
        self
    }

    pub fn members(mut self, members: impl IntoIterator<Item = NodeIndex>) -> Self {
        self.members.extend(members);
        self
    }

    pub fn modifiers(mut self, modifiers: ModifierFlags) -> Self {
        self.modifiers |= modifiers;
        self
    }

    pub fn abstract_(self) -> Self {
        self.modifiers(ModifierFlags::ABSTRACT)
    }

    pub fn final_(self) -> Self {
        self.modifiers(ModifierFlags::FINAL)
    }

    pub fn declare(self) -> Self {
        self.modifiers(ModifierFlags::DECLARE)
    }

    /// Only meaningful on a class nested in another class's body.
    pub fn static_(self) -> Self {
        self.modifiers(ModifierFlags::STATIC)
    }

    pub fn struct_(mut self) -> Self {
        self.is_struct = true;
        self
    }

    pub fn build(self) -> NodeIndex {
        let type_params = self.b.type_params(&self.type_params);
        let super_class = self.b.opt_ty(self.extends.as_deref());
        let implements = self.implements.iter().map(|t| self.b.ty(t)).collect();
        self.b.node(NodeKind::ClassDecl(ClassData {
            name: self.name,
            type_params,
            super_class,
            implements,
            members: self.members,
            modifiers: self.modifiers,
            is_struct: self.is_struct,
        }))
    }
}

#[must_use = "call build() to add the declaration"]
pub struct InterfaceBuilder<'b> {
    b: &'b mut AstBuilder,
    name: String,
    type_params: Vec<TypeParamSpec>,
    extends: Vec<String>,
    members: Vec<NodeIndex>,
    modifiers: ModifierFlags,
}

impl InterfaceBuilder<'_> {
    pub fn type_param(mut self, name: &str) -> Self {
        self.type_params.push(TypeParamSpec::new(name, None, None));
        self
    }

    pub fn type_param_with(mut self, name: &str, constraint: Option<&str>, default: Option<&str>) -> Self {
        self.type_params.push(TypeParamSpec::new(name, constraint, default));
        self
    }

    pub fn extends(mut self, type_text: &str) -> Self {
        self.extends.push(type_text.to_string());
        self
    }

    pub fn member(mut self, member: NodeIndex) -> Self {
        self.members.push(member);
        self
    }

    pub fn modifiers(mut self, modifiers: ModifierFlags) -> Self {
        self.modifiers |= modifiers;
        self
    }

    pub fn build(self) -> NodeIndex {
        let type_params = self.b.type_params(&self.type_params);
        let extends = self.extends.iter().map(|t| self.b.ty(t)).collect();
        self.b.node(NodeKind::InterfaceDecl(InterfaceData {
            name: self.name,
            type_params,
            extends,
            members: self.members,
            modifiers: self.modifiers,
        }))
    }
}

#[must_use = "call build() to add the member"]
pub struct MethodBuilder<'b> {
    b: &'b mut AstBuilder,
    name: String,
    kind: MethodKind,
    type_params: Vec<TypeParamSpec>,
    params: Vec<(String, String, bool)>,
    return_type: Option<String>,
    body: Option<Vec<NodeIndex>>,
    modifiers: ModifierFlags,
}

impl<'b> MethodBuilder<'b> {
    fn new(b: &'b mut AstBuilder, name: &str, kind: MethodKind) -> Self {
        Self {
            b,
            name: name.to_string(),
            kind,
            type_params: Vec::new(),
            params: Vec::new(),
            return_type: None,
            body: None,
            modifiers: ModifierFlags::empty(),
        }
    }

    pub fn type_param(mut self, name: &str) -> Self {
        self.type_params.push(TypeParamSpec::new(name, None, None));
        self
    }

    pub fn param(mut self, name: &str, type_text: &str) -> Self {
        self.params.push((name.to_string(), type_text.to_string(), false));
        self
    }

    pub fn optional_param(mut self, name: &str, type_text: &str) -> Self {
        self.params.push((name.to_string(), type_text.to_string(), true));
        self
    }

    pub fn returns(mut self, type_text: &str) -> Self {
        self.return_type = Some(type_text.to_string());
        self
    }

    pub fn body(mut self, statements: Vec<NodeIndex>) -> Self {
        self.body = Some(statements);
        self
    }

    pub fn modifiers(mut self, modifiers: ModifierFlags) -> Self {
        self.modifiers |= modifiers;
        self
    }

    pub fn static_(self) -> Self {
        self.modifiers(ModifierFlags::STATIC)
    }

    pub fn abstract_(self) -> Self {
        self.modifiers(ModifierFlags::ABSTRACT)
    }

    pub fn private_(self) -> Self {
        self.modifiers(ModifierFlags::PRIVATE)
    }

    pub fn protected_(self) -> Self {
        self.modifiers(ModifierFlags::PROTECTED)
    }

    pub fn native(self) -> Self {
        self.modifiers(ModifierFlags::NATIVE)
    }

    pub fn async_(self) -> Self {
        self.modifiers(ModifierFlags::ASYNC)
    }

    fn function_data(&mut self, receiver: Option<&str>) -> FunctionData {
        let type_params = self.b.type_params(&self.type_params);
        let receiver = self.b.opt_ty(receiver);
        let params = self
            .params
            .iter()
            .map(|(name, ty, optional)| self.b.param(name, ty, *optional))
            .collect();
        let return_type = self.b.opt_ty(self.return_type.as_deref());
        let body = match self.body.take() {
            Some(stmts) => self.b.block(stmts),
            None => NodeIndex::NONE,
        };
        FunctionData {
            type_params,
            params,
            return_type,
            body,
            receiver,
        }
    }

    pub fn build(mut self) -> NodeIndex {
        let function = self.function_data(None);
        self.b.node(NodeKind::Method(MethodData {
            name: self.name,
            kind: self.kind,
            function,
            modifiers: self.modifiers,
        }))
    }
}

#[must_use = "call build() to add the member"]
pub struct FieldBuilder<'b> {
    b: &'b mut AstBuilder,
    name: String,
    type_text: Option<String>,
    initializer: NodeIndex,
    modifiers: ModifierFlags,
}

impl FieldBuilder<'_> {
    pub fn init(mut self, initializer: NodeIndex) -> Self {
        self.initializer = initializer;
        self
    }

    pub fn modifiers(mut self, modifiers: ModifierFlags) -> Self {
        self.modifiers |= modifiers;
        self
    }

    pub fn static_(self) -> Self {
        self.modifiers(ModifierFlags::STATIC)
    }

    pub fn readonly(self) -> Self {
        self.modifiers(ModifierFlags::READONLY)
    }

    pub fn const_(self) -> Self {
        self.modifiers(ModifierFlags::CONST)
    }

    pub fn private_(self) -> Self {
        self.modifiers(ModifierFlags::PRIVATE)
    }

    pub fn build(self) -> NodeIndex {
        let type_annotation = self.b.opt_ty(self.type_text.as_deref());
        self.b.node(NodeKind::ClassProperty(PropertyData {
            name: self.name,
            type_annotation,
            initializer: self.initializer,
            modifiers: self.modifiers,
        }))
    }
}

/// Top-level function declaration; `receiver` makes it an extension.
#[must_use = "call build() to add the declaration"]
pub struct FunctionBuilder<'b> {
    inner: MethodBuilder<'b>,
    receiver: Option<String>,
}

impl FunctionBuilder<'_> {
    pub fn param(mut self, name: &str, type_text: &str) -> Self {
        self.inner = self.inner.param(name, type_text);
        self
    }

    pub fn returns(mut self, type_text: &str) -> Self {
        self.inner = self.inner.returns(type_text);
        self
    }

    pub fn body(mut self, statements: Vec<NodeIndex>) -> Self {
        self.inner = self.inner.body(statements);
        self
    }

    /// Extension function on `type_text`.
    pub fn receiver(mut self, type_text: &str) -> Self {
        self.receiver = Some(type_text.to_string());
        self
    }

    /// Extension getter on `type_text` returning `value_type`.
    pub fn extension_getter(mut self, type_text: &str, value_type: &str) -> Self {
        self.receiver = Some(type_text.to_string());
        self.inner.kind = MethodKind::Getter;
        self.inner.return_type = Some(value_type.to_string());
        self
    }

    /// Extension setter on `type_text` accepting `value_type`.
    pub fn extension_setter(mut self, type_text: &str, value_type: &str) -> Self {
        self.receiver = Some(type_text.to_string());
        self.inner.kind = MethodKind::Setter;
        self.inner = self.inner.param("value", value_type).returns("void");
        self
    }

    pub fn build(self) -> NodeIndex {
        let mut inner = self.inner;
        let function = inner.function_data(self.receiver.as_deref());
        inner.b.node(NodeKind::FunctionDecl(FunctionDeclData {
            name: inner.name,
            kind: inner.kind,
            function,
            modifiers: inner.modifiers | ModifierFlags::STATIC,
        }))
    }
}
