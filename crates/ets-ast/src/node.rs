//! Node payloads.
//!
//! Every syntactic form is a variant of [`NodeKind`]. Optional children use
//! `NodeIndex::NONE`; lists are plain vectors in source order.

use ets_common::{Language, Span};
use smallvec::SmallVec;

use crate::{ModifierFlags, NodeIndex};

/// A node stored in the arena.
#[derive(Clone, Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    pub parent: NodeIndex,
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Program(ProgramData),

    // Declarations
    ClassDecl(ClassData),
    InterfaceDecl(InterfaceData),
    FunctionDecl(FunctionDeclData),
    TypeAliasDecl(TypeAliasData),
    ImportDecl(ImportData),
    TypeParam(TypeParamData),

    // Class and interface members
    ClassProperty(PropertyData),
    Method(MethodData),
    Parameter(ParameterData),

    // Type annotations
    TypeRef(TypeRefData),
    FunctionTypeNode(FunctionTypeData),
    UnionTypeNode(Vec<NodeIndex>),

    // Statements
    Block(Vec<NodeIndex>),
    ExprStatement(NodeIndex),
    VarDecl(VarDeclData),
    If(IfData),
    While(WhileData),
    Return(NodeIndex),

    // Expressions
    Identifier(String),
    This,
    Super,
    Literal(Literal),
    Member(MemberData),
    Call(CallData),
    New(NewData),
    Assign(AssignData),
    Binary(BinaryData),
    Unary(UnaryData),
    Update(UpdateData),
    Conditional(ConditionalData),
    As(AsData),
    NonNull(NodeIndex),
    Typeof(NodeIndex),
    ArrayLiteral(Vec<NodeIndex>),
    ObjectLiteral(Vec<NodeIndex>),
    PropertyAssignment(PropertyAssignmentData),
    ArrowFunction(FunctionData),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProgramData {
    pub file_name: String,
    pub statements: Vec<NodeIndex>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClassData {
    pub name: String,
    pub type_params: Vec<NodeIndex>,
    /// `TypeRef` of the `extends` clause, or `NONE`.
    pub super_class: NodeIndex,
    pub implements: Vec<NodeIndex>,
    pub members: Vec<NodeIndex>,
    pub modifiers: ModifierFlags,
    pub is_struct: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InterfaceData {
    pub name: String,
    pub type_params: Vec<NodeIndex>,
    pub extends: Vec<NodeIndex>,
    pub members: Vec<NodeIndex>,
    pub modifiers: ModifierFlags,
}

/// Top-level function. A non-`NONE` `function.receiver` makes it an
/// extension function (or an extension accessor for getter/setter kinds).
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDeclData {
    pub name: String,
    pub kind: MethodKind,
    pub function: FunctionData,
    pub modifiers: ModifierFlags,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypeAliasData {
    pub name: String,
    pub type_params: Vec<NodeIndex>,
    pub type_node: NodeIndex,
}

/// `import { a, b } from "source"` where `language` is the runtime language
/// of the imported module.
#[derive(Clone, Debug, PartialEq)]
pub struct ImportData {
    pub source: String,
    pub language: Language,
    pub names: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypeParamData {
    pub name: String,
    pub constraint: NodeIndex,
    pub default: NodeIndex,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PropertyData {
    pub name: String,
    pub type_annotation: NodeIndex,
    pub initializer: NodeIndex,
    pub modifiers: ModifierFlags,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MethodKind {
    Method,
    Constructor,
    Getter,
    Setter,
    StaticBlock,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MethodData {
    pub name: String,
    pub kind: MethodKind,
    pub function: FunctionData,
    pub modifiers: ModifierFlags,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FunctionData {
    pub type_params: Vec<NodeIndex>,
    pub params: Vec<NodeIndex>,
    pub return_type: NodeIndex,
    /// `Block`, or `NONE` for abstract, interface and native methods.
    pub body: NodeIndex,
    /// Receiver type of an extension function.
    pub receiver: NodeIndex,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParameterData {
    pub name: String,
    pub type_annotation: NodeIndex,
    pub optional: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypeRefData {
    pub name: String,
    pub type_args: Vec<NodeIndex>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FunctionTypeData {
    pub params: Vec<NodeIndex>,
    pub return_type: NodeIndex,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VarKind {
    Let,
    Const,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VarDeclData {
    pub name: String,
    pub kind: VarKind,
    pub type_annotation: NodeIndex,
    pub initializer: NodeIndex,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IfData {
    pub test: NodeIndex,
    pub consequent: NodeIndex,
    pub alternate: NodeIndex,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WhileData {
    pub test: NodeIndex,
    pub body: NodeIndex,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Int(i64),
    Double(f64),
    String(String),
    Bool(bool),
    Null,
    Undefined,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MemberData {
    pub object: NodeIndex,
    pub property: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CallData {
    pub callee: NodeIndex,
    pub args: Vec<NodeIndex>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewData {
    pub type_ref: NodeIndex,
    pub args: Vec<NodeIndex>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AssignData {
    pub op: AssignOp,
    pub left: NodeIndex,
    pub right: NodeIndex,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    NotEq,
    Lt,
    Gt,
    And,
    Or,
}

impl BinaryOp {
    #[must_use]
    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::Lt | BinaryOp::Gt | BinaryOp::And | BinaryOp::Or
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BinaryData {
    pub op: BinaryOp,
    pub left: NodeIndex,
    pub right: NodeIndex,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Minus,
    Plus,
    Not,
    BitNot,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnaryData {
    pub op: UnaryOp,
    pub operand: NodeIndex,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateOp {
    Increment,
    Decrement,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UpdateData {
    pub op: UpdateOp,
    pub prefix: bool,
    pub operand: NodeIndex,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConditionalData {
    pub test: NodeIndex,
    pub consequent: NodeIndex,
    pub alternate: NodeIndex,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AsData {
    pub expr: NodeIndex,
    pub type_node: NodeIndex,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PropertyAssignmentData {
    pub key: String,
    pub value: NodeIndex,
}

fn push_some(out: &mut SmallVec<[NodeIndex; 4]>, idx: NodeIndex) {
    if idx.is_some() {
        out.push(idx);
    }
}

fn push_function(out: &mut SmallVec<[NodeIndex; 4]>, f: &FunctionData) {
    out.extend(f.type_params.iter().copied());
    push_some(out, f.receiver);
    out.extend(f.params.iter().copied());
    push_some(out, f.return_type);
    push_some(out, f.body);
}

impl NodeKind {
    /// Direct children in source order.
    #[must_use]
    pub fn children(&self) -> SmallVec<[NodeIndex; 4]> {
        let mut out = SmallVec::new();
        match self {
            NodeKind::Program(p) => out.extend(p.statements.iter().copied()),
            NodeKind::ClassDecl(c) => {
                out.extend(c.type_params.iter().copied());
                push_some(&mut out, c.super_class);
                out.extend(c.implements.iter().copied());
                out.extend(c.members.iter().copied());
            }
            NodeKind::InterfaceDecl(i) => {
                out.extend(i.type_params.iter().copied());
                out.extend(i.extends.iter().copied());
                out.extend(i.members.iter().copied());
            }
            NodeKind::FunctionDecl(f) => push_function(&mut out, &f.function),
            NodeKind::TypeAliasDecl(a) => {
                out.extend(a.type_params.iter().copied());
                push_some(&mut out, a.type_node);
            }
            NodeKind::ImportDecl(_) => {}
            NodeKind::TypeParam(t) => {
                push_some(&mut out, t.constraint);
                push_some(&mut out, t.default);
            }
            NodeKind::ClassProperty(p) => {
                push_some(&mut out, p.type_annotation);
                push_some(&mut out, p.initializer);
            }
            NodeKind::Method(m) => push_function(&mut out, &m.function),
            NodeKind::Parameter(p) => push_some(&mut out, p.type_annotation),
            NodeKind::TypeRef(t) => out.extend(t.type_args.iter().copied()),
            NodeKind::FunctionTypeNode(f) => {
                out.extend(f.params.iter().copied());
                push_some(&mut out, f.return_type);
            }
            NodeKind::UnionTypeNode(types) => out.extend(types.iter().copied()),
            NodeKind::Block(stmts) => out.extend(stmts.iter().copied()),
            NodeKind::ExprStatement(e) | NodeKind::Return(e) | NodeKind::NonNull(e) | NodeKind::Typeof(e) => {
                push_some(&mut out, *e);
            }
            NodeKind::VarDecl(v) => {
                push_some(&mut out, v.type_annotation);
                push_some(&mut out, v.initializer);
            }
            NodeKind::If(i) => {
                push_some(&mut out, i.test);
                push_some(&mut out, i.consequent);
                push_some(&mut out, i.alternate);
            }
            NodeKind::While(w) => {
                push_some(&mut out, w.test);
                push_some(&mut out, w.body);
            }
            NodeKind::Identifier(_) | NodeKind::This | NodeKind::Super | NodeKind::Literal(_) => {}
            NodeKind::Member(m) => push_some(&mut out, m.object),
            NodeKind::Call(c) => {
                push_some(&mut out, c.callee);
                out.extend(c.args.iter().copied());
            }
            NodeKind::New(n) => {
                push_some(&mut out, n.type_ref);
                out.extend(n.args.iter().copied());
            }
            NodeKind::Assign(a) => {
                push_some(&mut out, a.left);
                push_some(&mut out, a.right);
            }
            NodeKind::Binary(b) => {
                push_some(&mut out, b.left);
                push_some(&mut out, b.right);
            }
            NodeKind::Unary(u) => push_some(&mut out, u.operand),
            NodeKind::Update(u) => push_some(&mut out, u.operand),
            NodeKind::Conditional(c) => {
                push_some(&mut out, c.test);
                push_some(&mut out, c.consequent);
                push_some(&mut out, c.alternate);
            }
            NodeKind::As(a) => {
                push_some(&mut out, a.expr);
                push_some(&mut out, a.type_node);
            }
            NodeKind::ArrayLiteral(items) | NodeKind::ObjectLiteral(items) => {
                out.extend(items.iter().copied());
            }
            NodeKind::PropertyAssignment(p) => push_some(&mut out, p.value),
            NodeKind::ArrowFunction(f) => push_function(&mut out, f),
        }
        out
    }

    /// Declared name, for declarations and members.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            NodeKind::ClassDecl(c) => Some(&c.name),
            NodeKind::InterfaceDecl(i) => Some(&i.name),
            NodeKind::FunctionDecl(f) => Some(&f.name),
            NodeKind::TypeAliasDecl(a) => Some(&a.name),
            NodeKind::TypeParam(t) => Some(&t.name),
            NodeKind::ClassProperty(p) => Some(&p.name),
            NodeKind::Method(m) => Some(&m.name),
            NodeKind::Parameter(p) => Some(&p.name),
            NodeKind::VarDecl(v) => Some(&v.name),
            NodeKind::Identifier(name) => Some(name),
            _ => None,
        }
    }

    #[must_use]
    pub fn modifiers(&self) -> ModifierFlags {
        match self {
            NodeKind::ClassDecl(c) => c.modifiers,
            NodeKind::InterfaceDecl(i) => i.modifiers,
            NodeKind::FunctionDecl(f) => f.modifiers,
            NodeKind::ClassProperty(p) => p.modifiers,
            NodeKind::Method(m) => m.modifiers,
            _ => ModifierFlags::empty(),
        }
    }

    pub fn modifiers_mut(&mut self) -> Option<&mut ModifierFlags> {
        match self {
            NodeKind::ClassDecl(c) => Some(&mut c.modifiers),
            NodeKind::InterfaceDecl(i) => Some(&mut i.modifiers),
            NodeKind::FunctionDecl(f) => Some(&mut f.modifiers),
            NodeKind::ClassProperty(p) => Some(&mut p.modifiers),
            NodeKind::Method(m) => Some(&mut m.modifiers),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_expression(&self) -> bool {
        matches!(
            self,
            NodeKind::Identifier(_)
                | NodeKind::This
                | NodeKind::Super
                | NodeKind::Literal(_)
                | NodeKind::Member(_)
                | NodeKind::Call(_)
                | NodeKind::New(_)
                | NodeKind::Assign(_)
                | NodeKind::Binary(_)
                | NodeKind::Unary(_)
                | NodeKind::Update(_)
                | NodeKind::Conditional(_)
                | NodeKind::As(_)
                | NodeKind::NonNull(_)
                | NodeKind::Typeof(_)
                | NodeKind::ArrayLiteral(_)
                | NodeKind::ObjectLiteral(_)
                | NodeKind::ArrowFunction(_)
        )
    }
}
