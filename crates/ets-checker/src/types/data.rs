//! Type payloads.

use ets_ast::NodeIndex;
use ets_binder::{MemberTable, VariableId};
use ets_common::Language;
use indexmap::{IndexMap, IndexSet};
use smallvec::SmallVec;

use super::{ObjectFlags, SignatureFlags};

/// Handle to a type in the [`TypeArena`](super::TypeArena).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

impl TypeId {
    pub const ERROR: TypeId = TypeId(0);
    pub const VOID: TypeId = TypeId(1);
    pub const BOOLEAN: TypeId = TypeId(2);
    pub const BYTE: TypeId = TypeId(3);
    pub const CHAR: TypeId = TypeId(4);
    pub const SHORT: TypeId = TypeId(5);
    pub const INT: TypeId = TypeId(6);
    pub const LONG: TypeId = TypeId(7);
    pub const FLOAT: TypeId = TypeId(8);
    pub const DOUBLE: TypeId = TypeId(9);
    pub const NULL: TypeId = TypeId(10);
    pub const UNDEFINED: TypeId = TypeId(11);
    /// Root of the class hierarchy.
    pub const OBJECT: TypeId = TypeId(12);
    pub const STRING: TypeId = TypeId(13);
    /// `Object | null | undefined`, the implicit type-parameter constraint.
    pub const NULLISH_OBJECT: TypeId = TypeId(14);
    /// Class owning top-level functions.
    pub const GLOBAL: TypeId = TypeId(15);

    pub const FIRST_USER: u32 = 16;

    #[must_use]
    pub const fn is_error(self) -> bool {
        self.0 == Self::ERROR.0
    }
}

/// Handle to a call signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SignatureId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Void,
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveKind {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Void => "void",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
        }
    }

    /// Name of the type in assembler signatures.
    #[must_use]
    pub const fn assembler_name(self) -> &'static str {
        match self {
            PrimitiveKind::Void => "void",
            PrimitiveKind::Boolean => "u1",
            PrimitiveKind::Byte => "i8",
            PrimitiveKind::Char => "u16",
            PrimitiveKind::Short => "i16",
            PrimitiveKind::Int => "i32",
            PrimitiveKind::Long => "i64",
            PrimitiveKind::Float => "f32",
            PrimitiveKind::Double => "f64",
        }
    }

    #[must_use]
    pub const fn is_numeric(self) -> bool {
        !matches!(self, PrimitiveKind::Void | PrimitiveKind::Boolean)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Class,
    Interface,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UtilityKind {
    Partial,
    Required,
    Readonly,
}

impl UtilityKind {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            UtilityKind::Partial => "Partial",
            UtilityKind::Required => "Required",
            UtilityKind::Readonly => "Readonly",
        }
    }
}

/// Lazily computed aspects of an object type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Facet {
    Super,
    Interfaces,
    TypeParams,
    AbstractObligations,
    InvokeLegitimacy,
}

impl Facet {
    pub const COUNT: usize = 5;

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FacetState {
    #[default]
    Unresolved,
    InProgress,
    Resolved,
    /// Resolution hit an error and settled on a fallback.
    Failed,
}

impl FacetState {
    #[must_use]
    pub const fn is_settled(self) -> bool {
        matches!(self, FacetState::Resolved | FacetState::Failed)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FacetStates([FacetState; Facet::COUNT]);

impl FacetStates {
    #[must_use]
    pub const fn get(&self, facet: Facet) -> FacetState {
        self.0[facet.index()]
    }

    pub fn set(&mut self, facet: Facet, state: FacetState) {
        self.0[facet.index()] = state;
    }
}

#[derive(Clone, Debug)]
pub struct ObjectType {
    pub name: String,
    pub kind: ObjectKind,
    /// Declaring class or interface node; `NONE` for builtin and synthesized types.
    pub decl: NodeIndex,
    pub flags: ObjectFlags,
    /// Set by super resolution. `None` for interfaces and the root object type.
    pub super_type: Option<TypeId>,
    pub interfaces: IndexSet<TypeId>,
    pub type_params: Vec<TypeId>,
    /// Arguments of a generic instantiation, parallel to the base's parameters.
    pub type_args: Vec<TypeId>,
    /// Generic declaration type this is an instantiation of.
    pub original_base: Option<TypeId>,
    properties: [IndexMap<String, VariableId>; 6],
    pub construct_signatures: Vec<SignatureId>,
    pub facets: FacetStates,
}

impl ObjectType {
    #[must_use]
    pub fn new(name: &str, kind: ObjectKind, decl: NodeIndex, flags: ObjectFlags) -> Self {
        Self {
            name: name.to_string(),
            kind,
            decl,
            flags,
            super_type: None,
            interfaces: IndexSet::new(),
            type_params: Vec::new(),
            type_args: Vec::new(),
            original_base: None,
            properties: Default::default(),
            construct_signatures: Vec::new(),
            facets: FacetStates::default(),
        }
    }

    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.kind == ObjectKind::Interface
    }

    #[must_use]
    pub fn is_class(&self) -> bool {
        self.kind == ObjectKind::Class
    }

    #[must_use]
    pub fn properties(&self, table: MemberTable) -> &IndexMap<String, VariableId> {
        &self.properties[table.index()]
    }

    pub fn properties_mut(&mut self, table: MemberTable) -> &mut IndexMap<String, VariableId> {
        &mut self.properties[table.index()]
    }

    #[must_use]
    pub fn property(&self, table: MemberTable, name: &str) -> Option<VariableId> {
        self.properties[table.index()].get(name).copied()
    }

    /// The generic declaration for an instantiation, otherwise the type itself.
    #[must_use]
    pub fn generic_base(&self, this: TypeId) -> TypeId {
        self.original_base.unwrap_or(this)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FunctionType {
    pub name: String,
    /// Overloads in declaration order. A getter/setter pair is two signatures
    /// told apart by flag.
    pub signatures: SmallVec<[SignatureId; 2]>,
    /// Declared as an extension getter or setter.
    pub extension_accessor: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypeParameter {
    pub name: String,
    pub decl: NodeIndex,
    /// `NULLISH_OBJECT` until the second resolution phase assigns the real one.
    pub constraint: TypeId,
    pub default: Option<TypeId>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TypeData {
    Error,
    Primitive(PrimitiveKind),
    Null,
    Undefined,
    Object(Box<ObjectType>),
    Function(FunctionType),
    TypeParameter(TypeParameter),
    Union(SmallVec<[TypeId; 4]>),
    /// `T!`: the underlying type without `null` and `undefined`.
    NonNullish(TypeId),
    Utility { kind: UtilityKind, inner: TypeId },
    /// Values of a dynamically typed foreign language.
    Dynamic(Language),
}

// Object types are identified by their TypeId; this only backs `TypeData: PartialEq`.
impl PartialEq for ObjectType {
    fn eq(&self, other: &Self) -> bool {
        self.decl == other.decl && self.name == other.name && self.type_args == other.type_args
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParamInfo {
    pub name: String,
    pub ty: TypeId,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SignatureData {
    /// Object type declaring the signature.
    pub owner: TypeId,
    pub name: String,
    pub params: Vec<ParamInfo>,
    pub return_type: TypeId,
    pub min_arg_count: usize,
    pub flags: SignatureFlags,
    /// Declaring method or function node; `NONE` when synthesized.
    pub decl: NodeIndex,
    pub type_params: Vec<TypeId>,
}

impl SignatureData {
    #[must_use]
    pub fn has(&self, flags: SignatureFlags) -> bool {
        self.flags.intersects(flags)
    }

    #[must_use]
    pub fn is_accessor(&self) -> bool {
        self.has(SignatureFlags::GETTER_OR_SETTER)
    }

    /// Parameters after the extension receiver.
    #[must_use]
    pub fn explicit_params(&self) -> &[ParamInfo] {
        if self.has(SignatureFlags::EXTENSION) && !self.params.is_empty() {
            &self.params[1..]
        } else {
            &self.params
        }
    }

    /// Whether a call with `arg_count` explicit arguments fits this signature.
    #[must_use]
    pub fn accepts_arity(&self, arg_count: usize) -> bool {
        let receiver = usize::from(self.has(SignatureFlags::EXTENSION));
        let min = self.min_arg_count.saturating_sub(receiver);
        arg_count >= min && arg_count <= self.explicit_params().len()
    }
}
