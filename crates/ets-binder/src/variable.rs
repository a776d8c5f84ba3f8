//! Variables produced by the binder.

use bitflags::bitflags;
use ets_ast::NodeIndex;
use smallvec::SmallVec;

use crate::ScopeId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableId(pub u32);

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct VariableFlags: u32 {
        const VAR = 1 << 0;
        const LET = 1 << 1;
        const CONST = 1 << 2;
        const CLASS = 1 << 3;
        const INTERFACE = 1 << 4;
        const ENUM_LITERAL = 1 << 5;
        const TYPE_ALIAS = 1 << 6;
        const NAMESPACE = 1 << 7;
        const TYPE_PARAMETER = 1 << 8;
        const PROPERTY = 1 << 9;
        const METHOD = 1 << 10;
        const STATIC = 1 << 11;
        const READONLY = 1 << 12;
        const LOCAL = 1 << 13;
        /// Declared with an initializer.
        const INITIALIZED = 1 << 14;
        /// Const or readonly field without an initializer; must be assigned
        /// in every constructor (or static block for static fields).
        const EXPLICIT_INIT_REQUIRED = 1 << 15;
        const PUBLIC = 1 << 16;
        const PRIVATE = 1 << 17;
        const PROTECTED = 1 << 18;
        const PARAMETER = 1 << 19;
        /// Name imported from a dynamically typed module.
        const DYNAMIC_IMPORT = 1 << 20;
        /// Created by the checker rather than by a declaration.
        const SYNTHETIC = 1 << 21;

        const CLASS_OR_INTERFACE = Self::CLASS.bits() | Self::INTERFACE.bits();
        const TYPE = Self::CLASS.bits()
            | Self::INTERFACE.bits()
            | Self::ENUM_LITERAL.bits()
            | Self::TYPE_ALIAS.bits()
            | Self::NAMESPACE.bits()
            | Self::TYPE_PARAMETER.bits();
        const LET_OR_CONST = Self::LET.bits() | Self::CONST.bits();
    }
}

#[derive(Clone, Debug)]
pub struct Variable {
    pub name: String,
    /// Declaring nodes. Overloads and getter/setter pairs share one variable.
    pub declarations: SmallVec<[NodeIndex; 1]>,
    pub flags: VariableFlags,
    pub scope: ScopeId,
}

impl Variable {
    /// First declaration, or `NONE` for synthetic variables without one.
    #[must_use]
    pub fn decl(&self) -> NodeIndex {
        self.declarations.first().copied().unwrap_or(NodeIndex::NONE)
    }

    #[must_use]
    pub fn has_flags(&self, flags: VariableFlags) -> bool {
        self.flags.intersects(flags)
    }

    #[must_use]
    pub fn is_static(&self) -> bool {
        self.flags.contains(VariableFlags::STATIC)
    }
}
