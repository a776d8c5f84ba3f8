//! Declaration modifiers.

use bitflags::bitflags;

bitflags! {
    /// Modifiers written on (or attached by the checker to) declarations.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ModifierFlags: u32 {
        const STATIC = 1 << 0;
        const ABSTRACT = 1 << 1;
        const FINAL = 1 << 2;
        const PUBLIC = 1 << 3;
        const PRIVATE = 1 << 4;
        const PROTECTED = 1 << 5;
        const INTERNAL = 1 << 6;
        const READONLY = 1 << 7;
        const CONST = 1 << 8;
        const DECLARE = 1 << 9;
        const NATIVE = 1 << 10;
        const OVERRIDE = 1 << 11;
        const ASYNC = 1 << 12;
        const DEFAULT = 1 << 13;
        /// Field implements an interface getter.
        const GETTER = 1 << 14;
        /// Field implements an interface setter.
        const SETTER = 1 << 15;
        /// Synthetic override field whose storage lives in the super class.
        const SUPER_OWNER = 1 << 16;
        /// Class synthesized for a lambda or functional interface.
        const FUNCTIONAL = 1 << 17;

        const GETTER_SETTER = Self::GETTER.bits() | Self::SETTER.bits();
        const ACCESS = Self::PUBLIC.bits() | Self::PRIVATE.bits() | Self::PROTECTED.bits() | Self::INTERNAL.bits();
    }
}

impl ModifierFlags {
    /// Declarations without an explicit access modifier are public.
    #[must_use]
    pub fn is_public(self) -> bool {
        !self.intersects(Self::PRIVATE | Self::PROTECTED | Self::INTERNAL)
    }

    /// Access modifiers only, used to compare accessor pairs. An implicit
    /// access level normalizes to `PUBLIC`.
    #[must_use]
    pub fn access(self) -> ModifierFlags {
        let access = self & Self::ACCESS;
        if access.is_empty() { Self::PUBLIC } else { access }
    }
}
