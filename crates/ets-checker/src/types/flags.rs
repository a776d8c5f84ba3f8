//! Bit flags on types, signatures and member searches.

use bitflags::bitflags;

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ObjectFlags: u32 {
        const ABSTRACT = 1 << 0;
        const FINAL = 1 << 1;
        const STRUCT = 1 << 2;
        const DECLARE = 1 << 3;
        /// Synthesized class standing in for a lambda.
        const FUNCTIONAL = 1 << 4;
        /// Backing class of dynamic-interop bridge methods.
        const DYNAMIC_BRIDGE = 1 << 5;
        /// Built into the checker (`Object`, `String`, the global class).
        const BUILTIN = 1 << 6;
        const MEMBERS_RESOLVED = 1 << 7;
        const OVERRIDES_VALIDATED = 1 << 8;
        const CONSTRUCTORS_CHECKED = 1 << 9;
        const INITIALIZERS_CHECKED = 1 << 10;
        const ASYNC_PROXIES_CREATED = 1 << 11;
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct SignatureFlags: u32 {
        const ABSTRACT = 1 << 0;
        const STATIC = 1 << 1;
        const GETTER = 1 << 2;
        const SETTER = 1 << 3;
        const CONSTRUCT = 1 << 4;
        const PRIVATE = 1 << 5;
        const PROTECTED = 1 << 6;
        const FINAL = 1 << 7;
        const NATIVE = 1 << 8;
        /// Interface method with a default body.
        const DEFAULT = 1 << 9;
        /// First parameter is the receiver of an extension function.
        const EXTENSION = 1 << 10;
        /// Constructor without an explicit `super(...)`/`this(...)` call that
        /// lowering must complete with a call to the zero-argument super
        /// constructor.
        const IMPLICIT_SUPER_CALL_NEEDED = 1 << 11;
        const SYNTHETIC = 1 << 12;

        const GETTER_OR_SETTER = Self::GETTER.bits() | Self::SETTER.bits();
    }
}

bitflags! {
    /// What a member lookup may return and where it may look.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct PropertySearchFlags: u32 {
        const SEARCH_INSTANCE_METHOD = 1 << 0;
        const SEARCH_INSTANCE_FIELD = 1 << 1;
        const SEARCH_INSTANCE_DECL = 1 << 2;
        const SEARCH_STATIC_METHOD = 1 << 3;
        const SEARCH_STATIC_FIELD = 1 << 4;
        const SEARCH_STATIC_DECL = 1 << 5;
        const SEARCH_IN_BASE = 1 << 6;
        const SEARCH_IN_INTERFACES = 1 << 7;
        /// The access site may use a method as a value.
        const IS_FUNCTIONAL = 1 << 8;
        /// The access site reads through a getter.
        const IS_GETTER = 1 << 9;
        /// The access site writes through a setter.
        const IS_SETTER = 1 << 10;

        const SEARCH_INSTANCE = Self::SEARCH_INSTANCE_METHOD.bits()
            | Self::SEARCH_INSTANCE_FIELD.bits()
            | Self::SEARCH_INSTANCE_DECL.bits();
        const SEARCH_STATIC = Self::SEARCH_STATIC_METHOD.bits()
            | Self::SEARCH_STATIC_FIELD.bits()
            | Self::SEARCH_STATIC_DECL.bits();
        const SEARCH_METHOD = Self::SEARCH_INSTANCE_METHOD.bits() | Self::SEARCH_STATIC_METHOD.bits();
        const SEARCH_FIELD = Self::SEARCH_INSTANCE_FIELD.bits() | Self::SEARCH_STATIC_FIELD.bits();
        const SEARCH_DECL = Self::SEARCH_INSTANCE_DECL.bits() | Self::SEARCH_STATIC_DECL.bits();
        const SEARCH_ALL = Self::SEARCH_INSTANCE.bits() | Self::SEARCH_STATIC.bits();
    }
}

impl PropertySearchFlags {
    /// The same member categories with instance and static exchanged.
    ///
    /// Used to explain a failed lookup: a field searched as an instance member
    /// is looked for again among static members, and vice versa.
    #[must_use]
    pub fn with_swapped_staticness(self) -> Self {
        let wants_instance_method = self.contains(Self::SEARCH_STATIC_METHOD);
        let wants_instance_field = self.contains(Self::SEARCH_STATIC_FIELD);
        let wants_instance_decl = self.contains(Self::SEARCH_STATIC_DECL);
        let wants_static_method = self.contains(Self::SEARCH_INSTANCE_METHOD);
        let wants_static_field = self.contains(Self::SEARCH_INSTANCE_FIELD);
        let wants_static_decl = self.contains(Self::SEARCH_INSTANCE_DECL);

        let mut swapped = self - Self::SEARCH_ALL;
        swapped.set(Self::SEARCH_INSTANCE_METHOD, wants_instance_method);
        swapped.set(Self::SEARCH_INSTANCE_FIELD, wants_instance_field);
        swapped.set(Self::SEARCH_INSTANCE_DECL, wants_instance_decl);
        swapped.set(Self::SEARCH_STATIC_METHOD, wants_static_method);
        swapped.set(Self::SEARCH_STATIC_FIELD, wants_static_field);
        swapped.set(Self::SEARCH_STATIC_DECL, wants_static_decl);
        swapped
    }

    #[must_use]
    pub fn searches_static(self) -> bool {
        self.intersects(Self::SEARCH_STATIC)
    }

    #[must_use]
    pub fn searches_instance(self) -> bool {
        self.intersects(Self::SEARCH_INSTANCE)
    }
}
