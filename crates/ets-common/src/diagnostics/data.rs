//! Diagnostic message table.
//!
//! Codes are grouped by the checker phase that reports them:
//! 21xx type graph, 22xx member access, 23xx overriding and conformance,
//! 24xx constructors and field initialization, 25xx dynamic interop.

use super::{DiagnosticCategory, DiagnosticMessage};

pub mod diagnostic_codes {
    // Type graph
    pub const CYCLIC_INHERITANCE: u32 = 2101;
    pub const RESERVED_NAME_AS_SUPER_TYPE: u32 = 2102;
    pub const SUPER_TYPE_NOT_EXTENSIBLE: u32 = 2103;
    pub const STRUCT_NOT_EXTENSIBLE: u32 = 2104;
    pub const CANNOT_INHERIT_FINAL: u32 = 2105;
    pub const FINAL_AND_ABSTRACT: u32 = 2106;
    pub const INTERFACE_EXPECTED: u32 = 2107;
    pub const REPEATED_INTERFACE: u32 = 2108;
    pub const CONFLICTING_GENERIC_INTERFACE: u32 = 2109;
    pub const DUPLICATE_TYPE_PARAMETER: u32 = 2110;
    pub const TYPE_PARAMETER_USED_BEFORE_DEFINED: u32 = 2111;
    pub const CIRCULAR_CONSTRAINT: u32 = 2112;
    pub const EXTENDS_CONSTRAINT_NOT_OBJECT: u32 = 2113;
    pub const CANNOT_FIND_TYPE: u32 = 2114;
    pub const WRONG_TYPE_ARGUMENT_COUNT: u32 = 2115;

    // Member access
    pub const PROPERTY_DOES_NOT_EXIST: u32 = 2201;
    pub const IS_STATIC_PROPERTY: u32 = 2202;
    pub const IS_INSTANCE_PROPERTY: u32 = 2203;
    pub const METHOD_USED_IN_WRONG_CONTEXT: u32 = 2204;
    pub const CANNOT_READ_WRITEONLY: u32 = 2205;
    pub const CANNOT_ASSIGN_READONLY: u32 = 2206;
    pub const EXTENSION_ACCESSOR_CALLED: u32 = 2207;
    pub const EXTENSION_SHADOWED: u32 = 2208;
    pub const READONLY_FIELD_ALREADY_INITIALIZED: u32 = 2209;

    // Overriding and conformance
    pub const MISSING_OVERRIDE: u32 = 2301;
    pub const MISSING_GETTER: u32 = 2302;
    pub const MISSING_SETTER: u32 = 2303;
    pub const INTERFACE_METHOD_COLLISION: u32 = 2304;
    pub const INHERITED_WITH_DIFFERENT_DECLARATION: u32 = 2305;
    pub const NON_PUBLIC_INTERFACE_PROPERTY: u32 = 2306;
    pub const METHOD_SAME_NAME_AS_ACCESSOR: u32 = 2307;
    pub const DUPLICATE_ACCESSOR: u32 = 2308;
    pub const ACCESSOR_MODIFIERS_MISMATCH: u32 = 2309;
    pub const INVOKE_AND_INSTANTIATE: u32 = 2310;
    pub const INNER_CLASS_STATIC_METHOD: u32 = 2311;
    pub const INNER_CLASS_MUTABLE_STATIC_FIELD: u32 = 2312;

    // Constructors and field initialization
    pub const MUST_CALL_SUPER_CONSTRUCTOR: u32 = 2401;
    pub const RECURSIVE_CONSTRUCTOR_INVOCATION: u32 = 2402;
    pub const THIS_OR_SUPER_IN_CONSTRUCTOR: u32 = 2403;
    pub const CONSTRUCTOR_CALL_MUST_BE_FIRST: u32 = 2404;
    pub const MAYBE_DOUBLE_INIT: u32 = 2405;
    pub const MAYBE_MISSING_INIT: u32 = 2406;
    pub const NO_MATCHING_CONSTRUCTOR: u32 = 2407;

    // Dynamic interop
    pub const UNSUPPORTED_DYNAMIC_LANGUAGE: u32 = 2501;
    pub const NOT_A_FUNCTIONAL_INTERFACE: u32 = 2502;
}

use diagnostic_codes as c;

const fn error(code: u32, message: &'static str) -> DiagnosticMessage {
    DiagnosticMessage {
        code,
        category: DiagnosticCategory::Error,
        message,
    }
}

const fn warning(code: u32, message: &'static str) -> DiagnosticMessage {
    DiagnosticMessage {
        code,
        category: DiagnosticCategory::Warning,
        message,
    }
}

pub static DIAGNOSTIC_MESSAGES: &[DiagnosticMessage] = &[
    error(c::CYCLIC_INHERITANCE, "Cyclic inheritance involving {0}."),
    error(
        c::RESERVED_NAME_AS_SUPER_TYPE,
        "Cannot use reserved type name '{0}' as a super type.",
    ),
    error(
        c::SUPER_TYPE_NOT_EXTENSIBLE,
        "The super type of '{0}' class is not extensible.",
    ),
    error(c::STRUCT_NOT_EXTENSIBLE, "struct {0} is not extensible."),
    error(c::CANNOT_INHERIT_FINAL, "Cannot inherit with 'final' modifier."),
    error(
        c::FINAL_AND_ABSTRACT,
        "Cannot use both 'final' and 'abstract' modifiers.",
    ),
    error(c::INTERFACE_EXPECTED, "Interface expected here."),
    error(c::REPEATED_INTERFACE, "Repeated interface."),
    error(
        c::CONFLICTING_GENERIC_INTERFACE,
        "Implements generic interface '{0}' with different instantiations.",
    ),
    error(c::DUPLICATE_TYPE_PARAMETER, "Duplicate type parameter '{0}'."),
    error(
        c::TYPE_PARAMETER_USED_BEFORE_DEFINED,
        "Type Parameter {0} should be defined before use.",
    ),
    error(
        c::CIRCULAR_CONSTRAINT,
        "Type parameter '{0}' has circular constraint dependency.",
    ),
    error(
        c::EXTENDS_CONSTRAINT_NOT_OBJECT,
        "Extends constraint must be an object",
    ),
    error(c::CANNOT_FIND_TYPE, "Cannot find type '{0}'."),
    error(
        c::WRONG_TYPE_ARGUMENT_COUNT,
        "Type '{0}' expects {1} type argument(s) but got {2}.",
    ),
    error(
        c::PROPERTY_DOES_NOT_EXIST,
        "Property '{0}' does not exist on type '{1}'",
    ),
    error(c::IS_STATIC_PROPERTY, "'{0}' is a static property of '{1}'"),
    error(c::IS_INSTANCE_PROPERTY, "'{0}' is an instance property of '{1}'"),
    error(c::METHOD_USED_IN_WRONG_CONTEXT, "Method used in wrong context"),
    error(
        c::CANNOT_READ_WRITEONLY,
        "Cannot read from this property because it is writeonly.",
    ),
    error(
        c::CANNOT_ASSIGN_READONLY,
        "Cannot assign to this property because it is readonly.",
    ),
    error(
        c::EXTENSION_ACCESSOR_CALLED,
        "Extension accessor '{0}' cannot be called as a method.",
    ),
    warning(
        c::EXTENSION_SHADOWED,
        "Extension '{0}' is shadowed by a member of '{1}' with the same name.",
    ),
    error(
        c::READONLY_FIELD_ALREADY_INITIALIZED,
        "Readonly field '{0}' is already initialized at its declaration.",
    ),
    error(
        c::MISSING_OVERRIDE,
        "{0} is not abstract and does not override abstract method {1}{2} in {3}",
    ),
    error(
        c::MISSING_GETTER,
        "{0} is not abstract and does not implement getter for {1} property in {2}",
    ),
    error(
        c::MISSING_SETTER,
        "{0} is not abstract and does not implement setter for {1} property in {2}",
    ),
    error(
        c::INTERFACE_METHOD_COLLISION,
        "Method '{0}' is declared in {1} and {2} interfaces.",
    ),
    error(
        c::INHERITED_WITH_DIFFERENT_DECLARATION,
        "Cannot inherit from {0} {1}, because {2} {3} is inherited with a different declaration type",
    ),
    error(
        c::NON_PUBLIC_INTERFACE_PROPERTY,
        "Interface property implementation cannot be generated as non-public",
    ),
    error(
        c::METHOD_SAME_NAME_AS_ACCESSOR,
        "Method cannot use the same name as {0} accessor property",
    ),
    error(c::DUPLICATE_ACCESSOR, "Duplicate accessor definition"),
    error(
        c::ACCESSOR_MODIFIERS_MISMATCH,
        "Getter and setter methods must have the same accessor modifiers",
    ),
    error(
        c::INVOKE_AND_INSTANTIATE,
        "Static {0} method and static {1} method both exist in class/interface {2} is not allowed.",
    ),
    error(c::INNER_CLASS_STATIC_METHOD, "Inner class cannot have static methods"),
    error(
        c::INNER_CLASS_MUTABLE_STATIC_FIELD,
        "Inner class cannot have non-readonly static properties",
    ),
    error(c::MUST_CALL_SUPER_CONSTRUCTOR, "Must call super constructor"),
    error(
        c::RECURSIVE_CONSTRUCTOR_INVOCATION,
        "Recursive constructor invocation",
    ),
    error(
        c::THIS_OR_SUPER_IN_CONSTRUCTOR,
        "Using {0} is not allowed in constructor",
    ),
    error(
        c::CONSTRUCTOR_CALL_MUST_BE_FIRST,
        "Call to '{0}' must be first statement in constructor",
    ),
    error(
        c::MAYBE_DOUBLE_INIT,
        "Variable '{0}' might already have been initialized",
    ),
    error(
        c::MAYBE_MISSING_INIT,
        "Variable '{0}' might not have been initialized",
    ),
    error(
        c::NO_MATCHING_CONSTRUCTOR,
        "No matching constructor for '{0}' with {1} argument(s)",
    ),
    error(
        c::UNSUPPORTED_DYNAMIC_LANGUAGE,
        "Dynamic imports from language '{0}' are not enabled.",
    ),
    error(
        c::NOT_A_FUNCTIONAL_INTERFACE,
        "Type '{0}' is not a functional interface.",
    ),
];
