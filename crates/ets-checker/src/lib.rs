//! Static semantic resolution for ETS programs.
//!
//! Given a bound AST, the checker builds the type graph (super types,
//! interfaces, type parameters), resolves member accesses, validates
//! overrides, constructors and field initialization, and synthesizes the
//! bridge classes that dynamic-language interop needs. Everything it adds to
//! the program is returned as an edit list rather than applied in place.
//!
//! - `types` - type arena, object/function/signature payloads and flags
//! - `context` / `state` - shared session state and the `CheckerState` entry point
//! - `type_nodes` / `type_graph` - type annotations and the class hierarchy
//! - `members` / `member_resolution` - member tables and access resolution
//! - `overriding` / `accessors` - abstract obligations and accessor lowering
//! - `constructor_checker` / `const_fields` - constructor invariants
//! - `async_methods` - async implementation methods and inner-class rules
//! - `dynamic_interop` - bridge and lambda-object synthesis
//! - `expr` / `class_checker` - expression walk and the program pass

pub mod tracing_config;

pub mod options;
pub use options::CheckerOptions;

pub mod types;

pub mod context;
pub use context::{CheckerContext, DynamicCallKey};

pub mod state;
pub use state::CheckerState;

pub mod error_reporter;

pub mod type_nodes;
pub mod type_graph;

pub mod members;
pub use members::FoundProperty;

pub mod relations;

pub mod member_resolution;
pub use member_resolution::{AccessRole, ResolvedMember, ResolvedMemberKind};

pub mod overriding;
pub use overriding::AbstractObligations;

pub mod accessors;
pub use accessors::backing_field_name;

pub mod constructor_checker;
pub use constructor_checker::ConstructorStart;

pub mod const_fields;
pub mod async_methods;
pub mod dynamic_interop;
pub mod expr;
pub mod class_checker;

#[cfg(test)]
mod test_support;
