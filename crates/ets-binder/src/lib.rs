//! Name binder for the ETS semantic checker.
//!
//! The binder walks a finished AST once and produces:
//! - [`Variable`]s for every declaration, with [`VariableFlags`]
//! - scopes (global, type-parameter, class, function) and, for every class or
//!   interface, a [`ClassScope`] partitioned into six member tables
//! - a map from identifier and type-reference nodes to the variable they name
//!
//! The checker treats the binder as read-mostly: it only appends synthetic
//! variables (interop properties, generated accessors).

pub mod variable;
pub use variable::{Variable, VariableFlags, VariableId};

pub mod scope;
pub use scope::{ClassScope, MemberTable, Scope, ScopeId, ScopeKind};

mod state;
pub use state::BinderState;

mod state_binding;
