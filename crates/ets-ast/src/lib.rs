//! Abstract syntax tree for the ETS semantic checker.
//!
//! Nodes live in a flat [`NodeArena`] and reference each other through
//! [`NodeIndex`] handles. The node payload is a closed sum type
//! ([`NodeKind`]) so every consumer matches exhaustively.
//!
//! - `arena` - storage, parent links and typed accessors
//! - `queries` - structural and role queries used by the checker
//! - `builder` - fluent construction of programs without a parser
//! - `edit` - AST edit lists produced by the checker and applied afterwards

pub mod base;
pub use base::NodeIndex;

pub mod flags;
pub use flags::ModifierFlags;

pub mod node;
pub use node::*;

pub mod arena;
pub use arena::NodeArena;

pub mod queries;

pub mod type_text;

pub mod builder;
pub use builder::AstBuilder;

pub mod edit;
pub use edit::{AstEdit, ClassTarget, SyntheticMember, apply_edits};
