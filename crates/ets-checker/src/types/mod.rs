//! Type model.
//!
//! All types live in one [`TypeArena`] owned by the checking context and are
//! referenced through [`TypeId`] handles. Signatures live in the same arena
//! behind [`SignatureId`]s; every signature has exactly one owning object type.

mod arena;
mod data;
mod display;
mod flags;

pub use arena::TypeArena;
pub use data::*;
pub use flags::{ObjectFlags, PropertySearchFlags, SignatureFlags};
