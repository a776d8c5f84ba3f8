//! Centralized limits and thresholds for the checker.
//!
//! Recursion in the checker is bounded by explicit resolution stacks, so these
//! limits only guard against pathological inputs that slip past them.

/// Maximum depth of a `this(...)` constructor delegation chain that is
/// followed before the chain is treated as recursive.
pub const MAX_CONSTRUCTOR_CHAIN_DEPTH: usize = 256;

/// Maximum nesting depth of supertypes walked by subtype and member queries.
///
/// Cyclic hierarchies are cut by the super-type resolution facet; this bound
/// only protects against extremely deep but acyclic chains.
pub const MAX_HIERARCHY_DEPTH: usize = 512;

/// Maximum depth for expression walks (const-field scans, constructor
/// argument checks).
pub const MAX_EXPR_CHECK_DEPTH: usize = 500;

/// Red zone kept free on the stack before `stacker` grows a new segment.
pub const STACK_RED_ZONE: usize = 64 * 1024;

/// Size of each stack segment allocated by `stacker`.
pub const STACK_GROW_SIZE: usize = 1024 * 1024;
