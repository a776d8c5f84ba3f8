//! Checker context holding shared state for one checking session.
//!
//! Every memoization cache is a named map keyed by stable handles
//! (`TypeId`, `VariableId`, `NodeIndex`). Nothing here is persisted.

use std::rc::Rc;

use ets_ast::{AstEdit, ModifierFlags, NodeArena, NodeIndex};
use ets_binder::{BinderState, VariableId};
use ets_common::{Diagnostic, Language};
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::member_resolution::ResolvedMember;
use crate::options::CheckerOptions;
use crate::overriding::AbstractObligations;
use crate::types::{Facet, SignatureId, TypeArena, TypeId};

/// Key of the dynamic call cache.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DynamicCallKey {
    pub language: Language,
    pub is_construct: bool,
    /// Mangled argument signature, e.g. `dyncall-i32-std.core.String`.
    pub signature: String,
}

pub struct CheckerContext<'a> {
    pub arena: &'a NodeArena,
    pub binder: &'a mut BinderState,
    pub file_name: String,
    pub options: CheckerOptions,
    pub types: TypeArena,

    /// Accumulated diagnostics, in report order.
    pub diagnostics: Vec<Diagnostic>,
    /// (start, code, message) of every diagnostic already reported.
    pub emitted_diagnostics: FxHashSet<(u32, u32, String)>,

    // --- Type graph ---
    /// Class, interface and type-parameter declarations to their types.
    pub decl_types: FxHashMap<NodeIndex, TypeId>,
    /// Generic instantiations by (generic base, arguments).
    pub instantiations: FxHashMap<(TypeId, SmallVec<[TypeId; 2]>), TypeId>,
    /// Per-facet stacks of types whose resolution is in progress.
    pub resolution_stacks: [Vec<TypeId>; Facet::COUNT],
    pub apparent_types: FxHashMap<TypeId, TypeId>,

    // --- Members ---
    pub variable_types: FxHashMap<VariableId, TypeId>,
    pub signature_of_decl: FxHashMap<NodeIndex, SignatureId>,
    pub member_results: FxHashMap<NodeIndex, Vec<ResolvedMember>>,
    /// Dynamic properties by (dynamic type, name).
    pub dynamic_properties: FxHashMap<(TypeId, String), VariableId>,
    pub node_types: FxHashMap<NodeIndex, TypeId>,

    // --- Overriding ---
    pub obligations: FxHashMap<TypeId, Rc<AbstractObligations>>,
    /// Fields that implement interface accessors, with the accessor kinds they
    /// must provide. Consumed by the property transformation.
    pub accessor_marks: IndexMap<VariableId, ModifierFlags>,
    /// Synthetic `SUPER_OWNER` override fields by (class, name).
    pub super_owner_fields: FxHashMap<(TypeId, String), VariableId>,

    // --- Constructors ---
    /// Constructors that lowering must complete with `super()`.
    pub implicit_super_calls: Vec<NodeIndex>,

    /// Async methods to the synthetic variable holding their implementation.
    pub async_impls: FxHashMap<NodeIndex, VariableId>,

    // --- Dynamic interop ---
    pub dynamic_call_cache: FxHashMap<DynamicCallKey, SignatureId>,
    /// Backing class per (language, is_construct).
    pub dynamic_classes: FxHashMap<(Language, bool), TypeId>,
    /// Lambda-object class name to its constructor.
    pub lambda_object_cache: FxHashMap<String, SignatureId>,
    /// Number of bridge methods synthesized so far.
    pub dynamic_syntheses: u32,

    // --- Program pass ---
    pub checked_classes: FxHashSet<TypeId>,
    pub edits: Vec<AstEdit>,
}

impl<'a> CheckerContext<'a> {
    pub fn new(arena: &'a NodeArena, binder: &'a mut BinderState, file_name: String, options: CheckerOptions) -> Self {
        Self {
            arena,
            binder,
            file_name,
            options,
            types: TypeArena::new(),
            diagnostics: Vec::new(),
            emitted_diagnostics: FxHashSet::default(),
            decl_types: FxHashMap::default(),
            instantiations: FxHashMap::default(),
            resolution_stacks: Default::default(),
            apparent_types: FxHashMap::default(),
            variable_types: FxHashMap::default(),
            signature_of_decl: FxHashMap::default(),
            member_results: FxHashMap::default(),
            dynamic_properties: FxHashMap::default(),
            node_types: FxHashMap::default(),
            obligations: FxHashMap::default(),
            accessor_marks: IndexMap::new(),
            super_owner_fields: FxHashMap::default(),
            implicit_super_calls: Vec::new(),
            async_impls: FxHashMap::default(),
            dynamic_call_cache: FxHashMap::default(),
            dynamic_classes: FxHashMap::default(),
            lambda_object_cache: FxHashMap::default(),
            dynamic_syntheses: 0,
            checked_classes: FxHashSet::default(),
            edits: Vec::new(),
        }
    }

    #[must_use]
    pub fn resolution_stack(&self, facet: Facet) -> &[TypeId] {
        &self.resolution_stacks[facet.index()]
    }

    #[must_use]
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }
}
