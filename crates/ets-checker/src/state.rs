//! Checker state: the entry point wrapping [`CheckerContext`].
//!
//! Feature modules add behaviour through `impl<'a> CheckerState<'a>` blocks:
//!
//! - `type_graph` - super types, interfaces, type parameters
//! - `member_resolution` - member access and extensions
//! - `overriding` / `accessors` - abstract obligations and accessor lowering
//! - `constructor_checker` / `const_fields` - constructor invariants
//! - `dynamic_interop` - bridge synthesis for foreign-language calls
//! - `class_checker` - the program pass tying them together

use ets_ast::{AstEdit, NodeArena};
use ets_binder::BinderState;
use ets_common::Diagnostic;

use crate::context::CheckerContext;
use crate::options::CheckerOptions;

pub struct CheckerState<'a> {
    pub ctx: CheckerContext<'a>,
}

impl<'a> CheckerState<'a> {
    pub fn new(arena: &'a NodeArena, binder: &'a mut BinderState, file_name: &str, options: CheckerOptions) -> Self {
        Self {
            ctx: CheckerContext::new(arena, binder, file_name.to_string(), options),
        }
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.ctx.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.ctx.emitted_diagnostics.clear();
        std::mem::take(&mut self.ctx.diagnostics)
    }

    /// AST edits accumulated so far, for `ets_ast::apply_edits`.
    pub fn take_edits(&mut self) -> Vec<AstEdit> {
        std::mem::take(&mut self.ctx.edits)
    }
}
