//! Diagnostic emission.
//!
//! Every diagnostic is positioned at a node's span and de-duplicated on
//! (start, code, message), so re-running a check never reports twice.

use ets_ast::NodeIndex;
use ets_common::diagnostics::{DiagnosticCategory, lookup};
use ets_common::{Diagnostic, Span, format_message};
use tracing::trace;

use crate::state::CheckerState;
use crate::types::TypeId;

impl<'a> CheckerState<'a> {
    /// Report diagnostic `code` at `node` with message arguments `args`.
    pub fn error_at_node(&mut self, node: NodeIndex, code: u32, args: &[&str]) {
        let span = self.ctx.arena.span(node);
        self.report_at_span(span, code, args);
    }

    /// Same as [`Self::error_at_node`] but forces the warning category.
    pub fn warning_at_node(&mut self, node: NodeIndex, code: u32, args: &[&str]) {
        let span = self.ctx.arena.span(node);
        self.emit(span, code, args, DiagnosticCategory::Warning);
    }

    pub fn report_at_span(&mut self, span: Span, code: u32, args: &[&str]) {
        let category = lookup(code).map_or(DiagnosticCategory::Error, |m| m.category);
        self.emit(span, code, args, category);
    }

    /// Report at `node` and point at `related`, typically the declaration the
    /// node conflicts with.
    pub fn error_with_related(&mut self, node: NodeIndex, code: u32, args: &[&str], related: NodeIndex, note: &str) {
        let span = self.ctx.arena.span(node);
        let category = lookup(code).map_or(DiagnosticCategory::Error, |m| m.category);
        if self.emit(span, code, args, category) {
            let related_span = self.ctx.arena.span(related);
            if let Some(last) = self.ctx.diagnostics.pop() {
                self.ctx.diagnostics.push(last.with_related(related_span, note));
            }
        }
    }

    /// Returns whether a new diagnostic was recorded.
    fn emit(&mut self, span: Span, code: u32, args: &[&str], category: DiagnosticCategory) -> bool {
        let Some(template) = lookup(code) else {
            debug_assert!(false, "diagnostic code {code} has no message template");
            return false;
        };
        let message = format_message(template.message, args);
        if !self.ctx.emitted_diagnostics.insert((span.start, code, message.clone())) {
            return false;
        }
        trace!(code, start = span.start, %message, "diagnostic");
        let diagnostic = Diagnostic::new(category, code, self.ctx.file_name.as_str(), span, message);
        self.ctx.diagnostics.push(diagnostic);
        true
    }

    /// Type name for messages.
    #[must_use]
    pub fn format_type(&self, ty: TypeId) -> String {
        self.ctx.types.display(ty)
    }
}
