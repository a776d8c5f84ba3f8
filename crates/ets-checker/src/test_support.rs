//! Shared fixtures for unit tests: build, bind and check a program.

use ets_ast::{AstBuilder, NodeArena, NodeIndex};
use ets_binder::BinderState;
use ets_common::Diagnostic;

use crate::options::CheckerOptions;
use crate::state::CheckerState;

pub(crate) struct Fixture {
    pub arena: NodeArena,
    pub root: NodeIndex,
    pub binder: BinderState,
    pub options: CheckerOptions,
}

impl Fixture {
    pub fn new(builder: AstBuilder, statements: Vec<NodeIndex>) -> Self {
        Self::with_options(builder, statements, CheckerOptions::default())
    }

    pub fn with_options(builder: AstBuilder, statements: Vec<NodeIndex>, options: CheckerOptions) -> Self {
        crate::tracing_config::init_tracing();
        let (arena, root) = builder.finish(statements);
        let mut binder = BinderState::new();
        binder.bind_program(&arena, root);
        Self {
            arena,
            root,
            binder,
            options,
        }
    }

    pub fn checker(&mut self) -> CheckerState<'_> {
        CheckerState::new(&self.arena, &mut self.binder, "main.ets", self.options.clone())
    }

    /// Run the program pass and return its diagnostics.
    pub fn check(&mut self) -> Vec<Diagnostic> {
        let root = self.root;
        let mut checker = self.checker();
        checker.check_program(root);
        checker.take_diagnostics()
    }
}

pub(crate) fn codes(diagnostics: &[Diagnostic]) -> Vec<u32> {
    diagnostics.iter().map(|d| d.code).collect()
}

pub(crate) fn count_code(diagnostics: &[Diagnostic], code: u32) -> usize {
    diagnostics.iter().filter(|d| d.code == code).count()
}

pub(crate) fn messages(diagnostics: &[Diagnostic]) -> Vec<&str> {
    diagnostics.iter().map(|d| d.message_text.as_str()).collect()
}
