//! Checker diagnostics.
//!
//! A diagnostic is a coded, positioned message. Its text comes from the
//! template registered for the code in [`DIAGNOSTIC_MESSAGES`], with `{0}`,
//! `{1}`, ... replaced by the arguments at the report site.

use serde::Serialize;

use crate::Span;

mod data;
pub use data::{DIAGNOSTIC_MESSAGES, diagnostic_codes};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticCategory {
    Warning,
    Error,
    Suggestion,
    Message,
}

/// Secondary location attached to a diagnostic, such as the declaration a
/// conflict was found against.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedSpan {
    pub start: u32,
    pub length: u32,
    pub message_text: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub file: String,
    pub start: u32,
    pub length: u32,
    pub code: u32,
    pub category: DiagnosticCategory,
    pub message_text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<RelatedSpan>,
}

/// Byte length recorded for `span`; checker-made nodes have none.
fn span_length(span: Span) -> u32 {
    if span.is_synthetic() { 0 } else { span.len() }
}

impl Diagnostic {
    #[must_use]
    pub fn new(category: DiagnosticCategory, code: u32, file: impl Into<String>, span: Span, message_text: String) -> Self {
        Self {
            file: file.into(),
            start: span.start,
            length: span_length(span),
            code,
            category,
            message_text,
            related: Vec::new(),
        }
    }

    /// Attach a secondary location.
    #[must_use]
    pub fn with_related(mut self, span: Span, message_text: impl Into<String>) -> Self {
        self.related.push(RelatedSpan {
            start: span.start,
            length: span_length(span),
            message_text: message_text.into(),
        });
        self
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

/// Registered template of one diagnostic code.
#[derive(Clone, Copy, Debug)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    pub message: &'static str,
}

#[must_use]
pub fn lookup(code: u32) -> Option<&'static DiagnosticMessage> {
    DIAGNOSTIC_MESSAGES.iter().find(|m| m.code == code)
}

/// Substitute `{n}` placeholders in `template` with `args[n]`. Placeholders
/// without a matching argument are kept verbatim.
#[must_use]
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open + 1..];
        let argument = tail
            .find('}')
            .and_then(|close| tail[..close].parse::<usize>().ok().map(|n| (n, close)))
            .and_then(|(n, close)| args.get(n).map(|arg| (arg, close)));
        match argument {
            Some((arg, close)) => {
                out.push_str(arg);
                rest = &tail[close + 1..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
#[path = "../../tests/diagnostics_tests.rs"]
mod tests;
