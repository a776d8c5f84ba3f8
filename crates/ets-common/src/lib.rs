//! Common types and utilities for the ETS semantic checker.
//!
//! This crate provides foundational types used across all ets crates:
//! - Source spans (`Span`)
//! - Diagnostics and the message table
//! - Checker limits and thresholds

// Span - Source location tracking (byte offsets)
pub mod span;
pub use span::Span;

// Diagnostics - message table, categories and formatting
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory, diagnostic_codes, format_message};

// Centralized limits and thresholds
pub mod limits;

/// Runtime language of a declaration.
///
/// `Ets` is the statically typed host language; everything else is a
/// dynamically typed foreign language reachable through interop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Ets,
    Js,
    Ts,
}

impl Language {
    /// Whether values of this language are typed dynamically.
    #[must_use]
    pub const fn is_dynamic(self) -> bool {
        !matches!(self, Language::Ets)
    }

    /// Upper-case tag used in synthesized names (`JSCall`, `TSNew`, ...).
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Language::Ets => "ETS",
            Language::Js => "JS",
            Language::Ts => "TS",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Language::Ets => f.write_str("ets"),
            Language::Js => f.write_str("js"),
            Language::Ts => f.write_str("ts"),
        }
    }
}
