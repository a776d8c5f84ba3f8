//! Checker configuration.
//!
//! Options are read from the `compilerOptions` object of an `arktsconfig`
//! file. Every key is optional; missing keys keep their defaults.

use std::path::Path;

use anyhow::{Context, Result};
use ets_common::Language;
use ets_common::limits::MAX_CONSTRUCTOR_CHAIN_DEPTH;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckerOptions {
    /// Report every abstract method a concrete class fails to implement.
    /// When `false` only the first one per class is reported.
    pub report_all_missing_overrides: bool,
    /// Warn when an ordinary member hides an extension function or accessor.
    pub warn_extension_shadowing: bool,
    /// Foreign languages that may be imported dynamically.
    pub dynamic_languages: Vec<Language>,
    /// Longest `this(...)` delegation chain followed before giving up.
    pub max_constructor_chain_depth: usize,
}

impl Default for CheckerOptions {
    fn default() -> Self {
        Self {
            report_all_missing_overrides: true,
            warn_extension_shadowing: true,
            dynamic_languages: vec![Language::Js],
            max_constructor_chain_depth: MAX_CONSTRUCTOR_CHAIN_DEPTH,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    #[serde(default)]
    compiler_options: Option<CheckerOptions>,
}

impl CheckerOptions {
    /// Parse the options out of config file text.
    pub fn from_json_str(source: &str) -> Result<Self> {
        let config: ConfigFile = serde_json::from_str(source).context("failed to parse arktsconfig JSON")?;
        Ok(config.compiler_options.unwrap_or_default())
    }

    pub fn from_config_file(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read arktsconfig: {}", path.display()))?;
        Self::from_json_str(&source).with_context(|| format!("failed to load arktsconfig: {}", path.display()))
    }

    #[must_use]
    pub fn allows_dynamic_language(&self, language: Language) -> bool {
        self.dynamic_languages.contains(&language)
    }
}

#[cfg(test)]
#[path = "../tests/options_tests.rs"]
mod tests;
