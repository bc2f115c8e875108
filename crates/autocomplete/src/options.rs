use crate::error::{ContextError, Result};
use context_syntax::Language;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Retrieval settings for a single language
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageOptions {
    /// Collect definitions referenced by the syntax ancestors of the cursor
    pub enable_root_path_snippets: bool,

    /// Collect definitions of imported symbols used near the cursor
    pub enable_import_snippets: bool,

    /// Collect definitions of identifiers on the lines around the cursor
    pub enable_surrounding_symbols_snippets: bool,

    /// Pass through ranges the user recently edited
    pub enable_recently_edited_snippets: bool,

    /// Pass through ranges the user recently looked at
    pub enable_recently_visited_snippets: bool,

    /// Node kind -> text emitted in place of that node in a collapsed outline
    pub outline_node_replacements: HashMap<String, String>,

    /// Node kinds whose definitions are collapsed into outlines
    pub outline_type_root_nodes: Vec<String>,
}

impl Default for LanguageOptions {
    fn default() -> Self {
        Self {
            enable_root_path_snippets: true,
            enable_import_snippets: true,
            enable_surrounding_symbols_snippets: true,
            enable_recently_edited_snippets: true,
            enable_recently_visited_snippets: true,
            outline_node_replacements: HashMap::from([(
                "statement_block".to_string(),
                "{...}".to_string(),
            )]),
            outline_type_root_nodes: Vec::new(),
        }
    }
}

impl LanguageOptions {
    /// Fill in the language's built-in outline settings without overriding
    /// anything configured explicitly
    pub fn with_profile(mut self, language: Language) -> Self {
        let profile = language.profile();
        for (kind, replacement) in profile.outline_replacements {
            self.outline_node_replacements
                .entry((*kind).to_string())
                .or_insert_with(|| (*replacement).to_string());
        }
        for kind in profile.outline_root_kinds {
            if !self.outline_type_root_nodes.iter().any(|k| k == kind) {
                self.outline_type_root_nodes.push((*kind).to_string());
            }
        }
        self
    }

    pub fn replacement_for(&self, kind: &str) -> Option<&str> {
        self.outline_node_replacements.get(kind).map(String::as_str)
    }

    pub fn is_outline_root(&self, kind: &str) -> bool {
        self.outline_type_root_nodes.iter().any(|k| k == kind)
    }
}

/// Configuration for completion context retrieval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionOptions {
    /// Token budget shared by the caret window and the selected snippets
    pub max_prompt_tokens: usize,

    /// Share of the budget reserved for the text before the cursor
    pub prefix_percentage: f64,

    /// Upper bound on the share of the budget spent on text after the cursor
    pub max_suffix_percentage: f64,

    /// Collect snippets from the import table
    pub use_imports: bool,

    /// Use recently visited ranges supplied with the request
    pub use_recently_visited: bool,

    /// Use recently edited ranges supplied with the request
    pub use_recently_edited: bool,

    /// Time each collector gets before its results are abandoned
    pub collector_timeout_ms: u64,

    pub log_root_path_snippets: bool,
    pub log_import_snippets: bool,
    pub log_surrounding_symbols_snippets: bool,
    pub log_outline_creation: bool,
    pub log_snippet_limiting: bool,
    pub log_snippet_timeouts: bool,

    /// Options for languages without an entry in `language_options`
    pub default_language_options: LanguageOptions,

    /// Per-language options keyed by language id (`"rust"`, `"typescript"`, ...)
    pub language_options: HashMap<String, LanguageOptions>,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            max_prompt_tokens: 1024,
            prefix_percentage: 0.3,
            max_suffix_percentage: 0.2,
            use_imports: true,
            use_recently_visited: true,
            use_recently_edited: true,
            collector_timeout_ms: 300,
            log_root_path_snippets: false,
            log_import_snippets: false,
            log_surrounding_symbols_snippets: false,
            log_outline_creation: false,
            log_snippet_limiting: false,
            log_snippet_timeouts: false,
            default_language_options: LanguageOptions::default(),
            language_options: HashMap::new(),
        }
    }
}

impl CompletionOptions {
    /// Parse options from TOML; missing keys keep their defaults
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let options: Self = toml::from_str(source)?;
        options.validate()?;
        Ok(options)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Turn on every verbose logging channel
    pub fn with_all_logs(mut self) -> Self {
        self.log_root_path_snippets = true;
        self.log_import_snippets = true;
        self.log_surrounding_symbols_snippets = true;
        self.log_outline_creation = true;
        self.log_snippet_limiting = true;
        self.log_snippet_timeouts = true;
        self
    }

    pub fn collector_timeout(&self) -> Duration {
        Duration::from_millis(self.collector_timeout_ms)
    }

    /// Effective options for `language`: the per-language entry if configured,
    /// otherwise the defaults, with built-in profile settings merged underneath
    pub fn language_options_for(&self, language: Language) -> LanguageOptions {
        self.language_options
            .get(language.as_str())
            .or_else(|| self.language_options.get(language.base().as_str()))
            .unwrap_or(&self.default_language_options)
            .clone()
            .with_profile(language)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_prompt_tokens == 0 {
            return Err(ContextError::InvalidOptions(
                "max_prompt_tokens must be > 0".to_string(),
            ));
        }

        for (name, value) in [
            ("prefix_percentage", self.prefix_percentage),
            ("max_suffix_percentage", self.max_suffix_percentage),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ContextError::InvalidOptions(format!(
                    "{name} ({value}) must be within 0.0..=1.0"
                )));
            }
        }

        if self.collector_timeout_ms == 0 {
            return Err(ContextError::InvalidOptions(
                "collector_timeout_ms must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}
