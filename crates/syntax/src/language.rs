use crate::error::{Result, SyntaxError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

/// Supported programming language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Rust,
    Python,
    JavaScript,
    TypeScript,
    /// TypeScript with JSX, parsed by its own grammar
    Tsx,
    Go,
    Java,
    C,
    Cpp,
    CSharp,
    Ruby,
    Swift,
    Kotlin,
    Unknown,
}

impl Language {
    /// All languages with a bundled grammar
    pub const PARSEABLE: [Language; 5] = [
        Language::Rust,
        Language::Python,
        Language::JavaScript,
        Language::TypeScript,
        Language::Tsx,
    ];

    /// Detect language from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "rs" => Language::Rust,
            "py" | "pyw" | "pyi" => Language::Python,
            "js" | "mjs" | "cjs" | "jsx" => Language::JavaScript,
            "ts" | "mts" | "cts" => Language::TypeScript,
            "tsx" => Language::Tsx,
            "go" => Language::Go,
            "java" => Language::Java,
            "c" | "h" => Language::C,
            "cpp" | "cc" | "cxx" | "hpp" | "hh" | "hxx" => Language::Cpp,
            "cs" => Language::CSharp,
            "rb" => Language::Ruby,
            "swift" => Language::Swift,
            "kt" | "kts" => Language::Kotlin,
            _ => Language::Unknown,
        }
    }

    /// Detect language from file path
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(Language::Unknown)
    }

    /// Get language name as string
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Rust => "rust",
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Tsx => "tsx",
            Language::Go => "go",
            Language::Java => "java",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::CSharp => "csharp",
            Language::Ruby => "ruby",
            Language::Swift => "swift",
            Language::Kotlin => "kotlin",
            Language::Unknown => "unknown",
        }
    }

    /// Language whose profile and extraction rules this one shares
    pub fn base(self) -> Language {
        match self {
            Language::Tsx => Language::TypeScript,
            other => other,
        }
    }

    /// Check if this language can be parsed into a syntax tree
    pub fn supports_ast(self) -> bool {
        Self::PARSEABLE.contains(&self)
    }

    /// Get Tree-sitter language instance
    pub fn tree_sitter_language(self) -> Result<tree_sitter::Language> {
        match self {
            Language::Rust => Ok(tree_sitter_rust::LANGUAGE.into()),
            Language::Python => Ok(tree_sitter_python::LANGUAGE.into()),
            Language::JavaScript => Ok(tree_sitter_javascript::LANGUAGE.into()),
            Language::TypeScript => Ok(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()),
            Language::Tsx => Ok(tree_sitter_typescript::LANGUAGE_TSX.into()),
            _ => Err(SyntaxError::unsupported_language(self.as_str())),
        }
    }

    /// Built-in outline and filtering settings for this language
    pub fn profile(self) -> &'static LanguageProfile {
        match self.base() {
            Language::Rust => &RUST_PROFILE,
            Language::Python => &PYTHON_PROFILE,
            Language::JavaScript => &JAVASCRIPT_PROFILE,
            Language::TypeScript => &TYPESCRIPT_PROFILE,
            _ => &GENERIC_PROFILE,
        }
    }

    /// Check whether definitions living at `path` must never be outlined
    pub fn is_ignored_path(self, path: &str) -> bool {
        self.profile()
            .ignore_path_patterns
            .iter()
            .any(|pattern| pattern.is_match(path))
    }
}

/// Per-language settings used when turning definitions into snippets.
pub struct LanguageProfile {
    /// Node kinds eligible for collapsed outlines
    pub outline_root_kinds: &'static [&'static str],
    /// Node kind -> placeholder emitted instead of the node's text
    pub outline_replacements: &'static [(&'static str, &'static str)],
    /// Words that never name an imported symbol
    pub top_level_keywords: &'static [&'static str],
    /// Paths whose definitions are never outlined (vendored, generated, minified)
    pub ignore_path_patterns: Vec<Regex>,
}

fn patterns(sources: &[&str]) -> Vec<Regex> {
    sources
        .iter()
        .filter_map(|source| match Regex::new(source) {
            Ok(re) => Some(re),
            Err(e) => {
                log::warn!("Skipping invalid ignore pattern {source}: {e}");
                None
            }
        })
        .collect()
}

static RUST_PROFILE: Lazy<LanguageProfile> = Lazy::new(|| LanguageProfile {
    outline_root_kinds: &[
        "function_item",
        "impl_item",
        "trait_item",
        "mod_item",
    ],
    outline_replacements: &[("block", "{ ... }")],
    top_level_keywords: &[
        "fn", "let", "mut", "pub", "use", "mod", "impl", "trait", "struct", "enum", "type",
        "const", "static", "where", "for", "in", "if", "else", "match", "return", "self",
        "Self", "crate", "super", "async", "await", "move", "ref", "dyn", "unsafe",
    ],
    ignore_path_patterns: patterns(&[r"[\\/]target[\\/]", r"[\\/]vendor[\\/]"]),
});

static PYTHON_PROFILE: Lazy<LanguageProfile> = Lazy::new(|| LanguageProfile {
    outline_root_kinds: &["class_definition", "function_definition"],
    outline_replacements: &[("block", "...")],
    top_level_keywords: &[
        "def", "class", "import", "from", "as", "return", "if", "elif", "else", "for", "while",
        "in", "not", "and", "or", "is", "None", "True", "False", "self", "lambda", "with",
        "try", "except", "finally", "pass", "yield", "async", "await",
    ],
    ignore_path_patterns: patterns(&[r"[\\/]typeshed[\\/]", r"[\\/]\.venv[\\/]"]),
});

static JAVASCRIPT_PROFILE: Lazy<LanguageProfile> = Lazy::new(|| LanguageProfile {
    outline_root_kinds: &[
        "class_declaration",
        "function_declaration",
        "method_definition",
    ],
    outline_replacements: &[("statement_block", "{...}")],
    top_level_keywords: &[
        "function", "class", "module", "export", "import", "const", "let", "var", "return",
        "if", "else", "for", "while", "new", "this", "async", "await", "default", "from",
    ],
    ignore_path_patterns: patterns(&[
        r"node_modules[\\/]@types[\\/]react[\\/]",
        r"\.min\.js$",
    ]),
});

static TYPESCRIPT_PROFILE: Lazy<LanguageProfile> = Lazy::new(|| LanguageProfile {
    outline_root_kinds: &[
        "class_declaration",
        "abstract_class_declaration",
        "interface_declaration",
        "function_declaration",
        "method_definition",
    ],
    outline_replacements: &[("statement_block", "{...}")],
    top_level_keywords: &[
        "function", "class", "module", "export", "import", "const", "let", "var", "return",
        "if", "else", "for", "while", "new", "this", "async", "await", "default", "from",
        "interface", "type", "enum", "implements", "extends", "readonly",
    ],
    ignore_path_patterns: patterns(&[
        r"node_modules[\\/]@types[\\/]react[\\/]",
        r"\.min\.js$",
    ]),
});

static GENERIC_PROFILE: Lazy<LanguageProfile> = Lazy::new(|| LanguageProfile {
    outline_root_kinds: &[],
    outline_replacements: &[],
    top_level_keywords: &[],
    ignore_path_patterns: Vec::new(),
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(Language::from_extension("rs"), Language::Rust);
        assert_eq!(Language::from_extension("RS"), Language::Rust);
        assert_eq!(Language::from_extension("py"), Language::Python);
        assert_eq!(Language::from_extension("js"), Language::JavaScript);
        assert_eq!(Language::from_extension("ts"), Language::TypeScript);
        assert_eq!(Language::from_extension("tsx"), Language::Tsx);
        assert_eq!(Language::from_extension("jsx"), Language::JavaScript);
        assert_eq!(Language::from_extension("unknown"), Language::Unknown);
    }

    #[test]
    fn test_from_path() {
        assert_eq!(Language::from_path("test.rs"), Language::Rust);
        assert_eq!(Language::from_path("src/main.py"), Language::Python);
        assert_eq!(Language::from_path("index.ts"), Language::TypeScript);
        assert_eq!(Language::from_path("no_extension"), Language::Unknown);
    }

    #[test]
    fn test_tsx_shares_typescript_profile() {
        assert_eq!(Language::Tsx.base(), Language::TypeScript);
        assert_eq!(Language::Rust.base(), Language::Rust);
        assert!(std::ptr::eq(
            Language::Tsx.profile(),
            Language::TypeScript.profile()
        ));
        assert!(Language::Tsx.is_ignored_path("node_modules/@types/react/index.d.ts"));
    }

    #[test]
    fn test_supports_ast() {
        assert!(Language::Rust.supports_ast());
        assert!(Language::TypeScript.supports_ast());
        assert!(!Language::Go.supports_ast());
        assert!(!Language::Unknown.supports_ast());
    }

    #[test]
    fn test_tree_sitter_language() {
        for language in Language::PARSEABLE {
            assert!(language.tree_sitter_language().is_ok());
        }
        assert!(Language::Go.tree_sitter_language().is_err());
    }

    #[test]
    fn test_ignored_paths() {
        assert!(Language::TypeScript
            .is_ignored_path("/repo/node_modules/@types/react/index.d.ts"));
        assert!(Language::JavaScript.is_ignored_path("dist/app.min.js"));
        assert!(!Language::TypeScript.is_ignored_path("src/app.ts"));
        assert!(Language::Rust.is_ignored_path("/repo/target/debug/build/out.rs"));
    }

    #[test]
    fn test_profiles_have_outline_settings() {
        for language in Language::PARSEABLE {
            let profile = language.profile();
            assert!(!profile.outline_root_kinds.is_empty());
            assert!(!profile.outline_replacements.is_empty());
            assert!(!profile.top_level_keywords.is_empty());
        }
        assert!(Language::Go.profile().outline_root_kinds.is_empty());
    }
}
