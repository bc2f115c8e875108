//! Extraction rules for root-path context.
//!
//! Each rule is a tree-sitter query registered for a `(language, node kind)`
//! pair. Its captures mark the identifiers whose definitions are worth
//! showing when the cursor sits somewhere inside a node of that kind.

use context_syntax::tree_sitter::{Node, Query, QueryCursor};
use context_syntax::{Language, Position, SyntaxError, SyntaxTree};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use streaming_iterator::StreamingIterator;

const RULE_SOURCES: &[(Language, &str, &str)] = &[
    (
        Language::Rust,
        "function_item",
        include_str!("../queries/rust/function_item.scm"),
    ),
    (
        Language::Rust,
        "impl_item",
        include_str!("../queries/rust/impl_item.scm"),
    ),
    (
        Language::Rust,
        "let_declaration",
        include_str!("../queries/rust/let_declaration.scm"),
    ),
    (
        Language::Rust,
        "call_expression",
        include_str!("../queries/rust/call_expression.scm"),
    ),
    (
        Language::Rust,
        "struct_expression",
        include_str!("../queries/rust/struct_expression.scm"),
    ),
    (
        Language::TypeScript,
        "function_declaration",
        include_str!("../queries/typescript/function_declaration.scm"),
    ),
    (
        Language::TypeScript,
        "method_definition",
        include_str!("../queries/typescript/method_definition.scm"),
    ),
    (
        Language::TypeScript,
        "arrow_function",
        include_str!("../queries/typescript/arrow_function.scm"),
    ),
    (
        Language::TypeScript,
        "class_declaration",
        include_str!("../queries/typescript/class_declaration.scm"),
    ),
    (
        Language::TypeScript,
        "call_expression",
        include_str!("../queries/typescript/call_expression.scm"),
    ),
    (
        Language::TypeScript,
        "variable_declarator",
        include_str!("../queries/typescript/variable_declarator.scm"),
    ),
    (
        Language::TypeScript,
        "new_expression",
        include_str!("../queries/typescript/new_expression.scm"),
    ),
    (
        Language::JavaScript,
        "class_declaration",
        include_str!("../queries/javascript/class_declaration.scm"),
    ),
    (
        Language::JavaScript,
        "call_expression",
        include_str!("../queries/javascript/call_expression.scm"),
    ),
    (
        Language::JavaScript,
        "new_expression",
        include_str!("../queries/javascript/new_expression.scm"),
    ),
    (
        Language::Python,
        "function_definition",
        include_str!("../queries/python/function_definition.scm"),
    ),
    (
        Language::Python,
        "class_definition",
        include_str!("../queries/python/class_definition.scm"),
    ),
    (
        Language::Python,
        "call",
        include_str!("../queries/python/call.scm"),
    ),
];

static RULES: Lazy<HashMap<Language, HashMap<&'static str, Query>>> = Lazy::new(|| {
    let mut rules: HashMap<Language, HashMap<&'static str, Query>> = HashMap::new();
    for &(base, kind, source) in RULE_SOURCES {
        // Dialects share their base's rules but need queries built for their own grammar.
        for language in Language::PARSEABLE.into_iter().filter(|l| l.base() == base) {
            match compile(language, kind, source) {
                Ok(query) => {
                    rules.entry(language).or_default().insert(kind, query);
                }
                Err(e) => log::warn!("Skipping extraction rule: {e}"),
            }
        }
    }
    rules
});

fn compile(language: Language, kind: &str, source: &str) -> Result<Query, SyntaxError> {
    let grammar = language.tree_sitter_language()?;
    Query::new(&grammar, source).map_err(|e| SyntaxError::InvalidQuery {
        language: language.as_str().to_string(),
        kind: kind.to_string(),
        message: e.to_string(),
    })
}

/// Extraction rule for nodes of `kind`, if one is registered
pub fn rule_for(language: Language, kind: &str) -> Option<&'static Query> {
    RULES.get(&language)?.get(kind)
}

/// End positions of every capture of `query` matched at `node` itself,
/// in document order without repeats
pub fn capture_end_positions(tree: &SyntaxTree, node: Node<'_>, query: &Query) -> Vec<Position> {
    let mut cursor = QueryCursor::new();
    cursor.set_max_start_depth(Some(0));

    let mut positions = Vec::new();
    let mut matches = cursor.matches(query, node, tree.source().as_bytes());
    while let Some(m) = matches.next() {
        for capture in m.captures {
            positions.push(Position::from(capture.node.end_position()));
        }
    }

    positions.sort();
    positions.dedup();
    positions
}
