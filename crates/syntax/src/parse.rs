use crate::error::{Result, SyntaxError};
use crate::language::Language;
use std::sync::Arc;
use tree_sitter::{Node, Parser, Tree};

/// A parsed file: the tree-sitter tree plus the exact text it was built from.
///
/// Trees are never updated in place; a new content version gets a new tree.
pub struct SyntaxTree {
    tree: Tree,
    source: Arc<str>,
    language: Language,
}

impl SyntaxTree {
    pub fn root_node(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Source text spanned by `node`, empty if the node belongs to another text
    pub fn node_text(&self, node: &Node<'_>) -> &str {
        self.source
            .get(node.start_byte()..node.end_byte())
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("language", &self.language)
            .field("root", &self.tree.root_node().kind())
            .field("bytes", &self.source.len())
            .finish()
    }
}

/// Parse `text` with the grammar selected from `path`'s extension.
pub fn parse(path: &str, text: impl Into<Arc<str>>) -> Result<SyntaxTree> {
    parse_with_language(Language::from_path(path), text)
}

/// Parse `text` with an explicit language
pub fn parse_with_language(language: Language, text: impl Into<Arc<str>>) -> Result<SyntaxTree> {
    if !language.supports_ast() {
        return Err(SyntaxError::unsupported_language(language.as_str()));
    }

    let ts_language = language.tree_sitter_language()?;
    let mut parser = Parser::new();
    parser
        .set_language(&ts_language)
        .map_err(|e| SyntaxError::tree_sitter(format!("Failed to set language: {e}")))?;

    let source: Arc<str> = text.into();
    let tree = parser
        .parse(source.as_bytes(), None)
        .ok_or_else(|| SyntaxError::parse("Failed to parse source code"))?;

    Ok(SyntaxTree {
        tree,
        source,
        language,
    })
}

/// Indented S-expression-like dump of a subtree, for debug logging
pub fn tree_to_string(node: &Node<'_>) -> String {
    let mut out = String::new();
    let mut stack = vec![(*node, 0usize)];
    while let Some((current, depth)) = stack.pop() {
        out.push_str(&"  ".repeat(depth));
        out.push_str(current.kind());
        out.push_str(&format!(
            " [{}:{} - {}:{}]\n",
            current.start_position().row,
            current.start_position().column,
            current.end_position().row,
            current.end_position().column
        ));
        let mut cursor = current.walk();
        let children: Vec<_> = current.named_children(&mut cursor).collect();
        for child in children.into_iter().rev() {
            stack.push((child, depth + 1));
        }
    }
    out
}
