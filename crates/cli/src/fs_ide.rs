//! Filesystem-backed editor services for running retrieval outside an editor.

use async_trait::async_trait;
use context_autocomplete::{ContextError, Ide};
use context_syntax::tree_sitter::Node;
use context_syntax::{parse, path_to_cursor, position_to_index, Position, Range, RangeInFile, SyntaxTree};
use std::io;

/// Declaration kinds that introduce a type
const TYPE_DECLARATION_KINDS: &[&str] = &[
    "struct_item",
    "enum_item",
    "union_item",
    "trait_item",
    "type_item",
    "class_declaration",
    "abstract_class_declaration",
    "interface_declaration",
    "type_alias_declaration",
    "enum_declaration",
    "class_definition",
];

/// Reads files from disk and resolves definitions inside the same file by
/// matching declaration names.
///
/// There is no language server behind it: a symbol resolves to every
/// declaration in its own file whose `name` field has the same text.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsIde;

impl FsIde {
    pub fn new() -> Self {
        Self
    }

    async fn declarations(
        &self,
        filepath: &str,
        position: Position,
        types_only: bool,
    ) -> context_autocomplete::Result<Vec<RangeInFile>> {
        let contents = self.read_file(filepath).await?;
        let tree = parse(filepath, contents.as_str())?;
        let index = position_to_index(&contents, position);

        let Some(symbol) = identifier_at(&tree, index) else {
            return Ok(Vec::new());
        };
        let name = tree.node_text(&symbol);
        log::debug!("Resolving {name} in {filepath}");

        let found = named_declarations(&tree, name)
            .into_iter()
            .filter(|decl| !types_only || TYPE_DECLARATION_KINDS.contains(&decl.kind()))
            .map(|decl| RangeInFile::new(filepath, Range::of_node(&decl)))
            .collect();
        Ok(found)
    }
}

fn is_identifier(node: &Node<'_>) -> bool {
    node.kind().ends_with("identifier")
}

/// Identifier ending at or spanning `index`
fn identifier_at(tree: &SyntaxTree, index: usize) -> Option<Node<'_>> {
    [index, index + 1]
        .into_iter()
        .filter_map(|offset| path_to_cursor(tree, offset).last().copied())
        .find(is_identifier)
}

/// Nodes whose `name` field reads `name`, in document order
fn named_declarations<'tree>(tree: &'tree SyntaxTree, name: &str) -> Vec<Node<'tree>> {
    let mut found = Vec::new();
    let mut stack = vec![tree.root_node()];
    while let Some(node) = stack.pop() {
        if let Some(name_node) = node.child_by_field_name("name") {
            if tree.node_text(&name_node) == name {
                found.push(node);
            }
        }
        let mut cursor = node.walk();
        let children: Vec<_> = node.named_children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
    found
}

#[async_trait]
impl Ide for FsIde {
    async fn read_file(&self, filepath: &str) -> context_autocomplete::Result<String> {
        match tokio::fs::read_to_string(filepath).await {
            Ok(contents) => Ok(contents),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(ContextError::not_found(filepath)),
            Err(e) => Err(e.into()),
        }
    }

    async fn goto_definition(
        &self,
        filepath: &str,
        position: Position,
    ) -> context_autocomplete::Result<Vec<RangeInFile>> {
        self.declarations(filepath, position, false).await
    }

    async fn goto_type_definition(
        &self,
        filepath: &str,
        position: Position,
    ) -> context_autocomplete::Result<Vec<RangeInFile>> {
        self.declarations(filepath, position, true).await
    }
}
