//! Tree path resolution: locating the nodes around a cursor or a range.

use crate::parse::{parse, SyntaxTree};
use crate::ranges::position_to_index;
use crate::types::{Range, RangeInFileWithContents};
use tree_sitter::Node;

/// Root-first chain of nodes ending at the innermost node containing an offset
pub type AstPath<'tree> = Vec<Node<'tree>>;

/// Ancestor chain from the root down to the innermost node containing `offset`.
///
/// A child contains the offset when `start_byte <= offset <= end_byte`; the
/// first such child wins. The root is always included, even for offsets past
/// the end of the text.
pub fn path_to_cursor(tree: &SyntaxTree, offset: usize) -> AstPath<'_> {
    let mut path = vec![tree.root_node()];
    loop {
        let Some(current) = path.last().copied() else {
            break;
        };
        let mut cursor = current.walk();
        let next = current
            .children(&mut cursor)
            .find(|child| child.start_byte() <= offset && offset <= child.end_byte());
        match next {
            Some(child) => path.push(child),
            None => break,
        }
    }
    path
}

/// Smallest node whose position span fully contains `range`, or the root.
pub fn node_around_range<'tree>(tree: &'tree SyntaxTree, range: &Range) -> Node<'tree> {
    let mut node = tree.root_node();
    loop {
        let mut cursor = node.walk();
        let enclosing = node.children(&mut cursor).find(|child| {
            Range::of_node(child).start <= range.start && Range::of_node(child).end >= range.end
        });
        match enclosing {
            Some(child) => node = child,
            None => return node,
        }
    }
}

/// Node immediately preceding `offset` below `node`.
///
/// Returns the last child that ends strictly before the offset, descending
/// into a child that spans the offset when there is one.
pub fn node_before<'tree>(node: Node<'tree>, offset: usize) -> Node<'tree> {
    let mut parent = node;
    let mut candidate = node;
    'descend: loop {
        let mut cursor = parent.walk();
        let children: Vec<_> = parent.children(&mut cursor).collect();
        for child in children {
            if child.end_byte() < offset {
                candidate = child;
            } else if child.start_byte() <= offset && offset <= child.end_byte() {
                parent = child;
                candidate = child;
                continue 'descend;
            } else {
                break;
            }
        }
        return candidate;
    }
}

/// Smallest syntactic scope strictly enclosing a range of a file snapshot.
///
/// Returns `None` when the snapshot cannot be parsed.
pub fn scope_around_range(range: &RangeInFileWithContents) -> Option<RangeInFileWithContents> {
    let tree = match parse(&range.filepath, range.contents.as_str()) {
        Ok(tree) => tree,
        Err(e) => {
            log::debug!("No scope for {}: {e}", range.filepath);
            return None;
        }
    };

    let start = position_to_index(&range.contents, range.range.start);
    let end = position_to_index(&range.contents, range.range.end);

    let mut node = tree.root_node();
    loop {
        let mut cursor = node.walk();
        let enclosing = node
            .children(&mut cursor)
            .find(|child| child.start_byte() < start && child.end_byte() > end);
        match enclosing {
            Some(child) => node = child,
            None => break,
        }
    }

    Some(RangeInFileWithContents {
        filepath: range.filepath.clone(),
        range: Range::of_node(&node),
        contents: tree.node_text(&node).to_string(),
    })
}
