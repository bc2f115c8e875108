use crate::log_writer::LogWriter;
use crate::options::LanguageOptions;
use crate::snippet::Snippet;
use context_cache::{AsyncDedupCache, TtlCache};
use context_syntax::tree_sitter::Node;
use context_syntax::{node_around_range, parse, range_in_string, tree_to_string, Range, SyntaxTree};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;

const TREE_CACHE_SIZE: usize = 50;
const TREE_CACHE_TTL: Duration = Duration::from_secs(5);
const OUTLINE_CACHE_SIZE: usize = 50;
const OUTLINE_CACHE_TTL: Duration = Duration::from_secs(5);

/// Hex SHA-256 of a file snapshot
pub fn content_digest(contents: &str) -> String {
    format!("{:x}", Sha256::digest(contents.as_bytes()))
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TreeKey {
    filepath: String,
    digest: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct OutlineKey {
    filepath: String,
    start_byte: usize,
    end_byte: usize,
    digest: String,
}

/// Turns definition locations into snippets.
///
/// The definition node is found on a tree for the exact file snapshot. Kinds
/// configured as outline roots are collapsed: every descendant with a
/// replacement (usually a body) is swapped for its placeholder text, leaving
/// the signature-level structure. Other nodes are returned verbatim.
pub struct OutlineSynthesizer {
    trees: AsyncDedupCache<TreeKey, Arc<SyntaxTree>>,
    outlines: TtlCache<OutlineKey, String>,
}

impl Default for OutlineSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl OutlineSynthesizer {
    pub fn new() -> Self {
        Self {
            trees: AsyncDedupCache::new(TREE_CACHE_SIZE, TREE_CACHE_TTL),
            outlines: TtlCache::new(OUTLINE_CACHE_SIZE, OUTLINE_CACHE_TTL),
        }
    }

    /// Snippet for the definition at `range` in `contents`.
    ///
    /// Never fails: when the file cannot be parsed the snippet is the literal
    /// text covered by `range`.
    pub async fn create_outline(
        &self,
        filepath: &str,
        contents: &str,
        range: Range,
        options: &LanguageOptions,
        log: LogWriter,
    ) -> Snippet {
        let digest = content_digest(contents);
        let Some(tree) = self.tree_for(filepath, contents, &digest).await else {
            log::debug!("Unable to parse {filepath} ({range}); using literal text");
            return Snippet::code(filepath, range, range_in_string(contents, &range));
        };

        let node = node_around_range(&tree, &range);
        if log.is_enabled() {
            log.log(format_args!(
                "{filepath} {}\n{}",
                Range::of_node(&node),
                tree_to_string(&node)
            ));
        }

        let content = if options.is_outline_root(node.kind()) {
            let key = OutlineKey {
                filepath: filepath.to_string(),
                start_byte: node.start_byte(),
                end_byte: node.end_byte(),
                digest,
            };
            self.outlines.get_or_insert_with(key, || {
                log.log(format_args!("creating type outline for {}", node.kind()));
                collapse(&tree, node, options, log)
            })
        } else {
            log.log(format_args!("using text of node {}", node.kind()));
            tree.node_text(&node).to_string()
        };

        Snippet::code(filepath, Range::of_node(&node), content)
    }

    async fn tree_for(&self, filepath: &str, contents: &str, digest: &str) -> Option<Arc<SyntaxTree>> {
        let key = TreeKey {
            filepath: filepath.to_string(),
            digest: digest.to_string(),
        };
        let path = filepath.to_string();
        let text: Arc<str> = Arc::from(contents);
        self.trees
            .get(key, move || async move {
                let tree = parse(&path, text)?;
                Ok::<_, anyhow::Error>(Arc::new(tree))
            })
            .await
            .ok()
    }
}

/// Text of `root` with every replaced descendant swapped for its placeholder
fn collapse(tree: &SyntaxTree, root: Node<'_>, options: &LanguageOptions, log: LogWriter) -> String {
    let source = tree.source();
    let mut content = String::new();
    let mut index = root.start_byte();

    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if let Some(replacement) = options.replacement_for(node.kind()) {
            log.log(format_args!(
                "replacing {} {} by: {replacement}",
                node.kind(),
                Range::of_node(&node)
            ));
            if node.start_byte() > index {
                content.push_str(source.get(index..node.start_byte()).unwrap_or_default());
            }
            content.push_str(replacement);
            index = node.end_byte();
            continue;
        }

        let mut cursor = node.walk();
        let children: Vec<_> = node.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }

    if index < root.end_byte() {
        content.push_str(source.get(index..root.end_byte()).unwrap_or_default());
    }
    content
}
