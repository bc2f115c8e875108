use crate::context::CompletionContext;
use crate::ide::Ide;
use crate::log_writer::LogWriter;
use crate::options::CompletionOptions;
use crate::outline::OutlineSynthesizer;
use crate::queries::{capture_end_positions, rule_for};
use crate::snippet::Snippet;
use context_cache::AsyncDedupCache;
use context_syntax::tree_sitter::Node;
use context_syntax::{path_to_cursor, Language, Range, RangeInFile, SyntaxTree};
use futures::future::join_all;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;

const NODE_CACHE_SIZE: usize = 100;
const NODE_CACHE_TTL: Duration = Duration::from_secs(30);
const RANGE_CACHE_SIZE: usize = 50;
const RANGE_CACHE_TTL: Duration = Duration::from_secs(10);

/// Key of an ancestor: hash of its parent's key, its kind and its start offset.
///
/// The chain is seeded with the file path, so equal keys mean the same
/// ancestry in the same file.
fn key_from_node(parent_key: &str, node: &Node<'_>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(parent_key.as_bytes());
    hasher.update(node.kind().as_bytes());
    hasher.update(node.start_byte().to_string().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Collects definitions referenced by the syntax nodes enclosing the cursor.
///
/// Every named ancestor with an extraction rule contributes the outlines of
/// the definitions its captured identifiers resolve to. Results are cached
/// per ancestor, so typing inside a function body does not repeat the lookups
/// for its signature.
#[derive(Clone)]
pub struct RootPathCollector {
    ide: Arc<dyn Ide>,
    outlines: Arc<OutlineSynthesizer>,
    node_snippets: AsyncDedupCache<String, Vec<Snippet>>,
    range_snippets: AsyncDedupCache<String, Vec<Snippet>>,
}

impl RootPathCollector {
    pub fn new(ide: Arc<dyn Ide>, outlines: Arc<OutlineSynthesizer>) -> Self {
        Self {
            ide,
            outlines,
            node_snippets: AsyncDedupCache::new(NODE_CACHE_SIZE, NODE_CACHE_TTL),
            range_snippets: AsyncDedupCache::new(RANGE_CACHE_SIZE, RANGE_CACHE_TTL),
        }
    }

    /// Snippets for every ancestor of the cursor, root first
    pub async fn collect(&self, ctx: &CompletionContext) -> Vec<Snippet> {
        let Some(tree) = ctx.tree() else {
            return Vec::new();
        };
        let log = LogWriter::new("RootPathSnippets", ctx.options().log_root_path_snippets);

        let ancestors: Vec<Node<'_>> = path_to_cursor(tree, ctx.cursor_index())
            .into_iter()
            .filter(|node| node.is_named())
            .collect();
        if log.is_enabled() {
            let kinds: Vec<_> = ancestors.iter().map(|node| node.kind()).collect();
            log.log(format_args!("processing path {kinds:?}"));
        }

        let mut parent_key = ctx.filepath().to_string();
        let mut lookups = Vec::with_capacity(ancestors.len());
        for node in ancestors {
            let key = key_from_node(&parent_key, &node);
            lookups.push(self.snippets_for_node(key.clone(), tree, node, ctx, log));
            parent_key = key;
        }

        join_all(lookups).await.into_iter().flatten().collect()
    }

    async fn snippets_for_node(
        &self,
        key: String,
        tree: &SyntaxTree,
        node: Node<'_>,
        ctx: &CompletionContext,
        log: LogWriter,
    ) -> Vec<Snippet> {
        let kind = node.kind();
        let result = self
            .node_snippets
            .get_with(
                key,
                || {
                    log.log(format_args!("getting snippets for {kind}"));
                    let positions = match rule_for(tree.language(), kind) {
                        Some(rule) => capture_end_positions(tree, node, rule),
                        None => {
                            log.log(format_args!(
                                "No query for node type {kind} in language {}",
                                tree.language().as_str()
                            ));
                            Vec::new()
                        }
                    };

                    let this = self.clone();
                    let filepath: Arc<str> = Arc::from(ctx.filepath());
                    let options = Arc::new(ctx.options().clone());
                    async move {
                        let lookups = positions.into_iter().map(|position| {
                            let this = this.clone();
                            let filepath = Arc::clone(&filepath);
                            let options = Arc::clone(&options);
                            async move {
                                match this.ide.goto_definition(&filepath, position).await {
                                    Ok(definitions) => {
                                        if log.is_enabled() {
                                            let found: Vec<_> =
                                                definitions.iter().map(ToString::to_string).collect();
                                            log.log(format_args!("Found definitions: {}", found.join(", ")));
                                        }
                                        this.snippets_for_ranges(&definitions, &options, log).await
                                    }
                                    Err(e) => {
                                        log.log(format_args!("definition lookup at {position} failed: {e}"));
                                        Vec::new()
                                    }
                                }
                            }
                        });
                        let snippets: Vec<Snippet> =
                            join_all(lookups).await.into_iter().flatten().collect();
                        Ok::<_, anyhow::Error>(snippets)
                    }
                },
                || log.log(format_args!("cache hit for {kind}")),
            )
            .await;

        result.unwrap_or_else(|e| {
            log::debug!("Root path snippets for {kind} failed: {e}");
            Vec::new()
        })
    }

    /// Outline snippets for definition locations, in the order given.
    ///
    /// Each location is read and outlined once per file and start line while
    /// its cache entry lives. Ignored paths and files of unknown language
    /// contribute nothing.
    pub async fn snippets_for_ranges(
        &self,
        definitions: &[RangeInFile],
        options: &CompletionOptions,
        log: LogWriter,
    ) -> Vec<Snippet> {
        let outline_log = LogWriter::new("createOutline", options.log_outline_creation);
        let lookups = definitions.iter().map(|definition| {
            let key = format!("{}:{}", definition.filepath, definition.range.start.line);
            let filepath = definition.filepath.clone();
            let range: Range = definition.range;
            let language = Language::from_path(&filepath);
            let language_options = options.language_options_for(language);
            let ide = Arc::clone(&self.ide);
            let outlines = Arc::clone(&self.outlines);

            async move {
                let result = self
                    .range_snippets
                    .get(key, move || async move {
                        if language == Language::Unknown {
                            return Ok(Vec::new());
                        }
                        if language.is_ignored_path(&filepath) {
                            log.log(format_args!("Ignoring path: {filepath}"));
                            return Ok(Vec::new());
                        }

                        let contents = ide.read_file(&filepath).await?;
                        let snippet = outlines
                            .create_outline(&filepath, &contents, range, &language_options, outline_log)
                            .await;
                        Ok::<_, anyhow::Error>(vec![snippet])
                    })
                    .await;

                result.unwrap_or_else(|e| {
                    log.log(format_args!("no snippet for definition: {e}"));
                    Vec::new()
                })
            }
        });

        join_all(lookups).await.into_iter().flatten().collect()
    }
}
