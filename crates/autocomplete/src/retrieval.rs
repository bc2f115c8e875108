use crate::context::CompletionContext;
use crate::error::Result;
use crate::filtering::{select_snippets, CollectedSnippets};
use crate::ide::{Ide, ImportIndex};
use crate::imports::ImportCollector;
use crate::log_writer::LogWriter;
use crate::options::CompletionOptions;
use crate::outline::OutlineSynthesizer;
use crate::root_path::RootPathCollector;
use crate::snippet::{CompletionInput, Snippet};
use crate::symbols::SymbolCollector;
use crate::tokens::TokenCounter;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Run one collector, giving up on it after `limit`.
///
/// Lookups the collector started keep running in the background and still
/// fill the caches for the next request.
async fn bounded<F>(name: &str, collector: F, limit: Duration, log: LogWriter) -> Vec<Snippet>
where
    F: Future<Output = Vec<Snippet>>,
{
    match tokio::time::timeout(limit, collector).await {
        Ok(snippets) => snippets,
        Err(_) => {
            log.log(format_args!("{name} timed out after {}ms", limit.as_millis()));
            Vec::new()
        }
    }
}

/// Long-lived entry point for completion context retrieval.
///
/// Owns the collectors and their caches; share one instance across requests
/// so consecutive keystrokes reuse earlier lookups.
///
/// ```text
///  CompletionContext
///        |
///        +--> root path ------+
///        +--> symbols --------+--> select_snippets --> Vec<Snippet>
///        +--> imports --------+
///        +--> recent edits ---+
///        +--> recent visits --+
/// ```
pub struct ContextRetrievalService {
    ide: Arc<dyn Ide>,
    root_path: Arc<RootPathCollector>,
    symbols: SymbolCollector,
    imports: ImportCollector,
}

impl ContextRetrievalService {
    pub fn new(ide: Arc<dyn Ide>, import_index: Arc<dyn ImportIndex>) -> Self {
        let outlines = Arc::new(OutlineSynthesizer::new());
        let root_path = Arc::new(RootPathCollector::new(Arc::clone(&ide), Arc::clone(&outlines)));
        let symbols = SymbolCollector::new(Arc::clone(&ide), Arc::clone(&root_path));
        let imports = ImportCollector::new(import_index, outlines);

        Self {
            ide,
            root_path,
            symbols,
            imports,
        }
    }

    /// Build the request context, reading the file through this service's IDE
    pub async fn context_for(
        &self,
        input: CompletionInput,
        options: CompletionOptions,
        token_counter: Arc<dyn TokenCounter>,
    ) -> Result<CompletionContext> {
        CompletionContext::create(input, options, self.ide.as_ref(), token_counter).await
    }

    pub async fn root_path_snippets(&self, ctx: &CompletionContext) -> Vec<Snippet> {
        self.root_path.collect(ctx).await
    }

    pub async fn surrounding_symbol_snippets(&self, ctx: &CompletionContext) -> Vec<Snippet> {
        self.symbols.collect(ctx).await
    }

    pub async fn import_snippets(&self, ctx: &CompletionContext) -> Vec<Snippet> {
        self.imports.collect(ctx).await
    }

    /// Snippets worth adding to the prompt for this request, best first
    pub async fn snippets_for_request(&self, ctx: &CompletionContext) -> Vec<Snippet> {
        let options = ctx.options();
        let language = ctx.language_options();
        let limit = options.collector_timeout();
        let log = LogWriter::new("SnippetTimeouts", options.log_snippet_timeouts);

        let (root_path, surrounding_symbols, imports) = tokio::join!(
            async {
                if !language.enable_root_path_snippets {
                    return Vec::new();
                }
                bounded("root path", self.root_path_snippets(ctx), limit, log).await
            },
            async {
                if !language.enable_surrounding_symbols_snippets {
                    return Vec::new();
                }
                bounded("surrounding symbols", self.surrounding_symbol_snippets(ctx), limit, log).await
            },
            async {
                if !language.enable_import_snippets {
                    return Vec::new();
                }
                bounded("imports", self.import_snippets(ctx), limit, log).await
            },
        );

        let recently_edited = if options.use_recently_edited && language.enable_recently_edited_snippets {
            ctx.input()
                .recently_edited_ranges
                .iter()
                .map(Snippet::from)
                .collect()
        } else {
            Vec::new()
        };

        let recently_visited = if options.use_recently_visited && language.enable_recently_visited_snippets {
            ctx.input().recently_visited_ranges.clone()
        } else {
            Vec::new()
        };

        let collected = CollectedSnippets {
            root_path,
            surrounding_symbols,
            imports,
            recently_edited,
            recently_visited,
        };
        log::debug!(
            "Collected {} snippets for {} at {}",
            collected.len(),
            ctx.filepath(),
            ctx.pos()
        );

        select_snippets(ctx, collected)
    }
}
