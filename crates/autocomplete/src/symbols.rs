use crate::context::CompletionContext;
use crate::ide::Ide;
use crate::log_writer::LogWriter;
use crate::root_path::RootPathCollector;
use crate::snippet::Snippet;
use context_cache::AsyncDedupCache;
use context_syntax::{Position, RangeInFile};
use futures::future::join_all;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use std::time::Duration;

const DEFINITION_CACHE_SIZE: usize = 300;
const DEFINITION_CACHE_TTL: Duration = Duration::from_secs(10);

/// Lines scanned above the cursor line
const LINES_ABOVE: usize = 3;
/// Lines scanned below the cursor line
const LINES_BELOW: usize = 1;
/// Only the symbols closest to the end of the window are looked up
const MAX_SYMBOLS: usize = 10;

static SYMBOL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-zA-Z_$]+").expect("valid symbol regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LookupKind {
    TypeDefinition,
    Definition,
}

impl LookupKind {
    fn key_prefix(self) -> &'static str {
        match self {
            LookupKind::TypeDefinition => "type",
            LookupKind::Definition => "def",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Symbol {
    text: String,
    pos: Position,
}

/// Identifier-like words on `lines[first..=last]`, in reading order
fn symbols_in_window(lines: &[&str], cursor_line: usize) -> Vec<Symbol> {
    let Some(last_line) = lines.len().checked_sub(1) else {
        return Vec::new();
    };
    let first = cursor_line.saturating_sub(LINES_ABOVE);
    let last = (cursor_line + LINES_BELOW).min(last_line);

    let mut symbols = Vec::new();
    for (line_nr, line) in lines.iter().enumerate().take(last + 1).skip(first) {
        for m in SYMBOL_RE.find_iter(line) {
            symbols.push(Symbol {
                text: m.as_str().to_string(),
                pos: Position::new(line_nr, m.start()),
            });
        }
    }

    let keep_from = symbols.len().saturating_sub(MAX_SYMBOLS);
    symbols.split_off(keep_from)
}

/// Looks up type definitions and definitions of the words around the cursor.
///
/// Lexical only: any identifier-like word is a candidate, whatever the syntax
/// tree says. Lookups are shared across requests through a short-lived cache.
pub struct SymbolCollector {
    ide: Arc<dyn Ide>,
    root_path: Arc<RootPathCollector>,
    definitions: AsyncDedupCache<String, Vec<RangeInFile>>,
}

impl SymbolCollector {
    pub fn new(ide: Arc<dyn Ide>, root_path: Arc<RootPathCollector>) -> Self {
        Self {
            ide,
            root_path,
            definitions: AsyncDedupCache::new(DEFINITION_CACHE_SIZE, DEFINITION_CACHE_TTL),
        }
    }

    /// Snippets per symbol in window order, type definitions first
    pub async fn collect(&self, ctx: &CompletionContext) -> Vec<Snippet> {
        let log = LogWriter::new(
            "SurroundingSymbolSnippets",
            ctx.options().log_surrounding_symbols_snippets,
        );

        let symbols = symbols_in_window(&ctx.file_lines(), ctx.pos().line);
        let lookups = symbols.iter().flat_map(|symbol| {
            log.log(format_args!("found symbol {} at {}", symbol.text, symbol.pos));
            [
                self.lookup(ctx, symbol, LookupKind::TypeDefinition, log),
                self.lookup(ctx, symbol, LookupKind::Definition, log),
            ]
        });

        join_all(lookups).await.into_iter().flatten().collect()
    }

    async fn lookup(
        &self,
        ctx: &CompletionContext,
        symbol: &Symbol,
        kind: LookupKind,
        log: LogWriter,
    ) -> Vec<Snippet> {
        let key = format!(
            "{}:{}:{}:{}",
            kind.key_prefix(),
            symbol.pos.line,
            symbol.text,
            ctx.filepath()
        );
        let ide = Arc::clone(&self.ide);
        let filepath = ctx.filepath().to_string();
        let position = symbol.pos;

        let found = self
            .definitions
            .get(key, move || async move {
                let locations = match kind {
                    LookupKind::TypeDefinition => ide.goto_type_definition(&filepath, position).await?,
                    LookupKind::Definition => ide.goto_definition(&filepath, position).await?,
                };
                Ok::<_, anyhow::Error>(locations)
            })
            .await;

        let locations = match found {
            Ok(locations) => locations,
            Err(e) => {
                log.log(format_args!(
                    "{} lookup for {} at {} failed: {e}",
                    kind.key_prefix(),
                    symbol.text,
                    symbol.pos
                ));
                return Vec::new();
            }
        };

        if locations.is_empty() {
            log.log(format_args!(
                "no {} found for {} at {}",
                kind.key_prefix(),
                symbol.text,
                symbol.pos
            ));
            return Vec::new();
        }

        self.root_path
            .snippets_for_ranges(&locations, ctx.options(), log)
            .await
    }
}
