use crate::context::CompletionContext;
use crate::ide::ImportIndex;
use crate::log_writer::LogWriter;
use crate::outline::OutlineSynthesizer;
use crate::snippet::Snippet;
use context_syntax::Language;
use futures::future::join_all;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;

const PREFIX_LINES: usize = 5;
const SUFFIX_LINES: usize = 3;

static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z_$][A-Za-z0-9_$]*").expect("valid identifier regex"));

/// Distinct identifiers of `text` in first-occurrence order
fn identifiers(text: &str) -> Vec<&str> {
    let mut seen = HashSet::new();
    IDENTIFIER_RE
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|ident| seen.insert(*ident))
        .collect()
}

/// Identifiers near the cursor that may name imports: the last lines of the
/// prefix and the first lines of the suffix, minus language keywords
fn symbols_around_cursor(ctx: &CompletionContext) -> Vec<String> {
    let prefix_lines: Vec<&str> = ctx.full_prefix().split('\n').collect();
    let suffix_lines: Vec<&str> = ctx.full_suffix().split('\n').collect();
    let text = format!(
        "{}{}",
        prefix_lines[prefix_lines.len().saturating_sub(PREFIX_LINES)..].join("\n"),
        suffix_lines[..suffix_lines.len().min(SUFFIX_LINES)].join("\n")
    );

    let keywords = ctx.language().profile().top_level_keywords;
    identifiers(&text)
        .into_iter()
        .filter(|ident| !keywords.iter().any(|keyword| keyword == ident))
        .map(str::to_string)
        .collect()
}

/// Outlines the definitions of imported symbols used around the cursor.
pub struct ImportCollector {
    index: Arc<dyn ImportIndex>,
    outlines: Arc<OutlineSynthesizer>,
}

impl ImportCollector {
    pub fn new(index: Arc<dyn ImportIndex>, outlines: Arc<OutlineSynthesizer>) -> Self {
        Self { index, outlines }
    }

    pub async fn collect(&self, ctx: &CompletionContext) -> Vec<Snippet> {
        if !ctx.options().use_imports {
            return Vec::new();
        }
        let Some(file_imports) = self.index.get(ctx.filepath()) else {
            return Vec::new();
        };

        let log = LogWriter::new("ImportDefinitionSnippets", ctx.options().log_import_snippets);
        let outline_log = LogWriter::new("createOutline", ctx.options().log_outline_creation);
        let symbols = symbols_around_cursor(ctx);
        log.log(format_args!("extracted symbols: {symbols:?}"));

        let mut snippets = Vec::new();
        for symbol in &symbols {
            let definitions = file_imports.definitions(symbol);
            if definitions.is_empty() {
                continue;
            }

            let outlines = definitions.iter().map(|definition| {
                log.log(format_args!(
                    "found definition {} {}",
                    definition.filepath, definition.range
                ));
                let language_options = ctx
                    .options()
                    .language_options_for(Language::from_path(&definition.filepath));
                async move {
                    self.outlines
                        .create_outline(
                            &definition.filepath,
                            &definition.contents,
                            definition.range,
                            &language_options,
                            outline_log,
                        )
                        .await
                }
            });
            snippets.extend(join_all(outlines).await);
        }
        snippets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ide::{FileImports, StaticImportIndex};
    use crate::options::CompletionOptions;
    use crate::snippet::CompletionInput;
    use crate::test_support::MockIde;
    use crate::tokens::ApproxTokenCounter;
    use context_syntax::{Position, Range, RangeInFileWithContents};
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    const A_TS: &str = "import { foo } from \"./b\";\nimport { bar } from \"./c\";\n\n// helpers\n\nexport function run(n: number) {\n  return foo(n);\n}\n";
    const B_TS: &str = "export function foo(x: number): number {\n  return x + 1;\n}\n";

    fn foo_definition() -> RangeInFileWithContents {
        RangeInFileWithContents::new(
            "src/b.ts",
            Range::new(Position::new(0, 7), Position::new(2, 1)),
            B_TS,
        )
    }

    fn index() -> Arc<StaticImportIndex> {
        let mut index = StaticImportIndex::new();
        index.insert(
            "src/a.ts",
            FileImports {
                imports: HashMap::from([
                    ("foo".to_string(), vec![foo_definition()]),
                    ("bar".to_string(), vec![foo_definition()]),
                ]),
            },
        );
        Arc::new(index)
    }

    async fn context(options: CompletionOptions, pos: Position) -> CompletionContext {
        let input = CompletionInput::new("src/a.ts", pos).with_contents(A_TS);
        CompletionContext::create(input, options, &MockIde::new(), Arc::new(ApproxTokenCounter))
            .await
            .unwrap()
    }

    #[test]
    fn test_identifiers_first_occurrence_order() {
        assert_eq!(
            identifiers("return foo(n) + foo(bar_2, $el);"),
            vec!["return", "foo", "n", "bar_2", "$el"]
        );
    }

    #[tokio::test]
    async fn test_outlines_imported_symbol_near_cursor() {
        let ctx = context(CompletionOptions::default(), Position::new(6, 15)).await;
        let collector = ImportCollector::new(index(), Arc::new(OutlineSynthesizer::new()));

        let symbols = symbols_around_cursor(&ctx);
        assert!(symbols.contains(&"foo".to_string()));
        assert!(!symbols.contains(&"return".to_string()));
        // "bar" only appears more than five lines above the cursor.
        assert!(!symbols.contains(&"bar".to_string()));

        let snippets = collector.collect(&ctx).await;
        assert_eq!(snippets.len(), 1);
        assert_eq!(snippets[0].filepath, "src/b.ts");
        assert_eq!(snippets[0].content, "function foo(x: number): number {...}");
    }

    #[tokio::test]
    async fn test_disabled_imports() {
        let options = CompletionOptions {
            use_imports: false,
            ..Default::default()
        };
        let ctx = context(options, Position::new(6, 15)).await;
        let collector = ImportCollector::new(index(), Arc::new(OutlineSynthesizer::new()));

        assert!(collector.collect(&ctx).await.is_empty());
    }

    #[tokio::test]
    async fn test_file_without_import_table() {
        let input = CompletionInput::new("src/other.ts", Position::new(0, 0)).with_contents("foo();\n");
        let ctx = CompletionContext::create(
            input,
            CompletionOptions::default(),
            &MockIde::new(),
            Arc::new(ApproxTokenCounter),
        )
        .await
        .unwrap();
        let collector = ImportCollector::new(index(), Arc::new(OutlineSynthesizer::new()));

        assert!(collector.collect(&ctx).await.is_empty());
    }
}
