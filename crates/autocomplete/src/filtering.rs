use crate::context::CompletionContext;
use crate::log_writer::LogWriter;
use crate::snippet::Snippet;
use crate::tokens::TokenCounter;
use std::collections::HashSet;

/// Tokens reserved per snippet for the separator and file header the prompt
/// template wraps it in
pub const TOKEN_BUFFER: usize = 10;

/// Collector output for one request, one list per source
#[derive(Debug, Clone, Default)]
pub struct CollectedSnippets {
    pub root_path: Vec<Snippet>,
    pub surrounding_symbols: Vec<Snippet>,
    pub imports: Vec<Snippet>,
    pub recently_edited: Vec<Snippet>,
    pub recently_visited: Vec<Snippet>,
}

impl CollectedSnippets {
    /// All snippets in priority order
    pub fn into_ordered(self) -> Vec<Snippet> {
        let mut all = self.root_path;
        all.extend(self.surrounding_symbols);
        all.extend(self.imports);
        all.extend(self.recently_edited);
        all.extend(self.recently_visited);
        all
    }

    pub fn len(&self) -> usize {
        self.root_path.len()
            + self.surrounding_symbols.len()
            + self.imports.len()
            + self.recently_edited.len()
            + self.recently_visited.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Drop blank snippets and those the model already sees in the caret window
pub fn filter_already_visible(snippets: Vec<Snippet>, caret_window: &str) -> Vec<Snippet> {
    snippets
        .into_iter()
        .filter(|snippet| {
            let trimmed = snippet.content.trim();
            !trimmed.is_empty() && !caret_window.contains(trimmed)
        })
        .collect()
}

/// Keep the first of each (filepath, content) pair
pub fn remove_duplicates(snippets: Vec<Snippet>) -> Vec<Snippet> {
    let mut seen = HashSet::new();
    snippets
        .into_iter()
        .filter(|snippet| seen.insert((snippet.filepath.clone(), snippet.content.clone())))
        .collect()
}

/// Prompt tokens left once the caret window is in
pub fn remaining_token_count(ctx: &CompletionContext) -> usize {
    ctx.options()
        .max_prompt_tokens
        .saturating_sub(ctx.token_counter().count(&ctx.pruned_caret_window()))
}

/// Greedily keep snippets, in order, while they fit in `remaining` tokens
pub fn fit_to_budget(
    snippets: Vec<Snippet>,
    mut remaining: usize,
    counter: &dyn TokenCounter,
    log: LogWriter,
) -> Vec<Snippet> {
    let mut kept = Vec::with_capacity(snippets.len());
    for snippet in snippets {
        let cost = counter.count(&snippet.content) + TOKEN_BUFFER;
        if cost <= remaining {
            remaining -= cost;
            kept.push(snippet);
        } else {
            log.log(format_args!(
                "dropped {} {} ({cost} tokens, {remaining} left)",
                snippet.filepath, snippet.range
            ));
        }
    }
    kept
}

/// Merge collector output and cut it down to what fits next to the caret
/// window
pub fn select_snippets(ctx: &CompletionContext, collected: CollectedSnippets) -> Vec<Snippet> {
    let log = LogWriter::new("SnippetLimiting", ctx.options().log_snippet_limiting);
    let total = collected.len();

    let snippets = filter_already_visible(collected.into_ordered(), &ctx.pruned_caret_window());
    let snippets = remove_duplicates(snippets);
    let remaining = remaining_token_count(ctx);
    let selected = fit_to_budget(snippets, remaining, ctx.token_counter(), log);

    log.log(format_args!(
        "kept {} of {total} snippets within {remaining} tokens",
        selected.len()
    ));
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CompletionOptions;
    use crate::snippet::CompletionInput;
    use crate::test_support::{MockIde, WordCounter};
    use context_syntax::{Position, Range};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn snippet(filepath: &str, content: &str) -> Snippet {
        Snippet::code(filepath, Range::default(), content)
    }

    fn words(n: usize) -> String {
        vec!["w"; n].join(" ")
    }

    #[test]
    fn test_budget_keeps_prefix_that_fits() {
        let snippets = vec![
            snippet("a.ts", &words(50)),
            snippet("b.ts", &words(50)),
            snippet("c.ts", &words(50)),
        ];

        let kept = fit_to_budget(snippets, 90, &WordCounter, LogWriter::disabled());

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].filepath, "a.ts");
    }

    #[test]
    fn test_budget_skips_large_snippet_but_keeps_later_small_one() {
        let snippets = vec![
            snippet("big.ts", &words(100)),
            snippet("small.ts", &words(5)),
        ];

        let kept = fit_to_budget(snippets, 20, &WordCounter, LogWriter::disabled());

        let paths: Vec<_> = kept.iter().map(|s| s.filepath.as_str()).collect();
        assert_eq!(paths, vec!["small.ts"]);
    }

    #[test]
    fn test_visible_snippet_dropped_even_when_alone() {
        let snippets = vec![snippet("a.ts", "  const total = foo(a);\n")];

        let kept = filter_already_visible(snippets, "const a = 1;\nconst total = foo(a);\ntotal.");

        assert!(kept.is_empty());
    }

    #[test]
    fn test_blank_snippets_dropped() {
        let snippets = vec![snippet("a.ts", " \n\t"), snippet("b.ts", "x")];

        let kept = filter_already_visible(snippets, "");

        assert_eq!(kept, vec![snippet("b.ts", "x")]);
    }

    #[test]
    fn test_duplicates_keep_first_occurrence() {
        let snippets = vec![
            snippet("a.ts", "one"),
            snippet("b.ts", "one"),
            snippet("a.ts", "two"),
            snippet("a.ts", "one"),
        ];

        let kept = remove_duplicates(snippets);

        assert_eq!(
            kept,
            vec![snippet("a.ts", "one"), snippet("b.ts", "one"), snippet("a.ts", "two")]
        );
    }

    #[tokio::test]
    async fn test_select_preserves_collector_order() {
        let input = CompletionInput::new("main.txt", Position::new(0, 5)).with_contents("hello world");
        let ctx = CompletionContext::create(
            input,
            CompletionOptions::default(),
            &MockIde::new(),
            Arc::new(WordCounter),
        )
        .await
        .unwrap();

        let collected = CollectedSnippets {
            root_path: vec![snippet("root.ts", "root")],
            surrounding_symbols: vec![snippet("sym.ts", "symbol")],
            imports: vec![snippet("imp.ts", "import")],
            recently_edited: vec![snippet("edit.ts", "edited"), snippet("vis.ts", "world")],
            recently_visited: vec![snippet("vis.ts", "visited"), snippet("root.ts", "root")],
        };

        let selected = select_snippets(&ctx, collected);

        let contents: Vec<_> = selected.iter().map(|s| s.content.as_str()).collect();
        assert_eq!(contents, vec!["root", "symbol", "import", "edited", "visited"]);
    }

    #[tokio::test]
    async fn test_remaining_tokens_saturate() {
        let options = CompletionOptions {
            max_prompt_tokens: 1,
            prefix_percentage: 1.0,
            max_suffix_percentage: 1.0,
            ..Default::default()
        };
        let input = CompletionInput::new("main.txt", Position::new(0, 1)).with_contents("a");
        let ctx = CompletionContext::create(input, options, &MockIde::new(), Arc::new(WordCounter))
            .await
            .unwrap();

        assert_eq!(remaining_token_count(&ctx), 0);
    }
}
