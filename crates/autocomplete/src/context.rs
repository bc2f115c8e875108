use crate::error::Result;
use crate::ide::Ide;
use crate::options::{CompletionOptions, LanguageOptions};
use crate::snippet::CompletionInput;
use crate::tokens::{prune_lines_from_bottom, prune_lines_from_top, TokenCounter};
use context_syntax::{parse, path_to_cursor, position_to_index, AstPath, Language, Position, SyntaxTree};
use std::sync::Arc;

/// Everything the collectors need to know about one completion request.
///
/// Built once per request and read-only afterwards.
pub struct CompletionContext {
    input: CompletionInput,
    options: CompletionOptions,
    language: Language,
    language_options: LanguageOptions,
    contents: Arc<str>,
    cursor_index: usize,
    pruned_prefix: String,
    pruned_suffix: String,
    tree: Option<Arc<SyntaxTree>>,
    token_counter: Arc<dyn TokenCounter>,
}

impl CompletionContext {
    /// Read the file (unless the input carries its contents), split it at the
    /// cursor, prune the caret window to the token budget and parse it.
    ///
    /// Fails only when the file cannot be read.
    pub async fn create(
        input: CompletionInput,
        options: CompletionOptions,
        ide: &dyn Ide,
        token_counter: Arc<dyn TokenCounter>,
    ) -> Result<Self> {
        let contents: Arc<str> = match &input.manually_pass_file_contents {
            Some(contents) => Arc::from(contents.as_str()),
            None => Arc::from(ide.read_file(&input.filepath).await?),
        };
        Ok(Self::from_contents(input, options, contents, token_counter))
    }

    fn from_contents(
        input: CompletionInput,
        options: CompletionOptions,
        contents: Arc<str>,
        token_counter: Arc<dyn TokenCounter>,
    ) -> Self {
        let language = Language::from_path(&input.filepath);
        let language_options = options.language_options_for(language);
        let cursor_index = position_to_index(&contents, input.pos);

        let (full_prefix, full_suffix) = contents.split_at(cursor_index);
        let counter = token_counter.as_ref();

        let max_prefix_tokens = (options.max_prompt_tokens as f64 * options.prefix_percentage) as usize;
        let selected = input
            .selected_completion_info
            .as_ref()
            .map_or("", |info| info.text.as_str());
        let pruned_prefix = prune_lines_from_top(&format!("{full_prefix}{selected}"), max_prefix_tokens, counter);

        let max_suffix_tokens = options
            .max_prompt_tokens
            .saturating_sub(counter.count(&pruned_prefix))
            .min((options.max_prompt_tokens as f64 * options.max_suffix_percentage) as usize);
        let pruned_suffix = prune_lines_from_bottom(full_suffix, max_suffix_tokens, counter);

        let tree = match parse(&input.filepath, Arc::clone(&contents)) {
            Ok(tree) => Some(Arc::new(tree)),
            Err(e) => {
                log::debug!("No syntax tree for {}: {e}", input.filepath);
                None
            }
        };

        Self {
            input,
            options,
            language,
            language_options,
            contents,
            cursor_index,
            pruned_prefix,
            pruned_suffix,
            tree,
            token_counter,
        }
    }

    pub fn input(&self) -> &CompletionInput {
        &self.input
    }

    pub fn filepath(&self) -> &str {
        &self.input.filepath
    }

    pub fn pos(&self) -> Position {
        self.input.pos
    }

    pub fn options(&self) -> &CompletionOptions {
        &self.options
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn language_options(&self) -> &LanguageOptions {
        &self.language_options
    }

    pub fn file_lines(&self) -> Vec<&str> {
        self.contents.split('\n').collect()
    }

    pub fn cursor_index(&self) -> usize {
        self.cursor_index
    }

    /// File text before the cursor
    pub fn full_prefix(&self) -> &str {
        &self.contents[..self.cursor_index]
    }

    /// File text from the cursor on
    pub fn full_suffix(&self) -> &str {
        &self.contents[self.cursor_index..]
    }

    /// Prefix plus the selected completion, trimmed from the top to its share
    /// of the budget
    pub fn pruned_prefix(&self) -> &str {
        &self.pruned_prefix
    }

    pub fn pruned_suffix(&self) -> &str {
        &self.pruned_suffix
    }

    /// Text the model sees around the cursor anyway
    pub fn pruned_caret_window(&self) -> String {
        format!("{}{}", self.pruned_prefix, self.pruned_suffix)
    }

    pub fn tree(&self) -> Option<&Arc<SyntaxTree>> {
        self.tree.as_ref()
    }

    /// Syntax nodes from the root down to the innermost node at the cursor
    pub fn tree_path(&self) -> Option<AstPath<'_>> {
        self.tree
            .as_deref()
            .map(|tree| path_to_cursor(tree, self.cursor_index))
    }

    pub fn token_counter(&self) -> &dyn TokenCounter {
        self.token_counter.as_ref()
    }
}

impl std::fmt::Debug for CompletionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionContext")
            .field("filepath", &self.input.filepath)
            .field("pos", &self.input.pos)
            .field("language", &self.language)
            .field("cursor_index", &self.cursor_index)
            .field("parsed", &self.tree.is_some())
            .finish()
    }
}
