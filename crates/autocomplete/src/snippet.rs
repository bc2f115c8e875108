use context_syntax::{Position, Range};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Source of a snippet's text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnippetKind {
    Code,
}

impl fmt::Display for SnippetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnippetKind::Code => write!(f, "code"),
        }
    }
}

/// A bounded piece of code offered to the model as context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    #[serde(rename = "type")]
    pub kind: SnippetKind,
    pub filepath: String,
    pub range: Range,
    pub content: String,
}

impl Snippet {
    pub fn code(filepath: impl Into<String>, range: Range, content: impl Into<String>) -> Self {
        Self {
            kind: SnippetKind::Code,
            filepath: filepath.into(),
            range,
            content: content.into(),
        }
    }
}

/// Lines the user changed recently, with their text after the edit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentlyEditedRange {
    pub filepath: String,
    pub range: Range,
    pub lines: Vec<String>,
}

impl From<&RecentlyEditedRange> for Snippet {
    fn from(edit: &RecentlyEditedRange) -> Self {
        Snippet::code(edit.filepath.clone(), edit.range, edit.lines.join("\n"))
    }
}

/// Completion the editor currently shows in its suggestion widget
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SelectedCompletionInfo {
    pub text: String,
    pub range: Range,
}

/// One completion request as received from the editor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionInput {
    pub filepath: String,
    pub pos: Position,
    /// Unsaved buffer contents; the file is read through the IDE when absent
    #[serde(default)]
    pub manually_pass_file_contents: Option<String>,
    #[serde(default)]
    pub selected_completion_info: Option<SelectedCompletionInfo>,
    #[serde(default)]
    pub recently_visited_ranges: Vec<Snippet>,
    #[serde(default)]
    pub recently_edited_ranges: Vec<RecentlyEditedRange>,
}

impl CompletionInput {
    pub fn new(filepath: impl Into<String>, pos: Position) -> Self {
        Self {
            filepath: filepath.into(),
            pos,
            manually_pass_file_contents: None,
            selected_completion_info: None,
            recently_visited_ranges: Vec::new(),
            recently_edited_ranges: Vec::new(),
        }
    }

    pub fn with_contents(mut self, contents: impl Into<String>) -> Self {
        self.manually_pass_file_contents = Some(contents.into());
        self
    }
}
