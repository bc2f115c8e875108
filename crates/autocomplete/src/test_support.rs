use crate::error::{ContextError, Result};
use crate::ide::Ide;
use crate::tokens::TokenCounter;
use async_trait::async_trait;
use context_syntax::{Position, RangeInFile};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

type Locations = HashMap<(String, Position), Vec<RangeInFile>>;

/// In-memory editor with canned lookups and call counters.
#[derive(Default)]
pub(crate) struct MockIde {
    files: HashMap<String, String>,
    definitions: Locations,
    type_definitions: Locations,
    failing_lookups: bool,
    lookup_delay: Option<Duration>,
    reads: Mutex<HashMap<String, usize>>,
    definition_calls: AtomicUsize,
    type_definition_calls: AtomicUsize,
}

impl MockIde {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_file(mut self, path: &str, contents: &str) -> Self {
        self.files.insert(path.to_string(), contents.to_string());
        self
    }

    pub(crate) fn with_definition(mut self, path: &str, at: Position, target: RangeInFile) -> Self {
        self.definitions
            .entry((path.to_string(), at))
            .or_default()
            .push(target);
        self
    }

    pub(crate) fn with_type_definition(mut self, path: &str, at: Position, target: RangeInFile) -> Self {
        self.type_definitions
            .entry((path.to_string(), at))
            .or_default()
            .push(target);
        self
    }

    /// Every definition lookup fails
    pub(crate) fn failing_lookups(mut self) -> Self {
        self.failing_lookups = true;
        self
    }

    /// Every definition lookup sleeps first
    pub(crate) fn with_lookup_delay(mut self, delay: Duration) -> Self {
        self.lookup_delay = Some(delay);
        self
    }

    pub(crate) fn read_count(&self, path: &str) -> usize {
        self.reads
            .lock()
            .get(path)
            .copied()
            .unwrap_or(0)
    }

    pub(crate) fn definition_calls(&self) -> usize {
        self.definition_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn type_definition_calls(&self) -> usize {
        self.type_definition_calls.load(Ordering::SeqCst)
    }

    async fn lookup(&self, table: &Locations, path: &str, at: Position) -> Result<Vec<RangeInFile>> {
        if let Some(delay) = self.lookup_delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing_lookups {
            return Err(ContextError::lookup(format!("no language server for {path}")));
        }
        Ok(table
            .get(&(path.to_string(), at))
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl Ide for MockIde {
    async fn read_file(&self, filepath: &str) -> Result<String> {
        *self
            .reads
            .lock()
            .entry(filepath.to_string())
            .or_default() += 1;
        self.files
            .get(filepath)
            .cloned()
            .ok_or_else(|| ContextError::not_found(filepath))
    }

    async fn goto_definition(&self, filepath: &str, position: Position) -> Result<Vec<RangeInFile>> {
        self.definition_calls.fetch_add(1, Ordering::SeqCst);
        self.lookup(&self.definitions, filepath, position).await
    }

    async fn goto_type_definition(
        &self,
        filepath: &str,
        position: Position,
    ) -> Result<Vec<RangeInFile>> {
        self.type_definition_calls.fetch_add(1, Ordering::SeqCst);
        self.lookup(&self.type_definitions, filepath, position).await
    }
}

/// One token per whitespace-separated word
pub(crate) struct WordCounter;

impl TokenCounter for WordCounter {
    fn count(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }
}
