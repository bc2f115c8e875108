use crate::error::Result;
use async_trait::async_trait;
use context_syntax::{Position, RangeInFile, RangeInFileWithContents};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Editor services the collectors depend on.
///
/// Implementations are expected to be slow and may be called many times for
/// the same location; callers cache and deduplicate.
#[async_trait]
pub trait Ide: Send + Sync {
    /// Current contents of `filepath`, failing with `NotFound` when absent
    async fn read_file(&self, filepath: &str) -> Result<String>;

    /// Definitions of the symbol at `position`
    async fn goto_definition(&self, filepath: &str, position: Position) -> Result<Vec<RangeInFile>>;

    /// Definitions of the type of the symbol at `position`
    async fn goto_type_definition(
        &self,
        filepath: &str,
        position: Position,
    ) -> Result<Vec<RangeInFile>>;
}

/// Imported symbols of one file and where they are defined
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileImports {
    pub imports: HashMap<String, Vec<RangeInFileWithContents>>,
}

impl FileImports {
    pub fn definitions(&self, symbol: &str) -> &[RangeInFileWithContents] {
        self.imports.get(symbol).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Lookup of precomputed import tables
pub trait ImportIndex: Send + Sync {
    fn get(&self, filepath: &str) -> Option<Arc<FileImports>>;
}

/// In-memory import index, loadable from JSON `{filepath: {imports: {...}}}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticImportIndex {
    files: HashMap<String, Arc<FileImports>>,
}

impl StaticImportIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, filepath: impl Into<String>, imports: FileImports) {
        self.files.insert(filepath.into(), Arc::new(imports));
    }

    pub fn from_json_str(source: &str) -> serde_json::Result<Self> {
        serde_json::from_str(source)
    }

    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Ok(Self::from_json_str(&source)?)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl ImportIndex for StaticImportIndex {
    fn get(&self, filepath: &str) -> Option<Arc<FileImports>> {
        self.files.get(filepath).cloned()
    }
}
