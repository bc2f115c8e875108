//! Command-line front end for completion context retrieval.

pub mod fs_ide;

pub use fs_ide::FsIde;

use anyhow::{Context, Result};
use context_autocomplete::{
    ApproxTokenCounter, CompletionInput, CompletionOptions, ContextRetrievalService, ImportIndex,
    Snippet,
};
use context_syntax::Position;
use std::sync::Arc;

/// Snippets selected for a cursor in `filepath`, reading files from disk
pub async fn snippets_for_file(
    filepath: &str,
    pos: Position,
    options: CompletionOptions,
    import_index: Arc<dyn ImportIndex>,
) -> Result<Vec<Snippet>> {
    let service = ContextRetrievalService::new(Arc::new(FsIde::new()), import_index);
    let ctx = service
        .context_for(
            CompletionInput::new(filepath, pos),
            options,
            Arc::new(ApproxTokenCounter),
        )
        .await
        .with_context(|| format!("Failed to read {filepath}"))?;
    log::debug!("Built {ctx:?}");

    Ok(service.snippets_for_request(&ctx).await)
}
