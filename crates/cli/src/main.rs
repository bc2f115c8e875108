use anyhow::{Context, Result};
use clap::Parser;
use context_autocomplete::{CompletionOptions, ImportIndex, StaticImportIndex};
use context_cli::snippets_for_file;
use context_syntax::Position;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "context-snippets")]
#[command(about = "Print the context snippets an autocomplete request would use", long_about = None)]
#[command(version)]
struct Cli {
    /// File containing the cursor
    file: PathBuf,

    /// Cursor line (zero-based)
    #[arg(long)]
    line: usize,

    /// Cursor column in bytes (zero-based)
    #[arg(long)]
    character: usize,

    /// Completion options (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Import table (JSON: {filepath: {imports: {symbol: [definitions]}}})
    #[arg(long)]
    imports: Option<PathBuf>,

    /// Override the prompt token budget
    #[arg(long)]
    max_prompt_tokens: Option<usize>,

    /// Enable verbose logging, including every retrieval log channel
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long)]
    quiet: bool,
}

fn load_options(cli: &Cli) -> Result<CompletionOptions> {
    let mut options = match &cli.config {
        Some(path) => CompletionOptions::from_path(path)
            .with_context(|| format!("Failed to load options from {}", path.display()))?,
        None => CompletionOptions::default(),
    };
    if let Some(tokens) = cli.max_prompt_tokens {
        options.max_prompt_tokens = tokens;
        options.validate()?;
    }
    if cli.verbose {
        options = options.with_all_logs();
    }
    Ok(options)
}

fn load_imports(cli: &Cli) -> Result<Arc<dyn ImportIndex>> {
    let index = match &cli.imports {
        Some(path) => StaticImportIndex::from_path(path)
            .with_context(|| format!("Failed to load imports from {}", path.display()))?,
        None => StaticImportIndex::new(),
    };
    log::debug!("Import table covers {} files", index.len());
    Ok(Arc::new(index))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let options = load_options(&cli)?;
    let imports = load_imports(&cli)?;
    let filepath = cli.file.to_string_lossy();
    let pos = Position::new(cli.line, cli.character);

    let snippets = snippets_for_file(&filepath, pos, options, imports).await?;
    log::info!("Selected {} snippets for {filepath} at {pos}", snippets.len());

    println!("{}", serde_json::to_string_pretty(&snippets)?);
    Ok(())
}
