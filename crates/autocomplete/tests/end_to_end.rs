use async_trait::async_trait;
use context_autocomplete::{
    ApproxTokenCounter, CompletionInput, CompletionOptions, ContextError, ContextRetrievalService,
    FileImports, Ide, Position, Range, RangeInFile, RangeInFileWithContents, StaticImportIndex,
};
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::sync::Arc;

const A_TS: &str = "import { foo } from \"./b\";\n\nexport function main() {\n  const result = foo(41);\n  \n}\n";
const B_TS: &str = "export function foo(x: number): number {\n  return x + 1;\n}\n";

/// Workspace of in-memory files with no language server behind it
struct Workspace {
    files: HashMap<String, String>,
}

#[async_trait]
impl Ide for Workspace {
    async fn read_file(&self, filepath: &str) -> context_autocomplete::Result<String> {
        self.files
            .get(filepath)
            .cloned()
            .ok_or_else(|| ContextError::not_found(filepath))
    }

    async fn goto_definition(
        &self,
        _filepath: &str,
        _position: Position,
    ) -> context_autocomplete::Result<Vec<RangeInFile>> {
        Ok(Vec::new())
    }

    async fn goto_type_definition(
        &self,
        _filepath: &str,
        _position: Position,
    ) -> context_autocomplete::Result<Vec<RangeInFile>> {
        Ok(Vec::new())
    }
}

fn workspace() -> Arc<Workspace> {
    Arc::new(Workspace {
        files: HashMap::from([
            ("a.ts".to_string(), A_TS.to_string()),
            ("b.ts".to_string(), B_TS.to_string()),
        ]),
    })
}

fn import_index() -> Arc<StaticImportIndex> {
    let mut index = StaticImportIndex::new();
    index.insert(
        "a.ts",
        FileImports {
            imports: HashMap::from([(
                "foo".to_string(),
                vec![RangeInFileWithContents::new(
                    "b.ts",
                    Range::new(Position::new(0, 7), Position::new(2, 1)),
                    B_TS,
                )],
            )]),
        },
    );
    Arc::new(index)
}

fn options() -> CompletionOptions {
    CompletionOptions {
        collector_timeout_ms: 10_000,
        ..Default::default()
    }
}

#[tokio::test]
async fn imported_function_is_outlined() {
    let service = ContextRetrievalService::new(workspace(), import_index());
    let input = CompletionInput::new("a.ts", Position::new(4, 2));

    let ctx = service
        .context_for(input, options(), Arc::new(ApproxTokenCounter))
        .await
        .unwrap();
    let snippets = service.snippets_for_request(&ctx).await;

    let from_b: Vec<_> = snippets.iter().filter(|s| s.filepath == "b.ts").collect();
    assert_eq!(from_b.len(), 1);
    assert_eq!(from_b[0].content, "function foo(x: number): number {...}");
    assert_eq!(
        from_b[0].range,
        Range::new(Position::new(0, 7), Position::new(2, 1))
    );
}

#[tokio::test]
async fn repeated_requests_return_the_same_snippets() {
    let service = ContextRetrievalService::new(workspace(), import_index());
    let input = CompletionInput::new("a.ts", Position::new(4, 2));
    let ctx = service
        .context_for(input, options(), Arc::new(ApproxTokenCounter))
        .await
        .unwrap();

    let first = service.snippets_for_request(&ctx).await;
    let second = service.snippets_for_request(&ctx).await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn unsaved_contents_take_precedence_over_disk() {
    let service = ContextRetrievalService::new(workspace(), import_index());
    // The buffer no longer mentions `foo` near the cursor.
    let input = CompletionInput::new("a.ts", Position::new(7, 0))
        .with_contents("import { foo } from \"./b\";\n\n\n\n\n\n\nconst x = 1;\n");

    let ctx = service
        .context_for(input, options(), Arc::new(ApproxTokenCounter))
        .await
        .unwrap();
    let snippets = service.snippets_for_request(&ctx).await;

    assert!(snippets.iter().all(|s| s.filepath != "b.ts"));
}

#[tokio::test]
async fn missing_file_aborts_the_request() {
    let service = ContextRetrievalService::new(workspace(), import_index());
    let input = CompletionInput::new("c.ts", Position::new(0, 0));

    let result = service
        .context_for(input, options(), Arc::new(ApproxTokenCounter))
        .await;

    assert!(matches!(result, Err(ContextError::NotFound(path)) if path == "c.ts"));
}
