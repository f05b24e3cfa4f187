/// Render pipeline behavior under virtual time
/// Tests debouncing, ordering of overlapping compiles and stale-result discard
use futures::future::BoxFuture;
use quill_render::{
    CompileError, CompileOptions, Compiler, Node, PreviewSnapshot, RenderPipeline, RenderResult,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

/// Compiler driven by source prefixes:
/// `slow:` takes two seconds, `error:` fails with the rest as message
#[derive(Default)]
struct ScriptedCompiler {
    calls: Mutex<Vec<String>>,
}

impl ScriptedCompiler {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Compiler for ScriptedCompiler {
    fn compile<'a>(
        &'a self,
        source: &'a str,
        _options: &'a CompileOptions,
    ) -> BoxFuture<'a, Result<Vec<Node>, CompileError>> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(source.to_string());

            if let Some(rest) = source.strip_prefix("slow:") {
                tokio::time::sleep(Duration::from_secs(2)).await;
                return Ok(vec![Node::text(rest)]);
            }
            if let Some(message) = source.strip_prefix("error:") {
                return Err(CompileError::from(message));
            }
            Ok(vec![Node::text(source)])
        })
    }
}

fn pipeline() -> (RenderPipeline, Arc<ScriptedCompiler>) {
    let compiler = Arc::new(ScriptedCompiler::default());
    (RenderPipeline::with_defaults(compiler.clone()), compiler)
}

async fn next_result(rx: &mut watch::Receiver<PreviewSnapshot>) -> RenderResult {
    loop {
        rx.changed().await.expect("pipeline dropped");
        if let Some(result) = rx.borrow_and_update().result.clone() {
            return result;
        }
    }
}

fn body_of(result: &RenderResult) -> Vec<Node> {
    result.artifact().expect("expected success").body.clone()
}

#[tokio::test(start_paused = true)]
async fn test_burst_compiles_only_last_source() {
    let (pipeline, compiler) = pipeline();
    let mut rx = pipeline.subscribe();

    for source in ["#", "# T", "# Ti", "# Title"] {
        pipeline.schedule_render(source);
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
    assert!(compiler.calls().is_empty());

    let result = next_result(&mut rx).await;
    assert_eq!(body_of(&result), vec![Node::text("# Title")]);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(compiler.calls(), vec!["# Title".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_nothing_compiles_inside_the_window() {
    let (pipeline, compiler) = pipeline();

    pipeline.schedule_render("draft");
    tokio::time::sleep(Duration::from_millis(449)).await;
    assert!(compiler.calls().is_empty());
    assert!(pipeline.is_pending());

    tokio::time::sleep(Duration::from_millis(2)).await;
    assert_eq!(compiler.calls(), vec!["draft".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_failure_carries_message_and_keeps_last_artifact() {
    let (pipeline, _) = pipeline();
    let mut rx = pipeline.subscribe();

    pipeline.render_now("error:Unexpected token at 3:14");
    let result = next_result(&mut rx).await;
    assert_eq!(result.error_message(), Some("Unexpected token at 3:14"));
    assert!(pipeline.snapshot().last_artifact.is_none());

    pipeline.render_now("fixed");
    let result = next_result(&mut rx).await;
    assert!(result.is_success());

    pipeline.render_now("error:broken again");
    let result = next_result(&mut rx).await;
    assert_eq!(result.error_message(), Some("broken again"));

    let snapshot = pipeline.snapshot();
    let last = snapshot.last_artifact.expect("last success retained");
    assert_eq!(last.body, vec![Node::text("fixed")]);
}

#[tokio::test(start_paused = true)]
async fn test_slow_earlier_compile_does_not_overwrite_newer_result() {
    let (pipeline, compiler) = pipeline();
    let mut rx = pipeline.subscribe();

    pipeline.render_now("slow:first");
    pipeline.schedule_render("second");

    let result = next_result(&mut rx).await;
    assert_eq!(body_of(&result), vec![Node::text("second")]);

    tokio::time::sleep(Duration::from_secs(3)).await;
    let snapshot = pipeline.snapshot();
    assert_eq!(snapshot.sequence, 2);
    assert_eq!(
        body_of(snapshot.result.as_ref().unwrap()),
        vec![Node::text("second")]
    );
    assert_eq!(
        compiler.calls(),
        vec!["slow:first".to_string(), "second".to_string()]
    );
}

#[tokio::test(start_paused = true)]
async fn test_result_for_previous_subject_is_discarded() {
    let (pipeline, _) = pipeline();

    pipeline.retarget(Some("doc-a".to_string()));
    pipeline.render_now("slow:content of a");
    pipeline.retarget(Some("doc-b".to_string()));

    tokio::time::sleep(Duration::from_secs(3)).await;
    let snapshot = pipeline.snapshot();
    assert_eq!(snapshot.subject.as_deref(), Some("doc-b"));
    assert!(snapshot.result.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_success_for_other_document_replaces_failure() {
    let (pipeline, _) = pipeline();

    pipeline.retarget(Some("doc-a".to_string()));
    let mut rx = pipeline.subscribe();
    pipeline.render_now("error:bad");
    assert!(!next_result(&mut rx).await.is_success());

    pipeline.retarget(Some("doc-b".to_string()));
    pipeline.render_now("good");
    let result = next_result(&mut rx).await;

    assert!(result.is_success());
    assert_eq!(pipeline.snapshot().subject.as_deref(), Some("doc-b"));
}

#[tokio::test(start_paused = true)]
async fn test_retarget_drops_pending_render() {
    let (pipeline, compiler) = pipeline();

    pipeline.schedule_render("typed into a");
    pipeline.retarget(Some("doc-b".to_string()));
    assert!(!pipeline.is_pending());

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(compiler.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_artifact_html_is_self_contained() {
    let (pipeline, _) = pipeline();
    let mut rx = pipeline.subscribe();

    pipeline.render_now("body text");
    let result = next_result(&mut rx).await;
    let html = result.artifact().unwrap().to_html();

    assert!(html.contains("katex"));
    assert!(html.contains("body text"));
    assert!(html.trim_end().ends_with("</html>"));
}
