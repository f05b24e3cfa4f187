//! # Render Pipeline
//!
//! Coordinates source → compile → artifact for the live preview.
//!
//! The pipeline manages:
//! - Debouncing: a burst of [`RenderPipeline::schedule_render`] calls
//!   compiles only the last source, once the quiet period has elapsed
//! - Ordering: every request gets a sequence number, and a result is
//!   applied only if nothing newer has landed
//! - Staleness: results for a subject the session has moved away from are
//!   discarded
//!
//! In-flight compiles are never cancelled; they are checked when their
//! result is applied.

use crate::artifact::{PresentationResources, PreviewSnapshot, RenderArtifact, RenderResult};
use crate::compiler::{CompileOptions, Compiler};
use quill_common::DebounceTimer;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;

/// Reference quiet period before a scheduled render compiles
pub const DEFAULT_RENDER_DEBOUNCE: Duration = Duration::from_millis(450);

/// Debounced, ordered compile-and-render driver
pub struct RenderPipeline {
    shared: Arc<Shared>,
    timer: DebounceTimer,
}

struct Shared {
    compiler: Arc<dyn Compiler>,
    resources: Arc<PresentationResources>,
    state: Mutex<PipelineState>,
    preview: watch::Sender<PreviewSnapshot>,
}

struct PipelineState {
    /// Document whose results may be applied
    subject: Option<String>,
    last_sequence: u64,
    applied_sequence: u64,
}

#[derive(Debug)]
struct RenderRequest {
    sequence: u64,
    subject: Option<String>,
    source: String,
}

impl RenderPipeline {
    pub fn new(
        compiler: Arc<dyn Compiler>,
        resources: Arc<PresentationResources>,
        debounce: Duration,
    ) -> Self {
        let (preview, _) = watch::channel(PreviewSnapshot::default());

        Self {
            shared: Arc::new(Shared {
                compiler,
                resources,
                state: Mutex::new(PipelineState {
                    subject: None,
                    last_sequence: 0,
                    applied_sequence: 0,
                }),
                preview,
            }),
            timer: DebounceTimer::new(debounce),
        }
    }

    /// Pipeline with the default resources and quiet period
    pub fn with_defaults(compiler: Arc<dyn Compiler>) -> Self {
        Self::new(
            compiler,
            Arc::new(PresentationResources::default()),
            DEFAULT_RENDER_DEBOUNCE,
        )
    }

    /// Switch to a new subject.
    ///
    /// Drops any pending debounced render, clears the preview and makes every
    /// in-flight compile for the previous subject stale.
    pub fn retarget(&self, subject: Option<String>) {
        self.timer.clear();

        let mut state = self.shared.lock();
        tracing::debug!(from = ?state.subject, to = ?subject, "Retargeting render pipeline");
        state.subject = subject.clone();
        state.applied_sequence = state.last_sequence;

        let sequence = state.last_sequence;
        self.shared.preview.send_replace(PreviewSnapshot {
            sequence,
            subject,
            result: None,
            last_artifact: None,
        });
    }

    /// Compile `source` once no further call arrives within the quiet period
    pub fn schedule_render(&self, source: impl Into<String>) {
        let request = self.shared.next_request(source.into());
        tracing::debug!(sequence = request.sequence, "Render scheduled");

        let shared = self.shared.clone();
        self.timer.reset(move || {
            tokio::spawn(shared.execute(request));
        });
    }

    /// Compile `source` right away, superseding any pending scheduled render
    pub fn render_now(&self, source: impl Into<String>) {
        self.timer.clear();

        let request = self.shared.next_request(source.into());
        tracing::debug!(sequence = request.sequence, "Immediate render");
        tokio::spawn(self.shared.clone().execute(request));
    }

    /// Drop the pending scheduled render, if any
    pub fn cancel_pending(&self) -> bool {
        self.timer.clear()
    }

    /// Whether a scheduled render is still waiting for its quiet period
    pub fn is_pending(&self) -> bool {
        self.timer.is_pending()
    }

    /// Current subject
    pub fn subject(&self) -> Option<String> {
        self.shared.lock().subject.clone()
    }

    /// Latest applied result, if any
    pub fn latest(&self) -> Option<RenderResult> {
        self.shared.preview.borrow().result.clone()
    }

    pub fn snapshot(&self) -> PreviewSnapshot {
        self.shared.preview.borrow().clone()
    }

    /// Receiver notified every time the preview changes
    pub fn subscribe(&self) -> watch::Receiver<PreviewSnapshot> {
        self.shared.preview.subscribe()
    }

    pub fn debounce(&self) -> Duration {
        self.timer.delay()
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, PipelineState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn next_request(&self, source: String) -> RenderRequest {
        let mut state = self.lock();
        state.last_sequence += 1;
        RenderRequest {
            sequence: state.last_sequence,
            subject: state.subject.clone(),
            source,
        }
    }

    async fn execute(self: Arc<Self>, request: RenderRequest) {
        let options = CompileOptions {
            document_id: request.subject.clone(),
            ..CompileOptions::default()
        };

        tracing::debug!(sequence = request.sequence, bytes = request.source.len(), "Compiling");
        let result = match self.compiler.compile(&request.source, &options).await {
            Ok(body) => RenderResult::Success {
                artifact: Arc::new(RenderArtifact::new(self.resources.clone(), body)),
            },
            Err(e) => {
                tracing::debug!(sequence = request.sequence, error = %e, "Compile failed");
                RenderResult::Failure {
                    message: e.message(),
                }
            }
        };

        self.apply(request, result);
    }

    fn apply(&self, request: RenderRequest, result: RenderResult) {
        let mut state = self.lock();

        if state.subject != request.subject {
            tracing::debug!(
                sequence = request.sequence,
                subject = ?request.subject,
                "Discarding render for a document that is no longer current"
            );
            return;
        }
        if request.sequence <= state.applied_sequence {
            tracing::debug!(
                sequence = request.sequence,
                applied = state.applied_sequence,
                "Discarding stale render"
            );
            return;
        }
        state.applied_sequence = request.sequence;

        self.preview.send_modify(|snapshot| {
            snapshot.sequence = request.sequence;
            snapshot.subject = request.subject;
            if let RenderResult::Success { artifact } = &result {
                snapshot.last_artifact = Some(artifact.clone());
            }
            snapshot.result = Some(result);
        });
    }
}
