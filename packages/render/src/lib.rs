//! # Quill Render
//!
//! Turns document source into a live preview.
//!
//! ```text
//! schedule_render(source) ──(quiet period)──┐
//! render_now(source) ───────────────────────┤
//!                                           ↓
//!                         Compiler (external, may fail)
//!                                           ↓
//!               RenderArtifact = resources + document tree
//!                                           ↓
//!          PreviewSnapshot (watch channel, latest result wins)
//! ```

mod artifact;
mod compiler;
mod pipeline;
mod tree;

pub use artifact::{
    PresentationResources, PreviewSnapshot, RenderArtifact, RenderResult,
    DEFAULT_DOCUMENT_STYLESHEET, DEFAULT_MATH_STYLESHEET, DEFAULT_RESET_CSS,
};
pub use compiler::{CompileError, CompileOptions, Compiler, FnCompiler};
pub use pipeline::{RenderPipeline, DEFAULT_RENDER_DEBOUNCE};
pub use tree::Node;
