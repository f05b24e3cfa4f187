//! # Render Artifacts
//!
//! A successful compile is wrapped with the presentation resources it needs
//! into a self-contained, immutable [`RenderArtifact`]. Applying a render is
//! a single assignment of a [`RenderResult`].

use crate::tree::{escape_attribute, Node};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const DEFAULT_MATH_STYLESHEET: &str =
    "https://cdn.jsdelivr.net/npm/katex@0.16.9/dist/katex.min.css";

pub const DEFAULT_DOCUMENT_STYLESHEET: &str =
    "https://cdn.jsdelivr.net/npm/github-markdown-css@5.5.1/github-markdown-light.min.css";

pub const DEFAULT_RESET_CSS: &str = "html, body { margin: 0; padding: 0; } \
body { box-sizing: border-box; padding: 2rem; line-height: 1.6; } \
.markdown-body { max-width: 48rem; margin: 0 auto; }";

/// Stylesheets and reset attached to every artifact.
///
/// Attachment order is fixed: math stylesheet, then the document stylesheet
/// (which may override it), then the reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PresentationResources {
    pub math_stylesheet: String,
    pub document_stylesheet: String,
    pub reset_css: String,
}

impl Default for PresentationResources {
    fn default() -> Self {
        Self {
            math_stylesheet: DEFAULT_MATH_STYLESHEET.to_string(),
            document_stylesheet: DEFAULT_DOCUMENT_STYLESHEET.to_string(),
            reset_css: DEFAULT_RESET_CSS.to_string(),
        }
    }
}

impl PresentationResources {
    /// Stylesheet hrefs in attachment order
    pub fn stylesheets(&self) -> [&str; 2] {
        [self.math_stylesheet.as_str(), self.document_stylesheet.as_str()]
    }
}

/// Compiled document plus its presentation resources
#[derive(Debug, Clone, PartialEq)]
pub struct RenderArtifact {
    pub resources: Arc<PresentationResources>,
    pub body: Vec<Node>,
}

impl RenderArtifact {
    pub fn new(resources: Arc<PresentationResources>, body: Vec<Node>) -> Self {
        Self { resources, body }
    }

    /// Self-contained HTML document
    pub fn to_html(&self) -> String {
        let mut ctx = Context::new();

        ctx.add_line("<!DOCTYPE html>");
        ctx.add_line("<html>");
        ctx.indent();

        ctx.add_line("<head>");
        ctx.indent();
        ctx.add_line("<meta charset=\"UTF-8\">");
        ctx.add_line("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">");
        for href in self.resources.stylesheets() {
            ctx.add_line(&format!(
                "<link rel=\"stylesheet\" href=\"{}\">",
                escape_attribute(href)
            ));
        }
        ctx.add_line(&format!("<style>{}</style>", self.resources.reset_css));
        ctx.dedent();
        ctx.add_line("</head>");

        ctx.add_line("<body>");
        ctx.indent();
        ctx.add_line("<article class=\"markdown-body\">");
        ctx.indent();
        for node in &self.body {
            ctx.add_line(&node.to_html());
        }
        ctx.dedent();
        ctx.add_line("</article>");
        ctx.dedent();
        ctx.add_line("</body>");

        ctx.dedent();
        ctx.add_line("</html>");

        ctx.get_output()
    }
}

/// Outcome of one render attempt
#[derive(Debug, Clone, PartialEq)]
pub enum RenderResult {
    Success { artifact: Arc<RenderArtifact> },
    Failure { message: String },
}

impl RenderResult {
    pub fn is_success(&self) -> bool {
        matches!(self, RenderResult::Success { .. })
    }

    pub fn artifact(&self) -> Option<&Arc<RenderArtifact>> {
        match self {
            RenderResult::Success { artifact } => Some(artifact),
            RenderResult::Failure { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            RenderResult::Success { .. } => None,
            RenderResult::Failure { message } => Some(message),
        }
    }
}

/// What a preview surface shows: the live result plus the last good artifact
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreviewSnapshot {
    /// Sequence number of the request that produced `result` (0 = none yet)
    pub sequence: u64,
    /// Id of the document the preview belongs to
    pub subject: Option<String>,
    pub result: Option<RenderResult>,
    /// Most recent success for this subject, kept across failures
    pub last_artifact: Option<Arc<RenderArtifact>>,
}

struct Context {
    depth: usize,
    buffer: String,
}

impl Context {
    fn new() -> Self {
        Self {
            depth: 0,
            buffer: String::new(),
        }
    }

    fn add_line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.buffer.push_str("  ");
        }
        self.buffer.push_str(text);
        self.buffer.push('\n');
    }

    fn indent(&mut self) {
        self.depth += 1;
    }

    fn dedent(&mut self) {
        if self.depth > 0 {
            self.depth -= 1;
        }
    }

    fn get_output(self) -> String {
        self.buffer
    }
}
