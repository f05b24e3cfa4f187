//! # Compiler Seam
//!
//! The markup compiler is external to quill. It maps source text to a
//! document tree, or fails with a human-readable message. Compilers may be
//! asynchronous; synchronous ones are wrapped with [`FnCompiler`].

use crate::tree::Node;
use futures::future::BoxFuture;
use thiserror::Error;

/// Errors reported by a compiler for invalid or unsupported source
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl CompileError {
    /// The error text, or the error's string form when it carries no message
    pub fn message(&self) -> String {
        match self {
            CompileError::Message(message) => message.clone(),
            CompileError::Other(err) => err.to_string(),
        }
    }
}

impl From<String> for CompileError {
    fn from(s: String) -> Self {
        CompileError::Message(s)
    }
}

impl From<&str> for CompileError {
    fn from(s: &str) -> Self {
        CompileError::Message(s.to_string())
    }
}

/// Options passed through to the compiler
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Id of the document being compiled, if any
    pub document_id: Option<String>,
    /// Fail on invalid input instead of rendering it inline
    pub strict: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            document_id: None,
            strict: true,
        }
    }
}

/// Source text → document tree
pub trait Compiler: Send + Sync {
    fn compile<'a>(
        &'a self,
        source: &'a str,
        options: &'a CompileOptions,
    ) -> BoxFuture<'a, Result<Vec<Node>, CompileError>>;
}

/// Adapter for synchronous compiler functions
pub struct FnCompiler<F>(F);

impl<F> FnCompiler<F>
where
    F: Fn(&str, &CompileOptions) -> Result<Vec<Node>, CompileError> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> Compiler for FnCompiler<F>
where
    F: Fn(&str, &CompileOptions) -> Result<Vec<Node>, CompileError> + Send + Sync,
{
    fn compile<'a>(
        &'a self,
        source: &'a str,
        options: &'a CompileOptions,
    ) -> BoxFuture<'a, Result<Vec<Node>, CompileError>> {
        Box::pin(futures::future::ready((self.0)(source, options)))
    }
}
