//! Generative-text backend abstraction
//!
//! The recommendation service talks to the model through this trait so the
//! real Gemini client can be swapped for a scripted backend in tests, and so
//! a missing API key simply means no backend is wired in.

use crate::error::AppResult;

pub mod gemini;

/// Trait for generative-text backends
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Send a prompt and return the raw text of the model's reply.
    ///
    /// Transport, auth, and quota problems surface as errors; the caller
    /// decides how to degrade.
    async fn generate(&self, prompt: &str) -> AppResult<String>;

    /// Backend name for logging and debugging
    fn name(&self) -> &'static str;
}
