//! Generative model integration
//!
//! Defines the [`GenerativeModel`] seam used by the upload router, the Gemini
//! implementation behind it, and a mock for tests and local harnesses.

pub mod gemini;
pub mod mime;
pub mod mock;

pub use gemini::GeminiClient;
pub use mock::MockModel;

use crate::models::{GenerationRequest, GenerationResult};
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Sends prompt text plus optional inline media and returns the answer.
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult>;

    /// Model identifier reported by the health endpoint.
    fn model_id(&self) -> &str;
}
