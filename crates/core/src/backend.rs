//! Generation backend trait — the narrow seam to a text-generation server.
//!
//! The engine only hands over a fully rendered prompt and receives plain
//! text back. Transport, model loading, and streaming are the backend's
//! business.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::BackendError;

/// One generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model identifier understood by the backend
    pub model: String,

    /// The rendered persona prompt
    pub prompt: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_temperature() -> f32 {
    0.7
}

impl GenerationRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            temperature: default_temperature(),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// The backend name (e.g., "ollama").
    fn name(&self) -> &str;

    /// Generate a reply for the prompt.
    async fn generate(&self, request: GenerationRequest) -> Result<String, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct UpperBackend;

    #[async_trait]
    impl GenerationBackend for UpperBackend {
        fn name(&self) -> &str {
            "upper"
        }

        async fn generate(&self, request: GenerationRequest) -> Result<String, BackendError> {
            Ok(request.prompt.to_uppercase())
        }
    }

    #[test]
    fn request_defaults() {
        let req = GenerationRequest::new("llama3", "hi");
        assert_eq!(req.temperature, 0.7);
        let req = req.with_temperature(0.2);
        assert_eq!(req.temperature, 0.2);
    }

    #[tokio::test]
    async fn backend_is_object_safe() {
        let backend: Box<dyn GenerationBackend> = Box::new(UpperBackend);
        let out = backend
            .generate(GenerationRequest::new("m", "hello"))
            .await
            .unwrap();
        assert_eq!(out, "HELLO");
        assert_eq!(backend.name(), "upper");
    }
}
