//! Shared test helpers for the exchange tests.

use async_trait::async_trait;
use companion_core::backend::{GenerationBackend, GenerationRequest};
use companion_core::error::BackendError;
use std::sync::Mutex;

/// A mock backend that returns a sequence of scripted results.
///
/// Each call to `generate` returns the next result in the queue and records
/// the request it was given. Panics if more calls are made than results
/// provided.
pub struct ScriptedBackend {
    results: Mutex<Vec<Result<String, BackendError>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedBackend {
    pub fn new(results: Vec<Result<String, BackendError>>) -> Self {
        Self {
            results: Mutex::new(results),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Replies with each text in order.
    pub fn replies(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(t.to_string())).collect())
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted_mock"
    }

    async fn generate(&self, request: GenerationRequest) -> Result<String, BackendError> {
        let mut requests = self.requests.lock().unwrap();
        let results = self.results.lock().unwrap();
        let call = requests.len();

        if call >= results.len() {
            panic!(
                "ScriptedBackend: no more results (call #{}, have {})",
                call,
                results.len()
            );
        }

        requests.push(request);
        results[call].clone()
    }
}
