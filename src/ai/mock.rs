use super::GenerativeModel;
use crate::models::{GenerationRequest, GenerationResult};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// In-memory [`GenerativeModel`] that records every request it receives.
#[derive(Clone)]
pub struct MockModel {
    responses: Arc<Mutex<Vec<String>>>,
    failure: Arc<Mutex<Option<String>>>,
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
}

impl MockModel {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            failure: Arc::new(Mutex::new(None)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_response(self, response: impl Into<String>) -> Self {
        self.responses.lock().unwrap().push(response.into());
        self
    }

    /// Makes every call fail with an upstream error carrying `message`.
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        *self.failure.lock().unwrap() = Some(message.into());
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerativeModel for MockModel {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        let count = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len()
        };

        if let Some(message) = self.failure.lock().unwrap().clone() {
            return Err(Error::Upstream(message));
        }

        let responses = self.responses.lock().unwrap();
        let text = if responses.is_empty() {
            format!("Mock response to: {}", request.prompt())
        } else {
            responses[(count - 1) % responses.len()].clone()
        };

        Ok(GenerationResult { text })
    }

    fn model_id(&self) -> &str {
        "mock-model"
    }
}
