//! Shared test helpers and mock completion provider.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use nexus::completion::{CompletionProvider, CompletionRequest, CompletionResponse};
use nexus::error::Result;
use nexus::types::ToolCall;

/// A mock provider that returns canned responses and captures requests.
pub struct MockProvider {
    responses: Mutex<VecDeque<CompletionResponse>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Queue a text response.
    pub fn queue_response(&self, text: &str) {
        self.responses.lock().unwrap().push_back(CompletionResponse {
            content: text.to_string(),
            tool_calls: vec![],
        });
    }

    /// Queue a response carrying a tool call.
    pub fn queue_tool_call(&self, id: &str, name: &str, args: serde_json::Value) {
        self.responses.lock().unwrap().push_back(CompletionResponse {
            content: "Tool execution complete.".to_string(),
            tool_calls: vec![ToolCall {
                id: id.to_string(),
                name: name.to_string(),
                arguments: args,
                result: None,
            }],
        });
    }

    /// The most recent captured request.
    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    /// How many times the provider was called.
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| CompletionResponse {
                content: "Response complete.".to_string(),
                tool_calls: vec![],
            }))
    }
}
