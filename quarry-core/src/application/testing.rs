// quarry-core/src/application/testing.rs

// In-memory backend for application tests: records every round trip, replays scripted answers.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::domain::capabilities::Capabilities;
use crate::domain::target::TargetEntry;
use crate::domain::wizard::NormalizationOutcome;
use crate::error::QuarryError;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::backend::{Endpoint, QueryBackend};

#[derive(Default)]
pub(crate) struct RecordingBackend {
    pub capabilities: Capabilities,
    calls: Mutex<Vec<(Endpoint, Value)>>,
    replies: Mutex<VecDeque<Result<Value, String>>>,
    analysis_calls: Mutex<usize>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, payload: Value) -> Self {
        self.push(Ok(payload));
        self
    }

    pub fn fail(self, detail: &str) -> Self {
        self.push(Err(detail.to_string()));
        self
    }

    fn push(&self, reply: Result<Value, String>) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(reply);
        }
    }

    pub fn calls(&self) -> Vec<(Endpoint, Value)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn analysis_calls(&self) -> usize {
        self.analysis_calls.lock().map(|c| *c).unwrap_or_default()
    }

    fn next_reply(&self) -> Result<Value, QuarryError> {
        let reply = self
            .replies
            .lock()
            .ok()
            .and_then(|mut r| r.pop_front())
            .unwrap_or(Ok(Value::Null));
        reply.map_err(|detail| InfrastructureError::Remote { detail }.into())
    }
}

#[async_trait]
impl QueryBackend for RecordingBackend {
    async fn send(&self, endpoint: Endpoint, body: &Value) -> Result<Value, QuarryError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((endpoint, body.clone()));
        }
        self.next_reply()
    }

    async fn fetch_capabilities(&self) -> Result<Capabilities, QuarryError> {
        Ok(self.capabilities)
    }

    async fn list_targets(&self) -> Result<Vec<TargetEntry>, QuarryError> {
        Ok(Vec::new())
    }

    async fn analyze_for_normalization(&self) -> Result<Value, QuarryError> {
        if let Ok(mut n) = self.analysis_calls.lock() {
            *n += 1;
        }
        self.next_reply()
    }

    async fn normalize(&self, _body: &Value) -> Result<NormalizationOutcome, QuarryError> {
        let payload = self.next_reply()?;
        Ok(serde_json::from_value(payload).map_err(InfrastructureError::from)?)
    }
}
