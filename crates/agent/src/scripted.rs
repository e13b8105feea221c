//! Deterministic in-memory reasoning service.
//!
//! Replies are consumed in order, one per call. Clones share the reply queue
//! and the call log, so a test can hand one clone to a planner and inspect
//! the other afterwards.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::llm::{LlmClient, LlmError, StructuredRequest};

#[derive(Clone, Debug)]
pub enum ScriptedReply {
    Payload(Value),
    ServiceError { status: u16, message: String },
    Unauthorized,
    Refusal(String),
    Malformed(String),
    Delayed(Duration, Box<ScriptedReply>),
}

#[derive(Clone, Default)]
pub struct ScriptedLlmClient {
    replies: Arc<Mutex<VecDeque<ScriptedReply>>>,
    requests: Arc<Mutex<Vec<StructuredRequest>>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedLlmClient {
    pub fn new(replies: Vec<ScriptedReply>) -> Self {
        Self { replies: Arc::new(Mutex::new(replies.into())), ..Self::default() }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<StructuredRequest> {
        match self.requests.lock() {
            Ok(requests) => requests.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn next_reply(&self) -> Option<ScriptedReply> {
        match self.replies.lock() {
            Ok(mut replies) => replies.pop_front(),
            Err(poisoned) => poisoned.into_inner().pop_front(),
        }
    }

    fn record(&self, request: &StructuredRequest) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.requests.lock() {
            Ok(mut requests) => requests.push(request.clone()),
            Err(poisoned) => poisoned.into_inner().push(request.clone()),
        }
    }
}

#[async_trait]
impl LlmClient for ScriptedLlmClient {
    async fn complete_structured(&self, request: &StructuredRequest) -> Result<Value, LlmError> {
        self.record(request);

        let mut reply = self
            .next_reply()
            .ok_or_else(|| LlmError::MalformedPayload("scripted replies exhausted".to_string()))?;

        while let ScriptedReply::Delayed(delay, inner) = reply {
            tokio::time::sleep(delay).await;
            reply = *inner;
        }

        match reply {
            ScriptedReply::Payload(value) => Ok(value),
            ScriptedReply::ServiceError { status, message } => Err(LlmError::Api { status, message }),
            ScriptedReply::Unauthorized => Err(LlmError::Unauthorized {
                status: 401,
                message: "invalid api key".to_string(),
            }),
            ScriptedReply::Refusal(reason) => Err(LlmError::Refusal(reason)),
            ScriptedReply::Malformed(reason) => Err(LlmError::MalformedPayload(reason)),
            ScriptedReply::Delayed(..) => {
                Err(LlmError::MalformedPayload("unresolved scripted delay".to_string()))
            }
        }
    }
}

/// Paris, 2025-10-12, 3 nights, $1500 with $120/$180/$300 nightly rates.
#[cfg(test)]
pub(crate) fn paris_payload() -> Value {
    serde_json::json!({
        "city": "Paris",
        "check_in": "2025-10-12",
        "nights": 3,
        "budget_total_usd": 1500,
        "suggestions": [
            {
                "name": "Hotel du Petit Moulin",
                "neighborhood": "Le Marais",
                "price_per_night_usd": 120,
                "total_estimated_usd": 360,
                "pros": ["walkable", "great reviews"]
            },
            {
                "name": "Hotel Recamier",
                "neighborhood": "Saint-Germain-des-Pres",
                "price_per_night_usd": 180,
                "total_estimated_usd": 540,
                "pros": ["quiet square"]
            },
            {
                "name": "Le Pavillon de la Reine",
                "neighborhood": "Place des Vosges",
                "price_per_night_usd": 300,
                "total_estimated_usd": 900,
                "pros": ["premium", "garden courtyard"]
            }
        ]
    })
}
