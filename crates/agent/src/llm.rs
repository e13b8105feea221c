//! Reasoning-service capability.
//!
//! The planner only ever asks for one structured completion: an instruction
//! plus a JSON Schema the answer must satisfy. Anything that can answer that
//! question implements [`LlmClient`].

use std::time::Duration;

use async_trait::async_trait;
use hotelscout_core::errors::{GatewayError, PlanError, SchemaViolation};
use serde_json::Value;
use thiserror::Error;

/// One structured-output request.
#[derive(Clone, Debug, PartialEq)]
pub struct StructuredRequest {
    pub model: String,
    pub instruction_text: String,
    pub schema_name: String,
    pub output_schema: Value,
    pub temperature: f32,
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("credential rejected ({status}): {message}")]
    Unauthorized { status: u16, message: String },

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("timeout after {0:?}")]
    Timeout(Duration),

    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("service refused to answer: {0}")]
    Refusal(String),
}

impl From<LlmError> for PlanError {
    fn from(error: LlmError) -> Self {
        match error {
            LlmError::Network(source) => GatewayError::Transport(source.to_string()).into(),
            LlmError::Unauthorized { status, message } => {
                GatewayError::Authentication { status, message }.into()
            }
            LlmError::Api { status, message } => GatewayError::Service { status, message }.into(),
            LlmError::Timeout(after) => GatewayError::Timeout { after_secs: after.as_secs() }.into(),
            LlmError::MalformedPayload(reason) => SchemaViolation::malformed(reason).into(),
            LlmError::Refusal(reason) => {
                SchemaViolation::malformed(format!("service refusal: {reason}")).into()
            }
        }
    }
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Returns the parsed structured payload. Free-form text never reaches
    /// the caller.
    async fn complete_structured(&self, request: &StructuredRequest) -> Result<Value, LlmError>;
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use hotelscout_core::errors::{ErrorStage, GatewayError, PlanError};

    use super::LlmError;

    #[test]
    fn transport_failures_map_to_service_call_stage() {
        let cases = [
            LlmError::Unauthorized { status: 401, message: "bad key".to_string() },
            LlmError::Api { status: 503, message: "overloaded".to_string() },
            LlmError::Timeout(Duration::from_secs(60)),
        ];

        for error in cases {
            assert_eq!(PlanError::from(error).stage(), ErrorStage::ServiceCall);
        }
    }

    #[test]
    fn unauthorized_keeps_status() {
        let error = PlanError::from(LlmError::Unauthorized {
            status: 401,
            message: "invalid api key".to_string(),
        });
        assert_eq!(
            error,
            PlanError::Gateway(GatewayError::Authentication {
                status: 401,
                message: "invalid api key".to_string()
            })
        );
    }

    #[test]
    fn payload_failures_map_to_schema_stage() {
        let refusal = PlanError::from(LlmError::Refusal("I can't help with that".to_string()));
        assert_eq!(refusal.stage(), ErrorStage::SchemaValidation);

        let malformed = PlanError::from(LlmError::MalformedPayload("eof".to_string()));
        assert_eq!(malformed.stage(), ErrorStage::SchemaValidation);
    }
}
