use std::time::Duration;

use hotelscout_core::config::LlmConfig;
use hotelscout_core::domain::hotel::HotelsResponse;
use hotelscout_core::errors::{GatewayError, PlanError};
use hotelscout_core::schema::{hotels_response_schema, validate_hotels_value, SCHEMA_NAME};
use tracing::debug;

use crate::composer::Instruction;
use crate::llm::{LlmClient, StructuredRequest};

/// Sends one instruction to the reasoning service and validates the answer.
/// One attempt per call, bounded by `timeout`.
pub struct CompletionGateway<L> {
    client: L,
    model: String,
    timeout: Duration,
}

impl<L> CompletionGateway<L>
where
    L: LlmClient,
{
    pub fn new(client: L, model: impl Into<String>, timeout: Duration) -> Self {
        Self { client, model: model.into(), timeout }
    }

    pub fn from_config(client: L, config: &LlmConfig) -> Self {
        Self::new(client, config.model.clone(), Duration::from_secs(config.timeout_secs))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn client(&self) -> &L {
        &self.client
    }

    pub async fn request_hotels(&self, instruction: &Instruction) -> Result<HotelsResponse, PlanError> {
        let request = StructuredRequest {
            model: self.model.clone(),
            instruction_text: instruction.as_str().to_string(),
            schema_name: SCHEMA_NAME.to_string(),
            output_schema: hotels_response_schema(),
            temperature: 0.0,
        };

        debug!(model = %self.model, timeout_secs = self.timeout.as_secs(), "request_hotels: calling service");
        let value = match tokio::time::timeout(self.timeout, self.client.complete_structured(&request)).await {
            Ok(result) => result?,
            Err(_) => {
                debug!("request_hotels: deadline elapsed");
                return Err(GatewayError::Timeout { after_secs: self.timeout.as_secs() }.into());
            }
        };

        let hotels = validate_hotels_value(&value)?;
        debug!(suggestions = hotels.suggestions.len(), "request_hotels: payload validated");
        Ok(hotels)
    }
}
