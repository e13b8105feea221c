//! OpenAI-compatible Chat Completions client with strict structured output.

use std::time::Duration;

use async_trait::async_trait;
use hotelscout_core::config::LlmConfig;
use hotelscout_core::errors::PlanError;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::llm::{LlmClient, LlmError, StructuredRequest};

pub struct OpenAiClient {
    api_key: SecretString,
    base_url: String,
    http: Client,
    timeout: Duration,
}

impl OpenAiClient {
    /// Builds a client from configuration. Fails with a configuration error
    /// when no credential is set, before any request can be made.
    pub fn from_config(config: &LlmConfig) -> Result<Self, PlanError> {
        debug!(base_url = %config.base_url, model = %config.model, "from_config: called");
        let api_key = config.credential()?.clone();
        let timeout = Duration::from_secs(config.timeout_secs);

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| PlanError::Configuration(format!("http client: {error}")))?;

        Ok(Self {
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            timeout,
        })
    }

    fn build_request_body(&self, request: &StructuredRequest) -> Value {
        let mut body = json!({
            "model": request.model,
            "messages": [
                { "role": "user", "content": request.instruction_text },
            ],
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": request.schema_name,
                    "strict": true,
                    "schema": request.output_schema,
                },
            },
        });

        // GPT-5.x and o1/o3 models only accept their default temperature
        if accepts_temperature(&request.model) {
            body["temperature"] = json!(request.temperature);
        } else {
            debug!(model = %request.model, "build_request_body: omitting temperature");
        }

        body
    }

    fn parse_response(&self, api_response: ChatResponse) -> Result<Value, LlmError> {
        let message = api_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| LlmError::MalformedPayload("response contained no choices".to_string()))?;

        if let Some(refusal) = message.refusal.filter(|text| !text.trim().is_empty()) {
            return Err(LlmError::Refusal(refusal));
        }

        let content = message
            .content
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| LlmError::MalformedPayload("completion had no content".to_string()))?;

        serde_json::from_str(&content).map_err(|error| LlmError::MalformedPayload(error.to_string()))
    }
}

fn accepts_temperature(model: &str) -> bool {
    !(model.starts_with("gpt-5") || model.starts_with("o1") || model.starts_with("o3"))
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete_structured(&self, request: &StructuredRequest) -> Result<Value, LlmError> {
        debug!(model = %request.model, schema = %request.schema_name, "complete_structured: called");
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = self.build_request_body(request);

        let response = self
            .http
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_key.expose_secret()))
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|error| {
                if error.is_timeout() {
                    LlmError::Timeout(self.timeout)
                } else {
                    LlmError::Network(error)
                }
            })?;

        let status = response.status().as_u16();
        if status == 401 || status == 403 {
            debug!(status, "complete_structured: credential rejected");
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::Unauthorized { status, message });
        }

        if !response.status().is_success() {
            debug!(status, "complete_structured: API error");
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::Api { status, message });
        }

        let api_response: ChatResponse = response
            .json()
            .await
            .map_err(|error| LlmError::MalformedPayload(error.to_string()))?;
        debug!("complete_structured: success");
        self.parse_response(api_response)
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use hotelscout_core::config::AppConfig;
    use hotelscout_core::errors::{ErrorStage, GatewayError, PlanError};
    use hotelscout_core::schema::{hotels_response_schema, SCHEMA_NAME};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::{accepts_temperature, OpenAiClient};
    use crate::llm::{LlmClient, LlmError, StructuredRequest};

    fn llm_config(base_url: &str) -> hotelscout_core::config::LlmConfig {
        let mut config = AppConfig::default().llm;
        config.api_key = Some("sk-test".to_string().into());
        config.base_url = base_url.to_string();
        config.timeout_secs = 5;
        config
    }

    fn request(model: &str) -> StructuredRequest {
        StructuredRequest {
            model: model.to_string(),
            instruction_text: "Create exactly 3 hotel suggestions in Paris".to_string(),
            schema_name: SCHEMA_NAME.to_string(),
            output_schema: hotels_response_schema(),
            temperature: 0.0,
        }
    }

    fn completion(content: &str) -> serde_json::Value {
        json!({
            "id": "chatcmpl-1",
            "choices": [
                { "index": 0, "message": { "role": "assistant", "content": content }, "finish_reason": "stop" }
            ]
        })
    }

    #[test]
    fn missing_credential_fails_before_any_request() {
        let mut config = AppConfig::default().llm;
        config.api_key = None;

        let result = OpenAiClient::from_config(&config);
        assert!(matches!(result, Err(PlanError::Configuration(_))));
    }

    #[test]
    fn temperature_is_omitted_for_fixed_temperature_models() {
        assert!(accepts_temperature("gpt-4o-mini"));
        assert!(!accepts_temperature("gpt-5-nano"));
        assert!(!accepts_temperature("o3-mini"));

        let client = match OpenAiClient::from_config(&llm_config("http://localhost")) {
            Ok(client) => client,
            Err(error) => panic!("client should build: {error}"),
        };
        let body = client.build_request_body(&request("gpt-5-nano"));
        assert!(body.get("temperature").is_none());
        assert_eq!(body["response_format"]["json_schema"]["strict"], json!(true));

        let body = client.build_request_body(&request("gpt-4o-mini"));
        assert_eq!(body["temperature"], json!(0.0));
    }

    #[tokio::test]
    async fn structured_payload_is_parsed_from_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-4o-mini",
                "response_format": { "type": "json_schema", "json_schema": { "name": "hotels_response" } }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(r#"{"city":"Paris"}"#)))
            .expect(1)
            .mount(&server)
            .await;

        let client = match OpenAiClient::from_config(&llm_config(&server.uri())) {
            Ok(client) => client,
            Err(error) => panic!("client should build: {error}"),
        };
        let value = client.complete_structured(&request("gpt-4o-mini")).await;
        assert_eq!(value.ok(), Some(json!({ "city": "Paris" })));
    }

    #[tokio::test]
    async fn unauthorized_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&server)
            .await;

        let client = match OpenAiClient::from_config(&llm_config(&server.uri())) {
            Ok(client) => client,
            Err(error) => panic!("client should build: {error}"),
        };
        let error = client.complete_structured(&request("gpt-4o-mini")).await.err();
        assert!(matches!(error, Some(LlmError::Unauthorized { status: 401, .. })));
    }

    #[tokio::test]
    async fn slow_response_hits_http_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion(r#"{"city":"Paris"}"#))
                    .set_delay(Duration::from_secs(3)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut config = llm_config(&server.uri());
        config.timeout_secs = 1;
        let client = match OpenAiClient::from_config(&config) {
            Ok(client) => client,
            Err(error) => panic!("client should build: {error}"),
        };

        let error = match client.complete_structured(&request("gpt-4o-mini")).await {
            Ok(value) => panic!("expected timeout, got {value}"),
            Err(error) => error,
        };
        assert!(matches!(error, LlmError::Timeout(after) if after == Duration::from_secs(1)));
        assert_eq!(
            PlanError::from(error),
            PlanError::Gateway(GatewayError::Timeout { after_secs: 1 })
        );
    }

    #[tokio::test]
    async fn server_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .expect(1)
            .mount(&server)
            .await;

        let client = match OpenAiClient::from_config(&llm_config(&server.uri())) {
            Ok(client) => client,
            Err(error) => panic!("client should build: {error}"),
        };
        let error = client.complete_structured(&request("gpt-4o-mini")).await.err();
        match error {
            Some(error) => assert_eq!(PlanError::from(error).stage(), ErrorStage::ServiceCall),
            None => panic!("expected a service error"),
        }
    }

    #[tokio::test]
    async fn refusal_and_free_text_are_payload_failures() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [
                    { "message": { "role": "assistant", "content": null, "refusal": "I can't help with that." } }
                ]
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(completion("Here are three lovely hotels!")),
            )
            .mount(&server)
            .await;

        let client = match OpenAiClient::from_config(&llm_config(&server.uri())) {
            Ok(client) => client,
            Err(error) => panic!("client should build: {error}"),
        };

        let refusal = client.complete_structured(&request("gpt-4o-mini")).await.err();
        assert!(matches!(refusal, Some(LlmError::Refusal(_))));

        let free_text = client.complete_structured(&request("gpt-4o-mini")).await.err();
        assert!(matches!(free_text, Some(LlmError::MalformedPayload(_))));
    }
}
