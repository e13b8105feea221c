pub mod config;
pub mod schema;
pub mod suggest;
pub mod validate;

use hotelscout_core::config::ConfigError;
use hotelscout_core::errors::{ErrorStage, PlanError};
use serde::Serialize;

pub const EXIT_OK: u8 = 0;
pub const EXIT_CONFIGURATION: u8 = 2;
pub const EXIT_REQUEST_VALIDATION: u8 = 3;
pub const EXIT_SERVICE_CALL: u8 = 4;
pub const EXIT_SCHEMA_VALIDATION: u8 = 5;
pub const EXIT_INTERNAL: u8 = 6;
pub const EXIT_IO: u8 = 7;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
        };
        Self { exit_code: EXIT_OK, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    /// Successful command whose stdout is a JSON document rather than an outcome envelope.
    pub fn document<T: Serialize>(command: &str, document: &T) -> Self {
        match serde_json::to_string_pretty(document) {
            Ok(output) => Self { exit_code: EXIT_OK, output },
            Err(error) => Self::failure(command, "serialization", error.to_string(), EXIT_INTERNAL),
        }
    }

    pub fn from_plan_error(command: &str, error: &PlanError) -> Self {
        Self::failure(command, error.error_class(), error.user_message(), exit_code_for(error.stage()))
    }

    pub fn from_config_error(command: &str, error: &ConfigError) -> Self {
        Self::failure(command, "configuration", error.to_string(), EXIT_CONFIGURATION)
    }
}

pub fn exit_code_for(stage: ErrorStage) -> u8 {
    match stage {
        ErrorStage::Configuration => EXIT_CONFIGURATION,
        ErrorStage::RequestValidation => EXIT_REQUEST_VALIDATION,
        ErrorStage::ServiceCall => EXIT_SERVICE_CALL,
        ErrorStage::SchemaValidation => EXIT_SCHEMA_VALIDATION,
        ErrorStage::RequestComposition => EXIT_INTERNAL,
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

#[cfg(test)]
mod tests {
    use hotelscout_core::errors::{ErrorStage, GatewayError, PlanError};

    use super::{exit_code_for, CommandResult};

    #[test]
    fn each_stage_has_a_distinct_exit_code() {
        let stages = [
            ErrorStage::Configuration,
            ErrorStage::RequestValidation,
            ErrorStage::RequestComposition,
            ErrorStage::ServiceCall,
            ErrorStage::SchemaValidation,
        ];
        let mut codes: Vec<u8> = stages.iter().map(|stage| exit_code_for(*stage)).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), stages.len());
        assert!(!codes.contains(&0));
    }

    #[test]
    fn plan_error_outcome_carries_class_and_user_message() {
        let error = PlanError::from(GatewayError::Timeout { after_secs: 60 });
        let result = CommandResult::from_plan_error("suggest", &error);

        assert_eq!(result.exit_code, 4);
        let payload: serde_json::Value = match serde_json::from_str(&result.output) {
            Ok(payload) => payload,
            Err(error) => panic!("outcome should be JSON: {error}"),
        };
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "service_call");
        assert!(payload["message"].as_str().unwrap_or_default().contains("did not answer in time"));
    }
}
