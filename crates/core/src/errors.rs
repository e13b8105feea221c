use std::fmt;

use thiserror::Error;

/// Constraint a structured payload failed to satisfy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Constraint {
    Missing,
    WrongType { expected: &'static str },
    Minimum { min: i64, actual: i64 },
    OutOfRange { actual: String },
    NonEmpty,
    Cardinality { expected: usize, actual: usize },
    Malformed(String),
    TotalMatchesNightly { expected: u64, actual: u32 },
    WithinBudget { budget: u32, actual: u32 },
    EchoesRequest { expected: String, actual: String },
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "field is required"),
            Self::WrongType { expected } => write!(f, "expected {expected}"),
            Self::Minimum { min, actual } => write!(f, "must be >= {min} (got {actual})"),
            Self::OutOfRange { actual } => write!(f, "value `{actual}` is out of range"),
            Self::NonEmpty => write!(f, "must not be empty"),
            Self::Cardinality { expected, actual } => {
                write!(f, "must contain exactly {expected} entries (got {actual})")
            }
            Self::Malformed(reason) => write!(f, "malformed payload: {reason}"),
            Self::TotalMatchesNightly { expected, actual } => {
                write!(f, "must equal price_per_night_usd * nights = {expected} (got {actual})")
            }
            Self::WithinBudget { budget, actual } => {
                write!(f, "must not exceed budget_total_usd = {budget} (got {actual})")
            }
            Self::EchoesRequest { expected, actual } => {
                write!(f, "must echo the request value `{expected}` (got `{actual}`)")
            }
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{field}: {constraint}")]
pub struct SchemaViolation {
    pub field: String,
    pub constraint: Constraint,
}

impl SchemaViolation {
    pub fn new(field: impl Into<String>, constraint: Constraint) -> Self {
        Self { field: field.into(), constraint }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::new("$", Constraint::Malformed(reason.into()))
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("invalid travel request: {field} {reason}")]
pub struct InputValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl InputValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self { field, reason: reason.into() }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("authentication rejected by reasoning service ({status}): {message}")]
    Authentication { status: u16, message: String },
    #[error("reasoning service error {status}: {message}")]
    Service { status: u16, message: String },
    #[error("reasoning service did not answer within {after_secs}s")]
    Timeout { after_secs: u64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorStage {
    Configuration,
    RequestValidation,
    RequestComposition,
    ServiceCall,
    SchemaValidation,
}

impl ErrorStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::RequestValidation => "request_validation",
            Self::RequestComposition => "request_composition",
            Self::ServiceCall => "service_call",
            Self::SchemaValidation => "schema_validation",
        }
    }
}

impl fmt::Display for ErrorStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of one planning cycle. Every variant is terminal for that cycle.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("configuration failure: {0}")]
    Configuration(String),
    #[error(transparent)]
    InvalidRequest(#[from] InputValidationError),
    #[error("instruction composition failed: {0}")]
    Composition(String),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("schema violation at {0}")]
    SchemaViolation(#[from] SchemaViolation),
}

impl PlanError {
    pub fn stage(&self) -> ErrorStage {
        match self {
            Self::Configuration(_) => ErrorStage::Configuration,
            Self::InvalidRequest(_) => ErrorStage::RequestValidation,
            Self::Composition(_) => ErrorStage::RequestComposition,
            Self::Gateway(_) => ErrorStage::ServiceCall,
            Self::SchemaViolation(_) => ErrorStage::SchemaValidation,
        }
    }

    pub fn error_class(&self) -> &'static str {
        self.stage().as_str()
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::Configuration(message) => {
                format!("Configuration problem: {message}. Set HOTELSCOUT_LLM_API_KEY (or OPENAI_API_KEY) and retry.")
            }
            Self::InvalidRequest(error) => {
                format!("The travel request was rejected: {} {}.", error.field, error.reason)
            }
            Self::Composition(_) => "The instruction for the reasoning service could not be built.".to_string(),
            Self::Gateway(GatewayError::Timeout { .. }) => {
                "The reasoning service did not answer in time. Please retry shortly.".to_string()
            }
            Self::Gateway(GatewayError::Authentication { .. }) => {
                "The reasoning service rejected the configured credential.".to_string()
            }
            Self::Gateway(_) => {
                "The reasoning service is unavailable. Please retry shortly.".to_string()
            }
            Self::SchemaViolation(violation) => {
                format!("The reasoning service returned an invalid result ({violation}).")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::{
        Constraint, ErrorStage, GatewayError, InputValidationError, PlanError, SchemaViolation,
    };

    #[test]
    fn schema_violation_names_field_and_constraint() {
        let violation = SchemaViolation::new(
            "suggestions[1].price_per_night_usd",
            Constraint::Minimum { min: 1, actual: -5 },
        );

        assert_eq!(violation.to_string(), "suggestions[1].price_per_night_usd: must be >= 1 (got -5)");

        let error = PlanError::from(violation);
        assert_eq!(error.stage(), ErrorStage::SchemaValidation);
        assert!(error.user_message().contains("suggestions[1].price_per_night_usd"));
    }

    #[test]
    fn each_variant_maps_to_its_stage() {
        let cases = [
            (PlanError::Configuration("missing credential".to_owned()), "configuration"),
            (
                PlanError::from(InputValidationError::new("nights", "must be >= 1")),
                "request_validation",
            ),
            (PlanError::Composition("template".to_owned()), "request_composition"),
            (PlanError::from(GatewayError::Timeout { after_secs: 5 }), "service_call"),
            (PlanError::from(SchemaViolation::malformed("eof")), "schema_validation"),
        ];

        for (error, class) in cases {
            assert_eq!(error.error_class(), class, "unexpected class for {error}");
        }
    }

    #[test]
    fn gateway_messages_are_user_safe() {
        let auth = PlanError::from(GatewayError::Authentication {
            status: 401,
            message: "sk-live-secret is invalid".to_owned(),
        });
        assert!(!auth.user_message().contains("sk-live-secret"));

        let timeout = PlanError::from(GatewayError::Timeout { after_secs: 30 });
        assert!(timeout.user_message().contains("did not answer in time"));
    }

    #[test]
    fn cardinality_constraint_reads_naturally() {
        let violation = SchemaViolation::new(
            "suggestions",
            Constraint::Cardinality { expected: 3, actual: 2 },
        );
        assert_eq!(violation.to_string(), "suggestions: must contain exactly 3 entries (got 2)");
    }
}
