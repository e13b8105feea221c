pub mod config;
pub mod domain;
pub mod errors;
pub mod schema;
pub mod trace;

pub use config::{AppConfig, BudgetPolicy, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use domain::hotel::{HotelSuggestion, HotelsResponse, SUGGESTION_COUNT};
pub use domain::request::TravelRequest;
pub use domain::state::{ExecutionState, FlowPhase};
pub use errors::{
    Constraint, ErrorStage, GatewayError, InputValidationError, PlanError, SchemaViolation,
};
pub use trace::{
    InMemoryTraceSink, NoopTraceSink, TraceEvent, TraceLevel, TraceSink, Tracer, TracingSink,
};
