use std::time::Instant;

use hotelscout_core::config::AppConfig;
use hotelscout_core::domain::hotel::HotelsResponse;
use hotelscout_core::domain::request::TravelRequest;
use hotelscout_core::domain::state::ExecutionState;
use hotelscout_core::errors::PlanError;
use hotelscout_core::trace::{TraceEvent, TraceLevel, Tracer};
use tracing::warn;

use crate::composer::{HotelPromptComposer, InstructionComposer};
use crate::gateway::CompletionGateway;
use crate::guardrails::{BudgetGuardrail, GuardrailDecision};
use crate::llm::LlmClient;

const NODE_NAME: &str = "hotel_planner";

/// Runs the single planning step: validate, compose, call the service,
/// review the budget, attach.
pub struct HotelPlanner<L, C = HotelPromptComposer> {
    composer: C,
    gateway: CompletionGateway<L>,
    guardrail: BudgetGuardrail,
    tracer: Tracer,
}

impl<L> HotelPlanner<L, HotelPromptComposer>
where
    L: LlmClient,
{
    pub fn from_config(client: L, config: &AppConfig, tracer: Tracer) -> Result<Self, PlanError> {
        Self::new(client, HotelPromptComposer, config, tracer)
    }
}

impl<L, C> HotelPlanner<L, C>
where
    L: LlmClient,
    C: InstructionComposer,
{
    /// Fails with a configuration error when no credential is configured, so
    /// an unusable planner never reaches the service.
    pub fn new(client: L, composer: C, config: &AppConfig, tracer: Tracer) -> Result<Self, PlanError> {
        config.llm.credential()?;

        Ok(Self {
            composer,
            gateway: CompletionGateway::from_config(client, &config.llm),
            guardrail: BudgetGuardrail::new(config.planner.budget_policy),
            tracer,
        })
    }

    pub async fn plan(&self, request: TravelRequest) -> Result<ExecutionState, PlanError> {
        self.step(ExecutionState::pending(request)).await.into_result()
    }

    /// Advances a pending state to `Complete` or `Failed`. Terminal states are
    /// returned unchanged.
    pub async fn step(&self, state: ExecutionState) -> ExecutionState {
        if state.phase().is_terminal() {
            return state;
        }

        let started = Instant::now();
        self.trace_started(state.request());

        match self.run(state.request()).await {
            Ok(hotels) => {
                self.tracer.emit(
                    TraceEvent::new(
                        "planner.step_completed",
                        TraceLevel::Basic,
                        format!("node:end {NODE_NAME} ({:.2}s)", started.elapsed().as_secs_f64()),
                    )
                    .with_metadata("elapsed_ms", started.elapsed().as_millis().to_string()),
                );
                state.complete(hotels)
            }
            Err(error) => {
                warn!(
                    event_name = "planner.step_failed",
                    stage = error.stage().as_str(),
                    error = %error,
                    "planning step failed"
                );
                self.tracer.emit(
                    TraceEvent::new(
                        "planner.step_failed",
                        TraceLevel::Basic,
                        format!("node:failed {NODE_NAME}: {error}"),
                    )
                    .with_metadata("stage", error.stage().as_str())
                    .with_metadata("elapsed_ms", started.elapsed().as_millis().to_string()),
                );
                state.fail(error)
            }
        }
    }

    async fn run(&self, request: &TravelRequest) -> Result<HotelsResponse, PlanError> {
        request.validate()?;

        let instruction = self.composer.compose(request, &self.tracer)?;
        let hotels = self.gateway.request_hotels(&instruction).await?;
        self.trace_summary(&hotels);

        match self.guardrail.evaluate(request, &hotels) {
            GuardrailDecision::Allow => Ok(hotels),
            GuardrailDecision::Advise { findings } => {
                for finding in &findings {
                    warn!(
                        event_name = "planner.budget_advisory",
                        field = %finding.field,
                        reason_code = finding.reason_code(),
                        "{}",
                        finding.constraint
                    );
                    self.tracer.emit(
                        TraceEvent::new(
                            "planner.budget_advisory",
                            TraceLevel::Basic,
                            format!("{}: {}", finding.field, finding.constraint),
                        )
                        .with_metadata("reason_code", finding.reason_code()),
                    );
                }
                Ok(hotels)
            }
            GuardrailDecision::Deny { violation } => Err(violation.into()),
        }
    }

    fn trace_started(&self, request: &TravelRequest) {
        let check_out = request
            .check_out_date()
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "unknown".to_string());

        self.tracer.emit(
            TraceEvent::new(
                "planner.step_started",
                TraceLevel::Basic,
                format!(
                    "node:start {NODE_NAME} city={} check_in={} nights={} budget=${}",
                    request.city, request.check_in, request.nights, request.budget_total_usd
                ),
            )
            .with_metadata("city", request.city.clone())
            .with_metadata("check_in", request.check_in.clone())
            .with_metadata("nights", request.nights.to_string())
            .with_metadata("budget_total_usd", request.budget_total_usd.to_string())
            .with_metadata("check_out", check_out)
            .with_metadata("model", self.gateway.model()),
        );
    }

    fn trace_summary(&self, hotels: &HotelsResponse) {
        let mut message = format!("output summary: suggestions: {}", hotels.suggestions.len());
        for line in hotels.summary_lines() {
            message.push_str("\n  ");
            message.push_str(&line);
        }

        self.tracer.emit(
            TraceEvent::new("planner.result_summary", TraceLevel::Basic, message)
                .with_metadata("suggestions", hotels.suggestions.len().to_string()),
        );
    }
}
