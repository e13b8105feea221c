use hotelscout_core::domain::hotel::SUGGESTION_COUNT;
use hotelscout_core::domain::request::TravelRequest;
use hotelscout_core::errors::PlanError;
use hotelscout_core::trace::{TraceEvent, TraceLevel, Tracer};
use tera::{Context, Tera};

const HOTEL_PROMPT_TEMPLATE: &str = "\
You are a travel assistant. Create exactly {{ count }} hotel suggestions in {{ city }}
for a stay starting {{ check_in }} for {{ nights }} nights.
Every suggestion needs a name, a neighborhood, price_per_night_usd, total_estimated_usd and a short list of pros.
Ensure total_estimated_usd = price_per_night_usd * {{ nights }} and it must not exceed {{ budget }} USD total.
Prefer walkable areas, strong reviews, and price variety (value/mid/premium-but-within-budget).
Return JSON that strictly matches the schema.";

/// Natural-language instruction sent to the reasoning service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    text: String,
}

impl Instruction {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

pub trait InstructionComposer: Send + Sync {
    fn compose(&self, request: &TravelRequest, tracer: &Tracer) -> Result<Instruction, PlanError>;
}

/// Renders the hotel prompt. Output depends only on the request.
#[derive(Clone, Copy, Debug, Default)]
pub struct HotelPromptComposer;

impl HotelPromptComposer {
    fn render(&self, request: &TravelRequest) -> Result<String, tera::Error> {
        let mut context = Context::new();
        context.insert("count", &SUGGESTION_COUNT);
        context.insert("city", request.city.trim());
        context.insert("check_in", request.check_in.trim());
        context.insert("nights", &request.nights);
        context.insert("budget", &request.budget_total_usd);

        Tera::one_off(HOTEL_PROMPT_TEMPLATE, &context, false)
    }
}

impl InstructionComposer for HotelPromptComposer {
    fn compose(&self, request: &TravelRequest, tracer: &Tracer) -> Result<Instruction, PlanError> {
        let text = self
            .render(request)
            .map_err(|error| PlanError::Composition(error.to_string()))?;

        tracer.emit(
            TraceEvent::new("composer.instruction_composed", TraceLevel::Verbose, text.clone())
                .with_metadata("chars", text.len().to_string()),
        );

        Ok(Instruction::new(text))
    }
}
