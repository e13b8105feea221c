//! Hotel planning runtime.
//!
//! One planning cycle is a single step:
//! 1. **Validation** - reject impossible travel requests before anything else
//! 2. **Composition** (`composer`) - render the instruction for the service
//! 3. **Completion** (`gateway`) - one structured call, bounded by a timeout,
//!    followed by schema validation
//! 4. **Budget review** (`guardrails`) - nightly arithmetic and budget ceiling
//!
//! `HotelPlanner` in `runtime` drives the step. The reasoning service sits
//! behind the `LlmClient` trait: `OpenAiClient` talks HTTP, `ScriptedLlmClient`
//! answers from memory.
//!
//! The service only proposes hotels. Whether a proposal is accepted is decided
//! here, deterministically.

pub mod composer;
pub mod gateway;
pub mod guardrails;
pub mod llm;
pub mod openai;
pub mod runtime;
pub mod scripted;

pub use composer::{HotelPromptComposer, Instruction, InstructionComposer};
pub use gateway::CompletionGateway;
pub use guardrails::{BudgetFinding, BudgetGuardrail, GuardrailDecision};
pub use llm::{LlmClient, LlmError, StructuredRequest};
pub use openai::OpenAiClient;
pub use runtime::HotelPlanner;
pub use scripted::{ScriptedLlmClient, ScriptedReply};
