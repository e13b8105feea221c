use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use hotelscout_agent::openai::OpenAiClient;
use hotelscout_agent::runtime::HotelPlanner;
use hotelscout_core::config::{AppConfig, ConfigOverrides, LoadOptions};
use hotelscout_core::domain::request::{
    TravelRequest, DEFAULT_BUDGET_TOTAL_USD, DEFAULT_CHECK_IN, DEFAULT_CITY, DEFAULT_NIGHTS,
};
use hotelscout_core::errors::{InputValidationError, PlanError};
use hotelscout_core::trace::{TraceLevel, Tracer, TracingSink};

use crate::commands::{CommandResult, EXIT_INTERNAL, EXIT_IO, EXIT_REQUEST_VALIDATION};
use crate::logging;

const COMMAND: &str = "suggest";

#[derive(Debug, Clone, Args)]
pub struct SuggestArgs {
    #[arg(long, default_value = DEFAULT_CITY, help = "Destination city")]
    pub city: String,
    #[arg(long = "check-in", default_value = DEFAULT_CHECK_IN, help = "Check-in date (YYYY-MM-DD)")]
    pub check_in: String,
    #[arg(long, default_value_t = DEFAULT_NIGHTS, help = "Number of nights")]
    pub nights: u32,
    #[arg(long, default_value_t = DEFAULT_BUDGET_TOTAL_USD, help = "Total budget in USD")]
    pub budget: u32,
    #[arg(short, long, help = "Prompt for each field, using the flag values as defaults")]
    pub interactive: bool,
    #[arg(long, help = "Override llm.model")]
    pub model: Option<String>,
    #[arg(long, help = "Trace level: 0 silent, 1 basic, 2 verbose")]
    pub trace_level: Option<TraceLevel>,
}

impl SuggestArgs {
    pub fn request(&self) -> TravelRequest {
        TravelRequest::new(self.city.clone(), self.check_in.clone(), self.nights, self.budget)
    }

    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            llm_model: self.model.clone(),
            trace_level: self.trace_level,
            ..ConfigOverrides::default()
        }
    }
}

pub fn run(args: SuggestArgs, config_path: Option<PathBuf>) -> CommandResult {
    let options = LoadOptions {
        require_file: config_path.is_some(),
        config_path,
        overrides: args.overrides(),
        ..LoadOptions::default()
    };
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => return CommandResult::from_config_error(COMMAND, &error),
    };
    logging::init(&config);

    let stdin = io::stdin();
    let request = match resolve_request(&args, &config, &mut stdin.lock(), &mut io::stderr()) {
        Ok(request) => request,
        Err(result) => return result,
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(COMMAND, "io", format!("async runtime: {error}"), EXIT_IO)
        }
    };

    runtime.block_on(execute(request, &config))
}

/// The request to plan for. The credential is checked before any prompt is
/// shown so a missing key fails without asking for input.
fn resolve_request<R, W>(
    args: &SuggestArgs,
    config: &AppConfig,
    input: &mut R,
    output: &mut W,
) -> Result<TravelRequest, CommandResult>
where
    R: BufRead,
    W: Write,
{
    if let Err(error) = config.llm.credential() {
        return Err(CommandResult::from_config_error(COMMAND, &error));
    }

    if !args.interactive {
        return Ok(args.request());
    }

    prompt_request(input, output, &args.request()).map_err(prompt_failure)
}

/// Runs one planning cycle against the configured reasoning service.
pub async fn execute(request: TravelRequest, config: &AppConfig) -> CommandResult {
    let tracer = Tracer::new(config.trace.level, Arc::new(TracingSink));

    let planner = match OpenAiClient::from_config(&config.llm)
        .and_then(|client| HotelPlanner::from_config(client, config, tracer))
    {
        Ok(planner) => planner,
        Err(error) => return CommandResult::from_plan_error(COMMAND, &error),
    };

    match planner.plan(request).await {
        Ok(state) => match state.into_hotels() {
            Some(hotels) => CommandResult::document(COMMAND, &hotels),
            None => CommandResult::failure(
                COMMAND,
                "internal",
                "planner completed without a response",
                EXIT_INTERNAL,
            ),
        },
        Err(error) => CommandResult::from_plan_error(COMMAND, &error),
    }
}

/// Asks for each request field on `output`; a blank answer keeps the default.
pub fn prompt_request<R, W>(input: &mut R, output: &mut W, defaults: &TravelRequest) -> Result<TravelRequest>
where
    R: BufRead,
    W: Write,
{
    let city = ask(input, output, "City", &defaults.city)?;
    let check_in = ask(input, output, "Check-in", &defaults.check_in)?;
    let nights = ask(input, output, "Nights", &defaults.nights.to_string())?;
    let budget = ask(input, output, "Budget total USD", &defaults.budget_total_usd.to_string())?;

    Ok(TravelRequest::new(
        city,
        check_in,
        parse_whole_number("nights", &nights)?,
        parse_whole_number("budget_total_usd", &budget)?,
    ))
}

fn ask<R, W>(input: &mut R, output: &mut W, label: &str, default: &str) -> Result<String>
where
    R: BufRead,
    W: Write,
{
    write!(output, "{label} [{default}]: ").context("failed to write prompt")?;
    output.flush().context("failed to flush prompt")?;

    let mut line = String::new();
    input.read_line(&mut line).with_context(|| format!("failed to read {label}"))?;

    let answer = line.trim();
    Ok(if answer.is_empty() { default.to_string() } else { answer.to_string() })
}

fn parse_whole_number(field: &'static str, raw: &str) -> Result<u32> {
    raw.parse::<u32>()
        .map_err(|_| InputValidationError::new(field, format!("must be a whole number >= 1 (got `{raw}`)")))
        .map_err(anyhow::Error::from)
}

fn prompt_failure(error: anyhow::Error) -> CommandResult {
    match error.downcast::<InputValidationError>() {
        Ok(invalid) => {
            let error = PlanError::from(invalid);
            CommandResult::failure(COMMAND, error.error_class(), error.user_message(), EXIT_REQUEST_VALIDATION)
        }
        Err(other) => CommandResult::failure(COMMAND, "io", format!("{other:#}"), EXIT_IO),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use clap::Parser;
    use hotelscout_core::config::AppConfig;
    use hotelscout_core::domain::request::TravelRequest;
    use hotelscout_core::errors::InputValidationError;

    use super::{prompt_request, resolve_request, SuggestArgs};

    #[derive(Debug, Parser)]
    struct Harness {
        #[command(flatten)]
        args: SuggestArgs,
    }

    fn args(argv: &[&str]) -> SuggestArgs {
        let argv = std::iter::once("suggest").chain(argv.iter().copied());
        match Harness::try_parse_from(argv) {
            Ok(harness) => harness.args,
            Err(error) => panic!("arguments should parse: {error}"),
        }
    }

    fn keyed_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.llm.api_key = Some("sk-test".to_string().into());
        config
    }

    #[test]
    fn missing_credential_fails_before_prompting() {
        let mut input = Cursor::new("Lisbon\n2026-04-01\n5\n2200\n");
        let mut output = Vec::new();

        let result = match resolve_request(&args(&["-i"]), &AppConfig::default(), &mut input, &mut output) {
            Ok(request) => panic!("expected configuration failure, got {request:?}"),
            Err(result) => result,
        };
        assert_eq!(result.exit_code, 2);
        assert!(result.output.contains("\"error_class\":\"configuration\""), "{}", result.output);
        assert!(output.is_empty(), "no prompt should be written");
        assert_eq!(input.position(), 0, "no answer should be read");
    }

    #[test]
    fn interactive_answers_are_used_once_credential_is_present() {
        let mut input = Cursor::new("Lisbon\n2026-04-01\n5\n2200\n");
        let mut output = Vec::new();

        let request = resolve_request(&args(&["--interactive"]), &keyed_config(), &mut input, &mut output).ok();
        assert_eq!(request, Some(TravelRequest::new("Lisbon", "2026-04-01", 5, 2200)));
        assert!(!output.is_empty());
    }

    #[test]
    fn flag_request_skips_prompting() {
        let mut input = Cursor::new("");
        let mut output = Vec::new();

        let request =
            resolve_request(&args(&["--city", "Rome", "--nights", "2"]), &keyed_config(), &mut input, &mut output)
                .ok();
        assert_eq!(request, Some(TravelRequest::new("Rome", "2025-10-12", 2, 1500)));
        assert!(output.is_empty());
    }

    #[test]
    fn blank_answers_keep_defaults() {
        let mut input = Cursor::new("\n\n\n\n");
        let mut output = Vec::new();

        let request = match prompt_request(&mut input, &mut output, &TravelRequest::default()) {
            Ok(request) => request,
            Err(error) => panic!("prompting should succeed: {error}"),
        };
        assert_eq!(request, TravelRequest::default());

        let transcript = String::from_utf8_lossy(&output);
        assert!(transcript.contains("City [Paris]: "));
        assert!(transcript.contains("Check-in [2025-10-12]: "));
        assert!(transcript.contains("Nights [3]: "));
        assert!(transcript.contains("Budget total USD [1500]: "));
    }

    #[test]
    fn answers_replace_defaults() {
        let mut input = Cursor::new("Lisbon\n2026-04-01\n5\n2200\n");
        let mut output = Vec::new();

        let request = prompt_request(&mut input, &mut output, &TravelRequest::default()).ok();
        assert_eq!(request, Some(TravelRequest::new("Lisbon", "2026-04-01", 5, 2200)));
    }

    #[test]
    fn non_numeric_nights_is_a_validation_error() {
        let mut input = Cursor::new("\n\nthree\n\n");
        let mut output = Vec::new();

        let error = match prompt_request(&mut input, &mut output, &TravelRequest::default()) {
            Ok(request) => panic!("expected failure, got {request:?}"),
            Err(error) => error,
        };
        let invalid = error.downcast_ref::<InputValidationError>();
        assert_eq!(invalid.map(|invalid| invalid.field), Some("nights"));
    }
}
