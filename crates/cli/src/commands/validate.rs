use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use hotelscout_agent::guardrails::BudgetGuardrail;
use hotelscout_core::domain::request::TravelRequest;
use hotelscout_core::errors::PlanError;
use hotelscout_core::schema::validate_hotels_json;

use crate::commands::{CommandResult, EXIT_IO, EXIT_SCHEMA_VALIDATION};

const COMMAND: &str = "validate";

#[derive(Debug, Clone, Args)]
pub struct ValidateArgs {
    #[arg(value_name = "FILE", help = "HotelsResponse JSON document, or `-` for stdin")]
    pub path: PathBuf,
    #[arg(long, help = "Treat budget findings as schema violations")]
    pub strict: bool,
}

pub fn run(args: ValidateArgs) -> CommandResult {
    let raw = match read_document(&args.path) {
        Ok(raw) => raw,
        Err(error) => return CommandResult::failure(COMMAND, "io", format!("{error:#}"), EXIT_IO),
    };
    check(&raw, args.strict)
}

/// Validates a document against the response schema, then reviews it against
/// the request fields it echoes.
pub fn check(raw: &str, strict: bool) -> CommandResult {
    let hotels = match validate_hotels_json(raw) {
        Ok(hotels) => hotels,
        Err(violation) => {
            return CommandResult::from_plan_error(COMMAND, &PlanError::from(violation))
        }
    };

    let request = TravelRequest::new(
        hotels.city.clone(),
        hotels.check_in.clone(),
        hotels.nights,
        hotels.budget_total_usd,
    );
    let findings = BudgetGuardrail::default().review(&request, &hotels);

    if strict {
        if let Some(first) = findings.into_iter().next() {
            let violation = first.into_violation();
            return CommandResult::failure(
                COMMAND,
                "schema_validation",
                format!("budget check failed at {violation}"),
                EXIT_SCHEMA_VALIDATION,
            );
        }
        return CommandResult::success(COMMAND, summary(&hotels.summary_lines(), &[]));
    }

    let notes: Vec<String> =
        findings.iter().map(|finding| format!("{}: {}", finding.field, finding.constraint)).collect();
    CommandResult::success(COMMAND, summary(&hotels.summary_lines(), &notes))
}

fn summary(lines: &[String], notes: &[String]) -> String {
    let mut message = format!("valid hotels response with {} suggestions", lines.len());
    for line in lines {
        message.push_str("\n  ");
        message.push_str(line);
    }
    for note in notes {
        message.push_str("\n  advisory: ");
        message.push_str(note);
    }
    message
}

fn read_document(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut raw = String::new();
        io::stdin().read_to_string(&mut raw).context("failed to read document from stdin")?;
        return Ok(raw);
    }

    fs::read_to_string(path).with_context(|| format!("failed to read `{}`", path.display()))
}
