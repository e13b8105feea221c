use hotelscout_core::config::BudgetPolicy;
use hotelscout_core::domain::hotel::HotelsResponse;
use hotelscout_core::domain::request::TravelRequest;
use hotelscout_core::errors::{Constraint, SchemaViolation};

/// A suggestion or echoed field that disagrees with the request arithmetic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BudgetFinding {
    pub field: String,
    pub constraint: Constraint,
}

impl BudgetFinding {
    pub fn reason_code(&self) -> &'static str {
        match self.constraint {
            Constraint::TotalMatchesNightly { .. } => "total_mismatch",
            Constraint::WithinBudget { .. } => "over_budget",
            Constraint::EchoesRequest { .. } => "request_not_echoed",
            _ => "budget_check",
        }
    }

    pub fn into_violation(self) -> SchemaViolation {
        SchemaViolation::new(self.field, self.constraint)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardrailDecision {
    Allow,
    Advise { findings: Vec<BudgetFinding> },
    Deny { violation: SchemaViolation },
}

/// Checks nightly-rate arithmetic, the budget ceiling and echoed request
/// fields. Never rewrites the response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BudgetGuardrail {
    policy: BudgetPolicy,
}

impl Default for BudgetGuardrail {
    fn default() -> Self {
        Self::new(BudgetPolicy::Advisory)
    }
}

impl BudgetGuardrail {
    pub fn new(policy: BudgetPolicy) -> Self {
        Self { policy }
    }

    pub fn review(&self, request: &TravelRequest, response: &HotelsResponse) -> Vec<BudgetFinding> {
        let mut findings = Vec::new();

        if !response.city.trim().eq_ignore_ascii_case(request.city.trim()) {
            findings.push(echo_finding("city", &request.city, &response.city));
        }
        if response.check_in.trim() != request.check_in.trim() {
            findings.push(echo_finding("check_in", &request.check_in, &response.check_in));
        }
        if response.nights != request.nights {
            findings.push(echo_finding(
                "nights",
                &request.nights.to_string(),
                &response.nights.to_string(),
            ));
        }
        if response.budget_total_usd != request.budget_total_usd {
            findings.push(echo_finding(
                "budget_total_usd",
                &request.budget_total_usd.to_string(),
                &response.budget_total_usd.to_string(),
            ));
        }

        for (index, hotel) in response.suggestions.iter().enumerate() {
            let field = format!("suggestions[{index}].total_estimated_usd");
            let expected = u64::from(hotel.price_per_night_usd) * u64::from(request.nights);

            if u64::from(hotel.total_estimated_usd) != expected {
                findings.push(BudgetFinding {
                    field: field.clone(),
                    constraint: Constraint::TotalMatchesNightly {
                        expected,
                        actual: hotel.total_estimated_usd,
                    },
                });
            }
            if hotel.total_estimated_usd > request.budget_total_usd {
                findings.push(BudgetFinding {
                    field,
                    constraint: Constraint::WithinBudget {
                        budget: request.budget_total_usd,
                        actual: hotel.total_estimated_usd,
                    },
                });
            }
        }

        findings
    }

    pub fn evaluate(&self, request: &TravelRequest, response: &HotelsResponse) -> GuardrailDecision {
        let findings = self.review(request, response);
        if findings.is_empty() {
            return GuardrailDecision::Allow;
        }

        match self.policy {
            BudgetPolicy::Advisory => GuardrailDecision::Advise { findings },
            BudgetPolicy::Enforce => match findings.into_iter().next() {
                Some(first) => GuardrailDecision::Deny { violation: first.into_violation() },
                None => GuardrailDecision::Allow,
            },
        }
    }
}

fn echo_finding(field: &str, expected: &str, actual: &str) -> BudgetFinding {
    BudgetFinding {
        field: field.to_string(),
        constraint: Constraint::EchoesRequest {
            expected: expected.to_string(),
            actual: actual.to_string(),
        },
    }
}
