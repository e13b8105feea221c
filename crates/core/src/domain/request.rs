use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::InputValidationError;

pub const DEFAULT_CITY: &str = "Paris";
pub const DEFAULT_CHECK_IN: &str = "2025-10-12";
pub const DEFAULT_NIGHTS: u32 = 3;
pub const DEFAULT_BUDGET_TOTAL_USD: u32 = 1500;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelRequest {
    pub city: String,
    pub check_in: String,
    pub nights: u32,
    pub budget_total_usd: u32,
}

impl Default for TravelRequest {
    fn default() -> Self {
        Self {
            city: DEFAULT_CITY.to_string(),
            check_in: DEFAULT_CHECK_IN.to_string(),
            nights: DEFAULT_NIGHTS,
            budget_total_usd: DEFAULT_BUDGET_TOTAL_USD,
        }
    }
}

impl TravelRequest {
    pub fn new(
        city: impl Into<String>,
        check_in: impl Into<String>,
        nights: u32,
        budget_total_usd: u32,
    ) -> Self {
        Self { city: city.into(), check_in: check_in.into(), nights, budget_total_usd }
    }

    pub fn validate(&self) -> Result<(), InputValidationError> {
        if self.city.trim().is_empty() {
            return Err(InputValidationError::new("city", "must not be empty"));
        }
        if self.check_in.trim().is_empty() {
            return Err(InputValidationError::new("check_in", "must not be empty"));
        }
        if self.nights < 1 {
            return Err(InputValidationError::new("nights", format!("must be >= 1 (got {})", self.nights)));
        }
        if self.budget_total_usd < 1 {
            return Err(InputValidationError::new(
                "budget_total_usd",
                format!("must be >= 1 (got {})", self.budget_total_usd),
            ));
        }
        Ok(())
    }

    /// Parsed check-in date, when `check_in` is an ISO `YYYY-MM-DD` string.
    pub fn check_in_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.check_in.trim(), "%Y-%m-%d").ok()
    }

    pub fn check_out_date(&self) -> Option<NaiveDate> {
        self.check_in_date()?.checked_add_days(Days::new(u64::from(self.nights)))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::TravelRequest;

    #[test]
    fn default_request_matches_entry_defaults() {
        let request = TravelRequest::default();
        assert_eq!(request.city, "Paris");
        assert_eq!(request.check_in, "2025-10-12");
        assert_eq!(request.nights, 3);
        assert_eq!(request.budget_total_usd, 1500);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn zero_nights_is_rejected() {
        let request = TravelRequest { nights: 0, ..TravelRequest::default() };
        let error = request.validate().expect_err("nights = 0 must be rejected");
        assert_eq!(error.field, "nights");
    }

    #[test]
    fn blank_city_and_zero_budget_are_rejected() {
        let blank_city = TravelRequest { city: "   ".to_string(), ..TravelRequest::default() };
        assert_eq!(blank_city.validate().map_err(|error| error.field), Err("city"));

        let no_budget = TravelRequest { budget_total_usd: 0, ..TravelRequest::default() };
        assert_eq!(no_budget.validate().map_err(|error| error.field), Err("budget_total_usd"));
    }

    #[test]
    fn check_out_is_derived_from_iso_check_in() {
        let request = TravelRequest::new("Lisbon", "2025-12-30", 3, 900);
        assert_eq!(request.check_out_date(), NaiveDate::from_ymd_opt(2026, 1, 2));

        let free_form = TravelRequest::new("Lisbon", "next friday", 3, 900);
        assert!(free_form.validate().is_ok());
        assert_eq!(free_form.check_out_date(), None);
    }
}
