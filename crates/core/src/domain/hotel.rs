use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::SchemaViolation;
use crate::schema;

/// Number of suggestions every response must carry.
pub const SUGGESTION_COUNT: usize = 3;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct HotelSuggestion {
    pub name: String,
    pub neighborhood: String,
    /// Nightly rate in whole USD
    #[schemars(range(min = 1))]
    pub price_per_night_usd: u32,
    /// Nightly rate times the number of nights
    #[schemars(range(min = 1))]
    pub total_estimated_usd: u32,
    #[serde(default)]
    pub pros: Vec<String>,
}

/// Three hotel suggestions for one stay, with the request fields echoed back.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct HotelsResponse {
    pub city: String,
    /// ISO date, YYYY-MM-DD
    pub check_in: String,
    #[schemars(range(min = 1))]
    pub nights: u32,
    #[schemars(range(min = 1))]
    pub budget_total_usd: u32,
    #[schemars(length(min = 3, max = 3))]
    pub suggestions: Vec<HotelSuggestion>,
}

impl HotelsResponse {
    /// Re-checks an already typed value against the response schema.
    pub fn validate(&self) -> Result<(), SchemaViolation> {
        schema::validate_response(self)
    }

    pub fn summary_lines(&self) -> Vec<String> {
        self.suggestions
            .iter()
            .enumerate()
            .map(|(index, hotel)| {
                format!(
                    "{}. {} ({})  ${}/night  -> total ${}",
                    index + 1,
                    hotel.name,
                    hotel.neighborhood,
                    hotel.price_per_night_usd,
                    hotel.total_estimated_usd
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{HotelSuggestion, HotelsResponse};

    fn hotel(name: &str, nightly: u32) -> HotelSuggestion {
        HotelSuggestion {
            name: name.to_string(),
            neighborhood: "Le Marais".to_string(),
            price_per_night_usd: nightly,
            total_estimated_usd: nightly * 3,
            pros: vec!["walkable".to_string()],
        }
    }

    #[test]
    fn serialized_field_order_follows_contract() {
        let response = HotelsResponse {
            city: "Paris".to_string(),
            check_in: "2025-10-12".to_string(),
            nights: 3,
            budget_total_usd: 1500,
            suggestions: vec![hotel("A", 120), hotel("B", 180), hotel("C", 300)],
        };

        let json = serde_json::to_string(&response).expect("serialize");
        let positions: Vec<usize> = ["\"city\"", "\"check_in\"", "\"nights\"", "\"budget_total_usd\"", "\"suggestions\""]
            .iter()
            .map(|key| json.find(key).expect("key present"))
            .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]), "unexpected order in {json}");
    }

    #[test]
    fn summary_lists_each_suggestion() {
        let response = HotelsResponse {
            city: "Paris".to_string(),
            check_in: "2025-10-12".to_string(),
            nights: 3,
            budget_total_usd: 1500,
            suggestions: vec![hotel("A", 120), hotel("B", 180), hotel("C", 300)],
        };

        let lines = response.summary_lines();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "1. A (Le Marais)  $120/night  -> total $360");
    }
}
