use hotelscout_core::schema::{hotels_response_schema, SCHEMA_NAME};
use serde_json::json;

use crate::commands::CommandResult;

/// Prints the `json_schema` response format exactly as it is sent to the service.
pub fn run() -> CommandResult {
    let document = json!({
        "name": SCHEMA_NAME,
        "strict": true,
        "schema": hotels_response_schema(),
    });
    CommandResult::document("schema", &document)
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::run;

    #[test]
    fn prints_strict_named_schema() {
        let result = run();
        assert_eq!(result.exit_code, 0);

        let document: Value = serde_json::from_str(&result.output).unwrap_or(Value::Null);
        assert_eq!(document["name"], "hotels_response");
        assert_eq!(document["strict"], true);
        assert_eq!(document["schema"]["properties"]["suggestions"]["minItems"], 3);
    }
}
