//! Structural contract for the reasoning service's answer.
//!
//! [`hotels_response_schema`] is the descriptor sent with every completion
//! request; [`validate_hotels_value`] is the check applied to whatever comes
//! back. The two describe the same shape: three suggestions, positive integer
//! money and count fields, non-empty trimmed hotel names.

use schemars::generate::SchemaSettings;
use serde_json::{Map, Value};

use crate::domain::hotel::{HotelSuggestion, HotelsResponse, SUGGESTION_COUNT};
use crate::errors::{Constraint, SchemaViolation};

pub const SCHEMA_NAME: &str = "hotels_response";

/// Descriptor derived from [`HotelsResponse`], tightened for strict
/// structured output: subschemas inlined, every property required and no
/// additional properties anywhere.
pub fn hotels_response_schema() -> Value {
    let generator = SchemaSettings::draft2020_12()
        .with(|settings| {
            settings.inline_subschemas = true;
            settings.meta_schema = None;
        })
        .into_generator();

    let mut schema = generator.into_root_schema_for::<HotelsResponse>().to_value();
    if let Value::Object(root) = &mut schema {
        make_strict(root);
    }
    schema
}

// Strict mode rejects `format` on integers and ignores `default`.
const UNSUPPORTED_KEYWORDS: [&str; 3] = ["title", "format", "default"];

fn make_strict(schema: &mut Map<String, Value>) {
    for keyword in UNSUPPORTED_KEYWORDS {
        schema.remove(keyword);
    }

    if let Some(Value::Object(items)) = schema.get_mut("items") {
        make_strict(items);
    }

    let required = match schema.get_mut("properties") {
        Some(Value::Object(properties)) => {
            for property in properties.values_mut() {
                if let Value::Object(property) = property {
                    make_strict(property);
                }
            }
            Some(properties.keys().cloned().map(Value::String).collect::<Vec<_>>())
        }
        _ => None,
    };

    if let Some(required) = required {
        schema.insert("required".to_string(), Value::Array(required));
        schema.insert("additionalProperties".to_string(), Value::Bool(false));
    }
}

/// Parses raw model output and validates it.
pub fn validate_hotels_json(raw: &str) -> Result<HotelsResponse, SchemaViolation> {
    let value: Value =
        serde_json::from_str(raw).map_err(|error| SchemaViolation::malformed(error.to_string()))?;
    validate_hotels_value(&value)
}

pub fn validate_hotels_value(value: &Value) -> Result<HotelsResponse, SchemaViolation> {
    let root = object_at(value, "$")?;

    let city = required_string(root, "", "city")?;
    let check_in = required_string(root, "", "check_in")?;
    let nights = required_positive(root, "", "nights")?;
    let budget_total_usd = required_positive(root, "", "budget_total_usd")?;

    let items = required(root, "", "suggestions")?.as_array().ok_or_else(|| {
        SchemaViolation::new("suggestions", Constraint::WrongType { expected: "array" })
    })?;
    if items.len() != SUGGESTION_COUNT {
        return Err(SchemaViolation::new(
            "suggestions",
            Constraint::Cardinality { expected: SUGGESTION_COUNT, actual: items.len() },
        ));
    }

    let suggestions = items
        .iter()
        .enumerate()
        .map(|(index, item)| validate_suggestion(item, &format!("suggestions[{index}]")))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(HotelsResponse { city, check_in, nights, budget_total_usd, suggestions })
}

fn validate_suggestion(value: &Value, prefix: &str) -> Result<HotelSuggestion, SchemaViolation> {
    let object = object_at(value, prefix)?;

    let name = required_string(object, prefix, "name")?.trim().to_string();
    if name.is_empty() {
        return Err(SchemaViolation::new(field_path(prefix, "name"), Constraint::NonEmpty));
    }

    let neighborhood = required_string(object, prefix, "neighborhood")?;
    let price_per_night_usd = required_positive(object, prefix, "price_per_night_usd")?;
    let total_estimated_usd = required_positive(object, prefix, "total_estimated_usd")?;

    let pros = match object.get("pros") {
        None => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    SchemaViolation::new(
                        format!("{}[{index}]", field_path(prefix, "pros")),
                        Constraint::WrongType { expected: "string" },
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => {
            return Err(SchemaViolation::new(
                field_path(prefix, "pros"),
                Constraint::WrongType { expected: "array" },
            ))
        }
    };

    Ok(HotelSuggestion { name, neighborhood, price_per_night_usd, total_estimated_usd, pros })
}

/// Typed counterpart of [`validate_hotels_value`].
pub fn validate_response(response: &HotelsResponse) -> Result<(), SchemaViolation> {
    check_positive("nights", response.nights)?;
    check_positive("budget_total_usd", response.budget_total_usd)?;

    if response.suggestions.len() != SUGGESTION_COUNT {
        return Err(SchemaViolation::new(
            "suggestions",
            Constraint::Cardinality {
                expected: SUGGESTION_COUNT,
                actual: response.suggestions.len(),
            },
        ));
    }

    for (index, hotel) in response.suggestions.iter().enumerate() {
        let prefix = format!("suggestions[{index}]");
        if hotel.name.trim().is_empty() {
            return Err(SchemaViolation::new(field_path(&prefix, "name"), Constraint::NonEmpty));
        }
        check_positive(&field_path(&prefix, "price_per_night_usd"), hotel.price_per_night_usd)?;
        check_positive(&field_path(&prefix, "total_estimated_usd"), hotel.total_estimated_usd)?;
    }

    Ok(())
}

fn check_positive(field: &str, value: u32) -> Result<(), SchemaViolation> {
    if value < 1 {
        return Err(SchemaViolation::new(
            field,
            Constraint::Minimum { min: 1, actual: i64::from(value) },
        ));
    }
    Ok(())
}

fn field_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn object_at<'a>(value: &'a Value, field: &str) -> Result<&'a Map<String, Value>, SchemaViolation> {
    value
        .as_object()
        .ok_or_else(|| SchemaViolation::new(field, Constraint::WrongType { expected: "object" }))
}

fn required<'a>(
    object: &'a Map<String, Value>,
    prefix: &str,
    key: &str,
) -> Result<&'a Value, SchemaViolation> {
    object.get(key).ok_or_else(|| SchemaViolation::new(field_path(prefix, key), Constraint::Missing))
}

fn required_string(
    object: &Map<String, Value>,
    prefix: &str,
    key: &str,
) -> Result<String, SchemaViolation> {
    required(object, prefix, key)?.as_str().map(str::to_string).ok_or_else(|| {
        SchemaViolation::new(field_path(prefix, key), Constraint::WrongType { expected: "string" })
    })
}

fn required_positive(
    object: &Map<String, Value>,
    prefix: &str,
    key: &str,
) -> Result<u32, SchemaViolation> {
    let field = field_path(prefix, key);
    let value = integer_at(required(object, prefix, key)?, &field)?;
    if value < 1 {
        return Err(SchemaViolation::new(field, Constraint::Minimum { min: 1, actual: value }));
    }
    u32::try_from(value)
        .map_err(|_| SchemaViolation::new(field, Constraint::OutOfRange { actual: value.to_string() }))
}

// Integral floats (`120.0`) are accepted; anything with a fraction is not.
fn integer_at(value: &Value, field: &str) -> Result<i64, SchemaViolation> {
    if let Some(integer) = value.as_i64() {
        return Ok(integer);
    }
    if let Some(unsigned) = value.as_u64() {
        return Err(SchemaViolation::new(field, Constraint::OutOfRange { actual: unsigned.to_string() }));
    }
    match value.as_f64() {
        Some(float) if float.fract() == 0.0 => {
            if float >= i64::MIN as f64 && float <= i64::MAX as f64 {
                Ok(float as i64)
            } else {
                Err(SchemaViolation::new(field, Constraint::OutOfRange { actual: float.to_string() }))
            }
        }
        _ => Err(SchemaViolation::new(field, Constraint::WrongType { expected: "integer" })),
    }
}
