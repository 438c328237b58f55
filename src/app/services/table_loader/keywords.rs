//! Keyword parsing and checks

use crate::app::models::{Checker, KeywordDescriptor, KeywordValue, ScalarType};
use crate::app::services::fits_io::HeaderCard;
use tracing::trace;

/// Number found in a keyword value
#[derive(Debug, Clone, Copy)]
enum Number {
    Int(i32),
    Double(f64),
}

impl Number {
    fn scalar_type(&self) -> ScalarType {
        match self {
            Number::Int(_) => ScalarType::Int,
            Number::Double(_) => ScalarType::Double,
        }
    }

    fn as_f64(&self) -> f64 {
        match self {
            Number::Int(v) => *v as f64,
            Number::Double(v) => *v,
        }
    }
}

fn parse_number(text: &str) -> Option<Number> {
    if !text.contains('.') {
        if let Ok(v) = text.parse::<i32>() {
            return Some(Number::Int(v));
        }
    }
    text.replace(['D', 'd'], "E")
        .parse::<f64>()
        .ok()
        .map(Number::Double)
}

/// Convert a header card to the keyword's declared type
///
/// Character keywords are trimmed. Numeric keywords are parsed as integers
/// when the text has no decimal point, otherwise as doubles. A mismatch with
/// the declared type is severe but the value is still converted; unparsable
/// numbers become 0.
pub fn parse_keyword(
    desc: &KeywordDescriptor,
    card: &HeaderCard,
    checker: &mut Checker,
) -> KeywordValue {
    let raw = card.value.as_deref().unwrap_or_default();
    trace!("KEYWORD {} = '{}'", desc.name, raw);

    if desc.data_type == ScalarType::Char {
        return KeywordValue::Text(raw.trim().to_string());
    }

    let number = parse_number(raw.trim());
    let found = number.map_or(ScalarType::Char, |n| n.scalar_type());

    if found != desc.data_type {
        checker.severe(format!(
            "Invalid format for keyword '{}', found '{}' should be '{}'",
            desc.name,
            found.code(),
            desc.data_type.code()
        ));
    }

    let value = number.map_or(0.0, |n| n.as_f64());
    match (desc.data_type, number) {
        (ScalarType::Int, Some(Number::Int(v))) => KeywordValue::Int(v),
        (ScalarType::Int, _) => KeywordValue::Int(value as i32),
        _ => KeywordValue::Double(value),
    }
}

/// Severe when a text keyword holds a value outside its accepted set
pub fn check_accepted_value(desc: &KeywordDescriptor, value: &KeywordValue, checker: &mut Checker) {
    let (Some(accepted), Some(text)) = (desc.accepted_values, value.as_str()) else {
        return;
    };
    if !accepted.contains(&text) {
        checker.severe(format!(
            "Invalid value for keyword '{}', found '{}' should be one of [{}]",
            desc.name,
            text,
            accepted.join(", ")
        ));
    }
}
