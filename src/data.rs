use std::{fmt, sync::LazyLock};

use regex::Regex;
use serde::{Serialize, Serializer};

/// Matches a locale decimal comma without thousands separators, e.g. `-3,25`.
static DECIMAL_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+,\d+$").expect("decimal comma pattern compiles"));

/// A single normalized cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    Number(f64),
    Text(String),
    #[default]
    Empty,
}

impl Value {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    pub fn as_display(&self) -> String {
        match self {
            Value::Number(n) => format_number(*n),
            Value::Text(s) => s.clone(),
            Value::Empty => String::new(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Empty => serializer.serialize_none(),
        }
    }
}

/// Converts one raw source cell into a typed [`Value`].
///
/// Surrounding whitespace (including a trailing carriage return) is dropped.
/// A decimal comma is swapped for a dot only for the numeric parse attempt;
/// text cells keep their trimmed source form.
pub fn normalize_cell(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Empty;
    }
    let parsed = if DECIMAL_COMMA.is_match(trimmed) {
        trimmed.replacen(',', ".", 1).parse::<f64>()
    } else {
        trimmed.parse::<f64>()
    };
    match parsed {
        Ok(number) if number.is_finite() => Value::Number(number),
        _ => Value::Text(trimmed.to_string()),
    }
}

pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_cell_classifies_numbers_text_and_blanks() {
        assert_eq!(normalize_cell(" 42 "), Value::Number(42.0));
        assert_eq!(normalize_cell("-1.5\r"), Value::Number(-1.5));
        assert_eq!(normalize_cell("1e3"), Value::Number(1000.0));
        assert_eq!(normalize_cell("apple"), Value::Text("apple".to_string()));
        assert_eq!(normalize_cell("   "), Value::Empty);
        assert_eq!(normalize_cell(""), Value::Empty);
    }

    #[test]
    fn normalize_cell_accepts_decimal_comma_but_keeps_text_form() {
        assert_eq!(normalize_cell("3,25"), Value::Number(3.25));
        assert_eq!(normalize_cell("-0,5"), Value::Number(-0.5));
        // Thousands separators are not a decimal comma.
        assert_eq!(
            normalize_cell("1,234,5"),
            Value::Text("1,234,5".to_string())
        );
        assert_eq!(normalize_cell("3,"), Value::Text("3,".to_string()));
    }

    #[test]
    fn normalize_cell_rejects_non_finite_numbers() {
        assert_eq!(normalize_cell("inf"), Value::Text("inf".to_string()));
        assert_eq!(normalize_cell("NaN"), Value::Text("NaN".to_string()));
    }

    #[test]
    fn as_display_drops_trailing_zero_fraction() {
        assert_eq!(Value::Number(15.0).as_display(), "15");
        assert_eq!(Value::Number(2.5).as_display(), "2.5");
        assert_eq!(Value::Empty.as_display(), "");
    }

    #[test]
    fn serialize_maps_empty_to_null() {
        let json = serde_json::to_string(&vec![
            Value::Number(1.5),
            Value::Text("x".into()),
            Value::Empty,
        ])
        .unwrap();
        assert_eq!(json, r#"[1.5,"x",null]"#);
    }
}
