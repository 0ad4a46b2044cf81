// Field specs and per-field parsers shared by the submission form and imports

use crate::domain::account::is_valid_person_name;
use crate::errors::{AppError, Result};
use rust_decimal::Decimal;
use serde::{ser::SerializeMap, Serialize, Serializer};
use std::collections::HashMap;
use std::str::FromStr;

/// Upper bound of every incident counter
pub const COUNTER_MAX: u8 = 10;

/// Maximum number of digits in an RSO number
pub const RSO_MAX_DIGITS: usize = 6;

// ============================================================================
// Field Specs
// ============================================================================

/// Upper bound and precision of a decimal field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalBound {
    max_units: i64,
    scale: u32,
}

impl DecimalBound {
    /// 0–999.99 in steps of 0.01 (fines and weights)
    pub const AMOUNT: DecimalBound = DecimalBound::new(99_999, 2);
    /// 0–999 in steps of 0.1 (shift length)
    pub const WORK_TIME: DecimalBound = DecimalBound::new(9_990, 1);
    /// 0–999.9 in steps of 0.1 (nautical patrol hours)
    pub const HOURS: DecimalBound = DecimalBound::new(9_999, 1);

    pub const fn new(max_units: i64, scale: u32) -> Self {
        Self { max_units, scale }
    }

    pub fn max(&self) -> Decimal {
        Decimal::new(self.max_units, self.scale)
    }

    pub fn step(&self) -> Decimal {
        Decimal::new(1, self.scale)
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }
}

impl Serialize for DecimalBound {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("max", &self.max().to_string())?;
        map.serialize_entry("step", &self.step().to_string())?;
        map.end()
    }
}

/// Input kind as the rendering layer needs it
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    Select { options: Vec<&'static str> },
    Counter { max: u8 },
    Decimal { bound: DecimalBound },
    PersonName,
    Digits { max_len: usize },
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    #[serde(flatten)]
    pub kind: FieldKind,
}

impl FieldSpec {
    pub fn counter(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Counter { max: COUNTER_MAX },
        }
    }

    pub fn decimal(name: &'static str, label: &'static str, bound: DecimalBound) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Decimal { bound },
        }
    }

    pub fn person_name(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::PersonName,
        }
    }

    pub fn select(name: &'static str, label: &'static str, options: Vec<&'static str>) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Select { options },
        }
    }
}

// ============================================================================
// Field Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

// ============================================================================
// Form Values
// ============================================================================

/// Flat name → text mapping as emitted by the rendering layer or a spreadsheet row.
/// Parsers accumulate errors so one pass reports every bad field.
pub struct FormValues<'a> {
    values: &'a HashMap<String, String>,
    errors: Vec<FieldError>,
}

impl<'a> FormValues<'a> {
    pub fn new(values: &'a HashMap<String, String>) -> Self {
        Self {
            values,
            errors: Vec::new(),
        }
    }

    /// Trimmed value, `None` when absent or blank
    pub fn raw(&self, name: &str) -> Option<&'a str> {
        self.values
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn reject(&mut self, name: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(name, message));
    }

    /// Integer counter in 0..=COUNTER_MAX; blank means 0
    pub fn counter(&mut self, name: &str) -> u8 {
        let Some(raw) = self.raw(name) else {
            return 0;
        };

        match parse_whole_number(raw) {
            Some(n) if n <= u64::from(COUNTER_MAX) => n as u8,
            _ => {
                self.reject(
                    name,
                    format!("Informe um número inteiro entre 0 e {}.", COUNTER_MAX),
                );
                0
            }
        }
    }

    /// Non-negative decimal bounded by `bound`; blank means absent
    pub fn decimal(&mut self, name: &str, bound: DecimalBound) -> Option<Decimal> {
        let raw = self.raw(name)?;

        let parsed = Decimal::from_str(raw)
            .ok()
            .map(|d| d.normalize())
            .filter(|d| !d.is_sign_negative() && *d <= bound.max() && d.scale() <= bound.scale());

        if parsed.is_none() {
            self.reject(
                name,
                format!(
                    "Informe um valor entre 0 e {} (passo {}).",
                    bound.max(),
                    bound.step()
                ),
            );
        }
        parsed
    }

    /// Person name; blank means absent
    pub fn person_name(&mut self, name: &str) -> Option<String> {
        let raw = self.raw(name)?;
        if is_valid_person_name(raw) {
            Some(raw.to_string())
        } else {
            self.reject(name, "Use apenas letras, espaços, hífen ou apóstrofo.");
            None
        }
    }

    /// Up to `max_len` ASCII digits; blank means absent
    pub fn digits(&mut self, name: &str, max_len: usize) -> Option<String> {
        let raw = self.raw(name)?;
        if raw.len() <= max_len && raw.chars().all(|c| c.is_ascii_digit()) {
            Some(raw.to_string())
        } else {
            self.reject(name, format!("Máximo {} dígitos numéricos.", max_len));
            None
        }
    }

    /// One of a closed set of labels; blank means absent
    pub fn choice<T>(&mut self, name: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
        let raw = self.raw(name)?;
        let parsed = parse(raw);
        if parsed.is_none() {
            self.reject(name, "Opção inválida.");
        }
        parsed
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }

    /// Fails with every collected error, if any
    pub fn finish(self) -> Result<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.errors))
        }
    }
}

/// Accepts "3" and "3.0" (spreadsheets often store integers as floats)
fn parse_whole_number(raw: &str) -> Option<u64> {
    if let Ok(n) = raw.parse::<u64>() {
        return Some(n);
    }
    let d = Decimal::from_str(raw).ok()?;
    if d.is_sign_negative() || d.fract() != Decimal::ZERO {
        return None;
    }
    u64::from_str(&d.trunc().normalize().to_string()).ok()
}

/// Converts a JSON form payload (strings, numbers, nulls) into text values
pub fn text_values(payload: &serde_json::Map<String, serde_json::Value>) -> HashMap<String, String> {
    payload
        .iter()
        .filter_map(|(name, value)| {
            let text = match value {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                serde_json::Value::Null => return None,
                other => other.to_string(),
            };
            Some((name.clone(), text))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_counter_bounds() {
        let input = values(&[("a", "10"), ("b", "11"), ("c", "-1"), ("d", ""), ("e", "4.0")]);
        let mut form = FormValues::new(&input);

        assert_eq!(form.counter("a"), 10);
        assert_eq!(form.counter("b"), 0);
        assert_eq!(form.counter("c"), 0);
        assert_eq!(form.counter("d"), 0);
        assert_eq!(form.counter("e"), 4);
        assert_eq!(form.counter("missing"), 0);

        let errors = form.into_errors();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["b", "c"]);
    }

    #[test]
    fn test_decimal_bounds_and_step() {
        let input = values(&[
            ("ok", "999.99"),
            ("too_big", "1000"),
            ("too_fine", "1.005"),
            ("negative", "-2"),
            ("trailing", "12.50"),
        ]);
        let mut form = FormValues::new(&input);

        assert_eq!(
            form.decimal("ok", DecimalBound::AMOUNT),
            Some(Decimal::new(99_999, 2))
        );
        assert_eq!(form.decimal("too_big", DecimalBound::AMOUNT), None);
        assert_eq!(form.decimal("too_fine", DecimalBound::AMOUNT), None);
        assert_eq!(form.decimal("negative", DecimalBound::AMOUNT), None);
        assert_eq!(
            form.decimal("trailing", DecimalBound::AMOUNT),
            Some(Decimal::new(125, 1))
        );
        assert_eq!(form.decimal("missing", DecimalBound::AMOUNT), None);

        assert_eq!(form.into_errors().len(), 3);
    }

    #[test]
    fn test_work_time_bound() {
        assert_eq!(DecimalBound::WORK_TIME.max(), Decimal::new(999, 0));
        assert_eq!(DecimalBound::HOURS.max(), Decimal::new(9_999, 1));
    }

    #[test]
    fn test_digits_and_names() {
        let input = values(&[("rso", "123456"), ("long", "1234567"), ("name", "Silva"), ("bad", "X9")]);
        let mut form = FormValues::new(&input);

        assert_eq!(form.digits("rso", RSO_MAX_DIGITS), Some("123456".to_string()));
        assert_eq!(form.digits("long", RSO_MAX_DIGITS), None);
        assert_eq!(form.person_name("name"), Some("Silva".to_string()));
        assert_eq!(form.person_name("bad"), None);
        assert!(matches!(form.finish(), Err(AppError::Validation(errors)) if errors.len() == 2));
    }

    #[test]
    fn test_text_values_from_json() {
        let payload = serde_json::json!({"tva": 3, "pelotao": "1º", "multa": 12.5, "x": null});
        let map = text_values(payload.as_object().unwrap());
        assert_eq!(map.get("tva").map(String::as_str), Some("3"));
        assert_eq!(map.get("multa").map(String::as_str), Some("12.5"));
        assert!(!map.contains_key("x"));
    }

    #[test]
    fn test_field_spec_serialization() {
        let spec = FieldSpec::decimal("multaArbitrada", "Multa", DecimalBound::AMOUNT);
        let value = serde_json::to_value(&spec).unwrap();
        assert_eq!(value["kind"], "decimal");
        assert_eq!(value["bound"]["max"], "999.99");
        assert_eq!(value["bound"]["step"], "0.01");
    }
}
