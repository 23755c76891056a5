//! Field-type coercion for tabular import rows.
//!
//! Rules, applied per field:
//! - empty string → null
//! - named in `integer_fields` → `i64`
//! - named in `float_fields` → finite `f64`
//! - anything else → string, unchanged
//!
//! A row either coerces completely or fails with [`DomainError::Coercion`];
//! no partial record is ever returned.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::record::{Record, Value};

/// Field names that carry typed values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoercionRules {
    pub integer_fields: BTreeSet<String>,
    pub float_fields: BTreeSet<String>,
}

impl CoercionRules {
    pub fn new<I, F>(integer_fields: I, float_fields: F) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        F: IntoIterator,
        F::Item: Into<String>,
    {
        Self {
            integer_fields: integer_fields.into_iter().map(Into::into).collect(),
            float_fields: float_fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Coerce one raw row.
    pub fn coerce(&self, row: &BTreeMap<String, String>) -> DomainResult<Record> {
        row.iter()
            .map(|(field, raw)| -> DomainResult<(String, Value)> {
                Ok((field.clone(), self.coerce_field(field, raw)?))
            })
            .collect()
    }

    fn coerce_field(&self, field: &str, raw: &str) -> DomainResult<Value> {
        if raw.is_empty() {
            return Ok(Value::Null);
        }
        if self.integer_fields.contains(field) {
            return raw
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| coercion_error(field, raw, "integer"));
        }
        if self.float_fields.contains(field) {
            return match raw.trim().parse::<f64>() {
                Ok(x) if x.is_finite() => Ok(Value::Float(x)),
                _ => Err(coercion_error(field, raw, "float")),
            };
        }
        Ok(Value::String(raw.to_string()))
    }
}

fn coercion_error(field: &str, raw: &str, target: &'static str) -> DomainError {
    DomainError::Coercion {
        field: field.to_string(),
        value: raw.to_string(),
        target,
    }
}

/// Coerce `row` using the given field sets.
pub fn coerce(row: &BTreeMap<String, String>, rules: &CoercionRules) -> DomainResult<Record> {
    rules.coerce(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn row(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn rules() -> CoercionRules {
        CoercionRules::new(
            ["publication_year", "book_number"],
            ["contribution_percentage"],
        )
    }

    #[rstest]
    #[case("publication_year", "1937", Value::Int(1937))]
    #[case("publication_year", " 1937 ", Value::Int(1937))]
    #[case("contribution_percentage", "62.5", Value::Float(62.5))]
    #[case("contribution_percentage", "100", Value::Float(100.0))]
    #[case("title", "The Hobbit", Value::String("The Hobbit".into()))]
    #[case("book_number", "", Value::Null)]
    #[case("genre", "", Value::Null)]
    fn test_coerce_field(#[case] field: &str, #[case] raw: &str, #[case] expected: Value) {
        let record = rules().coerce(&row(&[(field, raw)])).unwrap();
        assert_eq!(record.get(field), Some(&expected));
    }

    #[test]
    fn test_bad_integer_names_field_and_value() {
        let err = coerce(
            &row(&[("title", "Emma"), ("publication_year", "not-a-year")]),
            &rules(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            DomainError::Coercion {
                field: "publication_year".into(),
                value: "not-a-year".into(),
                target: "integer",
            }
        );
    }

    #[rstest]
    #[case("NaN")]
    #[case("inf")]
    #[case("12,5")]
    fn test_bad_float(#[case] raw: &str) {
        let err = rules()
            .coerce(&row(&[("contribution_percentage", raw)]))
            .unwrap_err();
        assert!(matches!(err, DomainError::Coercion { target: "float", .. }));
    }
}
