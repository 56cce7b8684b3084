// SPDX-License-Identifier: Apache-2.0

use crate::features::{FeatureVector, FEATURE_COLUMNS, FEATURE_COUNT};
use crate::record::{NewRecord, PREDICTION_FIELD, RECORD_FIELDS};
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    NotAnObject,
    MissingFields {
        missing: Vec<&'static str>,
        required: Vec<&'static str>,
    },
    InvalidType {
        field: &'static str,
        reason: String,
    },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnObject => write!(f, "request body must be a JSON object"),
            Self::MissingFields { missing, .. } => {
                write!(f, "missing required fields: {}", missing.join(", "))
            }
            Self::InvalidType { field, reason } => {
                write!(f, "invalid value for field `{field}`: {reason}")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Parses the six model inputs from an untyped payload.
pub fn parse_features(payload: &Value) -> Result<FeatureVector, ValidationError> {
    let obj = payload.as_object().ok_or(ValidationError::NotAnObject)?;
    require_fields(obj, &FEATURE_COLUMNS)?;
    features_from(obj)
}

/// Parses a full record (six inputs plus the label) from an untyped payload.
///
/// Presence is checked for every field before any value is coerced, so a
/// payload that is both incomplete and malformed reports the missing fields.
pub fn parse_new_record(payload: &Value) -> Result<NewRecord, ValidationError> {
    let obj = payload.as_object().ok_or(ValidationError::NotAnObject)?;
    require_fields(obj, &RECORD_FIELDS)?;
    let features = features_from(obj)?;
    let prediction = coerce_label(&obj[PREDICTION_FIELD])?;
    Ok(NewRecord::new(features, prediction))
}

fn require_fields(
    obj: &Map<String, Value>,
    required: &[&'static str],
) -> Result<(), ValidationError> {
    let missing: Vec<&'static str> = required
        .iter()
        .copied()
        .filter(|k| !obj.contains_key(*k))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    Err(ValidationError::MissingFields {
        missing,
        required: required.to_vec(),
    })
}

fn features_from(obj: &Map<String, Value>) -> Result<FeatureVector, ValidationError> {
    let mut values = [0.0_f64; FEATURE_COUNT];
    for (slot, field) in values.iter_mut().zip(FEATURE_COLUMNS) {
        *slot = coerce_f64(field, &obj[field])?;
    }
    Ok(FeatureVector::from_array(values))
}

fn coerce_f64(field: &'static str, value: &Value) -> Result<f64, ValidationError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| ValidationError::InvalidType {
            field,
            reason: format!("number {n} is not representable as f64"),
        })?,
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| ValidationError::InvalidType {
                field,
                reason: format!("could not convert string to float: '{s}'"),
            })?,
        other => {
            return Err(ValidationError::InvalidType {
                field,
                reason: format!("expected a number, got {}", json_kind(other)),
            })
        }
    };
    if !parsed.is_finite() {
        return Err(ValidationError::InvalidType {
            field,
            reason: "value must be finite".to_string(),
        });
    }
    Ok(parsed)
}

fn coerce_label(value: &Value) -> Result<String, ValidationError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(true) => Ok("True".to_string()),
        Value::Bool(false) => Ok("False".to_string()),
        other => Err(ValidationError::InvalidType {
            field: PREDICTION_FIELD,
            reason: format!("expected a string label, got {}", json_kind(other)),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_numeric_strings() {
        let v = parse_features(&json!({
            "Time": "1.5", "SNR": " 10 ", "Speed": 5, "RSSI": -70, "PDR": 0.9, "Relative_Speed": 2
        }))
        .expect("features");
        assert_eq!(v.time, 1.5);
        assert_eq!(v.snr, 10.0);
    }

    #[test]
    fn rejects_non_finite_strings() {
        let err = parse_features(&json!({
            "Time": "nan", "SNR": 1, "Speed": 1, "RSSI": 1, "PDR": 1, "Relative_Speed": 1
        }))
        .expect_err("nan rejected");
        assert!(matches!(err, ValidationError::InvalidType { field: "Time", .. }));
    }

    #[test]
    fn rejects_booleans_and_nulls() {
        for bad in [json!(true), json!(null), json!([1.0])] {
            let err = parse_features(&json!({
                "Time": 0, "SNR": bad, "Speed": 1, "RSSI": 1, "PDR": 1, "Relative_Speed": 1
            }))
            .expect_err("type error");
            assert!(matches!(err, ValidationError::InvalidType { field: "SNR", .. }));
        }
    }

    #[test]
    fn label_coercion_uses_json_text() {
        let base = json!({
            "Time": 0, "SNR": 1, "Speed": 1, "RSSI": 1, "PDR": 1, "Relative_Speed": 1
        });
        let mut payload = base.clone();
        payload["prediction"] = json!(1);
        assert_eq!(parse_new_record(&payload).expect("record").prediction, "1");
        payload["prediction"] = json!(0.5);
        assert_eq!(parse_new_record(&payload).expect("record").prediction, "0.5");
        payload["prediction"] = json!(true);
        assert_eq!(parse_new_record(&payload).expect("record").prediction, "True");
        payload["prediction"] = json!(false);
        assert_eq!(parse_new_record(&payload).expect("record").prediction, "False");
        payload["prediction"] = json!(null);
        assert!(parse_new_record(&payload).is_err());
    }

    #[test]
    fn missing_check_runs_before_coercion() {
        let err = parse_new_record(&json!({"Time": "abc"})).expect_err("missing");
        match err {
            ValidationError::MissingFields { missing, required } => {
                assert_eq!(
                    missing,
                    vec!["SNR", "Speed", "RSSI", "PDR", "Relative_Speed", "prediction"]
                );
                assert_eq!(required.len(), 7);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_object_payload_is_rejected() {
        assert_eq!(
            parse_features(&json!([1, 2, 3])),
            Err(ValidationError::NotAnObject)
        );
    }
}
