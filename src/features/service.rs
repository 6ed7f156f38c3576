//! Input normalisation: order a raw request against the schema, then coerce
//! the ordered values to numbers.
//!
//! Both steps are fail-fast and walk the schema in order, so the reported
//! feature is always the first offending one by schema position.

use serde_json::Value;

use crate::common::error::{PredictError, PredictResult};

use super::domain::{FeatureSchema, FeatureVector, RawInput};

/// Look up every schema feature in `raw`, in schema order. Unknown keys are
/// ignored. Values are not inspected.
pub fn order_features<'a>(
    raw: &'a RawInput,
    schema: &FeatureSchema,
) -> PredictResult<Vec<(&'static str, &'a Value)>> {
    schema
        .names()
        .iter()
        .map(|&name| match raw.get(name) {
            Some(value) => Ok((name, value)),
            None => Err(PredictError::MissingFeature(name.to_string())),
        })
        .collect()
}

/// Coerce ordered values to `f64`. Only JSON numbers are accepted.
pub fn coerce_features(ordered: &[(&'static str, &Value)]) -> PredictResult<FeatureVector> {
    let mut values = Vec::with_capacity(ordered.len());
    for (name, value) in ordered {
        let number = value.as_f64().ok_or_else(|| {
            PredictError::InvalidFeatureValue(format!(
                "feature '{name}' must be a number, got {}",
                json_type(value)
            ))
        })?;
        values.push(number);
    }
    Ok(FeatureVector::new(values))
}

/// Order then coerce.
pub fn normalize(raw: &RawInput, schema: &FeatureSchema) -> PredictResult<FeatureVector> {
    let ordered = order_features(raw, schema)?;
    coerce_features(&ordered)
}

pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
