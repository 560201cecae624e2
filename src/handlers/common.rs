use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde_json::Value;
use validator::Validate;

use crate::errors::{FieldErrorMap, ServiceError};

/// 200 response with an already-built envelope body.
pub fn success_response(body: Value) -> Response {
    (StatusCode::OK, Json(body)).into_response()
}

/// 201 response with an already-built envelope body.
pub fn created_response(body: Value) -> Response {
    (StatusCode::CREATED, Json(body)).into_response()
}

/// Runs derive-based validation, surfacing failures as per-field 422s.
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ServiceError> {
    input.validate()?;
    Ok(())
}

/// Summary and meta totals are fixed-2-decimal strings, unlike the numeric
/// stats aggregates.
pub fn money_str(value: Decimal) -> String {
    format!("{:.2}", value)
}

/// Year/month list filter shared by the period-scoped resources.
#[derive(Debug, serde::Deserialize)]
pub struct PeriodQuery {
    pub year: Option<i32>,
    pub month: Option<i32>,
}

impl PeriodQuery {
    /// Bounds-checks the filter, reporting violations as per-field 422s.
    pub fn validate(&self) -> Result<(), ServiceError> {
        let mut errors = FieldErrors::new();
        if let Some(year) = self.year {
            if !(2000..=2900).contains(&year) {
                errors.add("year", "The year must be between 2000 and 2900");
            }
        }
        if let Some(month) = self.month {
            if !(1..=12).contains(&month) {
                errors.add("month", "The month must be between 1 and 12");
            }
        }
        errors.into_result()
    }
}

/// Collects manual field checks (numeric bounds the derive macros cannot
/// express for `Decimal`) into one validation error.
#[derive(Default)]
pub struct FieldErrors {
    fields: FieldErrorMap,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn into_result(self) -> Result<(), ServiceError> {
        if self.fields.is_empty() {
            Ok(())
        } else {
            Err(ServiceError::ValidationFailed(self.fields))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn money_str_is_fixed_two_decimals() {
        assert_eq!(money_str(dec!(5)), "5.00");
        assert_eq!(money_str(dec!(111.1)), "111.10");
    }

    #[test]
    fn field_errors_accumulate_per_field() {
        let mut errors = FieldErrors::new();
        errors.add("quantity", "The quantity must be greater than zero");
        errors.add("quantity", "The quantity is required");
        errors.add("unit", "The unit is required");
        let err = errors.into_result().unwrap_err();
        match err {
            ServiceError::ValidationFailed(fields) => {
                assert_eq!(fields["quantity"].len(), 2);
                assert_eq!(fields["unit"].len(), 1);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
