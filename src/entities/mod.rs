pub mod cost_component;
pub mod expense_category;
pub mod operational_expense;
pub mod price_scheme;
pub mod product;
pub mod product_cost;
pub mod sales_record;
pub mod user;

use rust_decimal::Decimal;
use serde::Serializer;

/// Serializes a monetary column as a two-decimal string ("111.11"), which is
/// how clients of this API expect money to arrive.
pub fn serialize_money<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{:.2}", value))
}

pub fn serialize_opt_money<S: Serializer>(
    value: &Option<Decimal>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => serializer.serialize_str(&format!("{:.2}", v)),
        None => serializer.serialize_none(),
    }
}
