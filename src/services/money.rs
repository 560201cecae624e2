use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a monetary value to 2 decimal places, half away from zero, and
/// pins the scale so serialization always shows two decimals.
pub fn round2(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round2(dec!(111.111111)), dec!(111.11));
        assert_eq!(round2(dec!(126.315789)), dec!(126.32));
        assert_eq!(round2(dec!(0.005)), dec!(0.01));
    }

    #[test]
    fn pins_the_scale_to_two() {
        assert_eq!(round2(dec!(100)).to_string(), "100.00");
        assert_eq!(round2(dec!(2.5)).to_string(), "2.50");
    }
}
