//! Descriptive statistics over decimal samples
//!
//! Every division goes through [`divide`], so an empty population surfaces as
//! [`SalesError::DivisionByZero`] instead of a NaN. Sums and squares are
//! checked; leaving the `Decimal` range is [`SalesError::Overflow`].
//! Human-facing values are rounded half away from zero to two places.

use crate::types::SalesError;
use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};

/// Round to two decimal places, half away from zero
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `numerator / denominator`, failing on a zero denominator
pub fn divide(
    numerator: Decimal,
    denominator: Decimal,
    operation: &'static str,
) -> Result<Decimal, SalesError> {
    if denominator.is_zero() {
        return Err(SalesError::division_by_zero(operation));
    }
    numerator
        .checked_div(denominator)
        .ok_or_else(|| SalesError::division_by_zero(operation))
}

/// Checked sum
pub fn sum<I>(values: I, operation: &'static str) -> Result<Decimal, SalesError>
where
    I: IntoIterator<Item = Decimal>,
{
    values.into_iter().try_fold(Decimal::ZERO, |total, value| {
        total
            .checked_add(value)
            .ok_or_else(|| SalesError::overflow(operation))
    })
}

/// Arithmetic mean, unrounded
pub fn mean(values: &[Decimal], operation: &'static str) -> Result<Decimal, SalesError> {
    let sum = sum(values.iter().copied(), operation)?;
    divide(sum, Decimal::from(values.len()), operation)
}

/// Sample (Bessel-corrected) standard deviation, rounded to two places
///
/// `sqrt(Σ(x − mean)² / (n − 1))`. Fewer than two values is a division by
/// zero.
pub fn sample_standard_deviation(
    values: &[Decimal],
    operation: &'static str,
) -> Result<Decimal, SalesError> {
    let mean = mean(values, operation)?;
    let squares = values
        .iter()
        .map(|value| {
            value
                .checked_sub(mean)
                .and_then(|deviation| deviation.checked_mul(deviation))
                .ok_or_else(|| SalesError::overflow(operation))
        })
        .collect::<Result<Vec<Decimal>, SalesError>>()?;
    let squares = sum(squares, operation)?;
    let degrees_of_freedom = Decimal::from(values.len().saturating_sub(1));
    let variance = divide(squares, degrees_of_freedom, operation)?;

    Ok(round2(variance.sqrt().unwrap_or(Decimal::ZERO)))
}

/// `part / whole` as a percentage in 0–100, rounded to two places
pub fn percentage(
    part: usize,
    whole: usize,
    operation: &'static str,
) -> Result<Decimal, SalesError> {
    let ratio = divide(Decimal::from(part), Decimal::from(whole), operation)?;
    Ok(round2(ratio * Decimal::ONE_HUNDRED))
}

/// Convert counts into decimal samples
pub fn counts_to_decimals(counts: &[usize]) -> Vec<Decimal> {
    counts.iter().map(|&count| Decimal::from(count)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn decimals(values: &[i64]) -> Vec<Decimal> {
        values.iter().map(|&v| Decimal::from(v)).collect()
    }

    #[rstest]
    #[case(Decimal::new(23333, 4), Decimal::new(233, 2))]
    #[case(Decimal::new(1005, 3), Decimal::new(101, 2))]
    #[case(Decimal::new(-1005, 3), Decimal::new(-101, 2))]
    #[case(Decimal::new(125, 3), Decimal::new(13, 2))]
    fn test_round2_half_away_from_zero(#[case] input: Decimal, #[case] expected: Decimal) {
        assert_eq!(round2(input), expected);
    }

    #[test]
    fn test_divide_by_zero_is_an_error() {
        assert_eq!(
            divide(Decimal::ONE, Decimal::ZERO, "test"),
            Err(SalesError::DivisionByZero { operation: "test" })
        );
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&decimals(&[1, 2, 3, 4]), "test").unwrap(), Decimal::new(25, 1));
        assert!(mean(&[], "test").is_err());
    }

    #[rstest]
    #[case::bessel_corrected(&[1, 2, 3, 4], Decimal::new(129, 2))]
    #[case::constant(&[5, 5, 5], Decimal::ZERO)]
    #[case::pair(&[3, 1], Decimal::new(141, 2))]
    #[case::merchant_counts(&[3, 3, 1], Decimal::new(115, 2))]
    fn test_sample_standard_deviation(#[case] values: &[i64], #[case] expected: Decimal) {
        assert_eq!(
            sample_standard_deviation(&decimals(values), "test").unwrap(),
            expected
        );
    }

    #[rstest]
    #[case::empty(&[])]
    #[case::single(&[42])]
    fn test_standard_deviation_needs_two_values(#[case] values: &[i64]) {
        assert!(matches!(
            sample_standard_deviation(&decimals(values), "test"),
            Err(SalesError::DivisionByZero { .. })
        ));
    }

    #[test]
    fn test_sum_overflow_is_an_error() {
        assert_eq!(
            sum([Decimal::MAX, Decimal::ONE], "test"),
            Err(SalesError::Overflow { operation: "test" })
        );
    }

    #[test]
    fn test_standard_deviation_overflow_is_an_error() {
        // 10^15 dollars apart: the squared deviation leaves the Decimal range
        let values = [Decimal::ZERO, Decimal::new(1_000_000_000_000_000, 0)];
        assert_eq!(
            sample_standard_deviation(&values, "test"),
            Err(SalesError::Overflow { operation: "test" })
        );
    }

    #[rstest]
    #[case(1, 3, Decimal::new(3333, 2))]
    #[case(2, 3, Decimal::new(6667, 2))]
    #[case(3, 3, Decimal::new(100, 0))]
    #[case(0, 3, Decimal::ZERO)]
    fn test_percentage(#[case] part: usize, #[case] whole: usize, #[case] expected: Decimal) {
        assert_eq!(percentage(part, whole, "test").unwrap(), expected);
    }

    #[test]
    fn test_percentage_of_nothing_is_an_error() {
        assert!(percentage(0, 0, "test").is_err());
    }
}
