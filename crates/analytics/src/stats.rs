//! Order statistics over exact decimals.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// The `q`-quantile of an ascending slice, by linear interpolation between
/// the two closest ranks (the numpy/pandas default).
///
/// Returns `None` for an empty slice or a `q` outside `[0, 1]`.
pub fn quantile(sorted: &[Decimal], q: Decimal) -> Option<Decimal> {
    if sorted.is_empty() || q < Decimal::ZERO || q > Decimal::ONE {
        return None;
    }

    let last = sorted.len() - 1;
    let position = q * Decimal::from(last);
    let floor = position.floor();
    let fraction = position - floor;
    let lower_index = floor.to_usize()?;
    let upper_index = (lower_index + 1).min(last);

    let lower = sorted[lower_index];
    let upper = sorted[upper_index];
    Some(lower + (upper - lower) * fraction)
}

/// First and third quartiles of an ascending slice.
pub fn quartiles(sorted: &[Decimal]) -> Option<(Decimal, Decimal)> {
    let q1 = quantile(sorted, Decimal::new(25, 2))?;
    let q3 = quantile(sorted, Decimal::new(75, 2))?;
    Some((q1, q3))
}

/// `part / whole × 100`, or `None` when `whole` is zero.
pub fn percentage(part: Decimal, whole: Decimal) -> Option<Decimal> {
    if whole.is_zero() {
        None
    } else {
        Some(part / whole * Decimal::ONE_HUNDRED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn quantile_interpolates_between_ranks() {
        let values = [dec!(1), dec!(2), dec!(3), dec!(4)];
        assert_eq!(quantile(&values, dec!(0.25)), Some(dec!(1.75)));
        assert_eq!(quantile(&values, dec!(0.5)), Some(dec!(2.5)));
        assert_eq!(quantile(&values, dec!(0.75)), Some(dec!(3.25)));
        assert_eq!(quantile(&values, Decimal::ZERO), Some(dec!(1)));
        assert_eq!(quantile(&values, Decimal::ONE), Some(dec!(4)));
    }

    #[test]
    fn quantile_of_a_single_value_is_that_value() {
        assert_eq!(quartiles(&[dec!(399)]), Some((dec!(399), dec!(399))));
    }

    #[test]
    fn quantile_rejects_bad_input() {
        assert_eq!(quantile(&[], dec!(0.5)), None);
        assert_eq!(quantile(&[dec!(1)], dec!(1.5)), None);
    }

    #[test]
    fn percentage_guards_against_zero() {
        assert_eq!(percentage(dec!(1), dec!(4)), Some(dec!(25)));
        assert_eq!(percentage(dec!(1), Decimal::ZERO), None);
    }
}
