use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// The null-safe division contract used by every derived ratio:
/// the quotient is `None` when the numerator is absent, the denominator is
/// absent, or the denominator is zero. Absence is data, not an error.
pub fn safe_div(numerator: Option<Decimal>, denominator: Option<Decimal>) -> Option<Decimal> {
    match (numerator, denominator) {
        (Some(n), Some(d)) if !d.is_zero() => Some(n / d),
        _ => None,
    }
}

/// A percentage-style ratio: `n / d * 100`, rounded to 2 decimal places.
pub fn pct_of(numerator: Option<Decimal>, denominator: Option<Decimal>) -> Option<Decimal> {
    safe_div(numerator, denominator).map(|q| round2(q * Decimal::ONE_HUNDRED))
}

pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn round0(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Annualizes a year-to-date figure reported as of the given quarter
/// (Q1 x4, Q2 x2, Q3 x4/3, Q4 x1). Multiplies by 4 before dividing by the
/// quarter number so no precision is lost to the repeating Q3 factor.
pub fn annualize(ytd: Option<Decimal>, quarter: u8) -> Option<Decimal> {
    ytd.map(|v| v * Decimal::from(4) / Decimal::from(quarter))
}

/// Average balance over the current value and the prior-year Q4 value.
/// Falls back to the current value alone when no positive prior Q4 balance
/// exists (newly observed entities are not averaged).
pub fn avg_balance(current: Option<Decimal>, prior_q4: Option<Decimal>) -> Option<Decimal> {
    match (current, prior_q4) {
        (Some(c), Some(p)) if p > Decimal::ZERO => Some((c + p) / dec!(2)),
        (current, _) => current,
    }
}

/// Year-over-year growth in percent, rounded to 2 decimal places.
/// `|prior|` in the denominator keeps the sign meaningful when the prior
/// value was negative. A zero or absent prior yields `None`.
pub fn yoy_growth(current: Option<Decimal>, prior: Option<Decimal>) -> Option<Decimal> {
    let current = current?;
    let prior = prior?;
    if prior.is_zero() {
        return None;
    }
    Some(round2((current - prior) / prior.abs() * Decimal::ONE_HUNDRED))
}

/// Sums the components of a compound figure. Absent components count as zero,
/// but a figure whose components are all absent stays null so that its ratios
/// degrade to null rather than to a spurious zero.
pub fn opt_sum(parts: &[Option<Decimal>]) -> Option<Decimal> {
    if parts.iter().all(Option::is_none) {
        return None;
    }
    Some(parts.iter().flatten().sum())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_div_is_null_safe() {
        assert_eq!(safe_div(Some(dec!(10)), Some(dec!(4))), Some(dec!(2.5)));
        assert_eq!(safe_div(None, Some(dec!(4))), None);
        assert_eq!(safe_div(Some(dec!(10)), None), None);
        assert_eq!(safe_div(Some(dec!(10)), Some(Decimal::ZERO)), None);
        assert_eq!(safe_div(Some(Decimal::ZERO), Some(dec!(4))), Some(Decimal::ZERO));
    }

    #[test]
    fn annualize_scales_by_quarter() {
        assert_eq!(annualize(Some(dec!(100)), 1), Some(dec!(400)));
        assert_eq!(annualize(Some(dec!(100)), 2), Some(dec!(200)));
        // 300 reported through Q3 annualizes to exactly 400.
        assert_eq!(annualize(Some(dec!(300)), 3), Some(dec!(400)));
        assert_eq!(annualize(Some(dec!(100)), 4), Some(dec!(100)));
        assert_eq!(annualize(None, 2), None);
    }

    #[test]
    fn yoy_growth_cases() {
        assert_eq!(yoy_growth(Some(dec!(120)), Some(dec!(100))), Some(dec!(20.00)));
        assert_eq!(yoy_growth(Some(dec!(80)), Some(dec!(100))), Some(dec!(-20.00)));
        assert_eq!(yoy_growth(Some(dec!(50)), Some(Decimal::ZERO)), None);
        assert_eq!(yoy_growth(Some(dec!(50)), None), None);
        assert_eq!(yoy_growth(None, Some(dec!(100))), None);
        // Negative prior: improving from -100 to -80 is +20%, not -20%.
        assert_eq!(yoy_growth(Some(dec!(-80)), Some(dec!(-100))), Some(dec!(20.00)));
    }

    #[test]
    fn avg_balance_falls_back_without_prior_q4() {
        assert_eq!(avg_balance(Some(dec!(500)), Some(dec!(450))), Some(dec!(475)));
        assert_eq!(avg_balance(Some(dec!(500)), None), Some(dec!(500)));
        assert_eq!(avg_balance(Some(dec!(500)), Some(Decimal::ZERO)), Some(dec!(500)));
        assert_eq!(avg_balance(None, Some(dec!(450))), None);
    }

    #[test]
    fn opt_sum_distinguishes_zero_from_absent() {
        assert_eq!(opt_sum(&[Some(dec!(1)), None, Some(dec!(2))]), Some(dec!(3)));
        assert_eq!(opt_sum(&[None, None]), None);
        assert_eq!(opt_sum(&[Some(Decimal::ZERO), None]), Some(Decimal::ZERO));
    }

    #[test]
    fn pct_of_rounds_to_two_places() {
        assert_eq!(pct_of(Some(dec!(1)), Some(dec!(3))), Some(dec!(33.33)));
        assert_eq!(pct_of(Some(dec!(50)), Some(dec!(500))), Some(dec!(10.00)));
        assert_eq!(pct_of(Some(dec!(1)), Some(Decimal::ZERO)), None);
    }
}
