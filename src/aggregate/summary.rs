//! Derivations shared by every aggregator: cent rounding, shares, averages and peak detection.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds to exactly two decimal places, half away from zero.
pub fn round_cents(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    // Only ever widens the scale here, so no further rounding takes place.
    rounded.rescale(2);
    rounded
}

/// `part / total`, or zero when `total` is zero.
pub fn share_of(part: Decimal, total: Decimal) -> Decimal {
    if total.is_zero() {
        Decimal::ZERO
    } else {
        part / total
    }
}

/// `total / count`, or zero when `count` is zero.
pub fn average_of(total: Decimal, count: usize) -> Decimal {
    if count == 0 {
        Decimal::ZERO
    } else {
        total / Decimal::from(count)
    }
}

/// Index of the largest value in `totals`, lowest index on ties. `None` when `total_spend <= 0`,
/// so that an all-zero series has no peak.
pub fn peak_index(totals: &[Decimal], total_spend: Decimal) -> Option<usize> {
    if total_spend <= Decimal::ZERO {
        return None;
    }
    let mut peak: Option<(usize, Decimal)> = None;
    for (ix, &value) in totals.iter().enumerate() {
        match peak {
            Some((_, max)) if value <= max => {}
            _ => peak = Some((ix, value)),
        }
    }
    peak.map(|(ix, _)| ix)
}
