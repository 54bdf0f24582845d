pub mod persistence;

/// Rounds a currency amount to cents, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Whole purchasable units needed to cover `value` (bags, buckets, boxes).
pub fn whole_units(value: f64) -> f64 {
    if value > 0.0 && value.is_finite() {
        value.ceil()
    } else {
        0.0
    }
}

/// Rounds up to the next multiple of `step` dollars.
pub fn ceil_to(value: f64, step: f64) -> f64 {
    (value / step).ceil() * step
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round2_rounds_half_away_from_zero() {
        assert_eq!(round2(1.005_000_1), 1.01);
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(-0.125), -0.13);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn whole_units_ceil_and_clamp() {
        assert_eq!(whole_units(1.97), 2.0);
        assert_eq!(whole_units(3.0), 3.0);
        assert_eq!(whole_units(0.0), 0.0);
        assert_eq!(whole_units(-4.0), 0.0);
        assert_eq!(whole_units(f64::NAN), 0.0);
        assert_eq!(whole_units(f64::INFINITY), 0.0);
    }

    #[test]
    fn whole_units_beyond_u32_range() {
        assert_eq!(whole_units(65_789_473_684.2), 65_789_473_685.0);
    }

    #[test]
    fn ceil_to_tens() {
        assert_eq!(ceil_to(1298.0, 10.0), 1300.0);
        assert_eq!(ceil_to(1300.0, 10.0), 1300.0);
        assert_eq!(ceil_to(0.0, 10.0), 0.0);
    }
}
