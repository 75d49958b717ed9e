use core::cmp::Ordering;

/// Total order on floats that treats `-0.0 == 0.0` and all NaNs as equal.
///
/// Used wherever a nearest candidate is chosen, so ties fall through to the
/// caller's secondary key instead of depending on the sign of zero.
pub fn stable_total_cmp_f64(a: f64, b: f64) -> Ordering {
    fn canon(v: f64) -> f64 {
        if v == 0.0 {
            0.0
        } else if v.is_nan() {
            f64::NAN
        } else {
            v
        }
    }
    canon(a).total_cmp(&canon(b))
}

#[cfg(test)]
mod tests {
    use super::stable_total_cmp_f64;
    use core::cmp::Ordering;

    #[test]
    fn zeros_and_nans_compare_equal() {
        assert_eq!(stable_total_cmp_f64(-0.0, 0.0), Ordering::Equal);
        assert_eq!(stable_total_cmp_f64(f64::NAN, -f64::NAN), Ordering::Equal);
    }

    #[test]
    fn ordinary_values_keep_their_order() {
        assert_eq!(stable_total_cmp_f64(1.0, 2.0), Ordering::Less);
        assert_eq!(stable_total_cmp_f64(3.5, -1.0), Ordering::Greater);
    }
}
