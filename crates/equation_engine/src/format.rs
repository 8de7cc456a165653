//! Number formatting for results shown to the user

/// Round `value` to `decimals` places, normalizing negative zero
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    let rounded = scaled.round() / factor;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Shortest decimal text of `value` rounded to `decimals` places.
///
/// Whole numbers print without a fractional part (`10`, not `10.0`).
pub fn format_value(value: f64, decimals: u32) -> String {
    format!("{}", round_to(value, decimals))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_numbers_have_no_fraction() {
        assert_eq!(format_value(10.0, 4), "10");
        assert_eq!(format_value(16.0000000001, 10), "16");
    }

    #[test]
    fn test_rounding() {
        assert_eq!(format_value(5000.0 / 1609.34, 4), "3.1069");
        assert_eq!(format_value(2.0 / 3.0, 2), "0.67");
        assert_eq!(format_value(-1.23456, 3), "-1.235");
    }

    #[test]
    fn test_negative_zero() {
        assert_eq!(format_value(-0.00001, 4), "0");
        assert_eq!(format_value(-0.0, 2), "0");
    }

    #[test]
    fn test_float_noise_is_hidden() {
        assert_eq!(format_value(0.1 + 0.2, 10), "0.3");
    }
}
