//! Percentage normalization
//!
//! The backend mixes conventions: some fields are fractions (0-1), others are
//! already percentages (0-100). Every percentage shown to a user goes through
//! [`normalize_percentage`] so the viewer never special-cases a field.
//!
//! ```text
//! input      | output
//! -----------|-------
//! 0.5        | 50
//! 85         | 85
//! 150        | 100   (clamped)
//! -0.2       | 0     (clamped)
//! None / NaN | 0
//! ```

use serde_json::Value;

/// Normalize a fractional-or-percentage value into `[0, 100]`.
///
/// Values with magnitude `<= 1` are treated as fractions and scaled by 100.
/// Anything else is assumed to already be a percentage. Missing and
/// non-finite inputs become 0.
pub fn normalize_percentage(value: Option<f64>) -> f64 {
    let Some(mut numeric) = value.filter(|v| v.is_finite()) else {
        return 0.0;
    };
    if numeric.abs() <= 1.0 {
        numeric *= 100.0;
    }
    numeric.clamp(0.0, 100.0)
}

/// Same rule applied to a raw JSON value. Numeric strings are parsed.
pub fn normalize_value(value: &Value) -> f64 {
    normalize_percentage(number_from_value(value))
}

/// Format with a fixed number of decimals, e.g. `format_percentage(Some(0.853), 1) == "85.3"`.
pub fn format_percentage(value: Option<f64>, decimals: usize) -> String {
    format!("{:.*}", decimals, normalize_percentage(value))
}

/// Confidence rounded for badges (`0.876` -> `88.0`).
pub fn format_confidence(confidence: Option<f64>, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (normalize_percentage(confidence) * factor).round() / factor
}

/// Pull a finite number out of a JSON value, accepting numeric strings.
pub(crate) fn number_from_value(value: &Value) -> Option<f64> {
    let numeric = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    numeric.is_finite().then_some(numeric)
}

/// Round to three decimals, the precision used for all derived metrics.
pub(crate) fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ==========================================================================
    // NORMALIZATION RULE
    // ==========================================================================
    //
    // Magnitude <= 1 means "fraction", everything else is "already percent".
    // The result is always clamped so a bad upstream value can never draw a
    // 150% bar.
    // ==========================================================================

    #[test]
    fn test_fraction_is_scaled() {
        assert_eq!(normalize_percentage(Some(0.5)), 50.0);
        assert_eq!(normalize_percentage(Some(1.0)), 100.0);
        assert_eq!(normalize_percentage(Some(0.0)), 0.0);
    }

    #[test]
    fn test_percentage_passes_through() {
        assert_eq!(normalize_percentage(Some(85.0)), 85.0);
        assert_eq!(normalize_percentage(Some(1.5)), 1.5);
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        assert_eq!(normalize_percentage(Some(150.0)), 100.0);
        assert_eq!(normalize_percentage(Some(-0.2)), 0.0);
        assert_eq!(normalize_percentage(Some(-40.0)), 0.0);
    }

    #[test]
    fn test_missing_and_non_finite_become_zero() {
        assert_eq!(normalize_percentage(None), 0.0);
        assert_eq!(normalize_percentage(Some(f64::NAN)), 0.0);
        assert_eq!(normalize_percentage(Some(f64::INFINITY)), 0.0);
    }

    #[test]
    fn test_json_values() {
        assert_eq!(normalize_value(&json!(0.25)), 25.0);
        assert_eq!(normalize_value(&json!("0.25")), 25.0);
        assert_eq!(normalize_value(&json!(" 72 ")), 72.0);
        assert_eq!(normalize_value(&json!(null)), 0.0);
        assert_eq!(normalize_value(&json!("high")), 0.0);
        assert_eq!(normalize_value(&json!({"score": 0.3})), 0.0);
    }

    #[test]
    fn test_formatting() {
        assert_eq!(format_percentage(Some(0.853), 1), "85.3");
        assert_eq!(format_percentage(Some(85.0), 0), "85");
        assert_eq!(format_percentage(None, 1), "0.0");
        assert_eq!(format_confidence(Some(0.876), 0), 88.0);
        assert_eq!(format_confidence(Some(0.8764), 1), 87.6);
    }

    #[test]
    fn test_round3() {
        assert_eq!(round3(0.12345), 0.123);
        assert_eq!(round3(0.9996), 1.0);
        assert_eq!(round3(0.0), 0.0);
    }
}
