use serde_json::Value;

/// Lenient parse of a formatted count. Accepts thousands separators and
/// plain integers/floats; anything else becomes NaN so that broken upstream
/// data stays visibly broken instead of being silently zeroed.
pub fn parse_count(raw: &str) -> f64 {
    let cleaned = raw.trim().replace(',', "");
    if cleaned.is_empty() {
        return f64::NAN;
    }
    cleaned.parse::<f64>().unwrap_or(f64::NAN)
}

/// Numeric view of a JSON metric cell. Strings go through [`parse_count`],
/// numbers pass through, everything else (missing, null) is NaN.
pub fn number_of(value: &Value) -> f64 {
    match value {
        Value::String(s) => parse_count(s),
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

/// Percentage of `dividend` over `divisor`, formatted with a fixed number of
/// decimals. A zero divisor yields "NaN" rather than an error; callers are
/// expected to display the result as-is.
pub fn ratio(dividend: &str, divisor: &str, decimals: usize) -> String {
    let dividend = parse_count(dividend);
    let divisor = parse_count(divisor);
    let value = if divisor == 0.0 {
        f64::NAN
    } else {
        dividend / divisor * 100.0
    };
    format!("{value:.decimals$}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_count_strips_separators() {
        assert_eq!(parse_count("1,234,567"), 1_234_567.0);
        assert_eq!(parse_count(" 42 "), 42.0);
        assert_eq!(parse_count("3.5"), 3.5);
    }

    #[test]
    fn parse_count_malformed_is_nan() {
        assert!(parse_count("").is_nan());
        assert!(parse_count("n/a").is_nan());
        assert!(parse_count("12x").is_nan());
    }

    #[test]
    fn ratio_formats_requested_decimals() {
        assert_eq!(ratio("50", "200", 1), "25.0");
        assert_eq!(ratio("1,000", "4,000", 2), "25.00");
    }

    #[test]
    fn ratio_of_zero_dividend() {
        assert_eq!(ratio("0", "100", 1), "0.0");
    }

    #[test]
    fn ratio_zero_divisor_is_nan_not_panic() {
        assert_eq!(ratio("5", "0", 1), "NaN");
        assert_eq!(ratio("0", "0", 1), "NaN");
    }

    #[test]
    fn number_of_handles_all_cell_shapes() {
        assert_eq!(number_of(&Value::String("2,000".into())), 2000.0);
        assert_eq!(number_of(&serde_json::json!(17)), 17.0);
        assert!(number_of(&Value::Null).is_nan());
        assert!(number_of(&Value::String("broken".into())).is_nan());
    }
}
