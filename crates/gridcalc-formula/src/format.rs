//! Display formatting for computed values

use crate::evaluator::EvaluationResult;
use gridcalc_core::RawValue;

/// Format a number for display
///
/// With `decimal_places` set, exactly that many fractional digits are
/// shown. Otherwise integral values print without a fraction and the rest
/// use the shortest text that round-trips.
///
/// ```
/// use gridcalc_formula::format_number;
///
/// assert_eq!(format_number(30.0, None), "30");
/// assert_eq!(format_number(2.5, None), "2.5");
/// assert_eq!(format_number(2.0, Some(2)), "2.00");
/// ```
pub fn format_number(n: f64, decimal_places: Option<u8>) -> String {
    match decimal_places {
        Some(places) => format!("{:.*}", places as usize, n),
        None if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", n as i64),
        None => format!("{}", n),
    }
}

/// Display text for an evaluation result
pub fn format_result(result: &EvaluationResult, decimal_places: Option<u8>) -> String {
    match result {
        EvaluationResult::Number(n) => format_number(*n, decimal_places),
        EvaluationResult::Text(s) => s.clone(),
        EvaluationResult::Error(e) => e.to_string(),
    }
}

/// Display text for a literal (non-formula) cell
pub fn format_raw(raw: &RawValue, decimal_places: Option<u8>) -> String {
    match raw {
        RawValue::Number(n) => format_number(*n, decimal_places),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridcalc_core::ErrorKind;

    #[test]
    fn test_format_number_default() {
        assert_eq!(format_number(0.0, None), "0");
        assert_eq!(format_number(-0.0, None), "0");
        assert_eq!(format_number(-12.0, None), "-12");
        assert_eq!(format_number(0.1 + 0.2, None), "0.30000000000000004");
        assert_eq!(format_number(1e20, None), "100000000000000000000");
    }

    #[test]
    fn test_format_number_fixed() {
        assert_eq!(format_number(3.14159, Some(2)), "3.14");
        assert_eq!(format_number(2.4, Some(0)), "2");
        assert_eq!(format_number(7.0, Some(3)), "7.000");
    }

    #[test]
    fn test_format_result_and_raw() {
        assert_eq!(
            format_result(&EvaluationResult::Error(ErrorKind::LookupNotFound), Some(2)),
            "#N/A"
        );
        assert_eq!(
            format_result(&EvaluationResult::Error(ErrorKind::CircularReference), None),
            "#ERROR!"
        );
        assert_eq!(format_result(&EvaluationResult::Text("x".into()), Some(2)), "x");
        assert_eq!(format_raw(&RawValue::Boolean(true), None), "TRUE");
        assert_eq!(format_raw(&RawValue::Number(1.5), Some(1)), "1.5");
        assert_eq!(format_raw(&RawValue::Empty, None), "");
    }
}
