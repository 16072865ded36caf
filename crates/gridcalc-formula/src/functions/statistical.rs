//! Statistical functions

use super::{collect_numbers, formula_error, number_arg};
use crate::error::FormulaResult;
use crate::evaluator::FormulaValue;
use ahash::AHashMap;
use gridcalc_core::ErrorKind;

/// COUNTA(value1, [value2], ...) - Counts non-empty values
///
/// Numbers, non-empty text and errors all count.
pub fn fn_counta(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let count = args
        .iter()
        .flat_map(|arg| arg.values())
        .filter(|v| match v {
            FormulaValue::Empty => false,
            FormulaValue::Text(s) => !s.is_empty(),
            _ => true,
        })
        .count();

    Ok(FormulaValue::Number(count as f64))
}

/// COUNTBLANK(range) - Counts empty cells and empty strings
pub fn fn_countblank(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let count = args
        .iter()
        .flat_map(|arg| arg.values())
        .filter(|v| match v {
            FormulaValue::Empty => true,
            FormulaValue::Text(s) => s.is_empty(),
            _ => false,
        })
        .count();

    Ok(FormulaValue::Number(count as f64))
}

/// MEDIAN(number1, [number2], ...)
///
/// For an even count, the average of the two middle values.
pub fn fn_median(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let mut numbers = collect_numbers(args);
    if numbers.is_empty() {
        return Ok(formula_error());
    }

    sort_ascending(&mut numbers);

    let len = numbers.len();
    let median = if len % 2 == 1 {
        numbers[len / 2]
    } else {
        (numbers[len / 2 - 1] + numbers[len / 2]) / 2.0
    };

    Ok(FormulaValue::Number(median))
}

/// MODE(number1, [number2], ...) - Most frequent value
///
/// Ties go to the value seen first. With no values the result is `#N/A`.
pub fn fn_mode(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let numbers = collect_numbers(args);

    let mut counts: AHashMap<u64, usize> = AHashMap::new();
    for n in &numbers {
        *counts.entry(frequency_key(*n)).or_insert(0) += 1;
    }

    let max = match counts.values().max() {
        Some(max) => *max,
        None => return Ok(FormulaValue::Error(ErrorKind::LookupNotFound)),
    };

    let mode = numbers
        .iter()
        .find(|n| counts.get(&frequency_key(**n)) == Some(&max))
        .copied()
        .unwrap_or(0.0);

    Ok(FormulaValue::Number(mode))
}

/// VAR(number1, [number2], ...) - Sample variance (`0` below two values)
pub fn fn_var(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    Ok(FormulaValue::Number(
        sample_variance(&collect_numbers(args)).unwrap_or(0.0),
    ))
}

/// STDEV(number1, [number2], ...) - Sample standard deviation (`0` below
/// two values)
pub fn fn_stdev(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    Ok(FormulaValue::Number(
        sample_variance(&collect_numbers(args))
            .map(f64::sqrt)
            .unwrap_or(0.0),
    ))
}

/// CORREL(range1, range2) - Pearson correlation
///
/// Values are paired by position up to the shorter input. Empty input or a
/// zero variance gives `0`.
pub fn fn_correl(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let xs = collect_numbers(&args[..1]);
    let ys = collect_numbers(&args[1..2]);
    let n = xs.len().min(ys.len());
    if n == 0 {
        return Ok(FormulaValue::Number(0.0));
    }

    let xs = &xs[..n];
    let ys = &ys[..n];
    let mean_x = xs.iter().sum::<f64>() / n as f64;
    let mean_y = ys.iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return Ok(FormulaValue::Number(0.0));
    }

    Ok(FormulaValue::Number(cov / (var_x * var_y).sqrt()))
}

/// PERCENTILE(range, k) - Linear interpolation at `k * (n - 1)`, `k` in
/// `[0, 1]`
pub fn fn_percentile(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let k = match number_arg(args, 1) {
        Ok(k) => k,
        Err(e) => return Ok(e),
    };
    Ok(percentile(collect_numbers(&args[..1]), k))
}

/// QUARTILE(range, q) - `q` truncated to `0..=4`, then PERCENTILE at `q / 4`
pub fn fn_quartile(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let q = match number_arg(args, 1) {
        Ok(q) => q.trunc(),
        Err(e) => return Ok(e),
    };
    if !(0.0..=4.0).contains(&q) {
        return Ok(formula_error());
    }
    Ok(percentile(collect_numbers(&args[..1]), q / 4.0))
}

/// RANK(number, range, [order])
///
/// Order `0` (default) ranks descending, anything else ascending. Ties share
/// the first matching rank; a number not in the range ranks `len + 1`.
pub fn fn_rank(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let number = match number_arg(args, 0) {
        Ok(n) => n,
        Err(e) => return Ok(e),
    };
    let order = if args.len() > 2 {
        match number_arg(args, 2) {
            Ok(o) => o,
            Err(e) => return Ok(e),
        }
    } else {
        0.0
    };

    let mut numbers = collect_numbers(&args[1..2]);
    sort_ascending(&mut numbers);
    if order == 0.0 {
        numbers.reverse();
    }

    let rank = numbers
        .iter()
        .position(|n| *n == number)
        .unwrap_or(numbers.len());

    Ok(FormulaValue::Number((rank + 1) as f64))
}

fn percentile(mut numbers: Vec<f64>, k: f64) -> FormulaValue {
    if numbers.is_empty() || !(0.0..=1.0).contains(&k) {
        return formula_error();
    }

    sort_ascending(&mut numbers);

    let pos = k * (numbers.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let fraction = pos - lower as f64;

    FormulaValue::Number(numbers[lower] + (numbers[upper] - numbers[lower]) * fraction)
}

fn sample_variance(numbers: &[f64]) -> Option<f64> {
    if numbers.len() < 2 {
        return None;
    }
    let n = numbers.len() as f64;
    let mean = numbers.iter().sum::<f64>() / n;
    let sum_sq: f64 = numbers.iter().map(|x| (x - mean) * (x - mean)).sum();
    Some(sum_sq / (n - 1.0))
}

fn sort_ascending(numbers: &mut [f64]) {
    numbers.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
}

/// Hash key for counting equal values; `-0.0` and `0.0` count together
fn frequency_key(n: f64) -> u64 {
    if n == 0.0 {
        0.0_f64.to_bits()
    } else {
        n.to_bits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn n(v: f64) -> FormulaValue {
        FormulaValue::Number(v)
    }

    fn column(values: &[f64]) -> FormulaValue {
        FormulaValue::Array(values.iter().map(|v| vec![n(*v)]).collect())
    }

    fn assert_approx(result: FormulaValue, expected: f64) {
        match result {
            FormulaValue::Number(v) => assert!(
                (v - expected).abs() < 1e-9,
                "expected {} but got {}",
                expected,
                v
            ),
            other => panic!("expected a number, got {:?}", other),
        }
    }

    #[test]
    fn test_counta_countblank() {
        let range = FormulaValue::Array(vec![
            vec![n(1.0), FormulaValue::Text("a".into())],
            vec![FormulaValue::Empty, FormulaValue::Text(String::new())],
            vec![FormulaValue::Error(ErrorKind::FormulaError), FormulaValue::Empty],
        ]);
        assert_eq!(fn_counta(&[range.clone()]).unwrap(), n(3.0));
        assert_eq!(fn_countblank(&[range]).unwrap(), n(3.0));
    }

    #[test]
    fn test_median() {
        assert_eq!(fn_median(&[column(&[1.0, 2.0, 3.0, 4.0])]).unwrap(), n(2.5));
        assert_eq!(fn_median(&[column(&[5.0, 1.0, 3.0])]).unwrap(), n(3.0));
        assert_eq!(
            fn_median(&[FormulaValue::Array(vec![])]).unwrap(),
            FormulaValue::Error(ErrorKind::FormulaError)
        );
    }

    #[test]
    fn test_mode() {
        assert_eq!(fn_mode(&[column(&[1.0, 2.0, 2.0, 3.0, 3.0])]).unwrap(), n(2.0));
        assert_eq!(fn_mode(&[column(&[3.0, 3.0, 2.0, 2.0])]).unwrap(), n(3.0));
        assert_eq!(fn_mode(&[column(&[7.0, 8.0])]).unwrap(), n(7.0));
        assert_eq!(
            fn_mode(&[FormulaValue::Array(vec![])]).unwrap(),
            FormulaValue::Error(ErrorKind::LookupNotFound)
        );
    }

    #[test]
    fn test_stdev_var() {
        assert_approx(fn_stdev(&[n(2.0), n(4.0), n(6.0)]).unwrap(), 2.0);
        assert_approx(fn_var(&[n(2.0), n(4.0), n(6.0)]).unwrap(), 4.0);
        assert_eq!(fn_stdev(&[n(5.0)]).unwrap(), n(0.0));
        assert_eq!(fn_var(&[n(5.0)]).unwrap(), n(0.0));
    }

    #[test]
    fn test_correl() {
        assert_approx(
            fn_correl(&[column(&[1.0, 2.0, 3.0]), column(&[2.0, 4.0, 6.0])]).unwrap(),
            1.0,
        );
        assert_approx(
            fn_correl(&[column(&[1.0, 2.0, 3.0]), column(&[3.0, 2.0, 1.0, 99.0])]).unwrap(),
            -1.0,
        );
        // Zero variance
        assert_eq!(
            fn_correl(&[column(&[1.0, 1.0]), column(&[2.0, 3.0])]).unwrap(),
            n(0.0)
        );
        assert_eq!(
            fn_correl(&[FormulaValue::Array(vec![]), column(&[2.0])]).unwrap(),
            n(0.0)
        );
    }

    #[test]
    fn test_percentile_quartile() {
        let data = column(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(fn_percentile(&[data.clone(), n(0.5)]).unwrap(), n(3.0));
        assert_approx(fn_percentile(&[data.clone(), n(0.3)]).unwrap(), 2.2);
        assert_eq!(fn_quartile(&[data.clone(), n(1.0)]).unwrap(), n(2.0));
        assert_eq!(fn_quartile(&[data.clone(), n(4.9)]).unwrap(), n(5.0));
        assert_eq!(
            fn_percentile(&[data.clone(), n(1.5)]).unwrap(),
            FormulaValue::Error(ErrorKind::FormulaError)
        );
        assert_eq!(
            fn_quartile(&[data, n(5.0)]).unwrap(),
            FormulaValue::Error(ErrorKind::FormulaError)
        );
    }

    #[test]
    fn test_rank() {
        let data = column(&[10.0, 30.0, 20.0, 30.0]);
        assert_eq!(fn_rank(&[n(30.0), data.clone()]).unwrap(), n(1.0));
        assert_eq!(fn_rank(&[n(20.0), data.clone()]).unwrap(), n(3.0));
        assert_eq!(fn_rank(&[n(10.0), data.clone(), n(1.0)]).unwrap(), n(1.0));
        assert_eq!(fn_rank(&[n(30.0), data.clone(), n(1.0)]).unwrap(), n(3.0));
        assert_eq!(fn_rank(&[n(99.0), data]).unwrap(), n(5.0));
    }
}
