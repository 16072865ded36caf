//! Math functions

use super::{collect_numbers, formula_error, number_arg};
use crate::error::FormulaResult;
use crate::evaluator::FormulaValue;

/// SUM function
pub fn fn_sum(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    Ok(FormulaValue::Number(collect_numbers(args).iter().sum()))
}

/// AVERAGE function
///
/// Fails when there is nothing to average.
pub fn fn_average(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let numbers = collect_numbers(args);
    if numbers.is_empty() {
        return Ok(formula_error());
    }
    Ok(FormulaValue::Number(
        numbers.iter().sum::<f64>() / numbers.len() as f64,
    ))
}

/// MIN function (`0` for no values)
pub fn fn_min(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let min = collect_numbers(args).into_iter().reduce(f64::min);
    Ok(FormulaValue::Number(min.unwrap_or(0.0)))
}

/// MAX function (`0` for no values)
pub fn fn_max(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let max = collect_numbers(args).into_iter().reduce(f64::max);
    Ok(FormulaValue::Number(max.unwrap_or(0.0)))
}

/// PRODUCT function (`0` for no values)
pub fn fn_product(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let product = collect_numbers(args).into_iter().reduce(|a, b| a * b);
    Ok(FormulaValue::Number(product.unwrap_or(0.0)))
}

/// COUNT function
///
/// Counts values that read as numbers; empty cells, words and errors are
/// not counted.
pub fn fn_count(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let count = args
        .iter()
        .flat_map(|arg| arg.values())
        .filter(|v| match v {
            FormulaValue::Number(_) => true,
            FormulaValue::Text(_) => v.as_number().is_some(),
            _ => false,
        })
        .count();

    Ok(FormulaValue::Number(count as f64))
}

/// ABS(number)
pub fn fn_abs(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    match number_arg(args, 0) {
        Ok(n) => Ok(FormulaValue::Number(n.abs())),
        Err(e) => Ok(e),
    }
}

/// ROUND(number, [num_digits]) - Rounds half away from zero
///
/// Negative digits round to the left of the decimal point.
pub fn fn_round(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let number = match number_arg(args, 0) {
        Ok(n) => n,
        Err(e) => return Ok(e),
    };

    let num_digits = if args.len() > 1 {
        match number_arg(args, 1) {
            Ok(n) => n.trunc() as i32,
            Err(e) => return Ok(e),
        }
    } else {
        0
    };

    let multiplier = 10_f64.powi(num_digits);
    let result = if number >= 0.0 {
        (number * multiplier + 0.5).floor() / multiplier
    } else {
        (number * multiplier - 0.5).ceil() / multiplier
    };

    Ok(FormulaValue::Number(result))
}

/// INT(number) - Rounds down toward negative infinity
pub fn fn_int(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    match number_arg(args, 0) {
        Ok(n) => Ok(FormulaValue::Number(n.floor())),
        Err(e) => Ok(e),
    }
}

/// MOD(number, divisor) - `number - divisor * floor(number / divisor)`
///
/// The result takes the sign of the divisor. A zero divisor fails.
pub fn fn_mod(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let (number, divisor) = match (number_arg(args, 0), number_arg(args, 1)) {
        (Ok(n), Ok(d)) => (n, d),
        (Err(e), _) | (_, Err(e)) => return Ok(e),
    };

    if divisor == 0.0 {
        return Ok(formula_error());
    }

    Ok(FormulaValue::Number(
        number - divisor * (number / divisor).floor(),
    ))
}

/// POWER(number, power)
pub fn fn_power(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let (number, power) = match (number_arg(args, 0), number_arg(args, 1)) {
        (Ok(n), Ok(p)) => (n, p),
        (Err(e), _) | (_, Err(e)) => return Ok(e),
    };

    let result = number.powf(power);
    if result.is_finite() {
        Ok(FormulaValue::Number(result))
    } else {
        Ok(formula_error())
    }
}

/// SQRT(number) - Fails for negative numbers
pub fn fn_sqrt(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    match number_arg(args, 0) {
        Ok(n) if n >= 0.0 => Ok(FormulaValue::Number(n.sqrt())),
        Ok(_) => Ok(formula_error()),
        Err(e) => Ok(e),
    }
}
