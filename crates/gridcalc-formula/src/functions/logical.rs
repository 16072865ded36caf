//! Logical functions

use super::formula_error;
use crate::ast::FormulaExpr;
use crate::error::{FormulaError, FormulaResult};
use crate::evaluator::{evaluate_expr, EvaluationContext, FormulaValue};
use gridcalc_core::{ErrorKind, NOT_AVAILABLE_SENTINEL};

/// Read a condition, or the error value to return instead
fn condition(value: &FormulaValue) -> Result<bool, FormulaValue> {
    match value {
        FormulaValue::Error(e) => Err(FormulaValue::Error(*e)),
        other => other.as_bool().ok_or_else(formula_error),
    }
}

/// IF(condition, value_if_true, [value_if_false])
///
/// Only the chosen branch is evaluated. The false branch defaults to `0`.
pub fn fn_if(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let (cond, if_true) = match args {
        [cond, if_true, ..] => (cond, if_true),
        _ => return Err(FormulaError::Argument("IF requires at least 2 arguments".into())),
    };

    match condition(&evaluate_expr(cond, ctx)?) {
        Ok(true) => evaluate_expr(if_true, ctx),
        Ok(false) => match args.get(2) {
            Some(if_false) => evaluate_expr(if_false, ctx),
            None => Ok(FormulaValue::Number(0.0)),
        },
        Err(e) => Ok(e),
    }
}

/// IFS(condition1, value1, [condition2, value2], ...)
///
/// Conditions are evaluated in order up to the first true one, whose value
/// is returned; `#N/A` when none is true.
pub fn fn_ifs(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    if args.len() % 2 != 0 {
        return Err(FormulaError::Argument(
            "IFS requires condition/value pairs".into(),
        ));
    }

    for pair in args.chunks(2) {
        match condition(&evaluate_expr(&pair[0], ctx)?) {
            Ok(true) => return evaluate_expr(&pair[1], ctx),
            Ok(false) => {}
            Err(e) => return Ok(e),
        }
    }

    Ok(FormulaValue::Error(ErrorKind::LookupNotFound))
}

/// AND(logical1, [logical2], ...) - `1` when every value is true
///
/// Empty cells and words inside ranges are ignored.
pub fn fn_and(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    fold_logical(args, true, |acc, b| acc && b)
}

/// OR(logical1, [logical2], ...) - `1` when any value is true
pub fn fn_or(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    fold_logical(args, false, |acc, b| acc || b)
}

fn fold_logical(
    args: &[FormulaValue],
    init: bool,
    f: impl Fn(bool, bool) -> bool,
) -> FormulaResult<FormulaValue> {
    let mut acc = init;
    for value in args.iter().flat_map(|arg| arg.values()) {
        match value {
            FormulaValue::Error(e) => return Ok(FormulaValue::Error(*e)),
            FormulaValue::Empty => {}
            other => {
                if let Some(b) = other.as_bool() {
                    acc = f(acc, b);
                }
            }
        }
    }
    Ok(FormulaValue::from_bool(acc))
}

/// NOT(logical)
pub fn fn_not(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    match args.first().map(condition) {
        Some(Ok(b)) => Ok(FormulaValue::from_bool(!b)),
        Some(Err(e)) => Ok(e),
        None => Err(FormulaError::Argument("NOT requires 1 argument".into())),
    }
}

/// IFERROR(value, value_if_error)
///
/// Falls back whenever the value displays as an error, i.e. its text starts
/// with `#`.
pub fn fn_iferror(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    match args {
        [value, fallback] => {
            if value.as_string().starts_with('#') {
                Ok(fallback.clone())
            } else {
                Ok(value.clone())
            }
        }
        _ => Err(FormulaError::Argument("IFERROR requires 2 arguments".into())),
    }
}

/// IFNA(value, value_if_na) - Falls back only on `#N/A`
pub fn fn_ifna(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    match args {
        [value, fallback] => {
            if value.as_string() == NOT_AVAILABLE_SENTINEL {
                Ok(fallback.clone())
            } else {
                Ok(value.clone())
            }
        }
        _ => Err(FormulaError::Argument("IFNA requires 2 arguments".into())),
    }
}
