//! Lookup functions

use super::{formula_error, number_arg};
use crate::error::FormulaResult;
use crate::evaluator::{compare_values, FormulaValue};
use gridcalc_core::ErrorKind;
use std::cmp::Ordering;

/// VLOOKUP(lookup_value, table_array, col_index_num, [range_lookup])
///
/// Searches the first column of the table and returns the value in the
/// requested column of the matching row.
///
/// - Exact mode (`range_lookup` false) takes the first equal key.
/// - Approximate mode (the default) expects ascending keys and takes the last
///   key not greater than the lookup value. Empty keys are skipped.
///
/// A miss is `#N/A`; an empty result cell reads as `0`.
pub fn fn_vlookup(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    for v in args {
        if let FormulaValue::Error(e) = v {
            return Ok(FormulaValue::Error(*e));
        }
    }

    let lookup_value = match args.first() {
        Some(FormulaValue::Array(_)) | None => return Ok(formula_error()),
        Some(v) => v,
    };

    let single;
    let table: &[Vec<FormulaValue>] = match args.get(1) {
        Some(FormulaValue::Array(rows)) => rows,
        Some(scalar) => {
            single = [vec![scalar.clone()]];
            &single
        }
        None => return Ok(formula_error()),
    };
    let width = table.first().map_or(0, |row| row.len());

    let col_index = match number_arg(args, 2) {
        Ok(n) => n.trunc(),
        Err(e) => return Ok(e),
    };
    if col_index < 1.0 || col_index > width as f64 {
        return Ok(formula_error());
    }
    let col = col_index as usize - 1;

    let approximate = match args.get(3) {
        Some(v) => match v.as_bool() {
            Some(b) => b,
            None => return Ok(formula_error()),
        },
        None => true,
    };

    let found = if approximate {
        approximate_match(table, lookup_value)
    } else {
        table.iter().position(|row| {
            row.first()
                .map_or(false, |key| compare_values(key, lookup_value) == Ordering::Equal)
        })
    };

    match found.and_then(|r| table[r].get(col)) {
        Some(FormulaValue::Empty) => Ok(FormulaValue::Number(0.0)),
        Some(value) => Ok(value.clone()),
        None => Ok(FormulaValue::Error(ErrorKind::LookupNotFound)),
    }
}

/// Row of the last key not greater than `value` in an ascending first column
fn approximate_match(table: &[Vec<FormulaValue>], value: &FormulaValue) -> Option<usize> {
    let mut best = None;
    for (r, row) in table.iter().enumerate() {
        let key = match row.first() {
            Some(FormulaValue::Empty) | None => continue,
            Some(key) => key,
        };
        match compare_values(key, value) {
            Ordering::Equal => return Some(r),
            Ordering::Less => best = Some(r),
            Ordering::Greater => break,
        }
    }
    best
}
