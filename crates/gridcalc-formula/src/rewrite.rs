//! Reference rewriting for row/column insert, delete and move
//!
//! Rewriting works on token spans of the formula text: only cell
//! references are replaced, everything else (whitespace, string literals,
//! function names) is copied through unchanged.
//!
//! ```
//! use gridcalc_formula::{rewrite_for_row_op, StructuralEdit};
//!
//! let shifted = rewrite_for_row_op("=SUM(A1:A5)", StructuralEdit::Insert { at: 1 });
//! assert_eq!(shifted, "=SUM(A1:A6)");
//!
//! let deleted = rewrite_for_row_op("=B3*2", StructuralEdit::Delete { at: 2 });
//! assert_eq!(deleted, "=#REF!*2");
//! ```

use crate::parser::{tokenize, Token};
use gridcalc_core::{CellAddress, MAX_COLS, MAX_ROWS};

const REF_ERROR: &str = "#REF!";

/// Which coordinate of a reference an edit applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Row,
    Column,
}

/// A structural edit along one axis, in 0-based indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuralEdit {
    /// A new row/column is inserted before `at`
    Insert { at: u32 },
    /// Row/column `at` is removed
    Delete { at: u32 },
    /// Row/column `from` is taken out and reinserted at `to`
    Move { from: u32, to: u32 },
}

impl StructuralEdit {
    /// Where `index` ends up after the edit; `None` if it was deleted
    pub fn map_index(&self, index: u32) -> Option<u32> {
        match *self {
            StructuralEdit::Insert { at } => Some(if index >= at { index + 1 } else { index }),
            StructuralEdit::Delete { at } => match index.cmp(&at) {
                std::cmp::Ordering::Less => Some(index),
                std::cmp::Ordering::Equal => None,
                std::cmp::Ordering::Greater => Some(index - 1),
            },
            StructuralEdit::Move { from, to } => Some(if index == from {
                to
            } else if from < to && index > from && index <= to {
                index - 1
            } else if from > to && index >= to && index < from {
                index + 1
            } else {
                index
            }),
        }
    }

    /// Map both ends of a range span `lo..=hi`; `None` if nothing is left
    ///
    /// A delete shrinks the span instead of invalidating it, unless the
    /// span covered only the deleted index.
    fn map_span(&self, lo: u32, hi: u32) -> Option<(u32, u32)> {
        match *self {
            StructuralEdit::Delete { at } => {
                if lo == at && hi == at {
                    return None;
                }
                let lo = if lo > at { lo - 1 } else { lo };
                let hi = if hi >= at { hi - 1 } else { hi };
                Some((lo, hi))
            }
            _ => Some((self.map_index(lo)?, self.map_index(hi)?)),
        }
    }
}

/// Rewrite every reference in `formula` for an edit along `axis`
///
/// Text that is not a formula (no leading `=`) is returned unchanged.
pub fn rewrite_references(formula: &str, axis: Axis, edit: StructuralEdit) -> String {
    let body = match formula.strip_prefix('=') {
        Some(body) => body,
        None => return formula.to_string(),
    };

    let limit = axis_limit(axis);
    let tokens = tokenize(body);
    let mut replacements: Vec<(usize, usize, String)> = Vec::new();

    let mut i = 0;
    while i < tokens.len() {
        let start = match reference_at(&tokens[i].token) {
            Some(addr) => addr,
            None => {
                i += 1;
                continue;
            }
        };

        let range_end = match (tokens.get(i + 1), tokens.get(i + 2)) {
            (Some(colon), Some(end)) if colon.token == Token::Colon => reference_at(&end.token),
            _ => None,
        };

        match range_end {
            Some(end) => {
                let (s, e) = (coordinate(&start, axis), coordinate(&end, axis));
                // Cells pushed off the sheet drop out of the range
                match edit.map_span(s.min(e), s.max(e)).filter(|&(lo, _)| lo < limit) {
                    Some((lo, hi)) => {
                        let hi = hi.min(limit - 1);
                        let (new_s, new_e) = if s <= e { (lo, hi) } else { (hi, lo) };
                        replacements.push((
                            tokens[i].start,
                            tokens[i].end,
                            relocate(&start, axis, new_s),
                        ));
                        replacements.push((
                            tokens[i + 2].start,
                            tokens[i + 2].end,
                            relocate(&end, axis, new_e),
                        ));
                    }
                    None => {
                        replacements.push((tokens[i].start, tokens[i + 2].end, REF_ERROR.into()))
                    }
                }
                i += 3;
            }
            None => {
                let mapped = edit
                    .map_index(coordinate(&start, axis))
                    .filter(|&index| index < limit);
                let text = match mapped {
                    Some(index) => relocate(&start, axis, index),
                    None => REF_ERROR.to_string(),
                };
                replacements.push((tokens[i].start, tokens[i].end, text));
                i += 1;
            }
        }
    }

    let mut out = String::with_capacity(formula.len() + 8);
    out.push('=');
    let mut pos = 0;
    for (start, end, text) in replacements {
        out.push_str(&body[pos..start]);
        out.push_str(&text);
        pos = end;
    }
    out.push_str(&body[pos..]);
    out
}

/// Rewrite references for a row insert, delete or move
pub fn rewrite_for_row_op(formula: &str, edit: StructuralEdit) -> String {
    rewrite_references(formula, Axis::Row, edit)
}

/// Rewrite references for a column insert, delete or move
pub fn rewrite_for_col_op(formula: &str, edit: StructuralEdit) -> String {
    rewrite_references(formula, Axis::Column, edit)
}

fn reference_at(token: &Token) -> Option<CellAddress> {
    match token {
        Token::CellRef(text) => CellAddress::parse(text).ok(),
        _ => None,
    }
}

fn axis_limit(axis: Axis) -> u32 {
    match axis {
        Axis::Row => MAX_ROWS,
        Axis::Column => MAX_COLS,
    }
}

fn coordinate(addr: &CellAddress, axis: Axis) -> u32 {
    match axis {
        Axis::Row => addr.row,
        Axis::Column => addr.col,
    }
}

fn relocate(addr: &CellAddress, axis: Axis, index: u32) -> String {
    let moved = match axis {
        Axis::Row => addr.moved_to(index, addr.col),
        Axis::Column => addr.moved_to(addr.row, index),
    };
    moved.to_a1_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn insert(at: u32) -> StructuralEdit {
        StructuralEdit::Insert { at }
    }

    fn delete(at: u32) -> StructuralEdit {
        StructuralEdit::Delete { at }
    }

    #[test]
    fn test_insert_row() {
        assert_eq!(rewrite_for_row_op("=SUM(A1:A5)", insert(1)), "=SUM(A1:A6)");
        assert_eq!(rewrite_for_row_op("=SUM(A1:A5)", insert(0)), "=SUM(A2:A6)");
        assert_eq!(rewrite_for_row_op("=SUM(A1:A5)", insert(5)), "=SUM(A1:A5)");
        assert_eq!(rewrite_for_row_op("=A1+B3", insert(2)), "=A1+B4");
    }

    #[test]
    fn test_insert_column() {
        assert_eq!(rewrite_for_col_op("=SUM(A1:C1)+D2", insert(1)), "=SUM(A1:D1)+E2");
        assert_eq!(rewrite_for_col_op("=Z1", insert(0)), "=AA1");
    }

    #[test]
    fn test_delete_single_reference() {
        assert_eq!(rewrite_for_row_op("=A2+A3", delete(1)), "=#REF!+A2");
        assert_eq!(rewrite_for_col_op("=B1*C1", delete(1)), "=#REF!*B1");
    }

    #[test]
    fn test_delete_shrinks_range() {
        assert_eq!(rewrite_for_row_op("=SUM(A1:A5)", delete(0)), "=SUM(A1:A4)");
        assert_eq!(rewrite_for_row_op("=SUM(A1:A5)", delete(4)), "=SUM(A1:A4)");
        assert_eq!(rewrite_for_row_op("=SUM(A1:A5)", delete(2)), "=SUM(A1:A4)");
        assert_eq!(rewrite_for_row_op("=SUM(A2:A5)", delete(0)), "=SUM(A1:A4)");
        assert_eq!(rewrite_for_row_op("=SUM(A3:B3)", delete(2)), "=SUM(#REF!)");
        // Reversed corners keep their order
        assert_eq!(rewrite_for_row_op("=SUM(A5:A1)", delete(0)), "=SUM(A4:A1)");
    }

    #[test]
    fn test_move_row() {
        let down = StructuralEdit::Move { from: 0, to: 2 };
        assert_eq!(rewrite_for_row_op("=A1+A2+A3+A4", down), "=A3+A1+A2+A4");

        let up = StructuralEdit::Move { from: 2, to: 0 };
        assert_eq!(rewrite_for_row_op("=A1+A2+A3+A4", up), "=A2+A3+A1+A4");
    }

    #[test]
    fn test_absolute_markers_preserved() {
        assert_eq!(rewrite_for_row_op("=$A$1+A$2", insert(0)), "=$A$2+A$3");
        assert_eq!(rewrite_for_col_op("=$B1", insert(0)), "=$C1");
    }

    #[test]
    fn test_strings_and_spacing_untouched() {
        assert_eq!(
            rewrite_for_row_op("= A1 * IF( \"A1\" = \"x\", 1,  SUM( A1 : A2 ))", insert(0)),
            "= A2 * IF( \"A1\" = \"x\", 1,  SUM( A2 : A3 ))"
        );
    }

    #[test]
    fn test_non_formula_unchanged() {
        assert_eq!(rewrite_for_row_op("A1", insert(0)), "A1");
        assert_eq!(rewrite_for_row_op("", delete(0)), "");
    }

    #[test]
    fn test_axes_are_independent() {
        assert_eq!(rewrite_for_row_op("=C1", insert(0)), "=C2");
        assert_eq!(rewrite_for_col_op("=C1", insert(5)), "=C1");
    }

    #[test]
    fn test_insert_past_last_row_or_column() {
        assert_eq!(rewrite_for_row_op("=A1048576+A1", insert(0)), "=#REF!+A2");
        assert_eq!(rewrite_for_col_op("=XFD1*2", insert(3)), "=#REF!*2");
        // The range end is pinned to the last row
        assert_eq!(
            rewrite_for_row_op("=SUM(A10:A1048576)", insert(0)),
            "=SUM(A11:A1048576)"
        );
        assert_eq!(
            rewrite_for_row_op("=SUM(A1048576:B1048576)", insert(5)),
            "=SUM(#REF!)"
        );
    }

    #[test]
    fn test_map_index() {
        let edit = StructuralEdit::Move { from: 3, to: 1 };
        assert_eq!(edit.map_index(3), Some(1));
        assert_eq!(edit.map_index(1), Some(2));
        assert_eq!(edit.map_index(2), Some(3));
        assert_eq!(edit.map_index(4), Some(4));
        assert_eq!(delete(3).map_index(3), None);
    }
}
