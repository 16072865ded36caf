//! Structural edits: row/column insert, delete and move
//!
//! An edit moves the cells, rewrites every formula so its references keep
//! pointing at the same data, and recalculates the grid.
//!
//! ```rust
//! use gridcalc::prelude::*;
//! use gridcalc::structure::apply_row_edit;
//!
//! let mut grid = Grid::new(6, 2);
//! for row in 0..5 {
//!     grid.set_value_at(row, 0, (row + 1) as f64).unwrap();
//! }
//! grid.set_formula("B1", "=SUM(A1:A5)").unwrap();
//!
//! apply_row_edit(&mut grid, StructuralEdit::Insert { at: 1 }).unwrap();
//! assert_eq!(grid.cell_at(0, 1).unwrap().formula(), Some("=SUM(A1:A6)"));
//! assert_eq!(grid.display("B1").unwrap(), "15");
//! ```

use crate::calculation::{CalculationStats, GridCalculationExt};
use crate::{rewrite_references, Axis, Grid, GridAccess, Result, StructuralEdit};
use tracing::debug;

/// Apply a row edit to the grid, rewrite formulas and recalculate
pub fn apply_row_edit(grid: &mut Grid, edit: StructuralEdit) -> Result<CalculationStats> {
    match edit {
        StructuralEdit::Insert { at } => grid.insert_row(at)?,
        StructuralEdit::Delete { at } => grid.delete_row(at)?,
        StructuralEdit::Move { from, to } => grid.move_row(from, to)?,
    }
    finish_edit(grid, Axis::Row, edit)
}

/// Apply a column edit to the grid, rewrite formulas and recalculate
pub fn apply_col_edit(grid: &mut Grid, edit: StructuralEdit) -> Result<CalculationStats> {
    match edit {
        StructuralEdit::Insert { at } => grid.insert_column(at)?,
        StructuralEdit::Delete { at } => grid.delete_column(at)?,
        StructuralEdit::Move { from, to } => grid.move_column(from, to)?,
    }
    finish_edit(grid, Axis::Column, edit)
}

fn finish_edit(grid: &mut Grid, axis: Axis, edit: StructuralEdit) -> Result<CalculationStats> {
    let rewritten = rewrite_formulas(grid, axis, edit);
    debug!(?axis, ?edit, rewritten, "structural edit applied");
    grid.recalculate()
}

/// Rewrite the references of every formula cell for an edit along `axis`
///
/// Use this when the grid owner performs the cell moves itself. Returns the
/// number of formulas whose text changed; the grid is not recalculated.
pub fn rewrite_formulas<G: GridAccess + ?Sized>(
    grid: &mut G,
    axis: Axis,
    edit: StructuralEdit,
) -> usize {
    let mut updates = Vec::new();

    for row in 0..grid.row_count() {
        for col in 0..grid.col_count() {
            let text = match grid.cell(row, col).and_then(|c| c.formula()) {
                Some(text) => text,
                None => continue,
            };
            let rewritten = rewrite_references(text, axis, edit);
            if rewritten != text {
                updates.push((row, col, rewritten));
            }
        }
    }

    let count = updates.len();
    for (row, col, text) in updates {
        grid.set_formula_text(row, col, text);
    }
    count
}
