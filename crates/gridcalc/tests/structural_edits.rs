//! Tests for row/column edits followed by reference rewriting and recalculation

use gridcalc::prelude::*;
use gridcalc::{apply_col_edit, apply_row_edit, rewrite_for_row_op, ERROR_SENTINEL};
use pretty_assertions::assert_eq;

fn formula(grid: &Grid, address: &str) -> String {
    grid.cell_by_address(address)
        .unwrap()
        .and_then(|cell| cell.formula())
        .unwrap_or_default()
        .to_string()
}

fn numbers_in_column_a(rows: u32) -> Grid {
    let mut grid = Grid::new(rows + 1, 3);
    for row in 0..rows {
        grid.set_value_at(row, 0, (row + 1) as f64).unwrap();
    }
    grid
}

#[test]
fn test_insert_row_grows_range() {
    assert_eq!(
        rewrite_for_row_op("=SUM(A1:A5)", StructuralEdit::Insert { at: 1 }),
        "=SUM(A1:A6)"
    );

    let mut grid = numbers_in_column_a(5);
    grid.set_formula("C1", "=SUM(A1:A5)").unwrap();
    grid.recalculate().unwrap();
    assert_eq!(grid.display("C1").unwrap(), "15");

    apply_row_edit(&mut grid, StructuralEdit::Insert { at: 1 }).unwrap();
    assert_eq!(grid.row_count(), 7);
    assert_eq!(formula(&grid, "C1"), "=SUM(A1:A6)");

    // Fill the new row; the range covers it
    grid.set_value("A2", 100).unwrap();
    grid.recalculate().unwrap();
    assert_eq!(grid.display("C1").unwrap(), "115");
}

#[test]
fn test_delete_row_shrinks_range_and_invalidates_reference() {
    let mut grid = numbers_in_column_a(5);
    grid.set_formula("C1", "=SUM(A1:A5)").unwrap();
    grid.set_formula("C2", "=A3*2").unwrap();
    grid.set_formula("C6", "=A5").unwrap();

    apply_row_edit(&mut grid, StructuralEdit::Delete { at: 2 }).unwrap();

    assert_eq!(formula(&grid, "C1"), "=SUM(A1:A4)");
    assert_eq!(formula(&grid, "C2"), "=#REF!*2");
    // The formula moved up with its row and follows A5 to A4
    assert_eq!(formula(&grid, "C5"), "=A4");

    assert_eq!(grid.display("C1").unwrap(), "12");
    assert_eq!(grid.display("C2").unwrap(), ERROR_SENTINEL);
    assert_eq!(grid.display("C5").unwrap(), "5");
}

#[test]
fn test_move_row_keeps_values() {
    let mut grid = numbers_in_column_a(4);
    grid.set_formula("B1", "=A1*10").unwrap();
    grid.set_formula("C1", "=A4-A1").unwrap();
    grid.recalculate().unwrap();
    assert_eq!(grid.display("C1").unwrap(), "3");

    // Row 1 moves below row 3: old rows 2..3 shift up
    apply_row_edit(&mut grid, StructuralEdit::Move { from: 0, to: 2 }).unwrap();

    assert_eq!(formula(&grid, "B3"), "=A3*10");
    assert_eq!(formula(&grid, "C3"), "=A4-A3");
    assert_eq!(grid.display("B3").unwrap(), "10");
    assert_eq!(grid.display("C3").unwrap(), "3");
}

#[test]
fn test_insert_column_preserves_absolute_markers() {
    let mut grid = Grid::new(2, 4);
    grid.set_value("A1", 2).unwrap();
    grid.set_value("B1", 3).unwrap();
    grid.set_formula("C1", "=$A$1*B$1").unwrap();

    apply_col_edit(&mut grid, StructuralEdit::Insert { at: 1 }).unwrap();

    assert_eq!(grid.col_count(), 5);
    assert_eq!(formula(&grid, "D1"), "=$A$1*C$1");
    assert_eq!(grid.display("D1").unwrap(), "6");
}

#[test]
fn test_delete_column_with_text_literal() {
    let mut grid = Grid::new(2, 4);
    grid.set_value("A1", 1).unwrap();
    grid.set_value("C1", 2).unwrap();
    grid.set_formula("D1", "=IF(\"C1\"=\"C1\", C1, 0)").unwrap();

    apply_col_edit(&mut grid, StructuralEdit::Delete { at: 1 }).unwrap();

    // Only the reference moves, not the text inside the string
    assert_eq!(formula(&grid, "C1"), "=IF(\"C1\"=\"C1\", B1, 0)");
    assert_eq!(grid.display("C1").unwrap(), "2");
}
