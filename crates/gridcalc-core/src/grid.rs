//! Grid type and the accessor traits the engine works through

use crate::cell::{Cell, CellAddress, DataType, RawValue};
use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};

/// Read/write access to a grid of cells, as seen by the engine
///
/// The grid owner implements this; the engine borrows it for the length of
/// a single call. Lookups outside the grid return `None`.
pub trait GridAccess {
    /// Number of rows
    fn row_count(&self) -> u32;

    /// Number of columns
    fn col_count(&self) -> u32;

    /// Bounds-checked cell lookup
    fn cell(&self, row: u32, col: u32) -> Option<&Cell>;

    /// Write back the result of evaluating a cell
    fn set_cell_computed(&mut self, row: u32, col: u32, display: String, data_type: DataType);

    /// Replace the formula text of a formula cell (used when references are
    /// rewritten after a structural edit)
    fn set_formula_text(&mut self, row: u32, col: u32, text: String);
}

/// Per-cell display formatting
pub trait CellStyles {
    /// Fixed number of fractional digits for numeric display, if any
    fn decimal_places(&self, row: u32, col: u32) -> Option<u8>;
}

/// A rectangular, in-memory grid of cells
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
    col_count: u32,
}

impl Grid {
    /// Create an empty grid of `rows x cols` cells
    pub fn new(rows: u32, cols: u32) -> Self {
        let rows = rows.min(MAX_ROWS);
        let cols = cols.min(MAX_COLS);
        Self {
            rows: (0..rows)
                .map(|_| vec![Cell::empty(); cols as usize])
                .collect(),
            col_count: cols,
        }
    }

    // === Cell Access ===

    /// Get a cell by address string (e.g., "A1")
    pub fn cell_by_address(&self, address: &str) -> Result<Option<&Cell>> {
        let addr = CellAddress::parse(address)?;
        Ok(self.cell_at(addr.row, addr.col))
    }

    /// Get a cell by row and column indices
    pub fn cell_at(&self, row: u32, col: u32) -> Option<&Cell> {
        self.rows
            .get(row as usize)
            .and_then(|cells| cells.get(col as usize))
    }

    /// Get a mutable cell by row and column indices
    pub fn cell_at_mut(&mut self, row: u32, col: u32) -> Option<&mut Cell> {
        self.rows
            .get_mut(row as usize)
            .and_then(|cells| cells.get_mut(col as usize))
    }

    /// Display text of a cell by address string
    pub fn display(&self, address: &str) -> Result<&str> {
        Ok(self
            .cell_by_address(address)?
            .map(|cell| cell.display.as_str())
            .unwrap_or(""))
    }

    /// Set a cell value by address string
    ///
    /// Strings go through [`RawValue::from_input`], so `"=A1*2"` stores a
    /// formula and `"12"` a number.
    pub fn set_value<V: Into<RawValue>>(&mut self, address: &str, value: V) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_value_at(addr.row, addr.col, value)
    }

    /// Set a cell value by row and column indices
    pub fn set_value_at<V: Into<RawValue>>(&mut self, row: u32, col: u32, value: V) -> Result<()> {
        let cell = self.cell_mut_checked(row, col)?;
        let raw = value.into();
        cell.data_type = raw.data_type();
        cell.raw = raw;
        Ok(())
    }

    /// Set a cell formula by address string
    pub fn set_formula(&mut self, address: &str, formula: &str) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_formula_at(addr.row, addr.col, formula)
    }

    /// Set a cell formula by row and column indices
    pub fn set_formula_at(&mut self, row: u32, col: u32, formula: &str) -> Result<()> {
        let text = if formula.starts_with('=') {
            formula.to_string()
        } else {
            format!("={}", formula)
        };
        self.set_value_at(row, col, RawValue::Formula(text))
    }

    /// Set the decimal places used to display a cell
    pub fn set_decimal_places(&mut self, address: &str, places: Option<u8>) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.cell_mut_checked(addr.row, addr.col)?.decimal_places = places;
        Ok(())
    }

    /// Clear a cell's content and display state
    pub fn clear_cell_at(&mut self, row: u32, col: u32) {
        if let Some(cell) = self.cell_at_mut(row, col) {
            *cell = Cell::empty();
        }
    }

    // === Structure ===

    /// Insert an empty row before `at` (`at == row_count` appends)
    pub fn insert_row(&mut self, at: u32) -> Result<()> {
        if at > self.row_count() {
            return Err(Error::RowOutOfBounds(at, self.row_count()));
        }
        if self.row_count() >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(self.row_count(), MAX_ROWS - 1));
        }
        self.rows
            .insert(at as usize, vec![Cell::empty(); self.col_count as usize]);
        Ok(())
    }

    /// Remove row `at`
    pub fn delete_row(&mut self, at: u32) -> Result<()> {
        self.validate_row(at)?;
        self.rows.remove(at as usize);
        Ok(())
    }

    /// Move row `from` so that it ends up at index `to`
    pub fn move_row(&mut self, from: u32, to: u32) -> Result<()> {
        self.validate_row(from)?;
        self.validate_row(to)?;
        let row = self.rows.remove(from as usize);
        self.rows.insert(to as usize, row);
        Ok(())
    }

    /// Insert an empty column before `at` (`at == col_count` appends)
    pub fn insert_column(&mut self, at: u32) -> Result<()> {
        if at > self.col_count {
            return Err(Error::ColumnOutOfBounds(at, self.col_count));
        }
        if self.col_count >= MAX_COLS {
            return Err(Error::ColumnOutOfBounds(self.col_count, MAX_COLS - 1));
        }
        for cells in &mut self.rows {
            cells.insert(at as usize, Cell::empty());
        }
        self.col_count += 1;
        Ok(())
    }

    /// Remove column `at`
    pub fn delete_column(&mut self, at: u32) -> Result<()> {
        self.validate_col(at)?;
        for cells in &mut self.rows {
            cells.remove(at as usize);
        }
        self.col_count -= 1;
        Ok(())
    }

    /// Move column `from` so that it ends up at index `to`
    pub fn move_column(&mut self, from: u32, to: u32) -> Result<()> {
        self.validate_col(from)?;
        self.validate_col(to)?;
        for cells in &mut self.rows {
            let cell = cells.remove(from as usize);
            cells.insert(to as usize, cell);
        }
        Ok(())
    }

    // === Helpers ===

    fn validate_row(&self, row: u32) -> Result<()> {
        if row >= self.row_count() {
            return Err(Error::RowOutOfBounds(row, self.row_count().saturating_sub(1)));
        }
        Ok(())
    }

    fn validate_col(&self, col: u32) -> Result<()> {
        if col >= self.col_count {
            return Err(Error::ColumnOutOfBounds(col, self.col_count.saturating_sub(1)));
        }
        Ok(())
    }

    fn cell_mut_checked(&mut self, row: u32, col: u32) -> Result<&mut Cell> {
        self.validate_row(row)?;
        self.validate_col(col)?;
        self.cell_at_mut(row, col)
            .ok_or_else(|| Error::other(format!("missing cell at ({}, {})", row, col)))
    }
}

impl GridAccess for Grid {
    fn row_count(&self) -> u32 {
        self.rows.len() as u32
    }

    fn col_count(&self) -> u32 {
        self.col_count
    }

    fn cell(&self, row: u32, col: u32) -> Option<&Cell> {
        self.cell_at(row, col)
    }

    fn set_cell_computed(&mut self, row: u32, col: u32, display: String, data_type: DataType) {
        if let Some(cell) = self.cell_at_mut(row, col) {
            cell.display = display;
            cell.data_type = data_type;
        }
    }

    fn set_formula_text(&mut self, row: u32, col: u32, text: String) {
        if let Some(cell) = self.cell_at_mut(row, col) {
            if cell.raw.is_formula() {
                cell.raw = RawValue::Formula(text);
            }
        }
    }
}

impl CellStyles for Grid {
    fn decimal_places(&self, row: u32, col: u32) -> Option<u8> {
        self.cell_at(row, col).and_then(|cell| cell.decimal_places)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn raw(grid: &Grid, address: &str) -> RawValue {
        grid.cell_by_address(address)
            .unwrap()
            .map(|c| c.raw.clone())
            .unwrap_or_default()
    }

    #[test]
    fn test_set_and_get() {
        let mut grid = Grid::new(3, 3);
        grid.set_value("A1", 10.0).unwrap();
        grid.set_value("B1", "hello").unwrap();
        grid.set_value("C1", "=A1*2").unwrap();
        grid.set_formula("A2", "SUM(A1:C1)").unwrap();

        assert_eq!(raw(&grid, "A1"), RawValue::Number(10.0));
        assert_eq!(raw(&grid, "B1"), RawValue::Text("hello".into()));
        assert_eq!(raw(&grid, "C1"), RawValue::formula("=A1*2"));
        assert_eq!(raw(&grid, "A2"), RawValue::formula("=SUM(A1:C1)"));
        assert_eq!(grid.cell_at(0, 2).unwrap().data_type, DataType::Formula);
        assert_eq!(grid.cell_at(1, 0).and_then(|c| c.formula()), Some("=SUM(A1:C1)"));
    }

    #[test]
    fn test_out_of_bounds() {
        let mut grid = Grid::new(2, 2);
        assert!(grid.set_value("C1", 1.0).is_err());
        assert!(grid.set_value("A3", 1.0).is_err());
        assert!(grid.cell(5, 5).is_none());
        assert_eq!(grid.display("B2").unwrap(), "");
    }

    #[test]
    fn test_row_structure() {
        let mut grid = Grid::new(3, 1);
        grid.set_value("A1", 1.0).unwrap();
        grid.set_value("A2", 2.0).unwrap();
        grid.set_value("A3", 3.0).unwrap();

        grid.insert_row(1).unwrap();
        assert_eq!(grid.row_count(), 4);
        assert_eq!(raw(&grid, "A2"), RawValue::Empty);
        assert_eq!(raw(&grid, "A3"), RawValue::Number(2.0));

        grid.delete_row(1).unwrap();
        assert_eq!(grid.row_count(), 3);
        assert_eq!(raw(&grid, "A2"), RawValue::Number(2.0));

        grid.move_row(0, 2).unwrap();
        assert_eq!(raw(&grid, "A1"), RawValue::Number(2.0));
        assert_eq!(raw(&grid, "A3"), RawValue::Number(1.0));

        assert!(grid.delete_row(3).is_err());
        assert!(grid.insert_row(5).is_err());
    }

    #[test]
    fn test_column_structure() {
        let mut grid = Grid::new(1, 3);
        grid.set_value("A1", 1.0).unwrap();
        grid.set_value("C1", 3.0).unwrap();

        grid.insert_column(0).unwrap();
        assert_eq!(grid.col_count(), 4);
        assert_eq!(raw(&grid, "B1"), RawValue::Number(1.0));

        grid.move_column(3, 0).unwrap();
        assert_eq!(raw(&grid, "A1"), RawValue::Number(3.0));

        grid.delete_column(0).unwrap();
        assert_eq!(grid.col_count(), 3);
        assert_eq!(raw(&grid, "B1"), RawValue::Number(1.0));
    }
}
