//! # gridcalc-core
//!
//! Core data structures for the gridcalc formula engine.
//!
//! This crate provides the fundamental types used throughout gridcalc:
//! - [`RawValue`] - Content typed into a cell (numbers, text, booleans, formulas)
//! - [`CellAddress`] and [`CellRange`] - Cell addressing and ranges
//! - [`Cell`] - Raw content plus the computed display state
//! - [`Grid`] - An in-memory grid, plus the [`GridAccess`] / [`CellStyles`]
//!   traits the engine reads and writes through
//!
//! ## Example
//!
//! ```rust
//! use gridcalc_core::{Grid, RawValue};
//!
//! let mut grid = Grid::new(10, 5);
//!
//! // Using string addresses
//! grid.set_value("A1", "Hello").unwrap();
//! grid.set_value("B1", 42.0).unwrap();
//!
//! // Or using row/column indices (0-based)
//! grid.set_value_at(1, 0, RawValue::Text("World".into())).unwrap();
//! grid.set_value_at(1, 1, "=B1*2").unwrap();
//! ```

pub mod cell;
pub mod error;
pub mod grid;

// Re-exports for convenience
pub use cell::{
    Cell, CellAddress, CellRange, CellRangeIterator, DataType, ErrorKind, RawValue,
    ERROR_SENTINEL, NOT_AVAILABLE_SENTINEL,
};
pub use error::{Error, Result};
pub use grid::{CellStyles, Grid, GridAccess};

/// Maximum number of rows in a grid
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a grid
pub const MAX_COLS: u32 = 16_384;
