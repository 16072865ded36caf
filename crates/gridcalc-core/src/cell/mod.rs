//! Cell-related types and utilities
//!
//! This module contains:
//! - [`RawValue`] - The content typed into a cell
//! - [`CellAddress`] - A cell's location (e.g., "A1")
//! - [`CellRange`] - A range of cells (e.g., "A1:B10")
//! - [`Cell`] - Raw content plus computed display state

mod address;
mod data;
mod value;

pub use address::{CellAddress, CellRange, CellRangeIterator};
pub use data::Cell;
pub use value::{DataType, ErrorKind, RawValue, ERROR_SENTINEL, NOT_AVAILABLE_SENTINEL};
