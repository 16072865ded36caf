//! # gridcalc
//!
//! A spreadsheet formula evaluation and recalculation engine.
//!
//! The engine works on any grid that implements [`GridAccess`] and
//! [`CellStyles`]; [`Grid`] is the in-memory implementation shipped with it.
//!
//! ## Features
//!
//! - A1 references with `$` markers, ranges clipped to the grid
//! - `+ - * /` arithmetic and comparison operators
//! - Math, statistical, logical and lookup functions
//! - Dependency-ordered recalculation with cycle detection
//! - Reference rewriting for row/column insert, delete and move
//!
//! ## Example
//!
//! ```rust
//! use gridcalc::prelude::*;
//!
//! let mut grid = Grid::new(10, 3);
//!
//! grid.set_value("A1", 10).unwrap();
//! grid.set_formula("B1", "=A1*2").unwrap();
//! grid.set_formula("C1", "=B1+10").unwrap();
//! grid.recalculate().unwrap();
//! assert_eq!(grid.display("C1").unwrap(), "30");
//!
//! // Edits are followed by a recalculation
//! grid.set_value("A1", 5).unwrap();
//! grid.recalculate().unwrap();
//! assert_eq!(grid.display("C1").unwrap(), "20");
//! ```

pub mod calculation;
pub mod prelude;
pub mod structure;

// Re-export calculation types
pub use calculation::{recalculate, CalculationOptions, CalculationStats, GridCalculationExt};
pub use structure::{apply_col_edit, apply_row_edit, rewrite_formulas};

// Re-export core types
pub use gridcalc_core::{
    Cell, CellAddress, CellRange, CellStyles, DataType, Error, ErrorKind, Grid, GridAccess,
    RawValue, Result, ERROR_SENTINEL, MAX_COLS, MAX_ROWS, NOT_AVAILABLE_SENTINEL,
};

// Re-export formula types
pub use gridcalc_formula::{
    evaluate, format_raw, format_result, parse_formula, rewrite_for_col_op, rewrite_for_row_op,
    rewrite_references, Axis, CellKey, DependencyGraph, EvaluationCache, EvaluationContext,
    EvaluationResult, FormulaError, FormulaExpr, FormulaResult, FormulaValue, StructuralEdit,
};
