//! # gridcalc-formula
//!
//! Formula parser and evaluator for gridcalc.
//!
//! This crate provides:
//! - Formula parsing (text → AST)
//! - Formula evaluation (AST → value) against any [`GridAccess`](gridcalc_core::GridAccess)
//! - Built-in math, statistical, logical and lookup functions
//! - Dependency tracking for calculation order and cycle detection
//! - Reference rewriting for row/column insert, delete and move
//!
//! ## Example
//!
//! ```rust
//! use gridcalc_core::Grid;
//! use gridcalc_formula::{evaluate, format_result, parse_formula, EvaluationResult};
//!
//! let mut grid = Grid::new(3, 3);
//! grid.set_value("A1", 4).unwrap();
//! grid.set_value("A2", 6).unwrap();
//!
//! assert!(parse_formula("=AVERAGE(A1:A2)").is_ok());
//!
//! let result = evaluate("=AVERAGE(A1:A2)", &grid, 0, 1);
//! assert_eq!(result, EvaluationResult::Number(5.0));
//! assert_eq!(format_result(&result, Some(2)), "5.00");
//! ```

pub mod ast;
pub mod dependency;
pub mod error;
pub mod evaluator;
pub mod format;
pub mod functions;
pub mod parser;
pub mod rewrite;

pub use ast::{BinaryOperator, FormulaExpr, Reference, UnaryOperator};
pub use dependency::{CellKey, DependencyGraph};
pub use error::{FormulaError, FormulaResult};
pub use evaluator::{
    compare_values, evaluate, evaluate_expr, EvaluationCache, EvaluationContext,
    EvaluationResult, FormulaValue,
};
pub use format::{format_number, format_raw, format_result};
pub use functions::{FunctionDef, FunctionRegistry};
pub use parser::parse_formula;
pub use rewrite::{rewrite_for_col_op, rewrite_for_row_op, rewrite_references, Axis, StructuralEdit};
