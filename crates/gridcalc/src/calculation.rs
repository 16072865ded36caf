//! Grid calculation engine
//!
//! Recalculates every formula cell of a grid in dependency order with a
//! bounded fixed-point loop, then writes the formatted results back into the
//! cells. A cycle is cut where evaluation re-enters a cell: that reference
//! reads as a circular reference error, which then flows through formulas
//! like any other error value.
//!
//! # Example
//!
//! ```rust
//! use gridcalc::prelude::*;
//!
//! let mut grid = Grid::new(10, 3);
//! grid.set_value("A1", 10.0).unwrap();
//! grid.set_value("A2", 20.0).unwrap();
//! grid.set_formula("A3", "=A1+A2").unwrap();
//!
//! // Calculate all formulas
//! let stats = grid.recalculate().unwrap();
//! assert_eq!(stats.formula_count, 1);
//! assert!(stats.converged);
//! assert_eq!(grid.display("A3").unwrap(), "30");
//! ```

use crate::{
    format_raw, format_result, CellKey, CellStyles, DataType, DependencyGraph, Error, ErrorKind,
    EvaluationCache, EvaluationContext, EvaluationResult, GridAccess, Result,
};
use tracing::{debug, trace, warn};

/// Options for grid calculation
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalculationOptions {
    /// Upper bound on evaluation passes (default: 10)
    pub max_passes: u32,
    /// Evaluate in dependency order and count cycle cells up front
    /// (default: true)
    ///
    /// When off, formula cells are evaluated row-major and only cells whose
    /// result is a circular reference error are counted.
    pub dependency_order: bool,
}

impl Default for CalculationOptions {
    fn default() -> Self {
        Self {
            max_passes: 10,
            dependency_order: true,
        }
    }
}

/// Statistics from a calculation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalculationStats {
    /// Total number of formula cells
    pub formula_count: usize,
    /// Number of cell evaluations over all passes
    pub cells_calculated: usize,
    /// Number of passes performed
    pub passes: u32,
    /// Number of cells on a cycle
    pub circular_references: usize,
    /// Number of formula cells showing an error after the last pass
    pub errors: usize,
    /// Whether the last pass changed nothing
    pub converged: bool,
}

/// Extension trait adding calculation methods to a grid
pub trait GridCalculationExt {
    /// Recalculate all formulas with default options
    fn recalculate(&mut self) -> Result<CalculationStats>;

    /// Recalculate all formulas with custom options
    fn recalculate_with_options(&mut self, options: &CalculationOptions)
        -> Result<CalculationStats>;
}

impl<G: GridAccess + CellStyles> GridCalculationExt for G {
    fn recalculate(&mut self) -> Result<CalculationStats> {
        self.recalculate_with_options(&CalculationOptions::default())
    }

    fn recalculate_with_options(
        &mut self,
        options: &CalculationOptions,
    ) -> Result<CalculationStats> {
        CalculationEngine::new(options.clone()).calculate_all(self)
    }
}

/// Recalculate `grid` with default options
///
/// Shorthand for [`GridCalculationExt::recalculate`].
pub fn recalculate<G: GridAccess + CellStyles>(grid: &mut G) -> Result<CalculationStats> {
    grid.recalculate()
}

/// The calculation engine
struct CalculationEngine {
    options: CalculationOptions,
    /// Formula cells in evaluation order
    order: Vec<CellKey>,
}

impl CalculationEngine {
    fn new(options: CalculationOptions) -> Self {
        Self {
            options,
            order: Vec::new(),
        }
    }

    /// Calculate all formulas in the grid
    fn calculate_all<G: GridAccess + CellStyles>(
        &mut self,
        grid: &mut G,
    ) -> Result<CalculationStats> {
        if self.options.max_passes == 0 {
            return Err(Error::other("max_passes must be at least 1"));
        }

        let mut stats = CalculationStats::default();

        // Phase 1: Literal displays follow the current decimal places
        refresh_literals(grid);

        // Phase 2: Collect formulas in evaluation order, find cycles
        if self.options.dependency_order {
            let graph = DependencyGraph::from_grid(&*grid);
            stats.circular_references = graph.circular_cells().len();
            self.order = graph.calculation_order();
        } else {
            self.order = collect_formula_cells(&*grid);
        }
        stats.formula_count = self.order.len();

        if stats.formula_count == 0 {
            stats.converged = true;
            return Ok(stats);
        }

        // Phase 3: Evaluate until a pass changes nothing
        for pass in 1..=self.options.max_passes {
            stats.passes = pass;

            let results = self.evaluate_pass(&*grid);
            stats.cells_calculated += results.len();

            if !self.options.dependency_order {
                stats.circular_references = results
                    .iter()
                    .filter(|(_, r)| *r == EvaluationResult::Error(ErrorKind::CircularReference))
                    .count();
            }
            stats.errors = results.iter().filter(|(_, r)| r.is_error()).count();

            let changed = write_results(grid, &results);
            trace!(pass, changed, "calculation pass finished");

            if changed == 0 {
                stats.converged = true;
                break;
            }
        }

        if !stats.converged {
            warn!(
                passes = stats.passes,
                formulas = stats.formula_count,
                "recalculation stopped at the pass limit without converging"
            );
        }

        debug!(
            formulas = stats.formula_count,
            calculated = stats.cells_calculated,
            passes = stats.passes,
            circular = stats.circular_references,
            errors = stats.errors,
            "recalculation finished"
        );

        Ok(stats)
    }

    /// Evaluate every formula cell once against a fresh memo
    fn evaluate_pass(&self, grid: &dyn GridAccess) -> Vec<(CellKey, EvaluationResult)> {
        let cache = EvaluationCache::new();
        self.order
            .iter()
            .map(|&key| {
                let ctx = EvaluationContext::new(grid, &cache, key.row, key.col);
                (key, EvaluationResult::from(ctx.evaluate_cell(key.row, key.col)))
            })
            .collect()
    }
}

/// Formula cells in row-major order
fn collect_formula_cells(grid: &dyn GridAccess) -> Vec<CellKey> {
    let mut cells = Vec::new();
    for row in 0..grid.row_count() {
        for col in 0..grid.col_count() {
            if grid.cell(row, col).map_or(false, |c| c.formula().is_some()) {
                cells.push(CellKey::new(row, col));
            }
        }
    }
    cells
}

/// Store results whose display or type differ from the cell; returns how
/// many cells changed
fn write_results<G: GridAccess + CellStyles>(
    grid: &mut G,
    results: &[(CellKey, EvaluationResult)],
) -> usize {
    let mut changed = 0;

    for (key, result) in results {
        let text = format_result(result, grid.decimal_places(key.row, key.col));
        let data_type = if result.is_error() {
            DataType::Error
        } else {
            DataType::Formula
        };

        let same = grid
            .cell(key.row, key.col)
            .map_or(false, |c| c.display == text && c.data_type == data_type);
        if same {
            continue;
        }

        trace!(row = key.row, col = key.col, text = text.as_str(), "cell updated");
        grid.set_cell_computed(key.row, key.col, text, data_type);
        changed += 1;
    }

    changed
}

/// Re-render non-formula cells whose display is stale
fn refresh_literals<G: GridAccess + CellStyles>(grid: &mut G) {
    let mut stale = Vec::new();

    for row in 0..grid.row_count() {
        for col in 0..grid.col_count() {
            let cell = match grid.cell(row, col) {
                Some(cell) if !cell.raw.is_formula() => cell,
                _ => continue,
            };
            let display = format_raw(&cell.raw, grid.decimal_places(row, col));
            let data_type = cell.raw.data_type();
            if cell.display != display || cell.data_type != data_type {
                stale.push((row, col, display, data_type));
            }
        }
    }

    for (row, col, display, data_type) in stale {
        grid.set_cell_computed(row, col, display, data_type);
    }
}
