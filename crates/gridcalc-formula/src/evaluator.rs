//! Formula evaluator
//!
//! Evaluates formula ASTs against a grid. References to formula cells are
//! resolved by evaluating those cells recursively; results are memoized in an
//! [`EvaluationCache`] that also tracks which cells are currently being
//! evaluated, so that a cell reached again while in progress is reported as a
//! circular reference instead of recursing forever.

use crate::ast::{BinaryOperator, FormulaExpr, UnaryOperator};
use crate::error::{FormulaError, FormulaResult};
use crate::format::format_number;
use crate::functions::{FunctionRegistry, Implementation};
use crate::parser::parse_formula;
use ahash::{AHashMap, AHashSet};
use gridcalc_core::{CellRange, ErrorKind, GridAccess, RawValue};
use std::cell::RefCell;
use std::cmp::Ordering;
use std::sync::OnceLock;
use tracing::trace;

/// Global function registry (lazily initialized)
static FUNCTION_REGISTRY: OnceLock<FunctionRegistry> = OnceLock::new();

fn get_function_registry() -> &'static FunctionRegistry {
    FUNCTION_REGISTRY.get_or_init(FunctionRegistry::new)
}

/// Value types during formula evaluation
///
/// Booleans and comparison results are numbers (`1`/`0`).
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaValue {
    Number(f64),
    Text(String),
    Error(ErrorKind),
    Empty,
    /// Cells of a range, row-major
    Array(Vec<Vec<FormulaValue>>),
}

impl FormulaValue {
    /// `1` for true, `0` for false
    pub fn from_bool(b: bool) -> Self {
        FormulaValue::Number(if b { 1.0 } else { 0.0 })
    }

    /// Convert to number, if possible
    ///
    /// Text converts when it parses as a number; empty is `0`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FormulaValue::Number(n) => Some(*n),
            FormulaValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            FormulaValue::Empty => Some(0.0),
            _ => None,
        }
    }

    /// Force conversion to number for arithmetic
    pub fn to_number(&self) -> FormulaResult<f64> {
        self.as_number()
            .ok_or_else(|| FormulaError::Evaluation(format!("Cannot convert {:?} to number", self)))
    }

    /// Truthiness for conditions: non-zero numbers are true, empty is false
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FormulaValue::Text(s) if s.trim().eq_ignore_ascii_case("TRUE") => Some(true),
            FormulaValue::Text(s) if s.trim().eq_ignore_ascii_case("FALSE") => Some(false),
            other => other.as_number().map(|n| n != 0.0),
        }
    }

    /// Convert to display text with default number formatting
    pub fn as_string(&self) -> String {
        match self {
            FormulaValue::Number(n) => format_number(*n, None),
            FormulaValue::Text(s) => s.clone(),
            FormulaValue::Error(e) => e.to_string(),
            FormulaValue::Empty => String::new(),
            FormulaValue::Array(_) => ErrorKind::FormulaError.to_string(),
        }
    }

    /// Check if this is an error
    pub fn is_error(&self) -> bool {
        matches!(self, FormulaValue::Error(_))
    }

    /// Iterate over the scalar values, flattening arrays row-major
    pub fn values(&self) -> Box<dyn Iterator<Item = &FormulaValue> + '_> {
        match self {
            FormulaValue::Array(rows) => Box::new(rows.iter().flatten().flat_map(|v| v.values())),
            other => Box::new(std::iter::once(other)),
        }
    }
}

impl From<&RawValue> for FormulaValue {
    fn from(raw: &RawValue) -> Self {
        match raw {
            RawValue::Empty => FormulaValue::Empty,
            RawValue::Number(n) => FormulaValue::Number(*n),
            RawValue::Text(s) => FormulaValue::Text(s.clone()),
            RawValue::Boolean(b) => FormulaValue::from_bool(*b),
            // Formula cells go through EvaluationContext::evaluate_cell
            RawValue::Formula(_) => FormulaValue::Empty,
        }
    }
}

/// Final value of a formula
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationResult {
    Number(f64),
    Text(String),
    Error(ErrorKind),
}

impl EvaluationResult {
    /// Check if this is an error
    pub fn is_error(&self) -> bool {
        matches!(self, EvaluationResult::Error(_))
    }

    /// Get the number if this is one
    pub fn as_number(&self) -> Option<f64> {
        match self {
            EvaluationResult::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<FormulaValue> for EvaluationResult {
    fn from(value: FormulaValue) -> Self {
        match value {
            FormulaValue::Number(n) => EvaluationResult::Number(n),
            FormulaValue::Text(s) => EvaluationResult::Text(s),
            FormulaValue::Error(e) => EvaluationResult::Error(e),
            FormulaValue::Empty => EvaluationResult::Number(0.0),
            // A bare range is not a value
            FormulaValue::Array(_) => EvaluationResult::Error(ErrorKind::FormulaError),
        }
    }
}

impl From<EvaluationResult> for FormulaValue {
    fn from(result: EvaluationResult) -> Self {
        match result {
            EvaluationResult::Number(n) => FormulaValue::Number(n),
            EvaluationResult::Text(s) => FormulaValue::Text(s),
            EvaluationResult::Error(e) => FormulaValue::Error(e),
        }
    }
}

/// Per-pass memo of formula cell results
///
/// A cell is "in progress" between entering and leaving its evaluation;
/// reaching it again in that window is a cycle.
#[derive(Debug, Default)]
pub struct EvaluationCache {
    values: RefCell<AHashMap<(u32, u32), FormulaValue>>,
    in_progress: RefCell<AHashSet<(u32, u32)>>,
}

impl EvaluationCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached value of a cell
    pub fn get(&self, row: u32, col: u32) -> Option<FormulaValue> {
        self.values.borrow().get(&(row, col)).cloned()
    }

    /// Store a cell's value, replacing any earlier one
    pub fn insert(&self, row: u32, col: u32, value: FormulaValue) {
        self.values.borrow_mut().insert((row, col), value);
    }

    /// Number of cached cells
    pub fn len(&self) -> usize {
        self.values.borrow().len()
    }

    /// Check if nothing is cached
    pub fn is_empty(&self) -> bool {
        self.values.borrow().is_empty()
    }

    fn is_in_progress(&self, row: u32, col: u32) -> bool {
        self.in_progress.borrow().contains(&(row, col))
    }

    fn enter(&self, row: u32, col: u32) {
        self.in_progress.borrow_mut().insert((row, col));
    }

    fn leave(&self, row: u32, col: u32) {
        self.in_progress.borrow_mut().remove(&(row, col));
    }
}

/// Context for formula evaluation
pub struct EvaluationContext<'a> {
    /// Grid for cell lookups
    pub grid: &'a dyn GridAccess,
    /// Memo shared by every evaluation in the same pass
    pub cache: &'a EvaluationCache,
    /// Current cell row
    pub current_row: u32,
    /// Current cell column
    pub current_col: u32,
}

impl<'a> EvaluationContext<'a> {
    /// Create a new evaluation context
    pub fn new(grid: &'a dyn GridAccess, cache: &'a EvaluationCache, row: u32, col: u32) -> Self {
        Self {
            grid,
            cache,
            current_row: row,
            current_col: col,
        }
    }

    /// The same grid and cache, positioned at another cell
    fn at(&self, row: u32, col: u32) -> EvaluationContext<'a> {
        EvaluationContext::new(self.grid, self.cache, row, col)
    }

    /// Resolve a single cell to a value
    ///
    /// Formula cells are evaluated (once per cache); a cell that is already
    /// being evaluated yields `Error(CircularReference)`. Empty and
    /// out-of-bounds cells are [`FormulaValue::Empty`].
    pub fn evaluate_cell(&self, row: u32, col: u32) -> FormulaValue {
        if self.cache.is_in_progress(row, col) {
            return FormulaValue::Error(ErrorKind::CircularReference);
        }
        if let Some(value) = self.cache.get(row, col) {
            return value;
        }

        let cell = match self.grid.cell(row, col) {
            Some(cell) => cell,
            None => return FormulaValue::Empty,
        };

        let formula = match &cell.raw {
            RawValue::Formula(text) => text,
            raw => return raw.into(),
        };

        self.cache.enter(row, col);
        let result = evaluate_text(formula, &self.at(row, col));
        self.cache.leave(row, col);

        let value = FormulaValue::from(result);
        trace!(row, col, ?value, "evaluated cell");
        self.cache.insert(row, col, value.clone());
        value
    }

    /// Resolve a range to an array of values, clipped to the grid
    pub fn range_values(&self, range: &CellRange) -> FormulaValue {
        let (top, left) = range.top_left();
        let (bottom, right) = range.bottom_right();
        let bottom = bottom.min(self.grid.row_count().saturating_sub(1));
        let right = right.min(self.grid.col_count().saturating_sub(1));

        if top >= self.grid.row_count() || left >= self.grid.col_count() {
            return FormulaValue::Array(vec![]);
        }

        let mut rows = Vec::with_capacity((bottom - top + 1) as usize);
        for row in top..=bottom {
            let mut cols = Vec::with_capacity((right - left + 1) as usize);
            for col in left..=right {
                cols.push(self.evaluate_cell(row, col));
            }
            rows.push(cols);
        }

        FormulaValue::Array(rows)
    }
}

/// Evaluate formula text at `(row, col)` of `grid`
///
/// Never fails: parse and evaluation failures come back as
/// [`EvaluationResult::Error`].
///
/// # Example
/// ```rust
/// use gridcalc_core::Grid;
/// use gridcalc_formula::{evaluate, EvaluationResult};
///
/// let mut grid = Grid::new(5, 1);
/// for (i, n) in [1.0, 2.0, 3.0, 4.0, 5.0].into_iter().enumerate() {
///     grid.set_value_at(i as u32, 0, n).unwrap();
/// }
/// assert_eq!(evaluate("=SUM(A1:A5)", &grid, 0, 1), EvaluationResult::Number(15.0));
/// ```
pub fn evaluate(formula: &str, grid: &dyn GridAccess, row: u32, col: u32) -> EvaluationResult {
    let cache = EvaluationCache::new();
    let ctx = EvaluationContext::new(grid, &cache, row, col);

    cache.enter(row, col);
    let result = evaluate_text(formula, &ctx);
    cache.leave(row, col);
    result
}

/// Parse and evaluate formula text, folding failures into an error result
fn evaluate_text(formula: &str, ctx: &EvaluationContext) -> EvaluationResult {
    match parse_formula(formula).and_then(|ast| evaluate_expr(&ast, ctx)) {
        Ok(value) => value.into(),
        Err(e) => {
            trace!(row = ctx.current_row, col = ctx.current_col, error = %e, "formula failed");
            EvaluationResult::Error(e.kind())
        }
    }
}

/// Evaluate a formula expression
pub fn evaluate_expr(expr: &FormulaExpr, ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    match expr {
        // === Literals ===
        FormulaExpr::Number(n) => Ok(FormulaValue::Number(*n)),
        FormulaExpr::String(s) => Ok(FormulaValue::Text(s.clone())),
        FormulaExpr::Boolean(b) => Ok(FormulaValue::from_bool(*b)),
        FormulaExpr::Error(e) => Ok(FormulaValue::Error(*e)),

        // === References ===
        FormulaExpr::CellRef(addr) => Ok(ctx.evaluate_cell(addr.row, addr.col)),
        FormulaExpr::RangeRef(range) => Ok(ctx.range_values(range)),

        // === Operators ===
        FormulaExpr::BinaryOp { op, left, right } => evaluate_binary_op(*op, left, right, ctx),

        FormulaExpr::UnaryOp { op, operand } => evaluate_unary_op(*op, operand, ctx),

        // === Functions ===
        FormulaExpr::Function { name, args } => evaluate_function(name, args, ctx),
    }
}

/// Evaluate a binary operation
fn evaluate_binary_op(
    op: BinaryOperator,
    left: &FormulaExpr,
    right: &FormulaExpr,
    ctx: &EvaluationContext,
) -> FormulaResult<FormulaValue> {
    // Evaluate operands first
    let left_val = evaluate_expr(left, ctx)?;
    let right_val = evaluate_expr(right, ctx)?;

    // An error operand has no numeric value, whatever its kind
    if left_val.is_error() || right_val.is_error() {
        return Ok(FormulaValue::Error(ErrorKind::FormulaError));
    }

    if op.is_comparison() {
        let ordering = compare_values(&left_val, &right_val);
        let result = match op {
            BinaryOperator::Equal => ordering == Ordering::Equal,
            BinaryOperator::NotEqual => ordering != Ordering::Equal,
            BinaryOperator::LessThan => ordering == Ordering::Less,
            BinaryOperator::LessEqual => ordering != Ordering::Greater,
            BinaryOperator::GreaterThan => ordering == Ordering::Greater,
            _ => ordering != Ordering::Less,
        };
        return Ok(FormulaValue::from_bool(result));
    }

    let l = left_val.to_number()?;
    let r = right_val.to_number()?;

    let result = match op {
        BinaryOperator::Add => l + r,
        BinaryOperator::Subtract => l - r,
        BinaryOperator::Multiply => l * r,
        _ if r == 0.0 => return Ok(FormulaValue::Error(ErrorKind::FormulaError)),
        _ => l / r,
    };

    Ok(finite_or_error(result))
}

/// Overflowed results are failures, never `inf` or `NaN`
fn finite_or_error(n: f64) -> FormulaValue {
    if n.is_finite() {
        FormulaValue::Number(n)
    } else {
        FormulaValue::Error(ErrorKind::FormulaError)
    }
}

/// Compare two values for ordering
///
/// Numeric when both sides read as numbers, otherwise case-insensitive text.
pub fn compare_values(left: &FormulaValue, right: &FormulaValue) -> Ordering {
    match (left.as_number(), right.as_number()) {
        (Some(l), Some(r)) => l.partial_cmp(&r).unwrap_or(Ordering::Equal),
        _ => left
            .as_string()
            .to_lowercase()
            .cmp(&right.as_string().to_lowercase()),
    }
}

/// Evaluate a unary operation
fn evaluate_unary_op(
    op: UnaryOperator,
    operand: &FormulaExpr,
    ctx: &EvaluationContext,
) -> FormulaResult<FormulaValue> {
    let val = evaluate_expr(operand, ctx)?;
    if val.is_error() {
        return Ok(FormulaValue::Error(ErrorKind::FormulaError));
    }

    let n = val.to_number()?;
    match op {
        UnaryOperator::Negate => Ok(FormulaValue::Number(-n)),
    }
}

/// Evaluate a function call
fn evaluate_function(
    name: &str,
    args: &[FormulaExpr],
    ctx: &EvaluationContext,
) -> FormulaResult<FormulaValue> {
    let registry = get_function_registry();

    let func = registry
        .get(name)
        .ok_or_else(|| FormulaError::UnknownFunction(name.to_string()))?;

    // Check argument count
    if args.len() < func.min_args {
        return Err(FormulaError::ArgumentCount {
            function: name.to_string(),
            expected: format!("at least {}", func.min_args),
            actual: args.len(),
        });
    }

    if let Some(max) = func.max_args {
        if args.len() > max {
            return Err(FormulaError::ArgumentCount {
                function: name.to_string(),
                expected: format!("at most {}", max),
                actual: args.len(),
            });
        }
    }

    let result = match func.implementation {
        Implementation::Lazy(f) => f(args, ctx)?,
        Implementation::Eager(f) => {
            // Evaluate arguments; error-handling functions see failures as values
            let mut evaluated_args = Vec::with_capacity(args.len());
            for arg in args {
                let value = match evaluate_expr(arg, ctx) {
                    Ok(value) => value,
                    Err(e) if func.catches_errors => FormulaValue::Error(e.kind()),
                    Err(e) => return Err(e),
                };
                evaluated_args.push(value);
            }
            f(&evaluated_args)?
        }
    };

    match result {
        FormulaValue::Number(n) => Ok(finite_or_error(n)),
        other => Ok(other),
    }
}
