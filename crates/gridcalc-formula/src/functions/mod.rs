//! Built-in functions

pub mod logical;
pub mod lookup;
pub mod math;
pub mod statistical;

use crate::ast::FormulaExpr;
use crate::error::FormulaResult;
use crate::evaluator::{EvaluationContext, FormulaValue};
use ahash::AHashMap;
use gridcalc_core::ErrorKind;

/// Function implementation signature
///
/// Arguments arrive evaluated; ranges are [`FormulaValue::Array`].
pub type FunctionImpl = fn(&[FormulaValue]) -> FormulaResult<FormulaValue>;

/// Signature of functions that evaluate their own arguments, so that a
/// branch that is not taken is never evaluated
pub type LazyFunctionImpl =
    fn(&[FormulaExpr], &EvaluationContext) -> FormulaResult<FormulaValue>;

/// How a function receives its arguments
#[derive(Clone, Copy)]
pub enum Implementation {
    Eager(FunctionImpl),
    Lazy(LazyFunctionImpl),
}

/// Function definition
pub struct FunctionDef {
    /// Function name (uppercase)
    pub name: &'static str,
    /// Minimum arguments
    pub min_args: usize,
    /// Maximum arguments (None = unlimited)
    pub max_args: Option<usize>,
    /// Implementation
    pub implementation: Implementation,
    /// Receives argument failures as error values instead of failing itself
    pub catches_errors: bool,
}

/// Function registry
pub struct FunctionRegistry {
    functions: AHashMap<String, FunctionDef>,
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionRegistry {
    /// Create a new registry with all built-in functions
    pub fn new() -> Self {
        let mut registry = Self {
            functions: AHashMap::new(),
        };

        registry.register_math_functions();
        registry.register_statistical_functions();
        registry.register_logical_functions();
        registry.register_lookup_functions();

        registry
    }

    /// Look up a function by name
    pub fn get(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(&name.to_uppercase())
    }

    /// Register a function
    pub fn register(&mut self, def: FunctionDef) {
        self.functions.insert(def.name.to_uppercase(), def);
    }

    /// Names of all registered functions, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.functions.values().map(|f| f.name).collect();
        names.sort_unstable();
        names
    }

    fn add(&mut self, name: &'static str, min_args: usize, max_args: Option<usize>, f: FunctionImpl) {
        self.register(FunctionDef {
            name,
            min_args,
            max_args,
            implementation: Implementation::Eager(f),
            catches_errors: false,
        });
    }

    fn add_lazy(
        &mut self,
        name: &'static str,
        min_args: usize,
        max_args: Option<usize>,
        f: LazyFunctionImpl,
    ) {
        self.register(FunctionDef {
            name,
            min_args,
            max_args,
            implementation: Implementation::Lazy(f),
            catches_errors: false,
        });
    }

    fn register_math_functions(&mut self) {
        self.add("SUM", 1, None, math::fn_sum);
        self.add("AVERAGE", 1, None, math::fn_average);
        self.add("COUNT", 1, None, math::fn_count);
        self.add("MIN", 1, None, math::fn_min);
        self.add("MAX", 1, None, math::fn_max);
        self.add("PRODUCT", 1, None, math::fn_product);

        self.add("ABS", 1, Some(1), math::fn_abs);
        self.add("ROUND", 1, Some(2), math::fn_round);
        self.add("INT", 1, Some(1), math::fn_int);
        self.add("MOD", 2, Some(2), math::fn_mod);
        self.add("POWER", 2, Some(2), math::fn_power);
        self.add("SQRT", 1, Some(1), math::fn_sqrt);
    }

    fn register_statistical_functions(&mut self) {
        self.add("COUNTA", 1, None, statistical::fn_counta);
        self.add("COUNTBLANK", 1, None, statistical::fn_countblank);
        self.add("MEDIAN", 1, None, statistical::fn_median);
        self.add("MODE", 1, None, statistical::fn_mode);
        self.add("STDEV", 1, None, statistical::fn_stdev);
        self.add("VAR", 1, None, statistical::fn_var);
        self.add("CORREL", 2, Some(2), statistical::fn_correl);
        self.add("PERCENTILE", 2, Some(2), statistical::fn_percentile);
        self.add("QUARTILE", 2, Some(2), statistical::fn_quartile);
        self.add("RANK", 2, Some(3), statistical::fn_rank);
    }

    fn register_logical_functions(&mut self) {
        self.add_lazy("IF", 2, Some(3), logical::fn_if);
        self.add_lazy("IFS", 2, None, logical::fn_ifs);
        self.add("AND", 1, None, logical::fn_and);
        self.add("OR", 1, None, logical::fn_or);
        self.add("NOT", 1, Some(1), logical::fn_not);

        // IFERROR / IFNA need to see failures of their first argument
        self.register(FunctionDef {
            name: "IFERROR",
            min_args: 2,
            max_args: Some(2),
            implementation: Implementation::Eager(logical::fn_iferror),
            catches_errors: true,
        });
        self.register(FunctionDef {
            name: "IFNA",
            min_args: 2,
            max_args: Some(2),
            implementation: Implementation::Eager(logical::fn_ifna),
            catches_errors: true,
        });
    }

    fn register_lookup_functions(&mut self) {
        self.add("VLOOKUP", 3, Some(4), lookup::fn_vlookup);
    }
}

/// Collect the numbers an aggregate sees
///
/// Empty cells are skipped; text that does not read as a number and error
/// values count as `0`.
pub(crate) fn collect_numbers(args: &[FormulaValue]) -> Vec<f64> {
    args.iter()
        .flat_map(|arg| arg.values())
        .filter(|v| !matches!(v, FormulaValue::Empty))
        .map(|v| v.as_number().unwrap_or(0.0))
        .collect()
}

/// A single numeric argument, or the error value to return instead
pub(crate) fn number_arg(args: &[FormulaValue], index: usize) -> Result<f64, FormulaValue> {
    match args.get(index) {
        Some(FormulaValue::Error(e)) => Err(FormulaValue::Error(*e)),
        Some(value) => value
            .as_number()
            .ok_or(FormulaValue::Error(ErrorKind::FormulaError)),
        None => Err(FormulaValue::Error(ErrorKind::FormulaError)),
    }
}

/// Shorthand for the generic failure value
pub(crate) fn formula_error() -> FormulaValue {
    FormulaValue::Error(ErrorKind::FormulaError)
}
