//! Prelude module - common imports for gridcalc users
//!
//! ```rust
//! use gridcalc::prelude::*;
//! ```

pub use crate::{
    // Calculation types
    CalculationOptions,
    CalculationStats,
    // Cell types
    Cell,
    CellAddress,
    CellRange,
    CellStyles,
    DataType,
    // Error types
    Error,
    ErrorKind,
    EvaluationResult,
    // Main types
    Grid,
    GridAccess,
    // Extension traits
    GridCalculationExt,
    RawValue,
    Result,
    // Structural edits
    StructuralEdit,
};
