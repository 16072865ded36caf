//! Cell data: raw content plus the computed display state

use super::value::{DataType, RawValue};

/// A single grid cell
///
/// `raw` is owned by the grid owner; `display` and `data_type` are written
/// back by the engine after each evaluation. `decimal_places` is the
/// per-cell display format consulted when a number is rendered.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    /// The cell's raw content
    pub raw: RawValue,
    /// Text shown for the cell
    pub display: String,
    /// Kind of the displayed content
    pub data_type: DataType,
    /// Fixed number of fractional digits for numeric display
    pub decimal_places: Option<u8>,
}

impl Cell {
    /// Create a cell holding `raw`; display state is filled in on the next
    /// recalculation
    pub fn new(raw: RawValue) -> Self {
        let data_type = raw.data_type();
        Self {
            raw,
            display: String::new(),
            data_type,
            decimal_places: None,
        }
    }

    /// Create an empty cell
    pub fn empty() -> Self {
        Self::default()
    }

    /// Check if this cell has no content
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Get the formula text if this is a formula cell
    pub fn formula(&self) -> Option<&str> {
        self.raw.formula_text()
    }
}
