//! Cell value types

use std::fmt;

/// Display text for every evaluation failure except lookup misses
pub const ERROR_SENTINEL: &str = "#ERROR!";

/// Display text for lookup/condition misses
pub const NOT_AVAILABLE_SENTINEL: &str = "#N/A";

/// The raw content of a cell, as entered by the user
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RawValue {
    /// Empty cell (no value)
    #[default]
    Empty,

    /// Text value
    Text(String),

    /// Numeric value
    Number(f64),

    /// Boolean value (TRUE/FALSE)
    Boolean(bool),

    /// Formula text, including the leading `=`
    Formula(String),
}

impl RawValue {
    /// Create a new formula value
    pub fn formula<S: Into<String>>(text: S) -> Self {
        RawValue::Formula(text.into())
    }

    /// Classify text typed into a cell
    ///
    /// `=...` is a formula, anything `f64` accepts is a number,
    /// `TRUE`/`FALSE` (any case) are booleans, blank input is empty and the
    /// rest is text.
    ///
    /// ```
    /// use gridcalc_core::RawValue;
    ///
    /// assert_eq!(RawValue::from_input("=A1+1"), RawValue::formula("=A1+1"));
    /// assert_eq!(RawValue::from_input(" 42 "), RawValue::Number(42.0));
    /// assert_eq!(RawValue::from_input("true"), RawValue::Boolean(true));
    /// assert_eq!(RawValue::from_input(""), RawValue::Empty);
    /// ```
    pub fn from_input(input: &str) -> Self {
        if input.starts_with('=') {
            return RawValue::Formula(input.to_string());
        }

        let trimmed = input.trim();
        if trimmed.is_empty() {
            return RawValue::Empty;
        }
        if let Ok(n) = trimmed.parse::<f64>() {
            if n.is_finite() {
                return RawValue::Number(n);
            }
        }
        if trimmed.eq_ignore_ascii_case("TRUE") {
            return RawValue::Boolean(true);
        }
        if trimmed.eq_ignore_ascii_case("FALSE") {
            return RawValue::Boolean(false);
        }

        RawValue::Text(input.to_string())
    }

    /// Check if the cell is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, RawValue::Empty)
    }

    /// Check if the cell contains a formula
    pub fn is_formula(&self) -> bool {
        matches!(self, RawValue::Formula(_))
    }

    /// Get the formula text if this is a formula cell
    pub fn formula_text(&self) -> Option<&str> {
        match self {
            RawValue::Formula(text) => Some(text),
            _ => None,
        }
    }

    /// The data type a cell holding this value starts out with
    pub fn data_type(&self) -> DataType {
        match self {
            RawValue::Empty | RawValue::Text(_) => DataType::String,
            RawValue::Number(_) => DataType::Number,
            RawValue::Boolean(_) => DataType::Boolean,
            RawValue::Formula(_) => DataType::Formula,
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Empty => write!(f, ""),
            RawValue::Text(s) => write!(f, "{}", s),
            RawValue::Number(n) => write!(f, "{}", n),
            RawValue::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            RawValue::Formula(text) => write!(f, "{}", text),
        }
    }
}

impl From<bool> for RawValue {
    fn from(b: bool) -> Self {
        RawValue::Boolean(b)
    }
}

impl From<i32> for RawValue {
    fn from(n: i32) -> Self {
        RawValue::Number(n as f64)
    }
}

impl From<i64> for RawValue {
    fn from(n: i64) -> Self {
        RawValue::Number(n as f64)
    }
}

impl From<f64> for RawValue {
    fn from(n: f64) -> Self {
        RawValue::Number(n)
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::from_input(s)
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::from_input(&s)
    }
}

/// What kind of content a cell currently displays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DataType {
    #[default]
    String,
    Number,
    Boolean,
    /// A formula whose last evaluation succeeded
    Formula,
    /// A formula whose last evaluation failed
    Error,
}

/// Evaluation error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorKind {
    /// Malformed or deleted reference (`#REF!` after a structural edit)
    InvalidReference,
    /// The cell depends on itself
    CircularReference,
    /// Parse, argument-count or type failure
    FormulaError,
    /// Lookup or condition miss
    LookupNotFound,
}

impl ErrorKind {
    /// Get the display string for this error
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::LookupNotFound => NOT_AVAILABLE_SENTINEL,
            ErrorKind::InvalidReference
            | ErrorKind::CircularReference
            | ErrorKind::FormulaError => ERROR_SENTINEL,
        }
    }

    /// Parse an error literal as it may appear inside formula text
    ///
    /// Unknown spreadsheet error literals (`#VALUE!`, `#DIV/0!`, ...) map to
    /// [`ErrorKind::FormulaError`].
    pub fn from_literal(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "#REF!" => Some(ErrorKind::InvalidReference),
            "#N/A" => Some(ErrorKind::LookupNotFound),
            "#ERROR!" | "#NULL!" | "#DIV/0!" | "#VALUE!" | "#NAME?" | "#NUM!" | "#CALC!" => {
                Some(ErrorKind::FormulaError)
            }
            _ => None,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_input_text() {
        assert_eq!(RawValue::from_input("hello"), RawValue::Text("hello".into()));
        assert_eq!(RawValue::from_input("1e3"), RawValue::Number(1000.0));
        // "inf" parses as f64 but is not a spreadsheet number
        assert_eq!(RawValue::from_input("inf"), RawValue::Text("inf".into()));
        assert_eq!(RawValue::from_input("False"), RawValue::Boolean(false));
    }

    #[test]
    fn test_error_sentinels() {
        assert_eq!(ErrorKind::LookupNotFound.to_string(), "#N/A");
        assert_eq!(ErrorKind::CircularReference.to_string(), "#ERROR!");
        assert_eq!(ErrorKind::from_literal("#ref!"), Some(ErrorKind::InvalidReference));
        assert_eq!(ErrorKind::from_literal("#DIV/0!"), Some(ErrorKind::FormulaError));
        assert_eq!(ErrorKind::from_literal("#BOGUS"), None);
    }
}
