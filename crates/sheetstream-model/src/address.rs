use core::fmt;

use serde::{Deserialize, Serialize};

/// A reference to a single cell within a worksheet.
///
/// Rows and columns are **1-indexed**, matching A1 notation:
/// - `row = 1` is Excel row `1`
/// - `col = 1` is Excel column `A`
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRef {
    /// 1-indexed column.
    pub col: u32,
    /// 1-indexed row.
    pub row: u32,
}

impl CellRef {
    /// Construct a new [`CellRef`].
    #[inline]
    pub const fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }

    /// Convert to Excel A1 notation (e.g. `A1`, `BC32`).
    pub fn to_a1(self) -> String {
        format!("{}{}", col_to_name(self.col), self.row)
    }

    /// Parse a strict A1-style reference: one or more uppercase
    /// letters followed by one or more digits (e.g. `A1`, `BC32`).
    ///
    /// Lowercase letters, `$` markers, and any surrounding or trailing
    /// characters are rejected.
    pub fn from_a1(a1: &str) -> Result<Self, A1ParseError> {
        if a1.is_empty() {
            return Err(A1ParseError::Empty);
        }

        let bytes = a1.as_bytes();
        let mut idx = 0usize;
        while idx < bytes.len() && bytes[idx].is_ascii_uppercase() {
            idx += 1;
        }
        if idx == 0 {
            return Err(A1ParseError::MissingColumn);
        }

        let row_start = idx;
        while idx < bytes.len() && bytes[idx].is_ascii_digit() {
            idx += 1;
        }
        if idx == row_start {
            return Err(A1ParseError::MissingRow);
        }
        if idx != bytes.len() {
            return Err(A1ParseError::TrailingCharacters);
        }

        let col = name_to_col(&a1[..row_start])?;
        let row: u32 = a1[row_start..]
            .parse()
            .map_err(|_| A1ParseError::InvalidRow)?;
        if row == 0 {
            return Err(A1ParseError::InvalidRow);
        }

        Ok(Self { col, row })
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1())
    }
}

/// Errors that can occur when parsing an A1 cell reference.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum A1ParseError {
    Empty,
    MissingColumn,
    MissingRow,
    InvalidColumn,
    InvalidRow,
    TrailingCharacters,
}

impl fmt::Display for A1ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            A1ParseError::Empty => "empty A1 reference",
            A1ParseError::MissingColumn => "missing column in A1 reference",
            A1ParseError::MissingRow => "missing row in A1 reference",
            A1ParseError::InvalidColumn => "invalid column in A1 reference",
            A1ParseError::InvalidRow => "invalid row in A1 reference",
            A1ParseError::TrailingCharacters => "trailing characters in A1 reference",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for A1ParseError {}

/// Convert a 1-based column number to its letter name (`1` -> `A`,
/// `26` -> `Z`, `27` -> `AA`). Column letters are bijective base-26:
/// there is no zero digit.
pub fn col_to_name(col: u32) -> String {
    let mut n = col;
    let mut out = Vec::<u8>::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        out.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    out.reverse();
    // Only ASCII letters are ever pushed.
    String::from_utf8(out).unwrap_or_default()
}

/// Convert a column letter name to its 1-based column number
/// (`A` -> `1`, `Z` -> `26`, `AA` -> `27`).
pub fn name_to_col(s: &str) -> Result<u32, A1ParseError> {
    if s.is_empty() {
        return Err(A1ParseError::MissingColumn);
    }
    let mut col: u32 = 0;
    for b in s.bytes() {
        if !b.is_ascii_uppercase() {
            return Err(A1ParseError::InvalidColumn);
        }
        let v = (b - b'A') as u32 + 1;
        col = col
            .checked_mul(26)
            .and_then(|c| c.checked_add(v))
            .ok_or(A1ParseError::InvalidColumn)?;
    }
    Ok(col)
}
