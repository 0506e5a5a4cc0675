//! Shared data types for streaming spreadsheet decoding.
//!
//! This crate is deliberately small and dependency-light: cell values,
//! A1-style cell references, and number-format classification. The
//! package decoders build on these without pulling in any archive or
//! XML machinery.

pub mod address;
pub mod format;
pub mod value;

pub use address::{col_to_name, name_to_col, A1ParseError, CellRef};
pub use format::{builtin_format_kind, classify_format_code, FormatKind, NumberFormat};
pub use value::{serial_to_datetime, CellValue};
