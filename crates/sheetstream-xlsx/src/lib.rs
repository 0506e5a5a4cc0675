//! Streaming row-oriented XLSX decoder.
//!
//! An `.xlsx` package is a zip archive of XML parts. This crate opens
//! the archive, decodes the small metadata parts (workbook index,
//! relationships, shared strings, styles) up front, and then streams
//! worksheet parts row by row: each `<row>` is reconstructed as a
//! dense, gap-filled `Vec<CellValue>` and handed to a caller-supplied
//! consumer. Worksheet XML is never held in memory as a tree.
//!
//! ```no_run
//! use sheetstream_xlsx::Document;
//!
//! # fn main() -> Result<(), sheetstream_xlsx::XlsxError> {
//! let mut doc = Document::open("report.xlsx")?;
//! doc.parse_sheet("Sheet1", |row, values| {
//!     println!("{row}: {values:?}");
//! })?;
//! # Ok(())
//! # }
//! ```

mod document;
mod error;
mod package;
mod rels;
mod shared_strings;
mod sheet;
mod styles;
mod workbook;

pub use document::{Document, SheetHandle};
pub use error::XlsxError;
pub use rels::{parse_relationships, resolve_target, Relationship};
pub use shared_strings::parse_shared_strings;
pub use sheet::SheetParser;
pub use styles::{parse_styles, CellXf, Styles};
pub use workbook::{parse_workbook_sheets, SheetEntry};

pub use sheetstream_model::{CellRef, CellValue, FormatKind};

pub(crate) fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().rposition(|b| *b == b':') {
        Some(idx) => &name[idx + 1..],
        None => name,
    }
}
