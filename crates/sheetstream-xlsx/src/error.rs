use quick_xml::events::attributes::AttrError;
use thiserror::Error;

/// Errors surfaced while decoding a package.
///
/// Lookup and ordering variants abort the current `parse_sheet` call:
/// a cell that references a missing shared string or style, or that
/// lands left of the column cursor, means the package (or this
/// decoder's view of it) is wrong, and silently guessing a value would
/// corrupt every later column in the row.
#[derive(Debug, Error)]
pub enum XlsxError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("xml attribute error: {0}")]
    XmlAttr(#[from] AttrError),
    #[error("utf-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("missing required part: {0}")]
    MissingPart(String),
    #[error("no sheet named {0:?} in workbook")]
    SheetNotFound(String),
    #[error("workbook relationship {0:?} not found")]
    RelationshipNotFound(String),
    #[error("row {row}: invalid cell reference {reference:?}")]
    InvalidCellRef { row: u32, reference: String },
    #[error(
        "row {row}: cell {reference} resolves to column {resolved}, \
         behind the sequential column {sequential}"
    )]
    OutOfOrderCell {
        row: u32,
        reference: String,
        resolved: u32,
        sequential: u32,
    },
    #[error("cell {reference}: shared string index {text:?} is not an integer")]
    SharedStringIndex { reference: String, text: String },
    #[error("cell {reference}: shared string index {index} out of range (table has {len})")]
    SharedStringOutOfRange {
        reference: String,
        index: usize,
        len: usize,
    },
    #[error("cell {reference}: style index {index} out of range (table has {len})")]
    StyleOutOfRange {
        reference: String,
        index: usize,
        len: usize,
    },
    #[error("malformed {part}: {detail}")]
    Malformed {
        part: &'static str,
        detail: &'static str,
    },
}
