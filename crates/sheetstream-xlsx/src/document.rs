use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use quick_xml::Reader;
use sheetstream_model::CellValue;
use zip::ZipArchive;

use crate::package::{read_part_optional, read_part_required};
use crate::rels::{parse_relationships, resolve_target};
use crate::shared_strings::parse_shared_strings;
use crate::sheet::SheetParser;
use crate::styles::{parse_styles, Styles};
use crate::workbook::parse_workbook_sheets;
use crate::XlsxError;

const WORKBOOK_PART: &str = "xl/workbook.xml";
const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
const REL_TYPE_STYLES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
const REL_TYPE_SHARED_STRINGS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings";

/// A resolved sheet: name plus the worksheet part backing it.
///
/// Handles stay valid for the lifetime of the `Document` that issued
/// them and can drive any number of parses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SheetHandle {
    name: String,
    part: String,
}

impl SheetHandle {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// An open workbook package.
///
/// Construction decodes the metadata parts once (workbook index,
/// relationships, shared strings, styles). Worksheet parts are not
/// touched until [`Document::parse_sheet`], which streams the
/// requested part from the archive on every call, so parsing the same
/// sheet twice yields the same rows.
pub struct Document<R> {
    archive: ZipArchive<R>,
    shared_strings: Vec<String>,
    styles: Styles,
    /// Sheet name to worksheet part name, in workbook order.
    sheet_parts: Vec<(String, String)>,
}

// The archive reader has no useful Debug form (and `R` need not
// implement it); show the decoded metadata instead.
impl<R> fmt::Debug for Document<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("shared_strings", &self.shared_strings.len())
            .field("styles", &self.styles)
            .field("sheet_parts", &self.sheet_parts)
            .finish_non_exhaustive()
    }
}

impl Document<BufReader<File>> {
    /// Open a package from the filesystem.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, XlsxError> {
        Self::from_reader(BufReader::new(File::open(path)?))
    }
}

impl<R: Read + Seek> Document<R> {
    /// Open a package from any seekable byte source.
    pub fn from_reader(reader: R) -> Result<Self, XlsxError> {
        let mut archive = ZipArchive::new(reader)?;

        let workbook_xml = read_part_required(&mut archive, WORKBOOK_PART)?;
        let rels_xml = read_part_required(&mut archive, WORKBOOK_RELS_PART)?;
        let sheets = parse_workbook_sheets(&workbook_xml)?;
        let rels = parse_relationships(&rels_xml)?;

        let part_for_type = |type_uri: &str, default: &str| -> String {
            rels.iter()
                .find(|rel| rel.type_uri == type_uri)
                .map(|rel| resolve_target(WORKBOOK_PART, &rel.target))
                .unwrap_or_else(|| default.to_string())
        };

        // Both parts are optional: all-numeric workbooks ship without
        // sharedStrings, and a missing styles part leaves every cell
        // on the General format.
        let shared_part = part_for_type(REL_TYPE_SHARED_STRINGS, "xl/sharedStrings.xml");
        let shared_strings = match read_part_optional(&mut archive, &shared_part)? {
            Some(xml) => parse_shared_strings(&xml)?,
            None => Vec::new(),
        };

        let styles_part = part_for_type(REL_TYPE_STYLES, "xl/styles.xml");
        let styles = match read_part_optional(&mut archive, &styles_part)? {
            Some(xml) => parse_styles(&xml)?,
            None => Styles::default(),
        };

        let mut sheet_parts = Vec::with_capacity(sheets.len());
        for sheet in sheets {
            let rel = rels
                .iter()
                .find(|rel| rel.id == sheet.rel_id)
                .ok_or_else(|| XlsxError::RelationshipNotFound(sheet.rel_id.clone()))?;
            sheet_parts.push((sheet.name, resolve_target(WORKBOOK_PART, &rel.target)));
        }

        Ok(Self {
            archive,
            shared_strings,
            styles,
            sheet_parts,
        })
    }

    /// Sheet names in workbook order.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheet_parts
            .iter()
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// The decoded shared-string table.
    pub fn shared_strings(&self) -> &[String] {
        &self.shared_strings
    }

    /// Resolve a sheet name to a handle, or fail with
    /// [`XlsxError::SheetNotFound`].
    pub fn open_sheet(&self, name: &str) -> Result<SheetHandle, XlsxError> {
        self.sheet_parts
            .iter()
            .find(|(sheet, _)| sheet == name)
            .map(|(name, part)| SheetHandle {
                name: name.clone(),
                part: part.clone(),
            })
            .ok_or_else(|| XlsxError::SheetNotFound(name.to_string()))
    }

    /// Stream the named sheet, invoking `consumer` once per row with
    /// the 1-based row number and its gap-filled values.
    pub fn parse_sheet<F>(&mut self, name: &str, consumer: F) -> Result<(), XlsxError>
    where
        F: FnMut(u32, Vec<CellValue>),
    {
        let sheet = self.open_sheet(name)?;
        self.parse_rows(&sheet, consumer)
    }

    /// Stream the sheet behind a handle. Each call re-opens the
    /// worksheet part, so repeated parses see identical rows.
    pub fn parse_rows<F>(&mut self, sheet: &SheetHandle, consumer: F) -> Result<(), XlsxError>
    where
        F: FnMut(u32, Vec<CellValue>),
    {
        let file = match self.archive.by_name(&sheet.part) {
            Ok(file) => file,
            Err(zip::result::ZipError::FileNotFound) => {
                return Err(XlsxError::MissingPart(sheet.part.clone()));
            }
            Err(err) => return Err(err.into()),
        };

        let mut reader = Reader::from_reader(BufReader::new(file));
        reader.config_mut().trim_text(false);

        SheetParser::new(&self.shared_strings, &self.styles).parse(&mut reader, consumer)
    }
}
