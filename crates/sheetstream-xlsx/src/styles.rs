use std::collections::HashMap;

use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use sheetstream_model::{builtin_format_kind, FormatKind, NumberFormat};

use crate::{local_name, XlsxError};

/// One `<xf>` record from `<cellXfs>`. Cells reference these by
/// position through their `s` attribute.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CellXf {
    pub font_id: u32,
    pub fill_id: u32,
    pub border_id: u32,
    pub num_fmt_id: u32,
    pub xf_id: u32,

    pub apply_font: bool,
    pub apply_fill: bool,
    pub apply_border: bool,
    pub apply_alignment: bool,
    pub apply_number_format: bool,
}

/// Decoded styles.xml: the ordered cell-format records plus the
/// workbook's custom number formats keyed by id.
#[derive(Clone, Debug, PartialEq)]
pub struct Styles {
    pub cell_xfs: Vec<CellXf>,
    pub num_fmts: HashMap<u32, NumberFormat>,
}

impl Default for Styles {
    /// A single General-format record, so style index 0 stays valid
    /// for packages that omit the styles part.
    fn default() -> Self {
        Self {
            cell_xfs: vec![CellXf::default()],
            num_fmts: HashMap::new(),
        }
    }
}

impl Styles {
    /// Classify a number-format id. Custom definitions shadow the
    /// built-in table; unknown ids (including the reserved gap in the
    /// built-in range) fall back to text.
    pub fn format_kind(&self, num_fmt_id: u32) -> FormatKind {
        if let Some(fmt) = self.num_fmts.get(&num_fmt_id) {
            return fmt.kind;
        }
        builtin_format_kind(num_fmt_id).unwrap_or(FormatKind::Text)
    }
}

/// Parse styles.xml, keeping only `<numFmts>` and `<cellXfs>`.
/// `<xf>` records under `<cellStyleXfs>` are not cell formats and are
/// ignored.
pub fn parse_styles(xml: &[u8]) -> Result<Styles, XlsxError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut in_num_fmts = false;
    let mut in_cell_xfs = false;
    let mut cell_xfs = Vec::new();
    let mut num_fmts = HashMap::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match local_name(e.name().as_ref()) {
                b"numFmts" => in_num_fmts = true,
                b"cellXfs" => in_cell_xfs = true,
                b"numFmt" if in_num_fmts => {
                    if let Some((id, fmt)) = parse_num_fmt(&e)? {
                        num_fmts.insert(id, fmt);
                    }
                }
                b"xf" if in_cell_xfs => cell_xfs.push(parse_xf(&e)?),
                _ => {}
            },
            // Self-closing records; `<numFmts/>` / `<cellXfs/>` as
            // empty sections carry nothing and need no flag.
            Event::Empty(e) => match local_name(e.name().as_ref()) {
                b"numFmt" if in_num_fmts => {
                    if let Some((id, fmt)) = parse_num_fmt(&e)? {
                        num_fmts.insert(id, fmt);
                    }
                }
                b"xf" if in_cell_xfs => cell_xfs.push(parse_xf(&e)?),
                _ => {}
            },
            Event::End(e) => match local_name(e.name().as_ref()) {
                b"numFmts" => in_num_fmts = false,
                b"cellXfs" => in_cell_xfs = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(Styles { cell_xfs, num_fmts })
}

fn parse_num_fmt(e: &BytesStart<'_>) -> Result<Option<(u32, NumberFormat)>, XlsxError> {
    let mut id = None;
    let mut code = None;
    for attr in e.attributes() {
        let attr = attr?;
        match local_name(attr.key.as_ref()) {
            b"numFmtId" => id = parse_u32_attr(&attr)?,
            b"formatCode" => code = Some(attr.unescape_value()?.into_owned()),
            _ => {}
        }
    }
    match (id, code) {
        (Some(id), Some(code)) => Ok(Some((id, NumberFormat::from_code(code)))),
        _ => Ok(None),
    }
}

fn parse_xf(e: &BytesStart<'_>) -> Result<CellXf, XlsxError> {
    let mut xf = CellXf::default();
    for attr in e.attributes() {
        let attr = attr?;
        match local_name(attr.key.as_ref()) {
            b"fontId" => xf.font_id = parse_u32_attr(&attr)?.unwrap_or(0),
            b"fillId" => xf.fill_id = parse_u32_attr(&attr)?.unwrap_or(0),
            b"borderId" => xf.border_id = parse_u32_attr(&attr)?.unwrap_or(0),
            b"numFmtId" => xf.num_fmt_id = parse_u32_attr(&attr)?.unwrap_or(0),
            b"xfId" => xf.xf_id = parse_u32_attr(&attr)?.unwrap_or(0),
            b"applyFont" => xf.apply_font = parse_bool_attr(&attr)?,
            b"applyFill" => xf.apply_fill = parse_bool_attr(&attr)?,
            b"applyBorder" => xf.apply_border = parse_bool_attr(&attr)?,
            b"applyAlignment" => xf.apply_alignment = parse_bool_attr(&attr)?,
            b"applyNumberFormat" => xf.apply_number_format = parse_bool_attr(&attr)?,
            _ => {}
        }
    }
    Ok(xf)
}

fn parse_u32_attr(attr: &Attribute<'_>) -> Result<Option<u32>, XlsxError> {
    Ok(attr.unescape_value()?.parse().ok())
}

fn parse_bool_attr(attr: &Attribute<'_>) -> Result<bool, XlsxError> {
    let value = attr.unescape_value()?;
    Ok(value == "1" || value.eq_ignore_ascii_case("true"))
}
