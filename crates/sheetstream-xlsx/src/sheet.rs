use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use sheetstream_model::{serial_to_datetime, CellRef, CellValue};

use crate::styles::Styles;
use crate::{local_name, XlsxError};

/// Where the cursor sits in the worksheet markup. Transitions are
/// driven only by the handful of elements the grid is made of;
/// anything else (formulas, dimension hints, extensions) passes
/// through without changing state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ParserState {
    Outside,
    InSheetData,
    InRow,
    InCell,
    InCellValue,
}

/// Attributes and payload of the cell currently being read.
#[derive(Debug, Default)]
struct PendingCell {
    reference: Option<String>,
    cell_type: Option<String>,
    style: Option<String>,
    raw: String,
}

impl PendingCell {
    fn from_attrs(e: &BytesStart<'_>) -> Result<Self, XlsxError> {
        let mut cell = Self::default();
        for attr in e.attributes() {
            let attr = attr?;
            match local_name(attr.key.as_ref()) {
                b"r" => cell.reference = Some(attr.unescape_value()?.into_owned()),
                b"t" => cell.cell_type = Some(attr.unescape_value()?.into_owned()),
                b"s" => cell.style = Some(attr.unescape_value()?.into_owned()),
                _ => {}
            }
        }
        Ok(cell)
    }
}

/// Streams one worksheet part, pushing each completed row to a
/// consumer as `(row_number, values)`.
///
/// Row numbers are the 1-based encounter order of `<row>` elements;
/// the `r` attribute on rows is not consulted. Within a row, values
/// are dense from column A through the rightmost cell present: cells
/// the markup skips come out as empty text.
pub struct SheetParser<'a> {
    shared: &'a [String],
    styles: &'a Styles,
}

impl<'a> SheetParser<'a> {
    pub fn new(shared: &'a [String], styles: &'a Styles) -> Self {
        Self { shared, styles }
    }

    /// Drive the reader to EOF, invoking `consumer` once per row.
    ///
    /// Fails on malformed XML, unparseable or out-of-order cell
    /// references, and shared-string or style indices that do not
    /// resolve. Any error leaves previously delivered rows intact but
    /// delivers nothing further.
    pub fn parse<B, F>(&self, reader: &mut Reader<B>, mut consumer: F) -> Result<(), XlsxError>
    where
        B: BufRead,
        F: FnMut(u32, Vec<CellValue>),
    {
        let mut buf = Vec::new();
        let mut state = ParserState::Outside;
        let mut row_number: u32 = 0;
        let mut row: Vec<CellValue> = Vec::new();
        let mut cell = PendingCell::default();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => match (state, local_name(e.name().as_ref())) {
                    (ParserState::Outside, b"sheetData") => state = ParserState::InSheetData,
                    (ParserState::InSheetData, b"row") => {
                        state = ParserState::InRow;
                        row_number += 1;
                        row.clear();
                    }
                    (ParserState::InRow, b"c") => {
                        state = ParserState::InCell;
                        cell = PendingCell::from_attrs(&e)?;
                    }
                    (ParserState::InCell, b"v") => state = ParserState::InCellValue,
                    _ => {}
                },
                Event::Empty(e) => match (state, local_name(e.name().as_ref())) {
                    // A self-closing row still counts toward numbering.
                    (ParserState::InSheetData, b"row") => {
                        row_number += 1;
                        consumer(row_number, Vec::new());
                    }
                    // A self-closing cell resolves with an empty payload.
                    (ParserState::InRow, b"c") => {
                        let cell = PendingCell::from_attrs(&e)?;
                        self.resolve_cell(row_number, &cell, &mut row)?;
                    }
                    _ => {}
                },
                Event::Text(t) if state == ParserState::InCellValue => {
                    cell.raw.push_str(&t.unescape()?);
                }
                Event::CData(t) if state == ParserState::InCellValue => {
                    cell.raw.push_str(std::str::from_utf8(&t)?);
                }
                Event::End(e) => match (state, local_name(e.name().as_ref())) {
                    (ParserState::InCellValue, b"v") => state = ParserState::InCell,
                    (ParserState::InCell, b"c") => {
                        self.resolve_cell(row_number, &cell, &mut row)?;
                        state = ParserState::InRow;
                    }
                    (ParserState::InRow, b"row") => {
                        consumer(row_number, std::mem::take(&mut row));
                        state = ParserState::InSheetData;
                    }
                    (ParserState::InSheetData, b"sheetData") => state = ParserState::Outside,
                    _ => {}
                },
                Event::Eof => {
                    if state != ParserState::Outside {
                        return Err(XlsxError::Malformed {
                            part: "worksheet",
                            detail: "unexpected eof inside <sheetData>",
                        });
                    }
                    break;
                }
                _ => {}
            }
            buf.clear();
        }

        Ok(())
    }

    /// Place one cell into the row being built: parse its reference,
    /// pad the gap up to its column, and append the typed value.
    fn resolve_cell(
        &self,
        row_number: u32,
        cell: &PendingCell,
        row: &mut Vec<CellValue>,
    ) -> Result<(), XlsxError> {
        let reference = cell.reference.as_deref().unwrap_or("");
        let cell_ref = CellRef::from_a1(reference).map_err(|_| XlsxError::InvalidCellRef {
            row: row_number,
            reference: reference.to_owned(),
        })?;

        // The next column the dense row expects. A cell landing left
        // of it would silently overwrite already-delivered columns.
        let sequential = row.len() as u32 + 1;
        if cell_ref.col < sequential {
            return Err(XlsxError::OutOfOrderCell {
                row: row_number,
                reference: reference.to_owned(),
                resolved: cell_ref.col,
                sequential,
            });
        }
        for _ in sequential..cell_ref.col {
            row.push(CellValue::Text(String::new()));
        }

        row.push(self.cell_value(reference, cell)?);
        Ok(())
    }

    fn cell_value(&self, reference: &str, cell: &PendingCell) -> Result<CellValue, XlsxError> {
        // Style lookup comes first: a dangling style index is fatal no
        // matter how the payload would have decoded. Cells without an
        // `s` attribute use record 0, which must exist.
        let index: usize = match &cell.style {
            Some(style) => style.parse().unwrap_or(0),
            None => 0,
        };
        let xf = self.styles.cell_xfs.get(index).ok_or_else(|| {
            XlsxError::StyleOutOfRange {
                reference: reference.to_owned(),
                index,
                len: self.styles.cell_xfs.len(),
            }
        })?;
        let num_fmt_id = xf.num_fmt_id;

        if cell.cell_type.as_deref() == Some("s") {
            let index: usize =
                cell.raw
                    .parse()
                    .map_err(|_| XlsxError::SharedStringIndex {
                        reference: reference.to_owned(),
                        text: cell.raw.clone(),
                    })?;
            let text = self
                .shared
                .get(index)
                .ok_or_else(|| XlsxError::SharedStringOutOfRange {
                    reference: reference.to_owned(),
                    index,
                    len: self.shared.len(),
                })?;
            return Ok(CellValue::Text(text.clone()));
        }

        // Only untyped cells carry numeric payloads. `t="str"` formula
        // results, `t="b"` booleans and other explicit types keep
        // their raw text.
        if !matches!(cell.cell_type.as_deref(), None | Some("")) {
            return Ok(CellValue::Text(cell.raw.clone()));
        }

        if self.styles.format_kind(num_fmt_id).is_temporal() {
            if let Ok(serial) = cell.raw.parse::<f64>() {
                if let Some(dt) = serial_to_datetime(serial) {
                    return Ok(CellValue::DateTime(dt));
                }
            }
            // Payload is not a usable serial value; keep the cell by
            // falling back to plain coercion.
        }

        Ok(coerce_number(&cell.raw))
    }
}

/// Int if the payload parses as one, else Float, demoting floats with
/// no fractional part back to Int, else the raw text.
fn coerce_number(raw: &str) -> CellValue {
    if let Ok(i) = raw.parse::<i64>() {
        return CellValue::Int(i);
    }
    if let Ok(f) = raw.parse::<f64>() {
        if f.is_finite() && f.trunc() == f && f >= i64::MIN as f64 && f < i64::MAX as f64 {
            return CellValue::Int(f as i64);
        }
        return CellValue::Float(f);
    }
    CellValue::Text(raw.to_owned())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use sheetstream_model::NumberFormat;

    use super::*;

    fn parse_rows(
        xml: &str,
        shared: &[String],
        styles: &Styles,
    ) -> Result<Vec<(u32, Vec<CellValue>)>, XlsxError> {
        let parser = SheetParser::new(shared, styles);
        let mut reader = Reader::from_reader(xml.as_bytes());
        reader.config_mut().trim_text(false);
        let mut rows = Vec::new();
        parser.parse(&mut reader, |n, values| rows.push((n, values)))?;
        Ok(rows)
    }

    fn shared(strings: &[&str]) -> Vec<String> {
        strings.iter().map(|s| s.to_string()).collect()
    }

    fn date_styles() -> Styles {
        // Index 0 is General, index 1 a custom date format.
        let mut styles = Styles::default();
        styles.cell_xfs.push(crate::styles::CellXf {
            num_fmt_id: 164,
            apply_number_format: true,
            ..Default::default()
        });
        styles
            .num_fmts
            .insert(164, NumberFormat::from_code("yyyy-mm-dd"));
        styles
    }

    #[test]
    fn dense_rows_with_shared_strings() {
        let xml = r#"<worksheet><sheetData>
            <row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c></row>
            <row r="2"><c r="A2"><v>1</v></c><c r="B2" t="s"><v>2</v></c></row>
        </sheetData></worksheet>"#;

        let rows = parse_rows(xml, &shared(&["id", "name", "Ann"]), &Styles::default()).unwrap();
        assert_eq!(
            rows,
            vec![
                (1, vec!["id".into(), "name".into()]),
                (2, vec![CellValue::Int(1), "Ann".into()]),
            ]
        );
    }

    #[test]
    fn skipped_cells_become_empty_text() {
        let xml = r#"<worksheet><sheetData>
            <row><c r="A1"><v>1</v></c><c r="B1"><v>2</v></c><c r="E1"><v>5</v></c></row>
        </sheetData></worksheet>"#;

        let rows = parse_rows(xml, &[], &Styles::default()).unwrap();
        assert_eq!(rows.len(), 1);
        let (_, values) = &rows[0];
        assert_eq!(values.len(), 5);
        assert_eq!(values[0], CellValue::Int(1));
        assert_eq!(values[1], CellValue::Int(2));
        assert_eq!(values[2], CellValue::Text(String::new()));
        assert_eq!(values[3], CellValue::Text(String::new()));
        assert_eq!(values[4], CellValue::Int(5));
    }

    #[test]
    fn out_of_order_cell_is_fatal() {
        let xml = r#"<worksheet><sheetData>
            <row><c r="C1"><v>3</v></c><c r="B1"><v>2</v></c></row>
        </sheetData></worksheet>"#;

        let err = parse_rows(xml, &[], &Styles::default()).unwrap_err();
        assert!(matches!(
            err,
            XlsxError::OutOfOrderCell {
                row: 1,
                resolved: 2,
                sequential: 4,
                ..
            }
        ));
    }

    #[test]
    fn invalid_reference_is_fatal() {
        let xml = r#"<worksheet><sheetData>
            <row><c r="1A"><v>1</v></c></row>
        </sheetData></worksheet>"#;

        let err = parse_rows(xml, &[], &Styles::default()).unwrap_err();
        assert!(matches!(err, XlsxError::InvalidCellRef { row: 1, .. }));
    }

    #[test]
    fn shared_string_index_failures_are_fatal() {
        let styles = Styles::default();
        let table = shared(&["only"]);

        let not_an_int = r#"<worksheet><sheetData>
            <row><c r="A1" t="s"><v>abc</v></c></row>
        </sheetData></worksheet>"#;
        assert!(matches!(
            parse_rows(not_an_int, &table, &styles).unwrap_err(),
            XlsxError::SharedStringIndex { .. }
        ));

        let out_of_range = r#"<worksheet><sheetData>
            <row><c r="A1" t="s"><v>7</v></c></row>
        </sheetData></worksheet>"#;
        assert!(matches!(
            parse_rows(out_of_range, &table, &styles).unwrap_err(),
            XlsxError::SharedStringOutOfRange { index: 7, len: 1, .. }
        ));
    }

    #[test]
    fn style_index_out_of_range_is_fatal() {
        let xml = r#"<worksheet><sheetData>
            <row><c r="A1" s="5"><v>1</v></c></row>
        </sheetData></worksheet>"#;

        assert!(matches!(
            parse_rows(xml, &[], &Styles::default()).unwrap_err(),
            XlsxError::StyleOutOfRange { index: 5, len: 1, .. }
        ));

        // Fatal even when the payload itself would have resolved.
        let shared_cell = r#"<worksheet><sheetData>
            <row><c r="A1" t="s" s="5"><v>0</v></c></row>
        </sheetData></worksheet>"#;
        assert!(matches!(
            parse_rows(shared_cell, &shared(&["ok"]), &Styles::default()).unwrap_err(),
            XlsxError::StyleOutOfRange { .. }
        ));
    }

    #[test]
    fn default_style_index_still_goes_through_the_table() {
        // A styles part with no <cellXfs> leaves the table empty, so
        // even a cell without an `s` attribute has nothing to resolve
        // against.
        let empty_table = Styles {
            cell_xfs: Vec::new(),
            ..Styles::default()
        };
        let xml = r#"<worksheet><sheetData>
            <row><c r="A1"><v>1</v></c></row>
        </sheetData></worksheet>"#;

        assert!(matches!(
            parse_rows(xml, &[], &empty_table).unwrap_err(),
            XlsxError::StyleOutOfRange { index: 0, len: 0, .. }
        ));
    }

    #[test]
    fn explicitly_typed_cells_keep_their_raw_text() {
        // Formula string results and booleans are not numeric payloads.
        let xml = r#"<worksheet><sheetData>
            <row><c r="A1" t="str"><v>123</v></c><c r="B1" t="b"><v>1</v></c></row>
        </sheetData></worksheet>"#;

        let rows = parse_rows(xml, &[], &Styles::default()).unwrap();
        assert_eq!(
            rows[0].1,
            vec![
                CellValue::Text("123".into()),
                CellValue::Text("1".into())
            ]
        );

        // A date-styled `t="str"` cell must not convert either.
        let dated = r#"<worksheet><sheetData>
            <row><c r="A1" t="str" s="1"><v>25569</v></c></row>
        </sheetData></worksheet>"#;
        let rows = parse_rows(dated, &[], &date_styles()).unwrap();
        assert_eq!(rows[0].1, vec![CellValue::Text("25569".into())]);
    }

    #[test]
    fn date_styled_serial_becomes_timestamp() {
        let xml = r#"<worksheet><sheetData>
            <row><c r="A1" s="1"><v>25569</v></c></row>
        </sheetData></worksheet>"#;

        let rows = parse_rows(xml, &[], &date_styles()).unwrap();
        match &rows[0].1[0] {
            CellValue::DateTime(dt) => assert_eq!(dt.timestamp(), 0),
            other => panic!("expected timestamp, got {other:?}"),
        }
    }

    #[test]
    fn unparseable_serial_falls_back_to_text() {
        let xml = r#"<worksheet><sheetData>
            <row><c r="A1" s="1"><v>hello</v></c></row>
        </sheetData></worksheet>"#;

        let rows = parse_rows(xml, &[], &date_styles()).unwrap();
        assert_eq!(rows[0].1[0], CellValue::Text("hello".into()));
    }

    #[test]
    fn row_numbers_follow_encounter_order() {
        // Row attributes claim rows 5 and 9; numbering ignores them.
        let xml = r#"<worksheet><sheetData>
            <row r="5"><c r="A1"><v>1</v></c></row>
            <row r="9"/>
        </sheetData></worksheet>"#;

        let rows = parse_rows(xml, &[], &Styles::default()).unwrap();
        assert_eq!(rows[0].0, 1);
        assert_eq!(rows[1], (2, vec![]));
    }

    #[test]
    fn self_closing_cell_resolves_empty() {
        let xml = r#"<worksheet><sheetData>
            <row><c r="B1"/></row>
        </sheetData></worksheet>"#;

        let rows = parse_rows(xml, &[], &Styles::default()).unwrap();
        assert_eq!(
            rows[0].1,
            vec![CellValue::Text(String::new()), CellValue::Text(String::new())]
        );
    }

    #[test]
    fn formula_text_is_not_a_value() {
        let xml = r#"<worksheet><sheetData>
            <row><c r="A1"><f>1+1</f><v>2</v></c></row>
        </sheetData></worksheet>"#;

        let rows = parse_rows(xml, &[], &Styles::default()).unwrap();
        assert_eq!(rows[0].1, vec![CellValue::Int(2)]);
    }

    #[test]
    fn truncated_sheet_data_is_fatal() {
        let xml = r#"<worksheet><sheetData><row><c r="A1"><v>1</v></c>"#;
        assert!(parse_rows(xml, &[], &Styles::default()).is_err());
    }

    #[test]
    fn coercion_ladder() {
        assert_eq!(coerce_number("42"), CellValue::Int(42));
        assert_eq!(coerce_number("-7"), CellValue::Int(-7));
        assert_eq!(coerce_number("3.25"), CellValue::Float(3.25));
        // Integral floats demote.
        assert_eq!(coerce_number("3.0"), CellValue::Int(3));
        assert_eq!(coerce_number("1e3"), CellValue::Int(1000));
        assert_eq!(coerce_number("1e300"), CellValue::Float(1e300));
        assert_eq!(coerce_number(""), CellValue::Text(String::new()));
        assert_eq!(coerce_number("12a"), CellValue::Text("12a".into()));
    }
}
