use quick_xml::events::Event;
use quick_xml::Reader;

use crate::{local_name, XlsxError};

/// One `<sheet>` entry from workbook.xml, in workbook order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SheetEntry {
    pub name: String,
    /// Relationship id linking the entry to its worksheet part.
    pub rel_id: String,
}

/// Extract the sheet index from workbook.xml. Entries without a name
/// or relationship id are skipped.
pub fn parse_workbook_sheets(xml: &[u8]) -> Result<Vec<SheetEntry>, XlsxError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut sheets = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) => {
                if local_name(e.name().as_ref()) == b"sheet" {
                    let mut name = None;
                    let mut rel_id = None;
                    for attr in e.attributes() {
                        let attr = attr?;
                        match local_name(attr.key.as_ref()) {
                            b"name" => name = Some(attr.unescape_value()?.into_owned()),
                            // `r:id`; the prefix is already stripped.
                            b"id" => rel_id = Some(attr.unescape_value()?.into_owned()),
                            _ => {}
                        }
                    }
                    if let (Some(name), Some(rel_id)) = (name, rel_id) {
                        sheets.push(SheetEntry { name, rel_id });
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(sheets)
}
