use quick_xml::events::Event;
use quick_xml::Reader;

use crate::{local_name, XlsxError};

/// Parse sharedStrings.xml into the ordered string table.
///
/// Each `<si>` yields exactly one entry, in document order, so cell
/// `t="s"` indices line up. Rich-text runs collapse to their
/// concatenated `<t>` content; run styling is not retained.
pub fn parse_shared_strings(xml: &[u8]) -> Result<Vec<String>, XlsxError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);

    let mut buf = Vec::new();
    let mut strings = Vec::new();
    let mut in_si = false;
    let mut in_t = false;
    let mut current = String::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match local_name(e.name().as_ref()) {
                b"si" => {
                    in_si = true;
                    current.clear();
                }
                b"t" if in_si => in_t = true,
                _ => {}
            },
            Event::Empty(e) if local_name(e.name().as_ref()) == b"si" => {
                strings.push(String::new());
            }
            Event::Text(t) if in_t => current.push_str(&t.unescape()?),
            Event::CData(t) if in_t => current.push_str(std::str::from_utf8(&t)?),
            Event::End(e) => match local_name(e.name().as_ref()) {
                b"t" => in_t = false,
                b"si" => {
                    in_si = false;
                    strings.push(std::mem::take(&mut current));
                }
                _ => {}
            },
            Event::Eof => {
                if in_si {
                    return Err(XlsxError::Malformed {
                        part: "sharedStrings.xml",
                        detail: "unexpected eof in <si>",
                    });
                }
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(strings)
}
