use serde::{Deserialize, Serialize};

/// The decoded meaning of a number-format code.
///
/// Only `Date`, `Time` and `DateTime` mark a cell's numeric payload as
/// a serial day count; `Duration` formats (elapsed time like
/// `[h]:mm:ss`) render spans, not instants, and keep the raw numeric
/// value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatKind {
    Text,
    Int,
    Float,
    Date,
    Time,
    DateTime,
    Duration,
}

impl FormatKind {
    /// True when a numeric payload under this format is a serial day
    /// count to be converted to a timestamp.
    #[inline]
    pub const fn is_temporal(self) -> bool {
        matches!(self, FormatKind::Date | FormatKind::Time | FormatKind::DateTime)
    }
}

/// A number format: the raw format code plus its classified kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberFormat {
    pub code: String,
    pub kind: FormatKind,
}

impl NumberFormat {
    /// Build a format from a custom format code, classifying it.
    pub fn from_code(code: impl Into<String>) -> Self {
        let code = code.into();
        let kind = classify_format_code(&code);
        Self { code, kind }
    }
}

/// Kind for a built-in format id, if the id is one of the reserved
/// built-ins. Ids 0x17 through 0x24 are unassigned and return `None`,
/// as does anything above 0x31.
pub const fn builtin_format_kind(id: u32) -> Option<FormatKind> {
    let kind = match id {
        0x00 => FormatKind::Text,               // General
        0x01 => FormatKind::Int,                // 0
        0x02 => FormatKind::Float,              // 0.00
        0x03 => FormatKind::Float,              // #,##0
        0x04 => FormatKind::Float,              // #,##0.00
        0x05 => FormatKind::Float,              // ($#,##0_);($#,##0)
        0x06 => FormatKind::Float,              // ($#,##0_);[RED]($#,##0)
        0x07 => FormatKind::Float,              // ($#,##0.00_);($#,##0.00_)
        0x08 => FormatKind::Float,              // ($#,##0.00_);[RED]($#,##0.00_)
        0x09 => FormatKind::Int,                // 0%
        0x0a => FormatKind::Float,              // 0.00%
        0x0b => FormatKind::Float,              // 0.00E+00
        0x0c => FormatKind::Float,              // # ?/?
        0x0d => FormatKind::Float,              // # ??/??
        0x0e => FormatKind::Date,               // m-d-yy
        0x0f => FormatKind::Date,               // d-mmm-yy
        0x10 => FormatKind::Date,               // d-mmm
        0x11 => FormatKind::Date,               // mmm-yy
        0x12 => FormatKind::Time,               // h:mm AM/PM
        0x13 => FormatKind::Time,               // h:mm:ss AM/PM
        0x14 => FormatKind::Time,               // h:mm
        0x15 => FormatKind::Time,               // h:mm:ss
        0x16 => FormatKind::DateTime,           // m-d-yy h:mm
        0x25 => FormatKind::Int,                // (#,##0_);(#,##0)
        0x26 => FormatKind::Int,                // (#,##0_);[RED](#,##0)
        0x27 => FormatKind::Float,              // (#,##0.00);(#,##0.00)
        0x28 => FormatKind::Float,              // (#,##0.00);[RED](#,##0.00)
        0x29 => FormatKind::Float,              // _(*#,##0_);...
        0x2a => FormatKind::Float,              // _($*#,##0_);...
        0x2b => FormatKind::Float,              // _(*#,##0.00_);...
        0x2c => FormatKind::Float,              // _($*#,##0.00_);...
        0x2d => FormatKind::Duration,           // mm:ss
        0x2e => FormatKind::Duration,           // [h]:mm:ss
        0x2f => FormatKind::Duration,           // mm:ss.0
        0x30 => FormatKind::Float,              // ##0.0E+0
        0x31 => FormatKind::Text,               // @
        _ => return None,
    };
    Some(kind)
}

/// Classify a custom format code.
///
/// Multi-section codes (any `;`) are treated as plain text: the
/// sections apply to positive/negative/zero values and cannot be
/// reduced to a single kind here. Otherwise a scan for the lowercase
/// date/time letters decides: `y` or `d` marks a date component, `h`
/// or `s` a time component, both a datetime; a code whose only
/// temporal letter is `m` is taken as a date (month, not minute).
pub fn classify_format_code(code: &str) -> FormatKind {
    if code.contains(';') {
        return FormatKind::Text;
    }

    let has_date = code.contains('y') || code.contains('d');
    let has_time = code.contains('h') || code.contains('s');
    let has_month_or_minute = code.contains('m');

    match (has_date, has_time) {
        (true, true) => FormatKind::DateTime,
        (true, false) => FormatKind::Date,
        (false, true) => FormatKind::Time,
        (false, false) if has_month_or_minute => FormatKind::Date,
        (false, false) => FormatKind::Text,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn builtin_table_shape() {
        assert_eq!(builtin_format_kind(0x00), Some(FormatKind::Text));
        assert_eq!(builtin_format_kind(0x01), Some(FormatKind::Int));
        assert_eq!(builtin_format_kind(0x0e), Some(FormatKind::Date));
        assert_eq!(builtin_format_kind(0x15), Some(FormatKind::Time));
        assert_eq!(builtin_format_kind(0x16), Some(FormatKind::DateTime));
        assert_eq!(builtin_format_kind(0x2e), Some(FormatKind::Duration));
        assert_eq!(builtin_format_kind(0x31), Some(FormatKind::Text));

        // The reserved gap and everything past the table are absent.
        for id in 0x17..=0x24 {
            assert_eq!(builtin_format_kind(id), None);
        }
        assert_eq!(builtin_format_kind(0x32), None);
        assert_eq!(builtin_format_kind(164), None);
    }

    #[test]
    fn duration_is_not_temporal() {
        assert!(!FormatKind::Duration.is_temporal());
        assert!(!FormatKind::Text.is_temporal());
        assert!(FormatKind::Date.is_temporal());
        assert!(FormatKind::Time.is_temporal());
        assert!(FormatKind::DateTime.is_temporal());
    }

    #[test]
    fn classify_dates_and_times() {
        assert_eq!(classify_format_code("yyyy-mm-dd"), FormatKind::Date);
        assert_eq!(classify_format_code("d-mmm"), FormatKind::Date);
        assert_eq!(classify_format_code("h:mm:ss"), FormatKind::Time);
        assert_eq!(classify_format_code("yyyy-mm-dd h:mm"), FormatKind::DateTime);
        // Bare `m` is ambiguous between month and minute; month wins.
        assert_eq!(classify_format_code("mm"), FormatKind::Date);
    }

    #[test]
    fn classify_non_temporal() {
        assert_eq!(classify_format_code("#,##0.00"), FormatKind::Text);
        assert_eq!(classify_format_code("@"), FormatKind::Text);
        assert_eq!(classify_format_code(""), FormatKind::Text);
        // Any sectioned code stays text, even with date letters inside.
        assert_eq!(classify_format_code("0;-0;@"), FormatKind::Text);
        assert_eq!(classify_format_code("yyyy;@"), FormatKind::Text);
        // Uppercase letters are not temporal markers.
        assert_eq!(classify_format_code("0.00E+00"), FormatKind::Text);
    }
}
