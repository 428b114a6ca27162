//! Line record codec.
//!
//! A line has the form `<number>.<text>`. The first `.` on the line separates the fields, so the text
//! itself may contain dots. Records are ordered by `(text, number)`.

use std::cmp::Ordering;
use std::error::Error;
use std::fmt;
use std::fmt::Display;
use std::num::ParseIntError;
use std::ops::Range;

const SEPARATOR: char = '.';

/// Line parsing error kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The line has no `.` separator.
    MissingSeparator,
    /// The part before the separator is not a non-negative integer.
    InvalidNumber(ParseIntError),
}

/// Line parsing error. Keeps the offending line for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    line: String,
    kind: ParseErrorKind,
}

impl ParseError {
    /// Returns the line that failed to parse.
    pub fn line(&self) -> &str {
        &self.line
    }

    /// Returns the failure kind.
    pub fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }
}

impl Error for ParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.kind {
            ParseErrorKind::MissingSeparator => None,
            ParseErrorKind::InvalidNumber(err) => Some(err),
        }
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ParseErrorKind::MissingSeparator => write!(f, "no '{}' separator in line {:?}", SEPARATOR, self.line),
            ParseErrorKind::InvalidNumber(err) => write!(f, "invalid number in line {:?}: {}", self.line, err),
        }
    }
}

/// A parsed line.
///
/// The record owns the line exactly as it was read (including the line terminator) and refers to the
/// text field by a byte range into it, so the raw bytes are written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    number: u64,
    text: Range<usize>,
    raw: String,
}

impl Record {
    /// Parses a raw line.
    pub fn parse(raw: String) -> Result<Self, ParseError> {
        let trimmed = raw.trim();
        let sep_pos = match trimmed.find(SEPARATOR) {
            Some(pos) => pos,
            None => {
                return Err(ParseError {
                    line: raw,
                    kind: ParseErrorKind::MissingSeparator,
                })
            }
        };

        let number = match trimmed[..sep_pos].trim().parse::<u64>() {
            Ok(number) => number,
            Err(err) => {
                return Err(ParseError {
                    line: raw,
                    kind: ParseErrorKind::InvalidNumber(err),
                })
            }
        };

        let leading = raw.len() - raw.trim_start().len();
        let tail = &trimmed[sep_pos + SEPARATOR.len_utf8()..];
        let text = tail.trim();
        let start = leading + sep_pos + SEPARATOR.len_utf8() + (tail.len() - tail.trim_start().len());

        return Ok(Record {
            number,
            text: start..start + text.len(),
            raw,
        });
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    /// Returns the trimmed text field.
    pub fn text(&self) -> &str {
        &self.raw[self.text.clone()]
    }

    /// Returns the line as read from the source.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn into_raw(self) -> String {
        self.raw
    }
}

/// Compares records by sort key: text first, number second.
pub fn compare_records(a: &Record, b: &Record) -> Ordering {
    a.text().cmp(b.text()).then(a.number.cmp(&b.number))
}

/// Checks whether a line carries no record.
pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

#[cfg(test)]
mod test {
    use std::cmp::Ordering;

    use rstest::*;

    use super::{compare_records, is_blank, ParseErrorKind, Record};

    fn record(line: &str) -> Record {
        Record::parse(line.to_string()).unwrap()
    }

    #[rstest]
    #[case("5. Banana\n", 5, "Banana")]
    #[case("  42.Apple pie  \n", 42, "Apple pie")]
    #[case("7. v1.2.3\n", 7, "v1.2.3")]
    #[case("1000000000000000000. max\n", 1_000_000_000_000_000_000, "max")]
    #[case("3.\n", 3, "")]
    #[case("+8. plus\r\n", 8, "plus")]
    fn test_parse(#[case] line: &str, #[case] number: u64, #[case] text: &str) {
        let record = record(line);

        assert_eq!(record.number(), number);
        assert_eq!(record.text(), text);
        assert_eq!(record.raw(), line);
    }

    #[rstest]
    #[case("no separator here\n")]
    #[case("\n")]
    fn test_parse_missing_separator(#[case] line: &str) {
        let err = Record::parse(line.to_string()).unwrap_err();

        assert_eq!(err.kind(), &ParseErrorKind::MissingSeparator);
        assert_eq!(err.line(), line);
    }

    #[rstest]
    #[case("abc. text\n")]
    #[case("-5. negative\n")]
    #[case(". empty number\n")]
    #[case("1 2. spaced\n")]
    fn test_parse_invalid_number(#[case] line: &str) {
        let err = Record::parse(line.to_string()).unwrap_err();

        assert!(matches!(err.kind(), ParseErrorKind::InvalidNumber(_)));
        assert!(err.to_string().contains("invalid number"));
    }

    #[rstest]
    #[case("2. Apple\n", "5. Banana\n", Ordering::Less)]
    #[case("5. Apple\n", "2. Apple\n", Ordering::Greater)]
    #[case("10. Apple\n", "9. Apple\n", Ordering::Greater)]
    #[case("1. A\n", " 1.A \n", Ordering::Equal)]
    #[case("1. Zebra\n", "1. apple\n", Ordering::Less)]
    fn test_compare_records(#[case] a: &str, #[case] b: &str, #[case] expected: Ordering) {
        assert_eq!(compare_records(&record(a), &record(b)), expected);
    }

    #[rstest]
    #[case("", true)]
    #[case(" \t\n", true)]
    #[case("1. A\n", false)]
    fn test_is_blank(#[case] line: &str, #[case] expected: bool) {
        assert_eq!(is_blank(line), expected);
    }
}
