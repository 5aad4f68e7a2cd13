//! Delimited-text helpers shared by the row loader and exporter.

use std::borrow::Cow;

use crate::constants::csv::{DELIMITER, QUOTE};
use crate::types::CellValue;

/// One logical record read from delimited text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DelimitedRecord {
    /// 0-based physical line where the record starts.
    pub line: usize,
    /// Parsed fields, or the reason the record was rejected.
    pub fields: Result<Vec<CellValue>, MalformedRecord>,
}

/// A record that could not be split into fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MalformedRecord {
    pub line: usize,
    pub reason: &'static str,
}

/// Iterator over the logical records of a delimited-text document.
///
/// Quoted fields may contain delimiters, doubled quotes and line breaks.
/// Blank lines are skipped. A record with an unterminated quote is reported as
/// malformed and reading resumes on the following physical line. Once a field
/// count is expected, a record whose quoted field spans lines but does not
/// yield that many fields is rejected the same way, so a stray opening quote
/// cannot swallow the lines after it.
pub struct DelimitedRecords<'a> {
    text: &'a str,
    pos: usize,
    line: usize,
    expected_fields: Option<usize>,
}

/// Iterate the records of `text`.
pub fn records(text: &str) -> DelimitedRecords<'_> {
    DelimitedRecords {
        text,
        pos: 0,
        line: 0,
        expected_fields: None,
    }
}

impl DelimitedRecords<'_> {
    /// Require multi-line records to carry exactly `count` fields, usually the
    /// header width.
    pub fn expect_fields(&mut self, count: usize) {
        self.expected_fields = Some(count);
    }

    fn reject(&mut self, line: usize, reason: &'static str) -> DelimitedRecord {
        let rest = &self.text[self.pos..];
        self.pos += rest.find('\n').map(|idx| idx + 1).unwrap_or(rest.len());
        self.line += 1;
        DelimitedRecord {
            line,
            fields: Err(MalformedRecord { line, reason }),
        }
    }
}

enum Parsed {
    Complete {
        fields: Vec<CellValue>,
        consumed: usize,
        newlines: usize,
        embedded_newlines: usize,
    },
    Unterminated,
}

impl Iterator for DelimitedRecords<'_> {
    type Item = DelimitedRecord;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.pos >= self.text.len() {
                return None;
            }
            let line = self.line;
            match parse_record(&self.text[self.pos..]) {
                Parsed::Complete {
                    fields,
                    consumed,
                    newlines,
                    embedded_newlines,
                } => {
                    if embedded_newlines > 0
                        && self
                            .expected_fields
                            .is_some_and(|expected| expected != fields.len())
                    {
                        return Some(self.reject(line, "multi-line record has wrong field count"));
                    }
                    self.pos += consumed;
                    self.line += newlines;
                    if fields.len() == 1 && fields[0].trim().is_empty() {
                        continue;
                    }
                    return Some(DelimitedRecord {
                        line,
                        fields: Ok(fields),
                    });
                }
                Parsed::Unterminated => {
                    return Some(self.reject(line, "unterminated quoted field"));
                }
            }
        }
    }
}

fn parse_record(text: &str) -> Parsed {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut newlines = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if in_quotes {
            if ch == QUOTE {
                if matches!(chars.peek(), Some((_, next)) if *next == QUOTE) {
                    chars.next();
                    field.push(QUOTE);
                } else {
                    in_quotes = false;
                }
            } else {
                if ch == '\n' {
                    newlines += 1;
                }
                field.push(ch);
            }
            continue;
        }
        match ch {
            QUOTE if field.is_empty() => in_quotes = true,
            DELIMITER => fields.push(std::mem::take(&mut field)),
            '\r' if matches!(chars.peek(), Some((_, '\n'))) => {}
            '\n' => {
                fields.push(field);
                return Parsed::Complete {
                    fields,
                    consumed: idx + 1,
                    newlines: newlines + 1,
                    embedded_newlines: newlines,
                };
            }
            _ => field.push(ch),
        }
    }

    if in_quotes {
        return Parsed::Unterminated;
    }
    fields.push(field);
    Parsed::Complete {
        fields,
        consumed: text.len(),
        newlines,
        embedded_newlines: newlines,
    }
}

/// Quote a field when it contains a delimiter, quote or line break.
pub fn escape_field(value: &str) -> Cow<'_, str> {
    let needs_quotes = value
        .chars()
        .any(|ch| ch == DELIMITER || ch == QUOTE || ch == '\n' || ch == '\r');
    if !needs_quotes {
        return Cow::Borrowed(value);
    }
    let doubled = value.replace(QUOTE, "\"\"");
    Cow::Owned(format!("{QUOTE}{doubled}{QUOTE}"))
}

/// Join escaped fields into one record line (without terminator).
pub fn join_record<'a, I>(fields: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut line = String::new();
    for (idx, field) in fields.into_iter().enumerate() {
        if idx > 0 {
            line.push(DELIMITER);
        }
        line.push_str(&escape_field(field));
    }
    line
}

/// Parse a numeric cell, treating anything unparsable as `0.0`.
pub fn coerce_number(value: &str) -> f64 {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|parsed| parsed.is_finite())
        .unwrap_or(0.0)
}
