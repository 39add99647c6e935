use std::fs;
use std::io::Write;
use std::iter;
use std::ops::Range;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Terminator, WriterBuilder};

use crate::error::{Error, Result};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Line ending detected on read and reproduced on write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    fn detect(bytes: &[u8]) -> Self {
        match bytes.iter().position(|&b| b == b'\n') {
            Some(i) if i > 0 && bytes[i - 1] == b'\r' => LineEnding::CrLf,
            _ => LineEnding::Lf,
        }
    }

    fn terminator(self) -> Terminator {
        match self {
            LineEnding::Lf => Terminator::Any(b'\n'),
            LineEnding::CrLf => Terminator::CRLF,
        }
    }

    fn as_bytes(self) -> &'static [u8] {
        match self {
            LineEnding::Lf => b"\n",
            LineEnding::CrLf => b"\r\n",
        }
    }
}

/// A record as it was read: the byte span of its text, without line breaks,
/// and the decoded fields.
#[derive(Debug, Clone, PartialEq, Default)]
struct RawRecord {
    span: Range<usize>,
    fields: Vec<String>,
}

/// An in-memory delimited text file: header row first, rows may be ragged.
///
/// The bytes that were read are kept, so writing the table back reproduces
/// every record whose fields were not changed exactly as it was, quotes,
/// blank lines and a missing final newline included. Only changed records
/// are re-encoded.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DelimitedTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub delimiter: u8,
    pub line_ending: LineEnding,
    pub bom: bool,
    body: Vec<u8>,
    raw: Vec<RawRecord>,
}

impl DelimitedTable {
    pub fn from_bytes(bytes: &[u8], delimiter: u8) -> Result<Self> {
        let (bom, body) = match bytes.strip_prefix(UTF8_BOM) {
            Some(rest) => (true, rest),
            None => (false, bytes),
        };

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(body);

        let mut raw = Vec::new();
        let mut record = StringRecord::new();
        loop {
            let start = reader.position().byte() as usize;
            if !reader.read_record(&mut record)? {
                break;
            }
            let end = reader.position().byte() as usize;
            raw.push(RawRecord {
                span: without_line_breaks(body, start..end),
                fields: record.iter().map(str::to_owned).collect(),
            });
        }

        let mut fields = raw.iter().map(|r| r.fields.clone());
        let header = fields.next().ok_or(Error::EmptyTable)?;
        let rows = fields.collect();

        Ok(Self {
            header,
            rows,
            delimiter,
            line_ending: LineEnding::detect(body),
            bom,
            body: body.to_vec(),
            raw,
        })
    }

    /// Reads the whole file into memory; the handle is closed on return.
    pub fn read<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<Self> {
        let bytes = fs::read(path.as_ref())?;
        Self::from_bytes(&bytes, delimiter)
    }

    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.header
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| Error::ColumnNotFound {
                column: name.to_owned(),
                header: self.header.clone(),
            })
    }

    pub fn write_to<W: Write>(&self, mut out: W) -> Result<()> {
        if self.bom {
            out.write_all(UTF8_BOM)?;
        }

        let records = iter::once(&self.header).chain(&self.rows);
        let mut cursor = 0;
        let mut appended = false;
        for (i, record) in records.enumerate() {
            match self.raw.get(i) {
                Some(raw) => {
                    out.write_all(&self.body[cursor..raw.span.start])?;
                    if *record == raw.fields {
                        out.write_all(&self.body[raw.span.clone()])?;
                    } else {
                        out.write_all(&self.encode(record)?)?;
                    }
                    cursor = raw.span.end;
                }
                None => {
                    if !appended {
                        out.write_all(&self.body[cursor..])?;
                        cursor = self.body.len();
                        appended = true;
                        if !self.body.is_empty() && !self.body.ends_with(b"\n") {
                            out.write_all(self.line_ending.as_bytes())?;
                        }
                    }
                    out.write_all(&self.encode(record)?)?;
                    out.write_all(self.line_ending.as_bytes())?;
                }
            }
        }

        // records dropped since the read are left out, the tail after the
        // last one read is kept
        let tail = self.raw.last().map_or(0, |r| r.span.end).max(cursor);
        out.write_all(&self.body[tail..])?;
        out.flush()?;
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        Ok(buf)
    }

    /// One record with minimal quoting and no line ending.
    fn encode(&self, record: &[String]) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        {
            let mut writer = WriterBuilder::new()
                .flexible(true)
                .delimiter(self.delimiter)
                .terminator(self.line_ending.terminator())
                .from_writer(&mut buf);
            writer.write_record(record)?;
            writer.flush()?;
        }
        let len = buf.len() - self.line_ending.as_bytes().len();
        buf.truncate(len);
        Ok(buf)
    }
}

fn without_line_breaks(body: &[u8], mut span: Range<usize>) -> Range<usize> {
    let is_break = |b: u8| b == b'\r' || b == b'\n';
    while span.start < span.end && is_break(body[span.start]) {
        span.start += 1;
    }
    while span.end > span.start && is_break(body[span.end - 1]) {
        span.end -= 1;
    }
    span
}

/// Header fields only, for offering a column choice before the full read.
pub fn read_header<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<Vec<String>> {
    let bytes = fs::read(path.as_ref())?;
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes[..]);
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(body);

    match reader.records().next() {
        Some(record) => Ok(record?.iter().map(str::to_owned).collect()),
        None => Err(Error::EmptyTable),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_quoted_wkt_and_ragged_rows() {
        let csv = "id,name,wkt\n1,a,\"MULTIPOINT ((1 2), (3 4))\"\n2\n3,c,MULTIPOINT (EMPTY)\n";
        let table = DelimitedTable::from_bytes(csv.as_bytes(), b',').unwrap();

        assert_eq!(table.header, vec!["id", "name", "wkt"]);
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[0][2], "MULTIPOINT ((1 2), (3 4))");
        assert_eq!(table.rows[1], vec!["2"]);
        assert_eq!(table.column_index("wkt").unwrap(), 2);
    }

    #[test]
    fn rewrite_is_byte_identical() {
        let csv = "id,name,wkt\n1,\"Smith, J\",\"MULTIPOINT ((1 2), (3 4))\"\n2\n3,c,MULTIPOINT ((10 10))\n";
        let table = DelimitedTable::from_bytes(csv.as_bytes(), b',').unwrap();
        assert_eq!(String::from_utf8(table.to_bytes().unwrap()).unwrap(), csv);
    }

    #[test]
    fn untouched_records_keep_quotes_blank_lines_and_missing_newline() {
        let csv = "id,wkt\n\"1\",\"MULTIPOINT ((10 10))\"\n\n2,MULTIPOINT (EMPTY)";
        let mut table = DelimitedTable::from_bytes(csv.as_bytes(), b',').unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.to_bytes().unwrap(), csv.as_bytes());

        table.rows[1][1] = "MULTIPOINT (10.5 9.5)".to_owned();
        assert_eq!(
            String::from_utf8(table.to_bytes().unwrap()).unwrap(),
            "id,wkt\n\"1\",\"MULTIPOINT ((10 10))\"\n\n2,MULTIPOINT (10.5 9.5)"
        );
    }

    #[test]
    fn changed_record_is_requoted_only_where_needed() {
        let csv = "id;wkt\r\n\"a\";\"MULTIPOINT ((0 0))\"\r\n\"b\";x\r\n";
        let mut table = DelimitedTable::from_bytes(csv.as_bytes(), b';').unwrap();
        table.rows[0][1] = "MULTIPOINT ((1 2))".to_owned();
        table.rows[1][1] = "has;delimiter".to_owned();
        assert_eq!(
            String::from_utf8(table.to_bytes().unwrap()).unwrap(),
            "id;wkt\r\na;MULTIPOINT ((1 2))\r\nb;\"has;delimiter\"\r\n"
        );
    }

    #[test]
    fn rows_added_after_reading_are_appended() {
        let mut table = DelimitedTable::from_bytes(b"id,wkt\n1,x", b',').unwrap();
        table.rows.push(vec!["2".to_owned(), "y".to_owned()]);
        assert_eq!(table.to_bytes().unwrap(), b"id,wkt\n1,x\n2,y\n");

        let built = DelimitedTable {
            header: vec!["id".to_owned()],
            rows: vec![vec!["1".to_owned()]],
            delimiter: b',',
            ..DelimitedTable::default()
        };
        assert_eq!(built.to_bytes().unwrap(), b"id\n1\n");
    }

    #[test]
    fn keeps_crlf_and_bom() {
        let csv = "\u{feff}id;wkt\r\n1;MULTIPOINT ((5 5))\r\n";
        let table = DelimitedTable::from_bytes(csv.as_bytes(), b';').unwrap();

        assert!(table.bom);
        assert_eq!(table.line_ending, LineEnding::CrLf);
        assert_eq!(table.header[0], "id");
        assert_eq!(table.to_bytes().unwrap(), csv.as_bytes());
    }

    #[test]
    fn missing_column() {
        let table = DelimitedTable::from_bytes(b"id,geom\n1,x\n", b',').unwrap();
        match table.column_index("wkt") {
            Err(Error::ColumnNotFound { column, header }) => {
                assert_eq!(column, "wkt");
                assert_eq!(header, vec!["id", "geom"]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn empty_input_has_no_header() {
        assert!(matches!(
            DelimitedTable::from_bytes(b"", b','),
            Err(Error::EmptyTable)
        ));
    }
}
