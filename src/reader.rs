use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use clap::ValueEnum;
use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter, Trim};
use log::debug;

use crate::error::Error;

/// Bytes inspected when deciding whether the first line is a header.
pub const SAMPLE_SIZE: usize = 1024;

// Rows after the header candidate that take part in the vote.
const SNIFF_ROWS: usize = 21;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum HeaderMode {
    /// Guess from a sample of the file
    #[default]
    Auto,
    /// First line is always a header
    Present,
    /// First line is always data
    Absent,
}

#[derive(Debug, Clone)]
pub struct Row {
    /// 1-based line the record starts on.
    pub line: u64,
    pub record: StringRecord,
}

/// Lazily yields the records of a comma separated file, header excluded.
pub struct RowReader {
    has_header: bool,
    records: StringRecordsIntoIter<File>,
}

impl RowReader {
    pub fn open(path: &Path, mode: HeaderMode) -> Result<Self, Error> {
        let open_error = |source: std::io::Error| Error::Open {
            path: path.to_path_buf(),
            source,
        };

        let mut file = File::open(path).map_err(open_error)?;

        let has_header = match mode {
            HeaderMode::Present => true,
            HeaderMode::Absent => false,
            HeaderMode::Auto => {
                let mut sample = Vec::with_capacity(SAMPLE_SIZE);
                file.by_ref()
                    .take(SAMPLE_SIZE as u64)
                    .read_to_end(&mut sample)
                    .map_err(open_error)?;
                file.seek(SeekFrom::Start(0)).map_err(open_error)?;

                if sample.len() >= SAMPLE_SIZE {
                    sniff_header(complete_lines(&sample))
                } else {
                    sniff_header(&sample)
                }
            }
        };
        debug!("{}: has header = {}", path.display(), has_header);

        let records = ReaderBuilder::new()
            .has_headers(has_header)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(file)
            .into_records();

        Ok(Self {
            has_header,
            records,
        })
    }

    pub fn has_header(&self) -> bool {
        self.has_header
    }
}

impl Iterator for RowReader {
    type Item = Result<Row, csv::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.records.next().map(|result| {
            result.map(|record| {
                let line = record.position().map_or(0, |pos| pos.line());
                Row { line, record }
            })
        })
    }
}

// Drops a trailing partial line so a cut-off row does not skew the vote.
fn complete_lines(sample: &[u8]) -> &[u8] {
    match sample.iter().rposition(|&b| b == b'\n') {
        Some(end) => &sample[..=end],
        None => sample,
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum ColumnKind {
    Numeric,
    Length(usize),
}

impl ColumnKind {
    fn of(value: &[u8]) -> Self {
        if is_numeric(value) {
            ColumnKind::Numeric
        } else {
            ColumnKind::Length(char_len(value))
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum ColumnState {
    Unseen,
    Consistent(ColumnKind),
    Mixed,
}

// Undecodable bytes are never numeric.
fn is_numeric(value: &[u8]) -> bool {
    std::str::from_utf8(value).is_ok_and(|text| text.parse::<f64>().is_ok())
}

fn char_len(value: &[u8]) -> usize {
    String::from_utf8_lossy(value).chars().count()
}

/// Guesses whether the first row of `sample` is a header.
///
/// Each column whose values below the first row are all numeric, or all of
/// one length, casts a vote: for a header when the first row's cell breaks
/// the pattern, against it otherwise. Columns with no rows below the first
/// vote by whether the cell is numeric. A positive tally means header.
/// Cells are compared as bytes, so a badly encoded row still takes part.
pub fn sniff_header(sample: &[u8]) -> bool {
    let mut rows = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(sample)
        .into_byte_records()
        .map_while(Result::ok);

    let Some(candidate) = rows.next() else {
        return false;
    };

    let mut columns = vec![ColumnState::Unseen; candidate.len()];
    for row in rows.take(SNIFF_ROWS) {
        if row.len() != candidate.len() {
            continue;
        }
        for (state, value) in columns.iter_mut().zip(row.iter()) {
            let kind = ColumnKind::of(value);
            *state = match *state {
                ColumnState::Unseen => ColumnState::Consistent(kind),
                ColumnState::Consistent(seen) if seen == kind => ColumnState::Consistent(seen),
                _ => ColumnState::Mixed,
            };
        }
    }

    let votes: i64 = columns
        .iter()
        .zip(candidate.iter())
        .map(|(state, cell)| match state {
            ColumnState::Mixed => 0,
            ColumnState::Unseen | ColumnState::Consistent(ColumnKind::Numeric) => {
                if is_numeric(cell) {
                    -1
                } else {
                    1
                }
            }
            ColumnState::Consistent(ColumnKind::Length(len)) => {
                if char_len(cell) == *len {
                    -1
                } else {
                    1
                }
            }
        })
        .sum();

    votes > 0
}
