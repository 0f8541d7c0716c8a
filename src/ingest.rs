use std::path::Path;

use csv::StringRecord;
use log::{debug, info, warn};

use crate::error::{Error, RowError};
use crate::reader::{HeaderMode, RowReader};

/// Malformed rows tolerated per file when no limit is given.
pub const DEFAULT_TOLERANCE: usize = usize::MAX;

const PROGRESS_INTERVAL: u64 = 100_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReadOptions {
    pub header: HeaderMode,
    /// Malformed rows that may be skipped before the pass is aborted.
    pub tolerance: usize,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            header: HeaderMode::Auto,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub processed: u64,
    pub skipped: u64,
}

/// Feeds every row of `path` to `handler`.
///
/// Rows the handler rejects, and rows that are not valid UTF-8, are logged
/// and skipped. Once more than `options.tolerance` rows have been skipped the
/// pass stops with [`Error::ToleranceExceeded`]. I/O failures stop it at once.
pub fn ingest<F>(path: &Path, options: &ReadOptions, mut handler: F) -> Result<IngestStats, Error>
where
    F: FnMut(&StringRecord) -> Result<(), RowError>,
{
    let reader = RowReader::open(path, options.header)?;
    info!("Reading {}", path.display());

    let mut stats = IngestStats::default();
    let mut remaining = options.tolerance;

    for row in reader {
        let (line, outcome) = match row {
            Ok(row) => (row.line, handler(&row.record)),
            Err(e) => {
                let undecodable = match e.kind() {
                    csv::ErrorKind::Utf8 { pos, .. } => Some(pos.as_ref().map_or(0, |p| p.line())),
                    _ => None,
                };
                match undecodable {
                    Some(line) => (line, Err(RowError::Encoding(e.to_string()))),
                    None => {
                        return Err(Error::Read {
                            path: path.to_path_buf(),
                            source: e,
                        })
                    }
                }
            }
        };

        match outcome {
            Ok(()) => {
                stats.processed += 1;
                if stats.processed % PROGRESS_INTERVAL == 0 {
                    debug!("{}: {} rows processed", path.display(), stats.processed);
                }
            }
            Err(err) => {
                warn!("{}: line {}: {}", path.display(), line, err);
                if remaining == 0 {
                    return Err(Error::ToleranceExceeded {
                        path: path.to_path_buf(),
                        line,
                        tolerance: options.tolerance,
                    });
                }
                remaining -= 1;
                stats.skipped += 1;
            }
        }
    }

    info!(
        "Finished {}: {} rows processed, {} skipped",
        path.display(),
        stats.processed,
        stats.skipped
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::NamedTempFile;

    fn write_temp(content: &[u8]) -> NamedTempFile {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(&temp_file, content).unwrap();
        temp_file
    }

    fn reject_odd(record: &StringRecord) -> Result<(), RowError> {
        let value: i64 = record[0].parse().unwrap();
        if value % 2 == 1 {
            return Err(RowError::UnknownProduct(value));
        }
        Ok(())
    }

    fn options(tolerance: usize) -> ReadOptions {
        ReadOptions {
            header: HeaderMode::Absent,
            tolerance,
        }
    }

    #[test]
    fn test_all_rows_handled() {
        let temp_file = write_temp(b"2,a\n4,b\n6,c\n");
        let mut seen = Vec::new();

        let stats = ingest(temp_file.path(), &options(0), |record| {
            seen.push(record[1].to_string());
            Ok(())
        })
        .unwrap();

        assert_eq!(stats, IngestStats { processed: 3, skipped: 0 });
        assert_eq!(seen, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_skipped_rows_within_tolerance() {
        let temp_file = write_temp(b"1\n2\n3\n4\n");

        let stats = ingest(temp_file.path(), &options(2), reject_odd).unwrap();

        assert_eq!(stats, IngestStats { processed: 2, skipped: 2 });
    }

    #[test]
    fn test_tolerance_exceeded() {
        let temp_file = write_temp(b"1\n3\n5\n2\n");

        let result = ingest(temp_file.path(), &options(2), reject_odd);

        match result {
            Err(Error::ToleranceExceeded { line, tolerance, .. }) => {
                assert_eq!(line, 3);
                assert_eq!(tolerance, 2);
            }
            _ => panic!("Expected ToleranceExceeded error"),
        }
    }

    #[test]
    fn test_zero_tolerance_aborts_on_first_bad_row() {
        let temp_file = write_temp(b"2\n1\n");
        let mut handled = 0;

        let result = ingest(temp_file.path(), &options(0), |record| {
            handled += 1;
            reject_odd(record)
        });

        assert!(matches!(result, Err(Error::ToleranceExceeded { line: 2, .. })));
        assert_eq!(handled, 2);
    }

    #[test]
    fn test_default_tolerance_is_unbounded() {
        let content: String = (0..1000).map(|i| format!("{}\n", i * 2 + 1)).collect();
        let temp_file = write_temp(content.as_bytes());
        let options = ReadOptions {
            header: HeaderMode::Absent,
            ..ReadOptions::default()
        };

        let stats = ingest(temp_file.path(), &options, reject_odd).unwrap();

        assert_eq!(stats, IngestStats { processed: 0, skipped: 1000 });
    }

    #[test]
    fn test_invalid_utf8_row_is_malformed() {
        let temp_file = write_temp(b"2,a\n4,\xff\n6,c\n");
        let mut handled = 0;

        let stats = ingest(temp_file.path(), &options(1), |_| {
            handled += 1;
            Ok(())
        })
        .unwrap();

        assert_eq!(stats, IngestStats { processed: 2, skipped: 1 });
        assert_eq!(handled, 2);

        let result = ingest(temp_file.path(), &options(0), |_| Ok(()));
        assert!(matches!(result, Err(Error::ToleranceExceeded { line: 2, .. })));
    }

    #[test]
    fn test_undecodable_header_is_not_charged() {
        let temp_file = write_temp(b"id\xff,name\n2,a\n4,b\n");
        let options = ReadOptions {
            header: HeaderMode::Auto,
            tolerance: 0,
        };

        let stats = ingest(temp_file.path(), &options, reject_odd).unwrap();

        assert_eq!(stats, IngestStats { processed: 2, skipped: 0 });
    }

    #[test]
    fn test_header_is_not_handled() {
        let temp_file = write_temp(b"id,name\n2,a\n4,b\n");
        let options = ReadOptions {
            header: HeaderMode::Present,
            tolerance: 0,
        };

        let stats = ingest(temp_file.path(), &options, reject_odd).unwrap();

        assert_eq!(stats.processed, 2);
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let result = ingest(Path::new("nonexistent_file.csv"), &options(10), |_| Ok(()));

        assert!(matches!(result, Err(Error::Open { .. })));
    }
}
