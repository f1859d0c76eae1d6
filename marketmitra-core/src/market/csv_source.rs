//! Offline price source backed by a directory of CSV files.
//!
//! One file per ticker, `<dir>/<TICKER>.csv`, with a header row naming at
//! least `date` and `close`. `open`, `high` and `low` are optional and fall
//! back to the close; other columns are ignored. Header names are matched
//! case-insensitively, so Yahoo's own export (`Date,Open,...,Adj Close`)
//! loads as-is.

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::debug;

use super::provider::{DataError, PriceBar, PriceSource};
use crate::coerce::parse_str;
use crate::window::DateWindow;

#[derive(Debug, Clone)]
pub struct CsvSource {
    dir: PathBuf,
}

struct Columns {
    date: usize,
    close: usize,
    open: Option<usize>,
    high: Option<usize>,
    low: Option<usize>,
}

impl CsvSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `symbol`'s series.
    pub fn path_for(&self, symbol: &str) -> Result<PathBuf, DataError> {
        if symbol.is_empty() || symbol.contains(['/', '\\']) || symbol.contains("..") {
            return Err(DataError::Other(format!("invalid symbol for CSV lookup: {symbol:?}")));
        }
        Ok(self.dir.join(format!("{symbol}.csv")))
    }

    fn read_file(path: &Path, window: &DateWindow) -> Result<Vec<PriceBar>, DataError> {
        let csv_err = |e: csv::Error| {
            let message = e.to_string();
            match e.into_kind() {
                csv::ErrorKind::Io(io) => DataError::Io(io),
                _ => DataError::Csv {
                    path: path.display().to_string(),
                    message,
                },
            }
        };

        let file = File::open(path)?;
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        // Byte records so one badly encoded row cannot sink the whole file.
        let headers = rdr.byte_headers().map_err(csv_err)?.clone();
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| String::from_utf8_lossy(h).eq_ignore_ascii_case(name))
        };
        let (Some(date), Some(close)) = (find("date"), find("close")) else {
            return Err(DataError::Csv {
                path: path.display().to_string(),
                message: "header must contain `date` and `close` columns".into(),
            });
        };
        let cols = Columns {
            date,
            close,
            open: find("open"),
            high: find("high"),
            low: find("low"),
        };

        let mut bars = Vec::new();
        let mut skipped = 0usize;
        for record in rdr.byte_records() {
            let record = match record {
                Ok(record) => record,
                Err(e) if e.is_io_error() => return Err(csv_err(e)),
                Err(_) => {
                    skipped += 1;
                    continue;
                }
            };
            match parse_row(&record, &cols) {
                Some(bar) if window.contains(bar.date) => bars.push(bar),
                Some(_) => {}
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            debug!(path = %path.display(), skipped, "skipped unparsable CSV rows");
        }
        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}

fn parse_row(record: &csv::ByteRecord, cols: &Columns) -> Option<PriceBar> {
    let cell = |i: usize| record.get(i).and_then(|b| std::str::from_utf8(b).ok());
    let date = NaiveDate::parse_from_str(cell(cols.date)?, "%Y-%m-%d").ok()?;
    let close = parse_str(cell(cols.close)?)?;
    let field = |idx: Option<usize>| idx.and_then(cell).and_then(parse_str).unwrap_or(close);
    Some(PriceBar {
        date,
        open: field(cols.open),
        high: field(cols.high),
        low: field(cols.low),
        close,
    })
}

impl PriceSource for CsvSource {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch(&self, symbol: &str, window: &DateWindow) -> Result<Vec<PriceBar>, DataError> {
        let path = self.path_for(symbol)?;
        if !path.exists() {
            debug!(symbol, path = %path.display(), "no CSV file for symbol");
            return Ok(Vec::new());
        }
        Self::read_file(&path, window)
    }
}
