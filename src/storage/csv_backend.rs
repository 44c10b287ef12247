use std::{
    fs::{File, OpenOptions},
    io::{Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, WriterBuilder};

use crate::{
    core::{
        time::{Clock, SystemClock},
        utils::ensure_dir,
    },
    domain::ExpenseRecord,
    errors::LedgerError,
};

use super::{ExpenseStore, Result};

/// Column names, in persisted order.
pub const HEADER: [&str; 4] = ["date", "amount", "category", "note"];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Expense store backed by a single delimited text file.
pub struct CsvExpenseStore {
    path: PathBuf,
    clock: Box<dyn Clock>,
}

impl CsvExpenseStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_clock(path, Box::new(SystemClock))
    }

    pub fn with_clock(path: impl Into<PathBuf>, clock: Box<dyn Clock>) -> Self {
        Self {
            path: path.into(),
            clock,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn initialize(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                ensure_dir(parent)?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        if file.metadata()?.len() == 0 {
            file.write_all(&encode_row(HEADER)?)?;
            file.sync_data()?;
            tracing::info!(path = %self.path.display(), "created expense file");
        }
        Ok(())
    }

    pub fn append(&self, amount: f64, category: &str, note: &str) -> Result<ExpenseRecord> {
        let record = ExpenseRecord::new(self.clock.today(), amount, category, note);
        let mut row = encode_row([
            record.date.format(DATE_FORMAT).to_string(),
            amount.to_string(),
            record.category.clone(),
            record.note.clone(),
        ])?;

        self.initialize()?;
        let mut file = OpenOptions::new().read(true).append(true).open(&self.path)?;
        let original_len = file.metadata()?.len();
        if !ends_with_newline(&mut file, original_len)? {
            row.insert(0, b'\n');
        }

        write_or_rollback(&mut file, &row, original_len, &self.path)?;

        tracing::debug!(
            date = %record.date,
            amount,
            category = %record.category,
            "appended expense"
        );
        Ok(record)
    }

    pub fn read_all(&self) -> Result<Vec<ExpenseRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            return Ok(Vec::new());
        }
        check_header(&headers)?;

        let mut records = Vec::new();
        for (index, row) in reader.records().enumerate() {
            let row = row?;
            let line = row
                .position()
                .map(|pos| pos.line())
                .unwrap_or(index as u64 + 2);
            match parse_row(&row, line) {
                Ok(record) => records.push(record),
                Err(err) => {
                    tracing::warn!(path = %self.path.display(), %err, "expense file is corrupt");
                    return Err(err);
                }
            }
        }
        Ok(records)
    }
}

impl ExpenseStore for CsvExpenseStore {
    fn initialize(&self) -> Result<()> {
        CsvExpenseStore::initialize(self)
    }

    fn append(&self, amount: f64, category: &str, note: &str) -> Result<ExpenseRecord> {
        CsvExpenseStore::append(self, amount, category, note)
    }

    fn read_all(&self) -> Result<Vec<ExpenseRecord>> {
        CsvExpenseStore::read_all(self)
    }

    fn location(&self) -> &Path {
        self.path()
    }
}

/// Serializes a single row, including its terminator, into memory so it can
/// be written with one call.
fn encode_row<I, T>(fields: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(fields)?;
    writer
        .into_inner()
        .map_err(|err| LedgerError::Io(err.into_error()))
}

/// Destination for one appended row that can be cut back to a known length.
trait RowSink: Write {
    fn commit(&mut self) -> std::io::Result<()>;
    fn truncate(&mut self, len: u64) -> std::io::Result<()>;
}

impl RowSink for File {
    fn commit(&mut self) -> std::io::Result<()> {
        self.sync_data()
    }

    fn truncate(&mut self, len: u64) -> std::io::Result<()> {
        self.set_len(len)
    }
}

/// Writes `row` in full or restores the sink to `original_len`.
fn write_or_rollback<S: RowSink>(
    sink: &mut S,
    row: &[u8],
    original_len: u64,
    path: &Path,
) -> Result<()> {
    let written = sink.write_all(row).and_then(|_| sink.commit());
    if let Err(err) = written {
        if let Err(rollback) = sink.truncate(original_len) {
            tracing::error!(
                path = %path.display(),
                original_len,
                %rollback,
                "could not remove partially written expense row"
            );
        }
        return Err(err.into());
    }
    Ok(())
}

fn ends_with_newline(file: &mut File, len: u64) -> Result<bool> {
    if len == 0 {
        return Ok(true);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::Start(len - 1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

fn check_header(headers: &StringRecord) -> Result<()> {
    let found: Vec<&str> = headers.iter().map(str::trim).collect();
    let mismatched = found.iter().zip(HEADER.iter()).any(|(a, b)| a != b);
    if found.len() < 3 || found.len() > HEADER.len() || mismatched {
        return Err(LedgerError::Format {
            line: 1,
            message: format!("unexpected header `{}`", found.join(",")),
        });
    }
    Ok(())
}

fn parse_row(row: &StringRecord, line: u64) -> Result<ExpenseRecord> {
    let field = |index: usize| -> Result<&str> {
        row.get(index).ok_or_else(|| LedgerError::Format {
            line,
            message: format!("missing `{}` field", HEADER[index]),
        })
    };

    let raw_date = field(0)?;
    let date = NaiveDate::parse_from_str(raw_date.trim(), DATE_FORMAT).map_err(|err| {
        LedgerError::Format {
            line,
            message: format!("invalid date `{raw_date}`: {err}"),
        }
    })?;

    let raw_amount = field(1)?;
    let amount: f64 = raw_amount.trim().parse().map_err(|_| LedgerError::Format {
        line,
        message: format!("invalid amount `{raw_amount}`"),
    })?;

    let category = field(2)?.to_string();
    let note = row.get(3).unwrap_or_default().to_string();

    Ok(ExpenseRecord {
        date,
        amount,
        category,
        note,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::FixedClock;
    use std::fs;
    use tempfile::tempdir;

    fn store_at(path: PathBuf) -> CsvExpenseStore {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        CsvExpenseStore::with_clock(path, Box::new(FixedClock(today)))
    }

    #[test]
    fn initialize_writes_header_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("expenses.csv");
        let store = store_at(path.clone());

        store.initialize().unwrap();
        store.initialize().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "date,amount,category,note\n");
    }

    #[test]
    fn initialize_creates_missing_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("expenses.csv");
        store_at(path.clone()).initialize().unwrap();
        assert!(path.exists());
    }

    #[test]
    fn append_without_initialize_writes_header_first() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("expenses.csv");
        let store = store_at(path.clone());

        store.append(12.5, "Food", "").unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "date,amount,category,note\n2024-06-01,12.5,Food,\n");
    }

    #[test]
    fn notes_with_delimiters_are_quoted() {
        let dir = tempdir().unwrap();
        let store = store_at(dir.path().join("expenses.csv"));
        let note = "bus, then \"metro\"\nback home";

        store.append(3.0, "Travel", note).unwrap();

        let records = store.read_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].note, note);
    }

    #[test]
    fn append_repairs_missing_trailing_newline() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("expenses.csv");
        fs::write(&path, "date,amount,category,note\n2024-01-02,5,Food,snack").unwrap();
        let store = store_at(path);

        store.append(7.0, "Study", "pens").unwrap();

        let records = store.read_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].note, "snack");
        assert_eq!(records[1].category, "Study");
    }

    #[test]
    fn header_only_and_empty_files_read_as_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("expenses.csv");
        fs::write(&path, "").unwrap();
        assert!(store_at(path.clone()).read_all().unwrap().is_empty());

        fs::write(&path, "date,amount,category,note\n").unwrap();
        assert!(store_at(path).read_all().unwrap().is_empty());
    }

    #[test]
    fn bad_date_is_a_format_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("expenses.csv");
        fs::write(&path, "date,amount,category,note\n06/01/2024,5,Food,\n").unwrap();

        let err = store_at(path).read_all().unwrap_err();
        assert!(matches!(err, LedgerError::Format { line: 2, .. }), "{err}");
    }

    #[test]
    fn foreign_header_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("expenses.csv");
        fs::write(&path, "when,how much,what\n2024-01-01,5,Food\n").unwrap();

        let err = store_at(path).read_all().unwrap_err();
        assert!(matches!(err, LedgerError::Format { line: 1, .. }), "{err}");
    }

    #[test]
    fn header_with_extra_columns_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("expenses.csv");
        fs::write(&path, "date,amount,category,note,x\n2024-01-01,5,Food,,1\n").unwrap();

        let err = store_at(path).read_all().unwrap_err();
        assert!(matches!(err, LedgerError::Format { line: 1, .. }), "{err}");
    }

    /// Writes at most `capacity` bytes to the real file, then fails like a full disk.
    struct ShortFile {
        file: File,
        capacity: usize,
        truncate_fails: bool,
    }

    impl Write for ShortFile {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if self.capacity == 0 {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "no space left on device",
                ));
            }
            let n = buf.len().min(self.capacity);
            let n = self.file.write(&buf[..n])?;
            self.capacity -= n;
            Ok(n)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.file.flush()
        }
    }

    impl RowSink for ShortFile {
        fn commit(&mut self) -> std::io::Result<()> {
            self.file.sync_data()
        }

        fn truncate(&mut self, len: u64) -> std::io::Result<()> {
            if self.truncate_fails {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "truncate refused",
                ));
            }
            self.file.set_len(len)
        }
    }

    fn short_file_at(path: &Path, capacity: usize, truncate_fails: bool) -> (ShortFile, u64) {
        let file = OpenOptions::new().append(true).open(path).unwrap();
        let len = file.metadata().unwrap().len();
        let sink = ShortFile {
            file,
            capacity,
            truncate_fails,
        };
        (sink, len)
    }

    #[test]
    fn failed_partial_write_leaves_file_unchanged() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("expenses.csv");
        let store = store_at(path.clone());
        store.append(10.0, "Food", "breakfast").unwrap();
        let before = fs::read(&path).unwrap();

        let row = encode_row(["2024-06-01", "25", "Travel", "taxi to the station"]).unwrap();
        let (mut sink, original_len) = short_file_at(&path, 7, false);
        let err = write_or_rollback(&mut sink, &row, original_len, &path).unwrap_err();

        assert!(matches!(err, LedgerError::Io(_)), "{err}");
        assert_eq!(fs::read(&path).unwrap(), before);
        assert_eq!(store.read_all().unwrap().len(), 1);
    }

    #[test]
    fn failed_rollback_still_reports_the_write_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("expenses.csv");
        store_at(path.clone()).initialize().unwrap();

        let row = encode_row(["2024-06-01", "25", "Travel", ""]).unwrap();
        let (mut sink, original_len) = short_file_at(&path, 4, true);
        let err = write_or_rollback(&mut sink, &row, original_len, &path).unwrap_err();

        match err {
            LedgerError::Io(io) => assert_eq!(io.kind(), std::io::ErrorKind::Other),
            other => panic!("expected io error, got {other:?}"),
        }
    }

    #[test]
    fn complete_write_is_kept() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("expenses.csv");
        let store = store_at(path.clone());
        store.initialize().unwrap();

        let row = encode_row(["2024-06-01", "25", "Travel", ""]).unwrap();
        let (mut sink, original_len) = short_file_at(&path, usize::MAX, false);
        write_or_rollback(&mut sink, &row, original_len, &path).unwrap();

        assert_eq!(store.read_all().unwrap()[0].amount, 25.0);
    }

    #[test]
    fn missing_note_column_reads_as_empty_note() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("expenses.csv");
        fs::write(&path, "date,amount,category,note\n2024-01-01,5,Food\n").unwrap();

        let records = store_at(path).read_all().unwrap();
        assert_eq!(records[0].note, "");
    }
}
