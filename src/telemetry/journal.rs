//! # Frame Journal
//!
//! One JSON object per line, one line per uplink cycle:
//!
//! ```text
//! {"timestamp":"2026-10-19T08:00:30.002Z","sequence":12,"outcome":"submitted","frame":"010866...","sample":{...},"fix":null,"error":null}
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::Result;
use crate::frame::protocol::{PositionFix, TelemetrySample};

const FILE_PREFIX: &str = "frames-";
const FILE_EXTENSION: &str = "jsonl";

/// What happened in one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalOutcome {
    Submitted,
    SubmitFailed,
    SensorFault,
    EncodingError,
}

/// One journal line
#[derive(Debug, Clone, Serialize)]
pub struct JournalRecord {
    pub timestamp: String,
    pub sequence: u32,
    pub outcome: JournalOutcome,
    pub frame: Option<String>,
    pub sample: Option<TelemetrySample>,
    pub fix: Option<PositionFix>,
    pub error: Option<String>,
}

impl JournalRecord {
    /// Start a record stamped with the current UTC time
    pub fn now(sequence: u32, outcome: JournalOutcome) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            sequence,
            outcome,
            frame: None,
            sample: None,
            fix: None,
            error: None,
        }
    }
}

/// Rotating JSONL writer
#[derive(Debug)]
pub struct FrameJournal {
    dir: PathBuf,
    max_records_per_file: usize,
    max_files_to_keep: usize,
    writer: Option<BufWriter<File>>,
    records_in_file: usize,
    files_opened: u32,
}

impl FrameJournal {
    /// Create the journal directory if needed; no file is opened until the
    /// first record arrives
    ///
    /// # Arguments
    ///
    /// * `dir` - Directory holding the `frames-*.jsonl` files
    /// * `max_records_per_file` - Lines per file before rotating (at least 1)
    /// * `max_files_to_keep` - Journal files retained in `dir` (at least 1)
    ///
    /// # Returns
    ///
    /// * `Result<FrameJournal>` - Journal ready for [`append`](Self::append)
    pub fn open<P: AsRef<Path>>(
        dir: P,
        max_records_per_file: usize,
        max_files_to_keep: usize,
    ) -> Result<Self> {
        fs::create_dir_all(dir.as_ref())?;

        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
            max_records_per_file: max_records_per_file.max(1),
            max_files_to_keep: max_files_to_keep.max(1),
            writer: None,
            records_in_file: 0,
            files_opened: 0,
        })
    }

    /// Append one record, rotating first if the current file is full
    ///
    /// A failed write drops the current file, so the next record starts a
    /// fresh one instead of landing after a partial line.
    pub fn append(&mut self, record: &JournalRecord) -> Result<()> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        if self.writer.is_none() || self.records_in_file >= self.max_records_per_file {
            self.rotate()?;
        }

        if let Some(writer) = self.writer.as_mut() {
            if let Err(e) = writer.write_all(&line).and_then(|_| writer.flush()) {
                warn!("Frame journal write failed, rotating on next record: {}", e);
                self.writer = None;
                return Err(e.into());
            }
            self.records_in_file += 1;
        }

        Ok(())
    }

    fn rotate(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }

        // Names can repeat after a restart within the same second
        let file = loop {
            self.files_opened += 1;
            let name = format!(
                "{}{}-{:04}.{}",
                FILE_PREFIX,
                Utc::now().format("%Y%m%dT%H%M%S"),
                self.files_opened,
                FILE_EXTENSION
            );
            let path = self.dir.join(name);

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => {
                    debug!("Opened frame journal {}", path.display());
                    break file;
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        };
        self.writer = Some(BufWriter::new(file));
        self.records_in_file = 0;

        self.prune();
        Ok(())
    }

    /// Remove the oldest journal files beyond the retention limit
    fn prune(&self) {
        let mut files = match self.journal_files() {
            Ok(files) => files,
            Err(e) => {
                warn!("Could not list journal directory {}: {}", self.dir.display(), e);
                return;
            }
        };

        if files.len() <= self.max_files_to_keep {
            return;
        }

        files.sort();
        let excess = files.len() - self.max_files_to_keep;
        for path in files.into_iter().take(excess) {
            if let Err(e) = fs::remove_file(&path) {
                warn!("Could not remove old journal {}: {}", path.display(), e);
            }
        }
    }

    /// Journal files currently on disk, unsorted
    pub fn journal_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let is_journal = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with(FILE_PREFIX) && n.ends_with(FILE_EXTENSION))
                .unwrap_or(false);
            if is_journal {
                files.push(path);
            }
        }
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> TelemetrySample {
        TelemetrySample { temperature: 21.5, humidity: 45.2, pressure: 1013.2, altitude: 123.45 }
    }

    fn read_lines(path: &Path) -> Vec<serde_json::Value> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_record_serializes_as_json_line() {
        let dir = TempDir::new().unwrap();
        let mut journal = FrameJournal::open(dir.path(), 100, 5).unwrap();

        let mut record = JournalRecord::now(12, JournalOutcome::Submitted);
        record.frame = Some("0108".to_string());
        record.sample = Some(sample());
        journal.append(&record).unwrap();

        let files = journal.journal_files().unwrap();
        assert_eq!(files.len(), 1);

        let lines = read_lines(&files[0]);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["sequence"], 12);
        assert_eq!(lines[0]["outcome"], "submitted");
        assert_eq!(lines[0]["frame"], "0108");
        assert_eq!(lines[0]["sample"]["temperature"], 21.5);
        assert!(lines[0]["fix"].is_null());
    }

    #[test]
    fn test_outcome_names() {
        let json = serde_json::to_string(&JournalOutcome::SubmitFailed).unwrap();
        assert_eq!(json, "\"submit_failed\"");
        let json = serde_json::to_string(&JournalOutcome::EncodingError).unwrap();
        assert_eq!(json, "\"encoding_error\"");
    }

    #[test]
    fn test_rotation_and_retention() {
        let dir = TempDir::new().unwrap();
        let mut journal = FrameJournal::open(dir.path(), 2, 2).unwrap();

        for seq in 0..5 {
            journal.append(&JournalRecord::now(seq, JournalOutcome::Submitted)).unwrap();
        }

        // 5 records at 2 per file = 3 files written, oldest pruned
        let mut files = journal.journal_files().unwrap();
        files.sort();
        assert_eq!(files.len(), 2);

        let newest = read_lines(&files[1]);
        assert_eq!(newest.len(), 1);
        assert_eq!(newest[0]["sequence"], 4);

        let older = read_lines(&files[0]);
        assert_eq!(older.len(), 2);
        assert_eq!(older[0]["sequence"], 2);
    }

    #[test]
    fn test_reopened_journal_never_extends_existing_file() {
        let dir = TempDir::new().unwrap();

        {
            let mut first = FrameJournal::open(dir.path(), 2, 10).unwrap();
            first.append(&JournalRecord::now(0, JournalOutcome::Submitted)).unwrap();
            first.append(&JournalRecord::now(1, JournalOutcome::Submitted)).unwrap();
        }

        let mut second = FrameJournal::open(dir.path(), 2, 10).unwrap();
        second.append(&JournalRecord::now(2, JournalOutcome::Submitted)).unwrap();

        let files = second.journal_files().unwrap();
        assert_eq!(files.len(), 2);

        let mut total = 0;
        for path in &files {
            let lines = read_lines(path);
            assert!(lines.len() <= 2, "{} holds {} records", path.display(), lines.len());
            total += lines.len();
        }
        assert_eq!(total, 3);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_failed_write_starts_fresh_file() {
        let dir = TempDir::new().unwrap();
        let mut journal = FrameJournal::open(dir.path(), 100, 5).unwrap();

        // Every write to /dev/full fails with ENOSPC
        let full = OpenOptions::new().write(true).open("/dev/full").unwrap();
        journal.writer = Some(BufWriter::new(full));

        assert!(journal.append(&JournalRecord::now(7, JournalOutcome::Submitted)).is_err());
        assert!(journal.writer.is_none());

        journal.append(&JournalRecord::now(8, JournalOutcome::Submitted)).unwrap();

        let files = journal.journal_files().unwrap();
        assert_eq!(files.len(), 1);
        let lines = read_lines(&files[0]);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["sequence"], 8);
    }

    #[test]
    fn test_open_creates_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        FrameJournal::open(&nested, 10, 1).unwrap();
        assert!(nested.is_dir());
    }
}
