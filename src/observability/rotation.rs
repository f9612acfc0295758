//! Size-rotated log file.
//!
//! # Design Decisions
//! - Rotation happens before the write that would cross the limit, so a
//!   record is never split across two files
//! - Backups are named `<stem>-<UTC timestamp>.<ext>` next to the live file;
//!   a second rotation within the same millisecond gets a `_<n>` suffix
//! - Only names whose middle part parses as a backup stamp count as backups,
//!   so pruning never touches unrelated `<stem>-*` files
//! - `max_backups == 0` keeps every backup

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};

/// UTC stamp embedded in backup names; sorts lexically.
const BACKUP_STAMP: &str = "%Y-%m-%dT%H-%M-%S%.3f";

/// An append-only file that rolls over once it reaches `max_bytes`.
#[derive(Debug)]
pub struct RotatingFile {
    path: PathBuf,
    max_bytes: u64,
    max_backups: usize,
    file: File,
    written: u64,
}

impl RotatingFile {
    /// Open (or create) the live file in append mode.
    pub fn open(path: impl Into<PathBuf>, max_bytes: u64, max_backups: usize) -> io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = open_append(&path)?;
        let written = file.metadata()?.len();
        Ok(Self {
            path,
            max_bytes,
            max_backups,
            file,
            written,
        })
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        let backup = self.backup_path(Utc::now());
        fs::rename(&self.path, &backup)?;
        self.file = open_append(&self.path)?;
        self.written = 0;
        if self.max_backups > 0 {
            self.prune_backups()?;
        }
        Ok(())
    }

    /// First free backup name for a rotation at `now`.
    fn backup_path(&self, now: DateTime<Utc>) -> PathBuf {
        let (stem, ext) = self.name_parts();
        let stamp = now.format(BACKUP_STAMP).to_string();
        let name = |middle: &str| match &ext {
            Some(ext) => format!("{}-{}.{}", stem, middle, ext),
            None => format!("{}-{}", stem, middle),
        };

        let mut candidate = self.path.with_file_name(name(&stamp));
        let mut n = 1u32;
        while candidate.exists() {
            candidate = self.path.with_file_name(name(&format!("{}_{}", stamp, n)));
            n += 1;
        }
        candidate
    }

    fn name_parts(&self) -> (String, Option<String>) {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = self
            .path
            .extension()
            .map(|e| e.to_string_lossy().into_owned());
        (stem, ext)
    }

    /// Backups sorted oldest first.
    fn backups(&self) -> io::Result<Vec<PathBuf>> {
        let (stem, ext) = self.name_parts();
        let prefix = format!("{}-", stem);
        let suffix = ext.map(|e| format!(".{}", e)).unwrap_or_default();
        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(dir) => dir.to_path_buf(),
            None => PathBuf::from("."),
        };

        let mut found: Vec<((NaiveDateTime, u32), PathBuf)> = fs::read_dir(dir)?
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let name = entry.file_name();
                let name = name.to_string_lossy();
                let middle = name.strip_prefix(&prefix)?.strip_suffix(&suffix)?;
                let key = parse_backup_middle(middle)?;
                Some((key, entry.path()))
            })
            .collect();
        found.sort();
        Ok(found.into_iter().map(|(_, path)| path).collect())
    }

    fn prune_backups(&self) -> io::Result<()> {
        let backups = self.backups()?;
        if backups.len() > self.max_backups {
            let excess = backups.len() - self.max_backups;
            for old in &backups[..excess] {
                fs::remove_file(old)?;
            }
        }
        Ok(())
    }
}

/// Split `<stamp>` or `<stamp>_<n>` into an ordering key.
fn parse_backup_middle(middle: &str) -> Option<(NaiveDateTime, u32)> {
    let (stamp, n) = match middle.split_once('_') {
        Some((stamp, n)) => (stamp, n.parse().ok()?),
        None => (middle, 0),
    };
    let at = NaiveDateTime::parse_from_str(stamp, BACKUP_STAMP).ok()?;
    Some((at, n))
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written > 0 && self.written + buf.len() as u64 > self.max_bytes {
            self.rotate()?;
        }
        let n = self.file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}
