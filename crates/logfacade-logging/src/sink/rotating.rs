//! Size-bounded log file with numbered-by-time backups
//!
//! The active file is appended to until the next write would push it past
//! `max_size_bytes`. It is then renamed to `<stem>-<UTC timestamp><ext>` and a
//! fresh file takes its place. Two rotations within one millisecond get
//! consecutive millisecond stamps. On open and after each rotation, backups
//! beyond `max_backups` or older than `max_age_days` are removed and, when
//! enabled, the remaining ones are gzip-compressed.

use crate::clock::Clock;
use crate::config::FileSinkConfig;
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use flate2::write::GzEncoder;
use flate2::Compression;
use logfacade_errors::{LogError, Result};
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const BACKUP_TIME_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.3f";
const COMPRESS_SUFFIX: &str = ".gz";

/// Rotating file writer
#[derive(Debug)]
pub struct RotatingFile {
    config: FileSinkConfig,
    clock: Arc<dyn Clock>,
    file: File,
    size: u64,
}

/// A rotated file found next to the active one
#[derive(Debug, Clone)]
struct Backup {
    path: PathBuf,
    taken_at: DateTime<Utc>,
    compressed: bool,
}

impl RotatingFile {
    /// Open (or create) the active file, creating parent directories
    ///
    /// # Errors
    ///
    /// Returns `Io` if the directory or file cannot be created.
    pub fn open(config: &FileSinkConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        if let Some(dir) = config.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| LogError::io("create directory", dir, e))?;
        }
        let file = open_append(&config.path)?;
        let size = file
            .metadata()
            .map_err(|e| LogError::io("stat", &config.path, e))?
            .len();

        let rotating = Self {
            config: config.clone(),
            clock,
            file,
            size,
        };
        // Prune backups left by earlier runs.
        let _ = rotating.enforce_retention();
        Ok(rotating)
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Bytes in the active file
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Close the active file, move it to a backup and start a new one
    ///
    /// # Errors
    ///
    /// Returns `Io` if the rename or the reopen fails. Retention failures
    /// are ignored; the next rotation retries them.
    pub fn rotate(&mut self) -> Result<()> {
        self.file
            .flush()
            .map_err(|e| LogError::io("flush", &self.config.path, e))?;

        let backup = self.free_backup_path(self.clock.now());
        if self.config.path.exists() {
            fs::rename(&self.config.path, &backup)
                .map_err(|e| LogError::io("rename", &self.config.path, e))?;
        }

        self.file = open_append(&self.config.path)?;
        self.size = 0;

        let _ = self.enforce_retention();
        Ok(())
    }

    fn backup_path(&self, at: DateTime<Utc>) -> PathBuf {
        let (stem, ext) = self.name_parts();
        let name = format!("{}-{}{}", stem, at.format(BACKUP_TIME_FORMAT), ext);
        self.dir().join(name)
    }

    /// First backup name at or after `at` not taken by a plain or compressed backup
    fn free_backup_path(&self, mut at: DateTime<Utc>) -> PathBuf {
        loop {
            let candidate = self.backup_path(at);
            let mut compressed = candidate.as_os_str().to_owned();
            compressed.push(COMPRESS_SUFFIX);
            if !candidate.exists() && !Path::new(&compressed).exists() {
                return candidate;
            }
            at += Duration::milliseconds(1);
        }
    }

    fn dir(&self) -> PathBuf {
        match self.config.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// File stem and extension (with its dot) of the active file
    fn name_parts(&self) -> (String, String) {
        let stem = self
            .config
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = self
            .config
            .path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        (stem, ext)
    }

    /// Backups sorted newest first
    fn backups(&self) -> io::Result<Vec<Backup>> {
        let (stem, ext) = self.name_parts();
        let prefix = format!("{}-", stem);
        let mut backups = Vec::new();

        for entry in fs::read_dir(self.dir())? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let (base, compressed) = match name.strip_suffix(COMPRESS_SUFFIX) {
                Some(base) => (base, true),
                None => (name.as_str(), false),
            };
            let Some(stamp) = base
                .strip_prefix(&prefix)
                .and_then(|rest| rest.strip_suffix(ext.as_str()))
            else {
                continue;
            };
            let Ok(taken_at) = NaiveDateTime::parse_from_str(stamp, BACKUP_TIME_FORMAT) else {
                continue;
            };
            backups.push(Backup {
                path: entry.path(),
                taken_at: taken_at.and_utc(),
                compressed,
            });
        }

        backups.sort_by(|a, b| b.taken_at.cmp(&a.taken_at));
        Ok(backups)
    }

    fn enforce_retention(&self) -> io::Result<()> {
        let backups = self.backups()?;
        let mut remaining = Vec::with_capacity(backups.len());
        let mut removed = Vec::new();

        if self.config.max_backups > 0 {
            // A backup and its compressed copy count once.
            let mut preserved = HashSet::new();
            for backup in backups {
                preserved.insert(backup.taken_at);
                if preserved.len() > self.config.max_backups {
                    removed.push(backup);
                } else {
                    remaining.push(backup);
                }
            }
        } else {
            remaining = backups;
        }

        if self.config.max_age_days > 0 {
            let cutoff = self.clock.now() - Duration::days(i64::from(self.config.max_age_days));
            let (expired, kept): (Vec<_>, Vec<_>) =
                remaining.into_iter().partition(|b| b.taken_at < cutoff);
            removed.extend(expired);
            remaining = kept;
        }

        for backup in &removed {
            fs::remove_file(&backup.path)?;
        }

        if self.config.compress {
            for backup in remaining.iter().filter(|b| !b.compressed) {
                compress_file(&backup.path)?;
            }
        }

        Ok(())
    }
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let len = buf.len() as u64;
        if len > self.config.max_size_bytes {
            return Err(LogError::WriteTooLarge {
                len,
                max: self.config.max_size_bytes,
            }
            .into());
        }
        if self.size + len > self.config.max_size_bytes {
            self.rotate()?;
        }

        self.file.write_all(buf)?;
        self.size += len;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

fn open_append(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| LogError::io("open", path, e))
}

fn compress_file(path: &Path) -> io::Result<()> {
    let mut gz_name = path.as_os_str().to_owned();
    gz_name.push(COMPRESS_SUFFIX);
    let gz_path = PathBuf::from(gz_name);

    let mut source = File::open(path)?;
    let mut encoder = GzEncoder::new(File::create(&gz_path)?, Compression::default());
    io::copy(&mut source, &mut encoder)?;
    encoder.finish()?;

    fs::remove_file(path)
}
