use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::models::hotel::Hotel;
use crate::models::user::User;

/// One durable document write. Each line of the log holds exactly one record, so
/// a write either lands whole or not at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum WalOperation {
    PutUser { user: User },
    PutHotel { hotel: Hotel },
}

impl WalOperation {
    fn to_line(&self) -> Result<String> {
        serde_json::to_string(self).context("Failed to encode WAL record")
    }

    fn from_line(line: &str) -> Result<Self> {
        serde_json::from_str(line).context("Failed to decode WAL record")
    }
}

pub struct Wal {
    file: Arc<Mutex<File>>,
    path: PathBuf,
}

impl Wal {
    pub fn new(path: PathBuf) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .context("Failed to open WAL file")?;

        Ok(Wal {
            file: Arc::new(Mutex::new(file)),
            path,
        })
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn lock(&self) -> Result<MutexGuard<'_, File>> {
        self.file.lock().map_err(|_| anyhow!("WAL lock poisoned"))
    }

    pub fn log_operation(&self, op: &WalOperation) -> Result<()> {
        let line = op.to_line()?;
        let mut file = self.lock()?;
        writeln!(file, "{}", line).context("Failed to write to WAL")?;
        file.flush().context("Failed to flush WAL")?;
        Ok(())
    }

    pub fn replay(&self) -> Result<Vec<WalOperation>> {
        let file = File::open(&self.path).context("Failed to open WAL for replay")?;
        let reader = BufReader::new(file);
        let mut operations = Vec::new();

        for (line_num, line_result) in reader.lines().enumerate() {
            let line = line_result.context("Failed to read line from WAL")?;
            let line = line.trim();

            if line.is_empty() {
                continue;
            }

            match WalOperation::from_line(line) {
                Ok(op) => operations.push(op),
                Err(e) => {
                    tracing::warn!(
                        line_num = line_num + 1,
                        error = %e,
                        "Failed to parse WAL line, skipping"
                    );
                }
            }
        }

        Ok(operations)
    }

    fn compaction_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".compact");
        PathBuf::from(name)
    }

    /// Replace the log contents with `operations`, dropping superseded records.
    ///
    /// The new log is written and synced beside the old one and then renamed
    /// over it, so a failure at any point leaves the previous log intact. Holds
    /// the write lock for the whole rewrite.
    pub fn compact(&self, operations: &[WalOperation]) -> Result<()> {
        let mut buf = String::new();
        for op in operations {
            buf.push_str(&op.to_line()?);
            buf.push('\n');
        }

        let mut file = self.lock()?;
        let tmp_path = self.compaction_path();

        let mut tmp = File::create(&tmp_path)
            .with_context(|| format!("Failed to create {}", tmp_path.display()))?;
        tmp.write_all(buf.as_bytes())
            .context("Failed to write compacted WAL")?;
        tmp.sync_all().context("Failed to sync compacted WAL")?;
        drop(tmp);

        fs::rename(&tmp_path, &self.path).context("Failed to swap in compacted WAL")?;
        sync_parent_dir(&self.path)?;

        *file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .context("Failed to reopen WAL after compaction")?;
        Ok(())
    }
}

#[cfg(unix)]
fn sync_parent_dir(path: &Path) -> Result<()> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    File::open(parent)
        .and_then(|dir| dir.sync_all())
        .context("Failed to sync WAL directory")
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) -> Result<()> {
    Ok(())
}
