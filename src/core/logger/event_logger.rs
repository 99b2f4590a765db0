use crate::core::logger::graph_logger::GraphState;
use crate::core::types::{ProcessId, ReductionOutcome, RemovalKind, ResourceId};
use chrono::Utc;
use parking_lot::Mutex;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
pub struct CombinedLogEntry<'a> {
    pub event: LogEntry<'a>,
    pub graph: &'a GraphState,
}

/// Structure for a single removal log entry
#[derive(Debug, Serialize)]
pub struct LogEntry<'a> {
    /// Position of the removal in the trace
    pub step: usize,
    /// Process that was removed
    pub process: &'a ProcessId,
    /// How the removal was decided
    pub kind: RemovalKind,
    /// Units given back, one entry per unit
    pub released: &'a [ResourceId],
    /// Seconds since the Unix Epoch with microsecond precision
    pub timestamp: f64,
}

#[derive(Debug, Serialize)]
struct OutcomeLogEntry<'a> {
    outcome: &'a ReductionOutcome,
}

/// Logger recording every removal step of a reduction as JSON lines
pub struct EventLogger {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl EventLogger {
    /// Create a logger writing to `path`, truncating any previous log
    ///
    /// If the file name contains `{timestamp}` it is replaced with the
    /// current UTC time. Missing parent directories are created.
    pub fn with_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let path = resolve_log_path(path.as_ref());

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;

        Ok(EventLogger {
            path,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    /// Path of the file being written
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record one removal together with the graph left behind
    pub fn log_removal(
        &self,
        step: usize,
        process: &ProcessId,
        kind: RemovalKind,
        released: &[ResourceId],
        graph: &GraphState,
    ) {
        let entry = CombinedLogEntry {
            event: LogEntry {
                step,
                process,
                kind,
                released,
                timestamp: unix_timestamp(),
            },
            graph,
        };
        self.write_line(&entry);
    }

    /// Record the terminal outcome of the run and flush
    pub fn log_outcome(&self, outcome: &ReductionOutcome) {
        self.write_line(&OutcomeLogEntry { outcome });
        let _ = self.writer.lock().flush();
    }

    fn write_line<T: Serialize>(&self, record: &T) {
        // Logging never fails a reduction
        if let Ok(json) = serde_json::to_string(record) {
            let _ = writeln!(self.writer.lock(), "{json}");
        }
    }
}

impl Drop for EventLogger {
    fn drop(&mut self) {
        let _ = self.writer.get_mut().flush();
    }
}

fn resolve_log_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    if raw.contains("{timestamp}") {
        let stamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
        PathBuf::from(raw.replace("{timestamp}", &stamp))
    } else {
        path.to_path_buf()
    }
}

fn unix_timestamp() -> f64 {
    let now = Utc::now();
    now.timestamp() as f64 + now.timestamp_subsec_micros() as f64 / 1_000_000.0
}
