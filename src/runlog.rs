// 📝 Run Log
//
// Human-readable record of one migration run. Every line is timestamped,
// appended to the log file and echoed to stdout.
//
// The orchestrator opens it once and owns it for the whole run; dropping it
// flushes and closes the file, so every exit path closes the sink.

use anyhow::{Context, Result};
use chrono::Local;
use std::fmt::Display;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct RunLog {
    sink: BufWriter<Box<dyn Write>>,
    mirror_stdout: bool,
}

impl RunLog {
    /// Open (append) the log file at `path`, mirroring to stdout
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file: {}", path.display()))?;
        Ok(Self::from_writer(Box::new(file), true))
    }

    /// Log into an arbitrary writer
    pub fn from_writer(writer: Box<dyn Write>, mirror_stdout: bool) -> Self {
        RunLog {
            sink: BufWriter::new(writer),
            mirror_stdout,
        }
    }

    /// Format one log line: `[YYYY-MM-DD HH:MM:SS] message`
    pub fn format_line(msg: &str) -> String {
        format!("[{}] {}", Local::now().format(TIMESTAMP_FORMAT), msg)
    }

    /// Write one line. A failing sink must not take the run down with it,
    /// so write errors only go to diagnostics.
    pub fn line(&mut self, msg: impl Display) {
        let formatted = Self::format_line(&msg.to_string());
        if self.mirror_stdout {
            println!("{}", formatted);
        }
        if let Err(e) = writeln!(self.sink, "{}", formatted) {
            tracing::warn!(error = %e, "failed to write run log line");
        }
    }
}

impl Drop for RunLog {
    fn drop(&mut self) {
        if let Err(e) = self.sink.flush() {
            tracing::warn!(error = %e, "failed to flush run log");
        }
    }
}
