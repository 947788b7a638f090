//! Log configuration
//!
//! The subscriber itself is installed by the binary; this module only holds the
//! settings and manages the log directory.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::Level;

const LOG_FILE_PREFIX: &str = "scenebridge_";
const LOG_FILE_EXT: &str = "log";

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Minimum level ("trace", "debug", "info", "warn", "error")
    pub level: String,
    /// Directory that receives log files
    pub log_path: PathBuf,
    /// Number of log files to keep
    pub max_files: usize,
    /// Write logs to stderr
    pub console_output: bool,
    /// Write logs to a file in `log_path`
    pub file_output: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_path: default_log_path(),
            max_files: 10,
            console_output: true,
            file_output: false,
        }
    }
}

fn default_log_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|mut p| {
            p.push("sacn-ledfx-bridge");
            p.push("logs");
            p
        })
        .unwrap_or_else(|| PathBuf::from("logs"))
}

impl LogConfig {
    /// Parse the configured level, falling back to INFO
    pub fn parse_level(&self) -> Level {
        self.level.trim().parse().unwrap_or(Level::INFO)
    }

    /// Stop writing to the terminal, e.g. while a full-screen panel owns it.
    ///
    /// File output is switched on so that warnings still land somewhere.
    pub fn disable_console(&mut self) {
        self.console_output = false;
        self.file_output = true;
    }

    /// True if at least one sink is enabled
    pub fn has_output(&self) -> bool {
        self.console_output || self.file_output
    }

    /// Create the log directory if file output is enabled
    pub fn ensure_log_directory(&self) -> std::io::Result<()> {
        if self.file_output {
            fs::create_dir_all(&self.log_path)?;
        }
        Ok(())
    }

    /// Path of the log file for this session.
    ///
    /// The timestamp is taken once per process so repeated calls agree.
    pub fn current_log_path(&self) -> PathBuf {
        static SESSION_STAMP: std::sync::OnceLock<String> = std::sync::OnceLock::new();
        let stamp = SESSION_STAMP
            .get_or_init(|| chrono::Local::now().format("%Y-%m-%d_%H-%M-%S").to_string());
        self.log_path
            .join(format!("{}{}.{}", LOG_FILE_PREFIX, stamp, LOG_FILE_EXT))
    }

    /// Delete the oldest log files so that at most `max_files - 1` remain,
    /// leaving room for the file of this session.
    ///
    /// Returns the number of files removed.
    pub fn cleanup_old_logs(&self) -> std::io::Result<usize> {
        if !self.log_path.is_dir() {
            return Ok(0);
        }

        let mut logs: Vec<PathBuf> = fs::read_dir(&self.log_path)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| is_log_file(path))
            .collect();

        // Timestamped names sort chronologically
        logs.sort();

        let keep = self.max_files.saturating_sub(1);
        if logs.len() <= keep {
            return Ok(0);
        }

        let excess = logs.len() - keep;
        for path in &logs[..excess] {
            fs::remove_file(path)?;
        }
        Ok(excess)
    }
}

fn is_log_file(path: &std::path::Path) -> bool {
    let name_matches = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(LOG_FILE_PREFIX));
    let ext_matches = path.extension().and_then(|e| e.to_str()) == Some(LOG_FILE_EXT);
    name_matches && ext_matches
}
