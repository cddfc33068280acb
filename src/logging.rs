use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Local;
use tracing_subscriber::EnvFilter;

/// Console logging. `RUST_LOG` wins over `default_level` when set.
pub fn setup_logging(default_level: &str) {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

/// Destination for the permanent record of successful operations.
pub trait SuccessSink {
    fn record(&self, message: &str) -> anyhow::Result<()>;
}

/// Appends timestamped lines to a file, creating it on first use.
#[derive(Clone, Debug)]
pub struct FileSuccessLog {
    path: PathBuf,
}

impl FileSuccessLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SuccessSink for FileSuccessLog {
    fn record(&self, message: &str) -> anyhow::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("failed to open success log {}", self.path.display()))?;

        let now = Local::now().format("%Y-%m-%d %H:%M:%S");
        writeln!(file, "[{}] {}", now, message).context("failed to write to success log")?;
        file.flush()
            .context("failed to flush all changes from buffer to success log")?;
        Ok(())
    }
}
