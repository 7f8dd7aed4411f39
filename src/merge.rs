//! External segment-merging tool.
//!
//! The merge step downloads every segment listed by the master playlist and
//! muxes them into one container. It is delegated to an external executable
//! (N_m3u8DL-RE by default) behind the [`MergeTool`] trait.

use crate::error::{Result, SegmuxError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

/// Default merge timeout: 30 minutes.
pub const DEFAULT_MERGE_TIMEOUT: Duration = Duration::from_secs(1800);

/// Turns a master playlist into a single container file.
#[async_trait]
pub trait MergeTool: Send + Sync {
    /// Merge the renditions referenced by `master` into
    /// `{output_dir}/{save_name}.{extension}` and return that path.
    async fn merge(&self, master: &Path, save_name: &str, output_dir: &Path) -> Result<PathBuf>;
}

/// N_m3u8DL-RE compatible command-line merger.
///
/// Invoked as
/// `{program} {master} -M format={format} --save-name {name} --save-dir {dir} --no-log`.
#[derive(Debug, Clone)]
pub struct ExternalMerger {
    program: PathBuf,
    format: String,
    timeout: Duration,
}

impl ExternalMerger {
    pub fn new(program: impl Into<PathBuf>, format: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            format: format.into(),
            timeout: DEFAULT_MERGE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Container format, also the output file extension.
    pub fn format(&self) -> &str {
        &self.format
    }

    fn tool_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }

    fn args(&self, master: &Path, save_name: &str, output_dir: &Path) -> Vec<String> {
        vec![
            master.to_string_lossy().to_string(),
            "-M".to_string(),
            format!("format={}", self.format),
            "--save-name".to_string(),
            save_name.to_string(),
            "--save-dir".to_string(),
            output_dir.to_string_lossy().to_string(),
            "--no-log".to_string(),
        ]
    }

    fn tool_error(&self, message: String) -> SegmuxError {
        SegmuxError::ExternalTool {
            tool: self.tool_name(),
            message,
        }
    }
}

#[async_trait]
impl MergeTool for ExternalMerger {
    async fn merge(&self, master: &Path, save_name: &str, output_dir: &Path) -> Result<PathBuf> {
        let args = self.args(master, save_name, output_dir);
        info!("Running {} {}", self.program.display(), args.join(" "));

        let child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.tool_error(format!("failed to spawn: {}", e)))?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(self.tool_error(format!("I/O error waiting for process: {}", e)));
            }
            // The child is killed when its future is dropped
            Err(_) => return Err(self.tool_error(format!("timed out after {:?}", self.timeout))),
        };

        debug!(
            "{} stdout: {}",
            self.tool_name(),
            String::from_utf8_lossy(&output.stdout).trim()
        );

        if !output.status.success() {
            return Err(self.tool_error(format!(
                "exited with status {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let merged = output_dir.join(format!("{}.{}", save_name, self.format));
        if !tokio::fs::try_exists(&merged).await.unwrap_or(false) {
            return Err(self.tool_error(format!(
                "exited successfully but {} was not created",
                merged.display()
            )));
        }

        info!("Merged output written to {}", merged.display());
        Ok(merged)
    }
}
