//! External converters (tesseract, typst, pandoc) invoked as child processes.
//!
//! Availability is checked once at startup; callers consult `is_available()`
//! and fall back instead of failing when a tool is missing.

use std::ffi::OsStr;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info};

use crate::errors::AppError;

#[derive(Debug, Clone)]
pub struct ExternalTool {
    pub name: &'static str,
    pub program: String,
    available: bool,
}

impl ExternalTool {
    /// Runs `<program> --version` and records whether it succeeded.
    pub async fn detect(name: &'static str, program: &str) -> Self {
        let available = Command::new(program)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false);

        if available {
            info!("{name} available ({program})");
        } else {
            info!("{name} not found ({program}) — dependent formats will fall back");
        }

        Self {
            name,
            program: program.to_string(),
            available,
        }
    }

    /// A tool known to be absent. Used when a feature toggle disables it.
    pub fn disabled(name: &'static str) -> Self {
        Self {
            name,
            program: String::new(),
            available: false,
        }
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Runs the tool to completion and returns its stdout.
    pub async fn run<I, S>(&self, args: I) -> Result<Vec<u8>, AppError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        if !self.available {
            return Err(AppError::Tool(format!("{} is not available", self.name)));
        }

        let output = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| AppError::Tool(format!("Failed to execute {}: {e}", self.name)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::Tool(format!(
                "{} exited with {}: {}",
                self.name,
                output.status,
                stderr.trim()
            )));
        }

        debug!("{} produced {} bytes on stdout", self.name, output.stdout.len());
        Ok(output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_program_is_unavailable() {
        let tool = ExternalTool::detect("ghost", "resmaster-definitely-not-a-binary").await;
        assert!(!tool.is_available());
    }

    #[tokio::test]
    async fn test_run_on_disabled_tool_errors() {
        let tool = ExternalTool::disabled("typst");
        let err = tool.run(["compile"]).await.unwrap_err();
        assert_eq!(err.code(), "TOOL_ERROR");
    }
}
