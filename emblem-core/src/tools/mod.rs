//! Wrappers for the external conversion commands the pipeline shells out
//! to. Failures are fatal and carry the tool name, exit status, and
//! captured stderr so the offending glyph can be fixed by hand.

use crate::config;
use std::{ffi::OsStr, path::PathBuf, process::Stdio};
use tokio::process::Command;

pub use process::*;

mod process;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to start {tool}")]
    FailedToStart {
        tool: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("error reading {tool} output")]
    SubprocessIoError {
        tool: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("{}", .0.message())]
    ToolFailed(ToolFailure),
    #[error("{tool} produced no output")]
    EmptyOutput { tool: &'static str },
    #[error("couldn't determine {tool} version from output")]
    FailedToGetVersion { tool: &'static str },
}

/// One configured external command.
#[derive(Debug, Clone)]
pub struct Tool {
    name: &'static str,
    path: PathBuf,
}

impl Tool {
    pub fn new(name: &'static str, path: impl Into<PathBuf>) -> Tool {
        Tool {
            name,
            path: path.into(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn spawn(&self, args: &[impl AsRef<OsStr>]) -> Result<ToolProcess, Error> {
        let mut cmd = Command::new(&self.path);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // kill-on-drop is a final fallback, a build normally waits for
            // every spawned process
            .kill_on_drop(true);

        tracing::debug!(tool = self.name, args = args.len(), "spawning");
        let child = cmd.spawn().map_err(|e| Error::FailedToStart {
            tool: self.name,
            source: e,
        })?;
        Ok(ToolProcess::new(self.name, child))
    }

    /// Runs the tool to completion, failing on a non-zero exit status.
    pub async fn run(&self, args: &[impl AsRef<OsStr>]) -> Result<ToolOutput, Error> {
        self.spawn(args)?.check_wait().await
    }

    /// First line of `<tool> --version`; doubles as an availability probe.
    pub async fn version_string(&self) -> Result<String, Error> {
        let output = self.run(&["--version"]).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        stdout
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_owned)
            .ok_or(Error::FailedToGetVersion { tool: self.name })
    }
}

/// The full set of external commands a build needs.
#[derive(Debug, Clone)]
pub struct Toolchain {
    pub inkscape: Tool,
    pub rsvg_convert: Tool,
    pub optipng: Tool,
}

impl Toolchain {
    pub fn from_config(tools: &config::Tools) -> Toolchain {
        Toolchain {
            inkscape: Tool::new("inkscape", &tools.inkscape),
            rsvg_convert: Tool::new("rsvg-convert", &tools.rsvg_convert),
            optipng: Tool::new("optipng", &tools.optipng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_build_toolchain_from_config() {
        let toolchain = Toolchain::from_config(&config::Tools::default());

        assert_eq!(toolchain.inkscape.name(), "inkscape");
        assert_eq!(toolchain.rsvg_convert.name(), "rsvg-convert");
        assert_eq!(toolchain.optipng.name(), "optipng");
    }

    #[tokio::test]
    async fn should_fail_to_start_missing_binary() {
        let tool = Tool::new("inkscape", "/nonexistent/bin/inkscape");

        let err = tool.run(&["--version"]).await.unwrap_err();

        assert!(matches!(err, Error::FailedToStart { tool: "inkscape", .. }));
    }
}
