use super::Error;
use tokio::process::Child;

/// A non-zero exit, with enough context to report which command failed
/// and why.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct ToolFailure {
    pub tool: &'static str,
    pub code: Option<i32>,
    pub stderr: String,
}

impl ToolFailure {
    pub fn message(&self) -> String {
        let status = match self.code {
            Some(code) => format!("{} exited with error status {}", self.tool, code),
            None => format!("{} exited with unknown error status", self.tool),
        };
        if self.stderr.is_empty() {
            status
        } else {
            format!("{}: {}", status, self.stderr)
        }
    }
}

#[derive(Debug)]
pub struct ToolProcess {
    tool: &'static str,
    child: Child,
}

/// Collected output of a finished tool process.
#[derive(Debug)]
pub struct ToolOutput {
    pub tool: &'static str,
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    success: bool,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.success
    }

    pub fn check_status(&self) -> Result<(), Error> {
        if self.success {
            Ok(())
        } else {
            Err(Error::ToolFailed(ToolFailure {
                tool: self.tool,
                code: self.code,
                stderr: String::from_utf8_lossy(&self.stderr).trim().to_owned(),
            }))
        }
    }
}

impl ToolProcess {
    pub(super) fn new(tool: &'static str, child: Child) -> ToolProcess {
        ToolProcess { tool, child }
    }

    pub async fn wait(self) -> Result<ToolOutput, Error> {
        let output = self
            .child
            .wait_with_output()
            .await
            .map_err(|e| Error::SubprocessIoError {
                tool: self.tool,
                source: e,
            })?;
        Ok(ToolOutput {
            tool: self.tool,
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
            success: output.status.success(),
        })
    }

    pub async fn check_wait(self) -> Result<ToolOutput, Error> {
        let output = self.wait().await?;
        output.check_status()?;
        Ok(output)
    }
}
