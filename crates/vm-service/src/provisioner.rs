//! Invocation of the Pulumi CLI

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info, warn};
use vm_common::{Error, Result};

/// Brings the managed stack up and tears it down.
///
/// Both operations act on the whole stack; neither is parameterized per VM.
#[async_trait]
pub trait Provisioner: Send + Sync {
    /// Create or update the stack, returning the tool's stdout
    async fn up(&self) -> Result<String>;

    /// Destroy every resource in the stack, returning the tool's stdout
    async fn destroy(&self) -> Result<String>;
}

/// Run `binary` with `args` in `working_dir` and return its stdout.
///
/// A non-zero exit becomes `Error::ProvisionerFailure` carrying the captured
/// stderr and stdout. The child runs to completion; there is no timeout.
pub async fn run<I, S>(binary: &str, args: I, working_dir: &Path) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    let output = Command::new(binary)
        .args(args)
        .current_dir(working_dir)
        .output()
        .await
        .map_err(|e| {
            Error::ProvisionerFailure(format!("Failed to execute {}: {}", binary, e))
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if !output.status.success() {
        warn!("{} exited with {}", binary, output.status);
        return Err(Error::ProvisionerFailure(diagnostic(&stdout, &stderr)));
    }

    debug!("{} output:\n{}", binary, stdout);
    Ok(stdout)
}

/// Join whichever of stderr and stdout carry text
fn diagnostic(stdout: &str, stderr: &str) -> String {
    [stderr.trim(), stdout.trim()]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("\n")
}

/// Provisioner backed by the `pulumi` command-line tool
#[derive(Debug, Clone)]
pub struct PulumiCli {
    /// Executable to invoke
    pub binary: String,

    /// Directory containing the Pulumi project
    pub working_dir: PathBuf,

    /// Stack to operate on
    pub stack: String,
}

impl PulumiCli {
    /// Create a new Pulumi invoker
    pub fn new(
        binary: impl Into<String>,
        working_dir: impl Into<PathBuf>,
        stack: impl Into<String>,
    ) -> Self {
        Self {
            binary: binary.into(),
            working_dir: working_dir.into(),
            stack: stack.into(),
        }
    }

    async fn run_subcommand(&self, subcommand: &str) -> Result<String> {
        info!(
            "Running pulumi {} on stack {} in {}",
            subcommand,
            self.stack,
            self.working_dir.display()
        );

        run(
            &self.binary,
            [subcommand, "--yes", "--stack", self.stack.as_str()],
            &self.working_dir,
        )
        .await
    }
}

#[async_trait]
impl Provisioner for PulumiCli {
    async fn up(&self) -> Result<String> {
        self.run_subcommand("up").await.map_err(|e| match e {
            Error::ProvisionerFailure(msg) => {
                Error::ProvisionerFailure(format!("Pulumi up failed: {}", msg))
            }
            other => other,
        })
    }

    async fn destroy(&self) -> Result<String> {
        self.run_subcommand("destroy").await.map_err(|e| match e {
            Error::ProvisionerFailure(msg) => {
                Error::ProvisionerFailure(format!("Pulumi destroy failed: {}", msg))
            }
            other => other,
        })
    }
}
