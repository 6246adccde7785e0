//! The external documentation generator seam.
//!
//! The generator is an opaque collaborator: given an input directory of
//! source files it produces documentation output in the configured output
//! directory and exits zero on success. The [`Generator`] trait is the
//! boundary; [`ApidocCommand`] is the real subprocess-backed implementation,
//! and tests plug in a mock.

use async_trait::async_trait;
use mockall::automock;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;
use tracing::{error, info};

use crate::config::GeneratorConfig;

/// Failure to run the documentation generator subprocess.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("failed to launch documentation generator {program:?}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("documentation generator {program:?} exited with {status}")]
    ExitStatus {
        program: String,
        status: std::process::ExitStatus,
    },
}

/// Trait for invoking a documentation generator against a staged input tree.
/// Implemented by the real subprocess command and by mocks in testing.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Generator: Send + Sync {
    /// Run the generator against `input_dir`, blocking until it exits.
    async fn generate(&self, input_dir: &Path) -> Result<(), GeneratorError>;
}

/// Subprocess-backed generator: `<program> [-f] -o <output_dir> <input_dir>`.
pub struct ApidocCommand {
    program: String,
    output_dir: PathBuf,
    force: bool,
}

impl ApidocCommand {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            program: config.program.clone(),
            output_dir: config.output_dir.clone(),
            force: config.force,
        }
    }
}

#[async_trait]
impl Generator for ApidocCommand {
    async fn generate(&self, input_dir: &Path) -> Result<(), GeneratorError> {
        let mut command = Command::new(&self.program);
        if self.force {
            command.arg("-f");
        }
        command.arg("-o").arg(&self.output_dir).arg(input_dir);

        info!(
            program = %self.program,
            input_dir = %input_dir.display(),
            output_dir = %self.output_dir.display(),
            force = self.force,
            "Invoking documentation generator"
        );

        let status = command.status().map_err(|e| {
            error!(
                error = ?e,
                program = %self.program,
                "Failed to launch documentation generator"
            );
            GeneratorError::Spawn {
                program: self.program.clone(),
                source: e,
            }
        })?;

        if status.success() {
            info!(
                program = %self.program,
                status = ?status,
                "Documentation generator finished successfully"
            );
            Ok(())
        } else {
            error!(
                program = %self.program,
                status = ?status,
                "Documentation generator exited with non-zero code"
            );
            Err(GeneratorError::ExitStatus {
                program: self.program.clone(),
                status,
            })
        }
    }
}
