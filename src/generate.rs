//! Coordinating module for the locate-stage-generate-cleanup pipeline.

use std::path::PathBuf;
use thiserror::Error;
use tracing::{error, info};

use crate::config::GenerateConfig;
use crate::generator::{ApidocCommand, Generator, GeneratorError};
use crate::stage::{self, CopyError, FilesystemError};

/// What a completed run produced.
#[derive(Debug)]
pub struct GenerateReport {
    /// Source subtree the documentation was generated from.
    pub package_dir: PathBuf,
    /// Number of files staged for the generator.
    pub staged_files: usize,
    /// Directory the generator wrote its output into.
    pub output_dir: PathBuf,
}

/// Failure of any step in the pipeline. Each variant names the step so the
/// invoker can tell from stderr which one aborted the run.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("copy step failed: {0}")]
    Copy(#[from] CopyError),
    #[error("staging directory step failed: {0}")]
    Filesystem(#[from] FilesystemError),
    #[error("generator step failed: {0}")]
    Generator(#[from] GeneratorError),
}

/// Entrypoint: regenerate documentation according to config, using the real
/// subprocess-backed generator.
pub async fn generate(config: &GenerateConfig) -> Result<GenerateReport, GenerateError> {
    let generator = ApidocCommand::new(&config.generator);
    generate_with(config, &generator).await
}

/// Run the pipeline with an explicit generator implementation.
///
/// A straight-line sequence: locate the packaged source, stage a disposable
/// copy, run the generator against it, remove the staging directory. The
/// [`stage::StagedTree`] guard removes the staging directory on every failure
/// path after it is created; only the success path treats a removal failure
/// as an error of its own.
pub async fn generate_with<G: Generator>(
    config: &GenerateConfig,
    generator: &G,
) -> Result<GenerateReport, GenerateError> {
    info!("Starting documentation regeneration pipeline");

    let package_dir = stage::locate_package_dir(&config.stage)?;
    info!(
        package_dir = %package_dir.display(),
        "Located package source directory"
    );

    let staged = stage::prepare_staging(&config.stage)?;
    let staged_files = stage::copy_tree(&package_dir, staged.path())?;
    info!(
        staged_files,
        staging_dir = %staged.path().display(),
        "Staged package source tree"
    );

    match generator.generate(staged.path()).await {
        Ok(()) => {
            info!(
                output_dir = %config.generator.output_dir.display(),
                "Documentation output written"
            );
        }
        Err(e) => {
            error!(error = %e, "Generator step failed, cleaning up staging directory");
            return Err(e.into());
        }
    }

    staged.remove()?;
    info!("Documentation regeneration pipeline complete");

    Ok(GenerateReport {
        package_dir,
        staged_files,
        output_dir: config.generator.output_dir.clone(),
    })
}
