use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

/// Top-level configuration for a documentation regeneration run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    pub stage: StageConfig,
    pub generator: GeneratorConfig,
}

impl GenerateConfig {
    pub fn trace_loaded(&self) {
        info!(
            source_root = %self.stage.source_root.display(),
            package_glob = %self.stage.package_glob,
            staging_dir = %self.stage.staging_dir.display(),
            program = %self.generator.program,
            "Loaded GenerateConfig"
        );
        debug!(?self, "Config loaded (full debug)");
    }
}

/// Staging configuration - where the packaged source lives and where to copy it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// Directory whose entries are matched against `package_glob`.
    pub source_root: PathBuf,
    /// Glob over directory names locating the versioned package build.
    /// Exactly one entry must match.
    pub package_glob: String,
    /// Path of the documentation input subtree inside the matched directory.
    pub package_subpath: PathBuf,
    /// Transient directory the subtree is copied into for the generator run.
    pub staging_dir: PathBuf,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            source_root: PathBuf::from("."),
            package_glob: "pkg-*".to_string(),
            package_subpath: PathBuf::from("lib/python2.7/dist-packages/mcvirt"),
            staging_dir: PathBuf::from("./doc-staging"),
        }
    }
}

/// Generator configuration - which external program produces the documentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Program name or path, resolved through PATH by the OS.
    pub program: String,
    /// Directory the generator writes its output files into.
    pub output_dir: PathBuf,
    /// Pass the force flag so existing output is regenerated.
    pub force: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            program: "sphinx-apidoc".to_string(),
            output_dir: PathBuf::from("."),
            force: true,
        }
    }
}
