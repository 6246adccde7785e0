use std::fs::{create_dir_all, write};
use std::path::{Path, PathBuf};
use tempfile::tempdir;

use doc_stage::config::{GenerateConfig, GeneratorConfig, StageConfig};
use doc_stage::generate::{generate, generate_with, GenerateError};
use doc_stage::generator::{GeneratorError, MockGenerator};
use doc_stage::stage::CopyError;

const PACKAGE_SUBPATH: &str = "lib/python2.7/dist-packages/mcvirt";

fn build_package_tree(root: &Path, versioned_name: &str) {
    let package_dir = root.join(versioned_name).join(PACKAGE_SUBPATH);
    create_dir_all(package_dir.join("sub")).unwrap();
    write(package_dir.join("a.py"), "print('a')\n").unwrap();
    write(package_dir.join("sub/b.py"), "print('b')\n").unwrap();
}

/// Config rooted in a temp dir; `true` stands in for the real generator in
/// end-to-end runs since the pipeline only observes the exit status.
fn generate_config(root: &Path) -> GenerateConfig {
    GenerateConfig {
        stage: StageConfig {
            source_root: root.to_path_buf(),
            package_glob: "pkg-*".to_string(),
            package_subpath: PathBuf::from(PACKAGE_SUBPATH),
            staging_dir: root.join("doc-staging"),
        },
        generator: GeneratorConfig {
            program: "true".to_string(),
            output_dir: root.join("out"),
            force: true,
        },
    }
}

#[tokio::test]
async fn pipeline_stages_tree_for_generator_and_cleans_up_on_success() {
    let tmp = tempdir().unwrap();
    build_package_tree(tmp.path(), "pkg-1.2.0");
    let config = generate_config(tmp.path());
    let staging_dir = config.stage.staging_dir.clone();

    let mut generator = MockGenerator::new();
    let expected_input = staging_dir.clone();
    generator
        .expect_generate()
        .withf(move |input_dir: &Path| {
            // The generator must see the complete staged copy, not the original
            input_dir == expected_input.as_path()
                && input_dir.join("a.py").is_file()
                && input_dir.join("sub/b.py").is_file()
        })
        .times(1)
        .returning(|_| Ok(()));

    let report = generate_with(&config, &generator)
        .await
        .expect("Pipeline should succeed");

    assert_eq!(report.staged_files, 2);
    assert_eq!(report.output_dir, config.generator.output_dir);
    assert!(
        !staging_dir.exists(),
        "Staging directory must be removed after a successful run"
    );
}

#[tokio::test]
async fn pipeline_cleans_up_staging_when_generator_fails() {
    let tmp = tempdir().unwrap();
    build_package_tree(tmp.path(), "pkg-1.2.0");
    let config = generate_config(tmp.path());
    let staging_dir = config.stage.staging_dir.clone();

    let mut generator = MockGenerator::new();
    generator.expect_generate().times(1).returning(|_| {
        Err(GeneratorError::Spawn {
            program: "sphinx-apidoc".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not installed"),
        })
    });

    let err = generate_with(&config, &generator).await.unwrap_err();
    assert!(
        matches!(err, GenerateError::Generator(_)),
        "Expected a generator step failure, got: {err:?}"
    );
    assert!(
        !staging_dir.exists(),
        "Staging directory must be removed even when the generator fails"
    );
}

#[tokio::test]
async fn pipeline_never_invokes_generator_without_a_unique_match() {
    let tmp = tempdir().unwrap();
    // No versioned package directory at all
    let config = generate_config(tmp.path());

    let mut generator = MockGenerator::new();
    generator.expect_generate().never();

    let err = generate_with(&config, &generator).await.unwrap_err();
    assert!(
        matches!(err, GenerateError::Copy(CopyError::NoMatch { .. })),
        "Expected NoMatch, got: {err:?}"
    );
    assert!(
        !config.stage.staging_dir.exists(),
        "No staging directory may be left behind when locating fails"
    );
}

#[tokio::test]
async fn pipeline_fails_before_generator_on_ambiguous_match() {
    let tmp = tempdir().unwrap();
    build_package_tree(tmp.path(), "pkg-1.2.0");
    build_package_tree(tmp.path(), "pkg-1.3.0");
    let config = generate_config(tmp.path());

    let mut generator = MockGenerator::new();
    generator.expect_generate().never();

    let err = generate_with(&config, &generator).await.unwrap_err();
    assert!(
        matches!(err, GenerateError::Copy(CopyError::AmbiguousMatch { .. })),
        "Expected AmbiguousMatch, got: {err:?}"
    );
    assert!(!config.stage.staging_dir.exists());
}

#[tokio::test]
async fn pipeline_reports_spawn_failure_for_missing_generator_program() {
    let tmp = tempdir().unwrap();
    build_package_tree(tmp.path(), "pkg-1.2.0");
    let mut config = generate_config(tmp.path());
    config.generator.program = "doc-stage-missing-generator-program".to_string();

    let err = generate(&config).await.unwrap_err();
    assert!(
        matches!(
            err,
            GenerateError::Generator(GeneratorError::Spawn { .. })
        ),
        "Expected Spawn failure, got: {err:?}"
    );
    assert!(
        !config.stage.staging_dir.exists(),
        "Staging directory must be removed after a spawn failure"
    );
}

#[tokio::test]
async fn pipeline_is_repeatable_over_an_unchanged_source() {
    let tmp = tempdir().unwrap();
    build_package_tree(tmp.path(), "pkg-1.2.0");
    let config = generate_config(tmp.path());

    let first = generate(&config).await.expect("First run should succeed");
    let second = generate(&config).await.expect("Second run should succeed");

    assert_eq!(first.staged_files, second.staged_files);
    assert_eq!(first.package_dir, second.package_dir);
    assert!(!config.stage.staging_dir.exists());
}
