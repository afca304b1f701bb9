use std::error::Error;

use ordrun::job::{JobFiles, Workspace, package};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn workspace_destroy_is_idempotent() -> TestResult {
    let sandbox = tempfile::tempdir()?;

    let workspace = Workspace::create(Some(sandbox.path()))?;
    assert!(workspace.root().is_dir());
    assert!(workspace.root().starts_with(sandbox.path()));

    workspace.destroy()?;
    assert!(!workspace.root().exists());
    // Already gone: destroy again, and after an external removal.
    workspace.destroy()?;
    Ok(())
}

#[test]
fn workspaces_are_unique_per_job() -> TestResult {
    let sandbox = tempfile::tempdir()?;
    let a = Workspace::create(Some(sandbox.path()))?;
    let b = Workspace::create(Some(sandbox.path()))?;
    assert_ne!(a.root(), b.root());
    a.destroy()?;
    b.destroy()?;
    Ok(())
}

#[test]
fn job_files_use_the_fixed_layout() {
    let files = JobFiles::new(std::path::Path::new("/work"));
    assert_eq!(files.user_script, std::path::Path::new("/work/user_script.sh"));
    assert_eq!(files.wrapper, std::path::Path::new("/work/user_job"));
    assert_eq!(files.output_file, std::path::Path::new("/work/output_file"));
    assert_eq!(files.exit_code_file, std::path::Path::new("/work/exit_code_file"));
    assert_eq!(files.job_id_file, std::path::Path::new("/work/jobid"));
}

#[tokio::test]
async fn wrapper_records_combined_output_and_exit_status() -> TestResult {
    let sandbox = tempfile::tempdir()?;
    let script = sandbox.path().join("script.sh");
    std::fs::write(&script, "echo out\necho err >&2\nexit 3\n")?;

    let files = JobFiles::new(sandbox.path());
    package(&script, &files)?;

    let status = tokio::process::Command::new("bash")
        .arg(&files.wrapper)
        .status()
        .await?;
    // The wrapper itself succeeds even when the user script fails; the
    // failure lands in the exit-code file instead.
    assert!(status.success());

    let output = std::fs::read_to_string(&files.output_file)?;
    assert!(output.contains("out"));
    assert!(output.contains("err"));
    assert_eq!(std::fs::read_to_string(&files.exit_code_file)?.trim(), "3");

    // Output is appended, not truncated, across runs.
    let status = tokio::process::Command::new("bash")
        .arg(&files.wrapper)
        .status()
        .await?;
    assert!(status.success());
    let output = std::fs::read_to_string(&files.output_file)?;
    assert_eq!(output.matches("out").count(), 2);
    Ok(())
}

#[test]
fn packaging_a_missing_script_fails() {
    let sandbox = tempfile::tempdir().unwrap();
    let files = JobFiles::new(sandbox.path());
    let missing = sandbox.path().join("does_not_exist.sh");
    assert!(package(&missing, &files).is_err());
}
