use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ordrun::job::JobCoordinator;
use ordrun::scheduler::JobStatus;
use ordrun_test_utils::fake_scheduler::FakeScheduler;
use ordrun_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

fn write_script(dir: &Path, body: &str) -> std::io::Result<PathBuf> {
    let path = dir.join("job_script.sh");
    std::fs::write(&path, body)?;
    Ok(path)
}

#[tokio::test]
async fn lifecycle_streams_output_and_returns_real_exit_code() -> TestResult {
    init_tracing();
    let sandbox = tempfile::tempdir()?;
    let script = write_script(sandbox.path(), "echo hi\nexit 7\n")?;

    // Scheduler reports running twice, then ended. The wrapper really runs,
    // so the output and exit-code files exist by the time polling starts.
    let fake = FakeScheduler::new("98765.hostA")
        .with_statuses([JobStatus::Running, JobStatus::Running, JobStatus::Ended])
        .run_wrapper_on_submit();
    let queries = fake.status_queries.clone();

    let mut job = JobCoordinator::new(&script, vec![], Some(sandbox.path()), false, fake)?;
    let workdir = job.workdir().to_path_buf();
    let output_file = job.files().output_file.clone();

    with_timeout(job.start()).await?;
    assert_eq!(job.job_id(), Some("98765.hostA"));

    let status = with_timeout(job.wait(Duration::from_millis(10))).await?;
    assert_eq!(status, JobStatus::Ended);

    // Exactly one query per scripted status, all with the normalized id
    // (no cell given, so the hostname suffix is stripped).
    assert_eq!(*queries.lock().unwrap(), ["98765", "98765", "98765"]);

    let output = std::fs::read_to_string(&output_file)?;
    assert!(output.contains("hi"), "streamed file missing output: {output:?}");
    assert_eq!(job.get_exit_code()?, Some(7));

    job.teardown();
    assert!(!workdir.exists(), "teardown left the working directory behind");
    // Second teardown must be a no-op, not an error.
    job.teardown();
    Ok(())
}

#[tokio::test]
async fn missing_exit_code_file_reports_unknown_not_zero() -> TestResult {
    init_tracing();
    let sandbox = tempfile::tempdir()?;
    let script = write_script(sandbox.path(), "exit 0\n")?;

    // The wrapper never runs, so no exit-code file is ever written.
    let fake = FakeScheduler::new("11111").with_statuses([JobStatus::Deleted]);

    let mut job = JobCoordinator::new(&script, vec![], Some(sandbox.path()), false, fake)?;
    with_timeout(job.start()).await?;
    let status = with_timeout(job.wait(Duration::from_millis(10))).await?;
    assert_eq!(status, JobStatus::Deleted);

    assert_eq!(job.get_exit_code()?, None);

    job.teardown();
    Ok(())
}

#[tokio::test]
async fn failed_status_query_is_terminal() -> TestResult {
    init_tracing();
    let sandbox = tempfile::tempdir()?;
    let script = write_script(sandbox.path(), "exit 0\n")?;

    // No scripted statuses: every query degrades to Unknown, which must end
    // the poll loop after a single iteration instead of spinning forever.
    let fake = FakeScheduler::new("22222");
    let queries = fake.status_queries.clone();

    let mut job = JobCoordinator::new(&script, vec![], Some(sandbox.path()), false, fake)?;
    with_timeout(job.start()).await?;
    let status = with_timeout(job.wait(Duration::from_millis(10))).await?;
    assert_eq!(status, JobStatus::Unknown);
    assert_eq!(queries.lock().unwrap().len(), 1);

    job.teardown();
    Ok(())
}

#[tokio::test]
async fn keep_tmp_preserves_the_working_directory() -> TestResult {
    init_tracing();
    let sandbox = tempfile::tempdir()?;
    let script = write_script(sandbox.path(), "exit 0\n")?;

    let fake = FakeScheduler::new("33333").with_statuses([JobStatus::Ended]);

    let mut job = JobCoordinator::new(&script, vec![], Some(sandbox.path()), true, fake)?;
    let workdir = job.workdir().to_path_buf();

    with_timeout(job.start()).await?;
    with_timeout(job.wait(Duration::from_millis(10))).await?;
    job.teardown();

    assert!(workdir.exists(), "keep-tmp working directory was removed");
    Ok(())
}
