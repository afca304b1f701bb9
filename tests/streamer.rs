use std::error::Error;
use std::io::Write;

use tokio::io::AsyncReadExt;

use ordrun::job::OutputStreamer;
use ordrun_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn streamer_forwards_appended_bytes() -> TestResult {
    init_tracing();
    let sandbox = tempfile::tempdir()?;
    let output_file = sandbox.path().join("output_file");

    let mut streamer = OutputStreamer::begin_piped(&output_file)?;
    let mut stdout = streamer.take_stdout().expect("piped streamer stdout");

    // The streamer must have created the file so a writer can append to it.
    assert!(output_file.exists());
    {
        let mut f = std::fs::OpenOptions::new().append(true).open(&output_file)?;
        writeln!(f, "hi")?;
    }

    let mut buf = [0u8; 64];
    let n = with_timeout(stdout.read(&mut buf)).await?;
    assert!(
        String::from_utf8_lossy(&buf[..n]).contains("hi"),
        "streamed bytes did not arrive"
    );

    streamer.stop();
    // Stopping twice is fine; the process is only signalled once.
    streamer.stop();
    Ok(())
}
