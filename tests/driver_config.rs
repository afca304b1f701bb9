use std::error::Error;
use std::path::Path;

use ordrun::driver::{DriverConfig, emit};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn config_document_has_the_shape_the_runner_expects() -> TestResult {
    let config = DriverConfig::new(Path::new("/home/ci"));

    let mut buf = Vec::new();
    emit(&config, &mut buf)?;
    let doc: serde_json::Value = serde_json::from_slice(&buf)?;

    assert_eq!(
        doc["builds_dir"],
        "/home/ci/ords/custom-executor-builds/"
    );
    assert_eq!(doc["cache_dir"], doc["builds_dir"]);
    assert_eq!(doc["builds_dir_is_shared"], true);
    assert_eq!(doc["hostname"], "ppp5");
    assert_eq!(doc["driver"]["name"], "ordrun");
    assert!(doc["driver"]["version"].is_string());
    assert!(doc["job_env"].is_object());
    Ok(())
}
