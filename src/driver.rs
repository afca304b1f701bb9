// src/driver.rs

//! The `config` executor stage.
//!
//! The runner calls this stage once before a job and consumes the JSON
//! document printed on stdout as-is. The document is static apart from the
//! home-directory base path.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;

use crate::errors::Result;

/// Host identity reported to the runner. Jobs are brokered through the
/// scheduler, so the submission front-end is the stable name to report.
const DRIVER_HOSTNAME: &str = "ppp5";

#[derive(Debug, Serialize)]
pub struct DriverInfo {
    pub name: &'static str,
    pub version: &'static str,
}

/// The configuration document consumed by the runner.
#[derive(Debug, Serialize)]
pub struct DriverConfig {
    pub builds_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub builds_dir_is_shared: bool,
    pub hostname: &'static str,
    pub driver: DriverInfo,
    pub job_env: BTreeMap<String, String>,
}

impl DriverConfig {
    /// Build the document with builds/cache directories under `base_dir`
    /// (the user's home directory in production).
    pub fn new(base_dir: &Path) -> Self {
        let builds_dir = base_dir.join("ords/custom-executor-builds/");
        Self {
            cache_dir: builds_dir.clone(),
            builds_dir,
            builds_dir_is_shared: true,
            hostname: DRIVER_HOSTNAME,
            driver: DriverInfo {
                name: env!("CARGO_PKG_NAME"),
                version: env!("CARGO_PKG_VERSION"),
            },
            job_env: BTreeMap::from([(
                "CUSTOM_ENVIRONMENT".to_string(),
                "ord_soumet".to_string(),
            )]),
        }
    }

    pub fn from_env() -> Result<Self> {
        let home = std::env::var("HOME").context("HOME is not set")?;
        Ok(Self::new(Path::new(&home)))
    }
}

/// Serialize the document to `writer` (stdout in production).
pub fn emit<W: Write>(config: &DriverConfig, mut writer: W) -> Result<()> {
    serde_json::to_writer(&mut writer, config).context("serializing driver config")?;
    writer.write_all(b"\n")?;
    Ok(())
}
