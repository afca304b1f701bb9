use std::error::Error;

use ordrun::environment::{ExitCodes, shell_env_lookup, submit_args_from_vars};
use ordrun::steps::map_exit_code;

type TestResult = Result<(), Box<dyn Error>>;

fn vars(list: &[(&str, &str)]) -> Vec<(String, String)> {
    list.iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn prefixed_vars_become_lowercased_flags() {
    let args = submit_args_from_vars(
        "CUSTOM_ENV_ORD_SOUMET_",
        vars(&[
            ("CUSTOM_ENV_ORD_SOUMET_MACH", "ppp5"),
            ("CUSTOM_ENV_ORD_SOUMET_CPUS", "4"),
            ("CUSTOM_ENV_OTHER", "ignored"),
            ("PATH", "/usr/bin"),
        ]),
    );
    // Sorted by name for a deterministic command line.
    assert_eq!(args, ["-cpus", "4", "-mach", "ppp5"]);
}

#[test]
fn bare_prefix_variable_is_ignored() {
    let args = submit_args_from_vars(
        "CUSTOM_ENV_ORD_SOUMET_",
        vars(&[("CUSTOM_ENV_ORD_SOUMET_", "oops")]),
    );
    assert!(args.is_empty());
}

#[tokio::test]
async fn shell_lookup_sees_inherited_variables() -> TestResult {
    // PATH is always set for a test run.
    assert!(shell_env_lookup("PATH").await?.is_some());
    Ok(())
}

#[tokio::test]
async fn shell_lookup_of_an_unset_variable_is_none() -> TestResult {
    assert_eq!(shell_env_lookup("ORDRUN_SURELY_NOT_SET_93412").await?, None);
    Ok(())
}

#[tokio::test]
async fn shell_lookup_rejects_invalid_names() {
    assert!(shell_env_lookup("not a name").await.is_err());
    assert!(shell_env_lookup("$(reboot)").await.is_err());
    assert!(shell_env_lookup("").await.is_err());
}

#[test]
fn exit_codes_distinguish_build_and_system_failure() {
    let codes = ExitCodes {
        build_failure: 55,
        system_failure: 66,
    };
    assert_eq!(map_exit_code("step_script", Some(0), codes), 0);
    assert_eq!(map_exit_code("step_script", Some(7), codes), 55);
    assert_eq!(map_exit_code("step_script", None, codes), 66);
}
