// src/scheduler/ids.rs

//! Job-identifier quirks of the scheduler CLI.

/// Cells whose job ids are accepted verbatim by `jobst`/`jobdel`.
///
/// Everywhere else `ord_soumet` returns ids of the form
/// `<number>.<hostname>` but the status/delete tools only accept the
/// leading numeric part.
const VERBATIM_ID_CELLS: &[&str] = &["ppp5", "ppp6", "robert", "underhill"];

/// The id to pass to `jobst` and `jobdel` for a given submitted id.
pub fn query_job_id(job_id: &str, cell_name: Option<&str>) -> String {
    match cell_name {
        Some(cell) if VERBATIM_ID_CELLS.contains(&cell) => job_id.to_string(),
        _ => job_id
            .split('.')
            .next()
            .unwrap_or(job_id)
            .to_string(),
    }
}

/// Extract the target cell from the submission arguments: the token
/// immediately following `-mach` or `-d`.
pub fn cell_name_from_args(args: &[String]) -> Option<String> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "-mach" || arg == "-d" {
            return iter.next().cloned();
        }
    }
    None
}
