/// CLI utilities for the `stylename check` subcommand
///
/// Batch counterpart of the diagnostics provider: walk component files, index
/// each against its imports, report unknown classes.
///
/// Modules:
/// - check: Directory walking and per-file checking
/// - output: Text and JSON rendering of findings
pub mod check;
pub mod output;

pub use check::{CheckReport, Finding, collect_component_files, run_check};
pub use output::{OutputFormat, OutputWriter};
