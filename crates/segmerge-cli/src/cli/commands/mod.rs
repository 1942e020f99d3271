//! CLI command handlers, one file per command.

mod jobs;
mod manifest;
mod resolve;
mod run;

pub use jobs::run_jobs;
pub use manifest::run_manifest;
pub use resolve::run_resolve;
pub use run::{run_batch, RunOverrides};
