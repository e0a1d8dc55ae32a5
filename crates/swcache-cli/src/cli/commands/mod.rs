//! CLI command handlers, one per file.

mod activate;
mod completions;
mod fetch;
mod install;
mod share;
mod status;

pub use activate::run_activate;
pub use completions::run_completions;
pub use fetch::run_fetch;
pub use install::run_install;
pub use share::{guess_mime, run_share};
pub use status::run_status;
