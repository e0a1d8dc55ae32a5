//! Version lifecycle: install (seed the cache) and activate (take control).

mod activate;
mod install;
mod state;

pub use activate::{ActivateError, ActivationReport, Activator};
pub use install::{InstallError, InstallReport, Installer};
pub use state::WorkerState;
