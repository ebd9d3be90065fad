//! # thpscope probes
//!
//! Two diagnostic binaries that map anonymous memory and then idle, so the
//! kernel's huge page backing can be inspected from the outside (e.g. with
//! `/proc/<pid>/smaps` or `/proc/meminfo`) while the process waits.
//!
//! - `thp_compare` maps three equal regions advised with `MADV_HUGEPAGE`,
//!   `MADV_NOHUGEPAGE` and nothing, touches them, and waits for SIGINT/SIGTERM.
//! - `hugetlb_probe` maps a region from the reserved huge page pool with
//!   `MAP_HUGETLB | MAP_POPULATE` and waits for one line on stdin.
//!
//! ## Modules
//!
//! - `compare`: The mapping plan, setup and summary of `thp_compare`.
//! - `probe`: Sizing and the stdin wait of `hugetlb_probe`.
//!
//! ## External Crates
//!
//! - `log`: Used for logging throughout the crate, written to stderr.
//! - `indicatif`: Progress bars while regions are touched.
pub mod compare;
pub mod probe;

#[macro_use]
extern crate log;

use indicatif::MultiProgress;
use indicatif_log_bridge::LogWrapper;

pub fn init_logging_with_progress() -> anyhow::Result<MultiProgress> {
    let logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).build();
    let progress = MultiProgress::new();
    LogWrapper::new(progress.clone(), logger).try_init()?;
    Ok(progress)
}
