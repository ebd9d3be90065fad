use std::io::Write;

use anyhow::Result;
use clap::Parser;
use log::info;
use thpscope_bin::compare::{MAPPINGS, log_backing, map_all, release_all, summary};
use thpscope_bin::init_logging_with_progress;
use thpscope_core::util::{ShutdownSignal, Size::MB};

/// CLI arguments for the `thp_compare` binary.
///
/// Maps three regions advised with `MADV_HUGEPAGE`, `MADV_NOHUGEPAGE` and
/// nothing, then idles until SIGINT or SIGTERM.
#[derive(Debug, Parser)]
struct CliArgs {
    /// Size of each region in MB.
    #[clap(long = "size-mb", default_value = "10")]
    size_mb: usize,
}

fn main() -> Result<()> {
    let progress = init_logging_with_progress()?;
    let args = CliArgs::parse();
    // installed first so a signal during setup is not lost
    let shutdown = ShutdownSignal::install()?;

    let mappings = map_all(&MAPPINGS, MB(args.size_mb), Some(&progress))?;

    let mut stdout = std::io::stdout().lock();
    write!(
        stdout,
        "{}",
        summary(mappings.iter().map(|m| (m.name(), m.advice())))
    )?;
    writeln!(
        stdout,
        "PID: {} - send SIGINT (Ctrl+C) or SIGTERM to exit.",
        std::process::id()
    )?;
    stdout.flush()?;
    drop(stdout);
    log_backing(&mappings);

    shutdown.wait();
    println!("\nReceived termination signal, cleaning up...");
    info!("Unmapping {} regions", mappings.len());
    release_all(mappings)?;
    println!("Memory unmapped, exiting.");
    Ok(())
}
