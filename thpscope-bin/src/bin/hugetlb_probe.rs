use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use thpscope_bin::init_logging_with_progress;
use thpscope_bin::probe::{
    DEFAULT_REGION_SIZE, default_pages, log_pool, region_size, wait_for_line,
};
use thpscope_core::allocator::{RegionAllocator, alloc_region};
use thpscope_core::util::Size::MB;
use thpscope_hugetlb::HugetlbAllocator;

/// CLI arguments for the `hugetlb_probe` binary.
///
/// Maps a populated region from the reserved huge page pool and holds it
/// until one line is read from stdin.
#[derive(Debug, Parser)]
struct CliArgs {
    /// Number of huge pages to map. Defaults to as many as make up 2 GB.
    #[clap(long = "pages")]
    pages: Option<usize>,
    /// Huge page size in MB. Defaults to the kernel's `Hugepagesize`.
    #[clap(long = "page-size-mb")]
    page_size_mb: Option<usize>,
}

fn main() -> Result<()> {
    let _progress = init_logging_with_progress()?;
    let args = CliArgs::parse();

    let mut allocator = match args.page_size_mb {
        Some(mb) => HugetlbAllocator::new(MB(mb))?,
        None => HugetlbAllocator::from_meminfo()?,
    };
    let page_size = allocator.page_size();
    let pages = args
        .pages
        .unwrap_or_else(|| default_pages(page_size, DEFAULT_REGION_SIZE));
    let size = region_size(page_size, pages)?;

    log_pool("before mapping");
    let region = alloc_region(&mut allocator, size)
        .with_context(|| format!("failed to map {} from the {} huge page pool", size, page_size))?;
    log_pool("after mapping");

    println!(
        "Mapped {} ({} x {} huge pages) at {:p}.",
        size,
        pages,
        page_size,
        region.ptr()
    );
    println!("PID: {} - press Enter to unmap and exit.", std::process::id());

    if !wait_for_line(&mut std::io::stdin().lock())? {
        info!("stdin closed");
    }
    region.release().context("munmap")?;
    println!("Memory unmapped, exiting.");
    Ok(())
}
