//! Sizing and input handling for `hugetlb_probe`.

use std::io::{self, BufRead};

use anyhow::Context;
use thpscope_core::memory::MemInfo;
use thpscope_core::util::Size::{self, GB};

/// Region mapped when no page count is given: two 1 GB pages.
pub const DEFAULT_REGION_SIZE: Size = GB(2);

/// Number of `page_size` pages covering `target`, at least one.
///
/// Rounds up, so the region is never smaller than `target`.
pub fn default_pages(page_size: Size, target: Size) -> usize {
    match (page_size.checked_bytes(), target.checked_bytes()) {
        (Some(page), Some(target)) if page > 0 => target.div_ceil(page).max(1),
        _ => 1,
    }
}

/// Total size of `pages` huge pages of `page_size`.
pub fn region_size(page_size: Size, pages: usize) -> anyhow::Result<Size> {
    anyhow::ensure!(pages > 0, "at least one huge page is required");
    let size = page_size
        .checked_mul(pages)
        .with_context(|| format!("{} pages of {} overflow the address space", pages, page_size))?;
    // the byte count itself must fit as well
    size.checked_bytes()
        .with_context(|| format!("{} pages of {} overflow the address space", pages, page_size))?;
    Ok(size)
}

/// Blocks until one line was read from `input`; its content is discarded.
///
/// Returns `false` if the input was closed instead.
pub fn wait_for_line(input: &mut impl BufRead) -> io::Result<bool> {
    let mut line = String::new();
    let n = input.read_line(&mut line)?;
    Ok(n > 0)
}

/// Logs the huge page pool counters.
pub fn log_pool(when: &str) {
    match MemInfo::read() {
        Ok(info) => info!(
            "Huge page pool {}: total {:?}, free {:?}, reserved {:?}, surplus {:?}",
            when, info.total, info.free, info.reserved, info.surplus
        ),
        Err(e) => warn!("Failed to read meminfo: {}", e),
    }
}
