//! Transparent Huge Pages (THP) advised allocator.
//!
//! This crate provides an allocator that maps private anonymous memory and
//! applies a transparent huge page hint with `madvise`: `MADV_HUGEPAGE`,
//! `MADV_NOHUGEPAGE`, or nothing at all. Whether the kernel honors the hint
//! depends on `/sys/kernel/mm/transparent_hugepage/enabled`.
//!
//! Implements the [`thpscope_core::allocator::RegionAllocator`] trait.
//!
//! # Platform Requirements
//!
//! - Linux with `CONFIG_TRANSPARENT_HUGEPAGE`, otherwise any hint is rejected with `EINVAL`
//! - THP should be set to "always" or "madvise" mode for `MADV_HUGEPAGE` to have an effect

#![warn(missing_docs)]

use log::{debug, warn};
use thiserror::Error;
use thpscope_core::allocator::RegionAllocator;
use thpscope_core::memory::{Advice, Region};
use thpscope_core::util::{PAGE_SIZE, Size, THP_SIZE};

/// THP allocator. Maps ordinary anonymous memory and tags it with an [`Advice`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ThpAllocator {
    advice: Advice,
}

impl ThpAllocator {
    /// Constructor for THP allocator
    pub fn new(advice: Advice) -> Self {
        ThpAllocator { advice }
    }

    /// The advice applied to every region of this allocator.
    pub fn advice(&self) -> Advice {
        self.advice
    }
}

/// Errors that can happen during THP allocation
#[derive(Debug, Error)]
pub enum Error {
    /// The mapping request was denied
    #[error("mmap: {0}")]
    Mmap(std::io::Error),
    /// The kernel rejected the hint
    #[error("madvise {}: {cause}", .advice.flag_name().unwrap_or("none"))]
    Advise {
        /// Rejected advice
        advice: Advice,
        /// OS error
        cause: std::io::Error,
    },
}

impl RegionAllocator for ThpAllocator {
    type Error = Error;

    fn page_size(&self) -> Size {
        Size::B(PAGE_SIZE)
    }

    fn alloc_region(&mut self, size: Size) -> Result<Region, Self::Error> {
        let mut region = Region::map(size.bytes(), 0).map_err(Error::Mmap)?;
        // on failure the region is dropped, and with it unmapped
        region
            .advise(self.advice)
            .map_err(|cause| Error::Advise {
                advice: self.advice,
                cause,
            })?;
        if self.advice == Advice::Hugepage && region.ptr() as usize & (THP_SIZE - 1) != 0 {
            warn!(
                "Region at {:p} is not {} aligned, its edges cannot be backed by huge pages",
                region.ptr(),
                Size::B(THP_SIZE)
            );
        }
        debug!("THP region {:p} ({})", region.ptr(), region.advice());
        Ok(region)
    }
}
