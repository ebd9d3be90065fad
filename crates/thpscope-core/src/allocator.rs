//! Region allocation strategies.
//!
//! This module defines the [`RegionAllocator`] trait and the [`alloc_region`]
//! entry point that validates a request before handing it to an allocator.

use log::info;
use thiserror::Error;

use crate::memory::Region;
use crate::util::Size;

/// Trait for strategies that obtain an anonymous [`Region`] from the kernel.
///
/// Implementors decide how the region is mapped and which backing is
/// requested, e.g. a plain mapping with a transparent huge page hint, or a
/// mapping served from the reserved hugetlb pool.
///
/// # Required Methods
///
/// * [`page_size()`](RegionAllocator::page_size) - The unit a request must be a multiple of
/// * [`alloc_region()`](RegionAllocator::alloc_region) - Maps the region
pub trait RegionAllocator {
    /// The error type returned by allocation operations.
    type Error: std::error::Error;

    /// Returns the page size backing regions of this allocator.
    fn page_size(&self) -> Size;

    /// Maps a region of `size` bytes.
    ///
    /// # Errors
    ///
    /// May return an error if:
    /// * The kernel refuses the mapping
    /// * The requested backing hint is rejected
    /// * The reserved huge page pool cannot satisfy the request
    fn alloc_region(&mut self, size: Size) -> Result<Region, Self::Error>;
}

/// Errors returned by [`alloc_region`]
#[derive(Debug, Error)]
pub enum AllocError<E: std::error::Error> {
    /// Requested size is zero or not a multiple of the page size
    #[error("size {size} must be a non-zero multiple of {page_size}")]
    SizeError {
        /// Requested size
        size: Size,
        /// Page size of the allocator
        page_size: Size,
    },
    /// The allocator failed
    #[error(transparent)]
    Allocator(E),
}

/// Allocate a region using an allocation strategy.
///
/// This is the main entry point for users who simply want a region: it checks
/// that `size` is a non-zero multiple of the allocator's page size before
/// mapping anything.
///
/// # Errors
///
/// Returns [`AllocError::SizeError`] for an invalid size and
/// [`AllocError::Allocator`] if the allocator fails.
pub fn alloc_region<A: RegionAllocator + ?Sized>(
    allocator: &mut A,
    size: Size,
) -> Result<Region, AllocError<A::Error>> {
    let page_size = allocator.page_size();
    if !size.is_multiple_of(page_size) {
        return Err(AllocError::SizeError { size, page_size });
    }
    let region = allocator.alloc_region(size).map_err(AllocError::Allocator)?;
    info!(
        "Mapped {} at {:p} ({})",
        size,
        region.ptr(),
        region.advice()
    );
    Ok(region)
}

#[cfg(test)]
mod tests {
    use super::{AllocError, RegionAllocator, alloc_region};
    use crate::memory::Region;
    use crate::util::{PAGE_SIZE, Size};

    struct Plain {
        calls: usize,
    }

    impl RegionAllocator for Plain {
        type Error = std::io::Error;

        fn page_size(&self) -> Size {
            Size::B(PAGE_SIZE)
        }

        fn alloc_region(&mut self, size: Size) -> Result<Region, Self::Error> {
            self.calls += 1;
            Region::map(size.bytes(), 0)
        }
    }

    #[test]
    fn rejects_unaligned_sizes() {
        let mut plain = Plain { calls: 0 };
        let err = alloc_region(&mut plain, Size::B(PAGE_SIZE + 1)).unwrap_err();
        assert!(matches!(err, AllocError::SizeError { .. }));
        let err = alloc_region(&mut plain, Size::B(0)).unwrap_err();
        assert!(matches!(err, AllocError::SizeError { .. }));
        assert_eq!(plain.calls, 0);
    }

    #[test]
    fn maps_aligned_sizes() -> anyhow::Result<()> {
        let mut plain = Plain { calls: 0 };
        let region = alloc_region(&mut plain, Size::KB(16))?;
        assert_eq!(region.len(), 16 * 1024);
        assert_eq!(plain.calls, 1);
        Ok(())
    }
}
