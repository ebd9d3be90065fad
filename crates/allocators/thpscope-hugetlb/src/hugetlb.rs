use lazy_static::lazy_static;
use libc::{MAP_HUGE_SHIFT, MAP_HUGETLB, MAP_POPULATE};
use log::{debug, warn};
use thiserror::Error;
use thpscope_core::allocator::RegionAllocator;
use thpscope_core::memory::{MemInfo, Region};
use thpscope_core::util::Size;

lazy_static! {
    /// Default huge page size of the running kernel, `None` if unsupported.
    pub static ref HUGEPAGE_SIZE: Option<Size> = match MemInfo::read() {
        Ok(info) => info.hugepage_size,
        Err(e) => {
            warn!("Failed to read meminfo: {}", e);
            None
        }
    };
}

/// Errors that can happen during hugetlb allocation
#[derive(Debug, Error)]
pub enum Error {
    /// The pool could not satisfy the mapping
    #[error("mmap: {0}")]
    Mmap(std::io::Error),
    /// The kernel reports no default huge page size
    #[error("no huge page size reported in /proc/meminfo")]
    NoHugepageSize,
    /// Huge page sizes are powers of two
    #[error("invalid huge page size {0}")]
    InvalidPageSize(Size),
}

/// Hugetlb allocator.
///
/// Maps regions from the huge page pool of a fixed page size. The page size
/// is encoded in the `mmap` flags, so pools of non-default sizes work too.
#[derive(Clone, Copy, Debug)]
pub struct HugetlbAllocator {
    page_size: Size,
}

impl HugetlbAllocator {
    /// Creates an allocator for huge pages of `page_size`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPageSize`] if `page_size` is not a power of two,
    /// or does not fit in `usize`.
    pub fn new(page_size: Size) -> Result<Self, Error> {
        if !page_size.checked_bytes().is_some_and(usize::is_power_of_two) {
            return Err(Error::InvalidPageSize(page_size));
        }
        Ok(HugetlbAllocator { page_size })
    }

    /// Creates an allocator for the kernel's default huge page size.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoHugepageSize`] if the size cannot be determined.
    pub fn from_meminfo() -> Result<Self, Error> {
        let page_size = (*HUGEPAGE_SIZE).ok_or(Error::NoHugepageSize)?;
        Self::new(page_size)
    }

    /// The `mmap` flags selecting this allocator's pool.
    pub fn map_flags(&self) -> libc::c_int {
        let shift = self.page_size.bytes().trailing_zeros() as libc::c_int;
        MAP_HUGETLB | MAP_POPULATE | (shift << MAP_HUGE_SHIFT)
    }
}

impl RegionAllocator for HugetlbAllocator {
    type Error = Error;

    fn page_size(&self) -> Size {
        self.page_size
    }

    fn alloc_region(&mut self, size: Size) -> Result<Region, Self::Error> {
        debug!(
            "Requesting {} from the {} huge page pool",
            size, self.page_size
        );
        Region::map(size.bytes(), self.map_flags()).map_err(Error::Mmap)
    }
}
