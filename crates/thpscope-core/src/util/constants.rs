/// Page shift value (12 bits) for 4KB pages
pub const PAGE_SHIFT: usize = 12;
/// Standard page size (4096 bytes)
pub const PAGE_SIZE: usize = 1 << PAGE_SHIFT;

/// PMD-sized transparent huge page (2 MB) on x86_64
pub const THP_SIZE: usize = 1 << 21;

/// Granularity of progress updates while filling a region
pub const FILL_CHUNK: usize = THP_SIZE;
