//! Hugetlb allocator backed by the reserved huge page pool.
//!
//! This crate provides an allocator that maps anonymous memory with
//! `MAP_HUGETLB | MAP_POPULATE`, so the whole region is served from the
//! kernel's huge page pool and resident as soon as the mapping returns. There
//! is no fallback to ordinary pages.
//!
//! Implements the [`thpscope_core::allocator::RegionAllocator`] trait.
//!
//! # Platform Requirements
//!
//! - Huge pages of the requested size must be reserved beforehand, e.g. via
//!   `/sys/kernel/mm/hugepages/hugepages-<size>kB/nr_hugepages` or the
//!   `hugepages=` kernel parameter

#![warn(missing_docs)]

mod hugetlb;

pub use hugetlb::*;
