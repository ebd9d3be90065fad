//! # thpscope Core
//!
//! `thpscope-core` holds the pieces shared by the thpscope probes: an owned
//! anonymous mapping ([`memory::Region`]), the transparent huge page advice
//! applied to it ([`memory::Advice`]) and the [`allocator::RegionAllocator`]
//! trait that the allocator crates implement.
//!
//! ## Main Components
//!
//! - [`memory`] module - [`memory::Region`] and readers for `/proc/self/smaps`
//!   and `/proc/meminfo` used to observe how the kernel backs a region.
//!
//! - [`util`] module - [`util::Size`], page constants, the [`util::ShutdownSignal`]
//!   used to wait for SIGINT/SIGTERM, and progress bar styles.
//!
//! ## Platform Support
//!
//! Linux only. Transparent huge page advice needs a kernel built with
//! `CONFIG_TRANSPARENT_HUGEPAGE`, and hugetlb mappings need a reserved pool.

#![warn(missing_docs)]

pub mod allocator;
pub mod memory;
pub mod util;
