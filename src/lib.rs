//! # thpscope
//!
//! Probes for watching how Linux backs anonymous memory with huge pages.
//!
//! The crate re-exports [`thpscope_core`] and, behind features, the allocators:
//!
//! - `thp` - [`ThpAllocator`](thp::ThpAllocator): ordinary mappings tagged with a
//!   transparent huge page hint.
//! - `hugetlb` - [`HugetlbAllocator`](hugetlb::HugetlbAllocator): mappings served
//!   from the reserved huge page pool.
//!
//! The `thpscope-bin` package builds the two probes on top of them,
//! `thp_compare` and `hugetlb_probe`.

pub use thpscope_core::*;

#[cfg(feature = "hugetlb")]
pub use thpscope_hugetlb as hugetlb;
#[cfg(feature = "thp")]
pub use thpscope_thp as thp;
