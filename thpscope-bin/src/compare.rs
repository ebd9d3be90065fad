//! Setup and reporting for `thp_compare`.
//!
//! Three regions of equal size are mapped in a fixed order, each with a
//! different transparent huge page advice, and filled with a distinct byte so
//! every page is faulted in.

use std::fmt::Write as _;

use anyhow::Context;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use thpscope_core::allocator::{RegionAllocator, alloc_region};
use thpscope_core::memory::{Advice, Region, SmapsEntry};
use thpscope_core::util::{NamedProgress, Size};
use thpscope_thp::ThpAllocator;

/// One entry of the mapping plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MappingSpec {
    /// Name printed in the summary
    pub name: &'static str,
    /// Advice applied after mapping
    pub advice: Advice,
    /// Byte written across the region
    pub fill: u8,
}

/// The regions `thp_compare` maps, in summary order.
pub const MAPPINGS: [MappingSpec; 3] = [
    MappingSpec {
        name: "hugepage_mem",
        advice: Advice::Hugepage,
        fill: 0xA5,
    },
    MappingSpec {
        name: "nohugepage_mem",
        advice: Advice::NoHugepage,
        fill: 0x5A,
    },
    MappingSpec {
        name: "default_mem",
        advice: Advice::None,
        fill: 0xFF,
    },
];

/// A mapped and touched region of the plan.
#[derive(Debug)]
pub struct Mapping {
    pub spec: MappingSpec,
    pub region: Region,
}

impl Mapping {
    pub fn name(&self) -> &'static str {
        self.spec.name
    }

    /// The advice the kernel accepted for the region.
    pub fn advice(&self) -> Advice {
        self.region.advice()
    }
}

/// Maps, advises and fills every entry of `plan` in order with [`ThpAllocator`].
///
/// If any entry fails, the regions mapped so far are dropped, and with them
/// unmapped, before the error is returned.
pub fn map_all(
    plan: &[MappingSpec],
    size: Size,
    progress: Option<&MultiProgress>,
) -> anyhow::Result<Vec<Mapping>> {
    map_all_with(plan, size, progress, |spec| ThpAllocator::new(spec.advice))
}

/// Like [`map_all`], mapping each entry with the allocator `make` builds for it.
pub fn map_all_with<A, F>(
    plan: &[MappingSpec],
    size: Size,
    progress: Option<&MultiProgress>,
    mut make: F,
) -> anyhow::Result<Vec<Mapping>>
where
    A: RegionAllocator,
    A::Error: Send + Sync + 'static,
    F: FnMut(&MappingSpec) -> A,
{
    let mut mappings = Vec::with_capacity(plan.len());
    for spec in plan {
        let mut allocator = make(spec);
        let mut region = alloc_region(&mut allocator, size)
            .with_context(|| format!("failed to set up {}", spec.name))?;
        let p = progress.map(|p| {
            p.add(
                ProgressBar::new(region.len() as u64)
                    .with_style(ProgressStyle::named_bytes(&format!("Touching {}", spec.name))),
            )
        });
        region.fill_with_progress(spec.fill, p.as_ref());
        if let Some(p) = p {
            p.finish_and_clear();
        }
        mappings.push(Mapping {
            spec: *spec,
            region,
        });
    }
    Ok(mappings)
}

/// Renders the mapping summary, one numbered line per mapping.
pub fn summary<'a>(mappings: impl IntoIterator<Item = (&'a str, Advice)>) -> String {
    let mut out = String::from("Memory allocated and madvise applied.\nMapping summary:\n");
    for (i, (name, advice)) in mappings.into_iter().enumerate() {
        // writing to a String cannot fail
        let _ = writeln!(out, "  [{}] {}: {}", i + 1, name, advice);
    }
    out
}

/// Logs what `/proc/self/smaps` reports for each mapping.
pub fn log_backing(mappings: &[Mapping]) {
    for mapping in mappings {
        match SmapsEntry::for_addr(mapping.region.ptr()) {
            Ok(entry) => info!("{}: {}", mapping.name(), entry),
            Err(e) => warn!("{}: failed to read smaps: {}", mapping.name(), e),
        }
    }
}

/// Unmaps every mapping, last mapped first.
///
/// All mappings are released even if one fails; the first failure is returned.
pub fn release_all(mappings: Vec<Mapping>) -> anyhow::Result<()> {
    let mut result = Ok(());
    for mapping in mappings.into_iter().rev() {
        let name = mapping.name();
        if let Err(e) = mapping.region.release() {
            error!("munmap {}: {}", name, e);
            if result.is_ok() {
                result = Err(e).with_context(|| format!("munmap {}", name));
            }
        }
    }
    result
}
