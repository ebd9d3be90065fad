use std::fmt;
use std::fs;
use std::ops::Range;

use thiserror::Error;

use crate::util::Size;

/// Per-mapping memory statistics of the current process.
pub const SMAPS_PATH: &str = "/proc/self/smaps";

/// Errors that can happen while looking up a mapping in smaps
#[derive(Debug, Error)]
pub enum SmapsError {
    #[error(transparent)]
    #[allow(missing_docs)]
    IoError(#[from] std::io::Error),
    /// No VMA contains the address
    #[error("no mapping contains address 0x{0:x}")]
    NotFound(usize),
}

/// One VMA record from `/proc/<pid>/smaps`.
///
/// Adjacent mappings with identical flags are merged by the kernel, so the
/// record may span more than the region it was looked up for.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SmapsEntry {
    /// Virtual address range of the VMA
    pub range: Range<usize>,
    /// Resident memory (`Rss`)
    pub rss: Option<Size>,
    /// Anonymous memory backed by transparent huge pages (`AnonHugePages`)
    pub anon_huge_pages: Option<Size>,
    /// Whether the VMA may be backed by transparent huge pages (`THPeligible`)
    pub thp_eligible: Option<bool>,
    /// Two-letter VMA flags (`VmFlags`), e.g. `hg` for `MADV_HUGEPAGE`
    pub vm_flags: Vec<String>,
}

impl SmapsEntry {
    /// Looks up the VMA containing `addr` in [`SMAPS_PATH`].
    ///
    /// # Errors
    ///
    /// Returns an error if smaps cannot be read or no VMA contains `addr`.
    pub fn for_addr<T>(addr: *const T) -> Result<Self, SmapsError> {
        let addr = addr as usize;
        let smaps = fs::read_to_string(SMAPS_PATH)?;
        Self::find_containing(&smaps, addr).ok_or(SmapsError::NotFound(addr))
    }

    /// Finds the record containing `addr` in smaps text.
    pub fn find_containing(smaps: &str, addr: usize) -> Option<Self> {
        Self::parse_all(smaps)
            .into_iter()
            .find(|e| e.range.contains(&addr))
    }

    /// Parses every record of smaps text.
    pub fn parse_all(smaps: &str) -> Vec<Self> {
        let mut entries: Vec<SmapsEntry> = vec![];
        for line in smaps.lines() {
            if let Some(range) = parse_header(line) {
                entries.push(SmapsEntry {
                    range,
                    ..Default::default()
                });
                continue;
            }
            let Some(entry) = entries.last_mut() else {
                continue;
            };
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            match key {
                "Rss" => entry.rss = parse_kb(value),
                "AnonHugePages" => entry.anon_huge_pages = parse_kb(value),
                "THPeligible" => entry.thp_eligible = value.trim().parse::<u8>().ok().map(|v| v != 0),
                "VmFlags" => {
                    entry.vm_flags = value.split_whitespace().map(str::to_owned).collect();
                }
                _ => {}
            }
        }
        entries
    }

    /// Checks whether the VMA carries the given `VmFlags` entry.
    pub fn has_flag(&self, flag: &str) -> bool {
        self.vm_flags.iter().any(|f| f == flag)
    }
}

impl fmt::Display for SmapsEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn opt<T: fmt::Display>(v: &Option<T>) -> String {
            v.as_ref().map_or("?".to_owned(), |v| v.to_string())
        }
        write!(
            f,
            "0x{:x}-0x{:x} Rss: {}, AnonHugePages: {}, THPeligible: {}, VmFlags: {}",
            self.range.start,
            self.range.end,
            opt(&self.rss),
            opt(&self.anon_huge_pages),
            opt(&self.thp_eligible),
            self.vm_flags.join(" ")
        )
    }
}

/// Parses a VMA header line such as `7f0000000000-7f0000a00000 rw-p 00000000 00:00 0`.
fn parse_header(line: &str) -> Option<Range<usize>> {
    let first = line.split_whitespace().next()?;
    let (start, end) = first.split_once('-')?;
    let start = usize::from_str_radix(start, 16).ok()?;
    let end = usize::from_str_radix(end, 16).ok()?;
    Some(start..end)
}

fn parse_kb(s: &str) -> Option<Size> {
    let mut parts = s.split_whitespace();
    let value = parts.next()?.parse::<usize>().ok()?;
    match parts.next() {
        Some("kB") => Some(Size::KB(value)),
        _ => None,
    }
}
