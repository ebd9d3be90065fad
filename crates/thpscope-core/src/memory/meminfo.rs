use std::fs;
use std::io;

use crate::util::Size;

// https://www.kernel.org/doc/Documentation/vm/hugetlbpage.txt
//
// The output of "cat /proc/meminfo" will include lines like:
// ...
// HugePages_Total: uuu
// HugePages_Free:  vvv
// HugePages_Rsvd:  www
// HugePages_Surp:  xxx
// Hugepagesize:    yyy kB
// Hugetlb:         zzz kB

/// Location of the system memory counters.
pub const MEMINFO_PATH: &str = "/proc/meminfo";

/// Huge page pool counters of the default huge page size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemInfo {
    /// Default huge page size (`Hugepagesize`)
    pub hugepage_size: Option<Size>,
    /// Pages in the pool (`HugePages_Total`)
    pub total: Option<usize>,
    /// Pages not yet faulted in (`HugePages_Free`)
    pub free: Option<usize>,
    /// Pages promised to mappings but not yet faulted in (`HugePages_Rsvd`)
    pub reserved: Option<usize>,
    /// Surplus pages above the persistent pool (`HugePages_Surp`)
    pub surplus: Option<usize>,
}

impl MemInfo {
    /// Reads and parses [`MEMINFO_PATH`].
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read.
    pub fn read() -> io::Result<Self> {
        Ok(Self::parse(&fs::read_to_string(MEMINFO_PATH)?))
    }

    /// Parses the contents of `/proc/meminfo`. Unknown or malformed lines are ignored.
    pub fn parse(s: &str) -> Self {
        let mut info = MemInfo::default();
        for line in s.lines() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            match key {
                "Hugepagesize" => info.hugepage_size = parse_value(value).map(Size::B),
                "HugePages_Total" => info.total = parse_value(value),
                "HugePages_Free" => info.free = parse_value(value),
                "HugePages_Rsvd" => info.reserved = parse_value(value),
                "HugePages_Surp" => info.surplus = parse_value(value),
                _ => {}
            }
        }
        info
    }

    /// Pages that a new mapping can still reserve.
    pub fn available(&self) -> Option<usize> {
        Some(self.free?.saturating_sub(self.reserved.unwrap_or(0)))
    }
}

/// Parses a meminfo value, scaling `kB` to bytes.
fn parse_value(s: &str) -> Option<usize> {
    let mut parts = s.split_whitespace();
    let value = parts.next()?.parse::<usize>().ok()?;
    match parts.next() {
        None => Some(value),
        Some("kB") => value.checked_mul(1024),
        Some(_) => None,
    }
}
