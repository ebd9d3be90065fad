use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Transparent huge page hint for a mapping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Advice {
    /// `MADV_HUGEPAGE`: ask the kernel to back the range with huge pages
    Hugepage,
    /// `MADV_NOHUGEPAGE`: exclude the range from huge page backing
    NoHugepage,
    /// Leave the range to the system-wide THP policy
    #[default]
    None,
}

impl Advice {
    /// All variants, in the order the comparison tool maps them.
    pub const ALL: [Advice; 3] = [Advice::Hugepage, Advice::NoHugepage, Advice::None];

    /// The `madvise` flag for this advice, or `None` if no call is issued.
    pub fn flag(&self) -> Option<libc::c_int> {
        match self {
            Advice::Hugepage => Some(libc::MADV_HUGEPAGE),
            Advice::NoHugepage => Some(libc::MADV_NOHUGEPAGE),
            Advice::None => None,
        }
    }

    /// Name of the `madvise` flag, as printed in diagnostics.
    pub fn flag_name(&self) -> Option<&'static str> {
        match self {
            Advice::Hugepage => Some("MADV_HUGEPAGE"),
            Advice::NoHugepage => Some("MADV_NOHUGEPAGE"),
            Advice::None => None,
        }
    }
}

impl fmt::Display for Advice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.flag_name() {
            Some(name) => write!(f, "{} applied", name),
            None => write!(f, "no madvise"),
        }
    }
}

/// Unknown advice name
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown advice '{0}', expected one of: hugepage, nohugepage, none")]
pub struct ParseAdviceError(String);

impl FromStr for Advice {
    type Err = ParseAdviceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hugepage" | "madv_hugepage" => Ok(Advice::Hugepage),
            "nohugepage" | "madv_nohugepage" => Ok(Advice::NoHugepage),
            "none" | "default" => Ok(Advice::None),
            _ => Err(ParseAdviceError(s.to_owned())),
        }
    }
}
