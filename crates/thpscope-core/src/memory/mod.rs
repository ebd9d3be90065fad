//! The `memory` module provides the owned mapping type and the readers used to
//! observe how the kernel backs it.
//!
//! - `Region`: An anonymous mapping that is unmapped when dropped.
//! - `Advice`: The transparent huge page hint applied to a `Region`.
//! - `SmapsEntry`: A VMA record from `/proc/self/smaps`.
//! - `MemInfo`: The huge page pool counters from `/proc/meminfo`.
mod advice;
mod meminfo;
mod region;
mod smaps;

pub use self::advice::{Advice, ParseAdviceError};
pub use self::meminfo::{MEMINFO_PATH, MemInfo};
pub use self::region::Region;
pub use self::smaps::{SMAPS_PATH, SmapsEntry, SmapsError};
