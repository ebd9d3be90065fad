//! Utility types shared by the probes.
//!
//! This module provides:
//! - [`Size`] - Memory size representation
//! - Constants for page arithmetic ([`PAGE_SIZE`], [`FILL_CHUNK`], etc.)
//! - [`ShutdownSignal`] - blocking wait for SIGINT/SIGTERM
//! - Progress reporting utilities ([`NamedProgress`])

mod constants;
mod named_progress;
mod shutdown;
mod size;

pub use self::constants::*;
pub use self::named_progress::NamedProgress;
pub use self::shutdown::{ShutdownError, ShutdownHandle, ShutdownSignal};
pub use self::size::Size;
