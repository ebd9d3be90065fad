use std::{
    cmp::min,
    io,
    mem::ManuallyDrop,
    ptr::{NonNull, null_mut},
};

use indicatif::ProgressBar;
use libc::{MAP_ANONYMOUS, MAP_PRIVATE, PROT_READ, PROT_WRITE};
use log::{debug, trace, warn};

use super::Advice;
use crate::util::FILL_CHUNK;

/// An owned anonymous memory mapping.
///
/// The mapping is created with `mmap(MAP_PRIVATE | MAP_ANONYMOUS)` and is
/// unmapped exactly once: either by [`Region::release`], which reports the
/// result of `munmap`, or when the region is dropped.
#[derive(Debug)]
pub struct Region {
    ptr: NonNull<u8>,
    len: usize,
    advice: Advice,
}

// The region is exclusively owned, so moving it between threads is fine.
unsafe impl Send for Region {}

impl Region {
    /// Maps `len` bytes of private anonymous read/write memory.
    ///
    /// `flags` is or-ed into `MAP_PRIVATE | MAP_ANONYMOUS`, e.g. `MAP_HUGETLB | MAP_POPULATE`.
    ///
    /// # Errors
    ///
    /// Returns [`io::ErrorKind::InvalidInput`] for a zero length, and the OS
    /// error if `mmap` fails.
    pub fn map(len: usize, flags: libc::c_int) -> io::Result<Self> {
        if len == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "cannot map a zero-length region",
            ));
        }
        let p = unsafe {
            libc::mmap(
                null_mut(),
                len,
                PROT_READ | PROT_WRITE,
                MAP_PRIVATE | MAP_ANONYMOUS | flags,
                -1,
                0,
            )
        };
        if p == libc::MAP_FAILED {
            return Err(io::Error::last_os_error());
        }
        let ptr = NonNull::new(p as *mut u8).ok_or_else(|| io::Error::other("mmap returned NULL"))?;
        trace!("mmap({:p}, 0x{:x}, flags=0x{:x})", ptr, len, flags);
        Ok(Region {
            ptr,
            len,
            advice: Advice::None,
        })
    }

    /// Applies `advice` to the whole region.
    ///
    /// [`Advice::None`] issues no system call.
    ///
    /// # Errors
    ///
    /// Returns the OS error if `madvise` rejects the hint, e.g. `EINVAL` on a
    /// kernel without transparent huge page support.
    pub fn advise(&mut self, advice: Advice) -> io::Result<()> {
        if let Some(flag) = advice.flag() {
            let ret = unsafe { libc::madvise(self.ptr.as_ptr() as *mut libc::c_void, self.len, flag) };
            if ret != 0 {
                return Err(io::Error::last_os_error());
            }
            debug!("madvise({:p}, 0x{:x}, {:?})", self.ptr, self.len, advice);
        }
        self.advice = advice;
        Ok(())
    }

    /// Writes `byte` to every byte of the region, forcing it to be backed.
    pub fn fill(&mut self, byte: u8) {
        self.fill_with_progress(byte, None);
    }

    /// Like [`Region::fill`], reporting the number of written bytes to `progress`.
    pub fn fill_with_progress(&mut self, byte: u8, progress: Option<&ProgressBar>) {
        for offset in (0..self.len).step_by(FILL_CHUNK) {
            let count = min(FILL_CHUNK, self.len - offset);
            unsafe { std::ptr::write_bytes(self.ptr.as_ptr().byte_add(offset), byte, count) };
            if let Some(p) = progress {
                p.inc(count as u64);
            }
        }
    }

    /// Base address of the region.
    pub fn ptr(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// Length of the region in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always `false`, zero-length regions cannot be mapped.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The advice last applied with [`Region::advise`].
    pub fn advice(&self) -> Advice {
        self.advice
    }

    /// Views the region as a byte slice.
    pub fn as_slice(&self) -> &[u8] {
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// Unmaps the region and reports the result.
    ///
    /// # Errors
    ///
    /// Returns the OS error if `munmap` fails. The region is not unmapped
    /// again on drop either way.
    pub fn release(self) -> io::Result<()> {
        let this = ManuallyDrop::new(self);
        unsafe { this.unmap() }
    }

    /// # Safety
    ///
    /// Must be called at most once, and the region must not be accessed afterwards.
    unsafe fn unmap(&self) -> io::Result<()> {
        let ret = unsafe { libc::munmap(self.ptr.as_ptr() as *mut libc::c_void, self.len) };
        if ret != 0 {
            return Err(io::Error::last_os_error());
        }
        trace!("munmap({:p}, 0x{:x})", self.ptr, self.len);
        Ok(())
    }
}

impl Drop for Region {
    fn drop(&mut self) {
        if let Err(e) = unsafe { self.unmap() } {
            warn!("munmap({:p}, 0x{:x}) failed: {}", self.ptr, self.len, e);
        }
    }
}
