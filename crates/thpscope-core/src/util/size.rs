/// Memory size representation supporting common units.
///
/// All units use binary (base-2) multipliers (1 KB = 1024 bytes).
///
/// # Examples
///
/// ```
/// use thpscope_core::util::Size;
///
/// let size = Size::MB(10);
/// assert_eq!(size.bytes(), 10 * 1024 * 1024);
///
/// let large = Size::GB(2);
/// assert_eq!(large.bytes(), 2 * (1 << 30));
/// ```
#[derive(Clone, Copy, Debug)]
pub enum Size {
    /// Size in bytes
    B(usize),
    /// Size in kilobytes (1 KB = 1024 bytes)
    KB(usize),
    /// Size in megabytes (1 MB = 1024 KB)
    MB(usize),
    /// Size in gigabytes (1 GB = 1024 MB)
    GB(usize),
}

impl Size {
    /// Converts this size to bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// use thpscope_core::util::Size;
    ///
    /// assert_eq!(Size::B(100).bytes(), 100);
    /// assert_eq!(Size::KB(1).bytes(), 1024);
    /// assert_eq!(Size::MB(1).bytes(), 1048576);
    /// assert_eq!(Size::GB(1).bytes(), 1073741824);
    /// ```
    pub const fn bytes(&self) -> usize {
        match self {
            Size::B(bytes) => *bytes,
            Size::KB(kb) => *kb * (1 << 10),
            Size::MB(mb) => *mb * (1 << 20),
            Size::GB(gb) => *gb * (1 << 30),
        }
    }

    /// The count in this size's own unit.
    const fn raw(&self) -> usize {
        match self {
            Size::B(v) | Size::KB(v) | Size::MB(v) | Size::GB(v) => *v,
        }
    }

    /// Converts this size to bytes, returning `None` on overflow.
    pub const fn checked_bytes(&self) -> Option<usize> {
        match self {
            Size::B(bytes) => Some(*bytes),
            Size::KB(kb) => kb.checked_mul(1 << 10),
            Size::MB(mb) => mb.checked_mul(1 << 20),
            Size::GB(gb) => gb.checked_mul(1 << 30),
        }
    }

    /// Returns `true` if this size is a non-zero multiple of `unit`.
    ///
    /// Sizes whose byte count overflows `usize` are never a multiple.
    pub const fn is_multiple_of(&self, unit: Size) -> bool {
        match (self.checked_bytes(), unit.checked_bytes()) {
            (Some(bytes), Some(unit)) => unit != 0 && bytes != 0 && bytes % unit == 0,
            _ => false,
        }
    }

    /// Multiplies this size by `n`, keeping the unit.
    ///
    /// Returns `None` on overflow.
    pub const fn checked_mul(&self, n: usize) -> Option<Size> {
        match self {
            Size::B(v) => match v.checked_mul(n) {
                Some(v) => Some(Size::B(v)),
                None => None,
            },
            Size::KB(v) => match v.checked_mul(n) {
                Some(v) => Some(Size::KB(v)),
                None => None,
            },
            Size::MB(v) => match v.checked_mul(n) {
                Some(v) => Some(Size::MB(v)),
                None => None,
            },
            Size::GB(v) => match v.checked_mul(n) {
                Some(v) => Some(Size::GB(v)),
                None => None,
            },
        }
    }
}

impl PartialEq for Size {
    fn eq(&self, other: &Self) -> bool {
        match (self.checked_bytes(), other.checked_bytes()) {
            (Some(a), Some(b)) => a == b,
            // overflowing sizes only equal themselves
            _ => {
                std::mem::discriminant(self) == std::mem::discriminant(other)
                    && self.raw() == other.raw()
            }
        }
    }
}

impl Eq for Size {}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Size::B(bytes) => write!(f, "{} B", bytes),
            Size::KB(kb) => write!(f, "{} KB", kb),
            Size::MB(mb) => write!(f, "{} MB", mb),
            Size::GB(gb) => write!(f, "{} GB", gb),
        }
    }
}
