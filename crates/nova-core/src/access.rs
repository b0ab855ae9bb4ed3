//! Flags describing why core memory is being touched.
//!
//! Mirrors the `CORE_*` bitmask from the original implementation: the CPU
//! pacer uses these to decide whether a read counted as "useful progress"
//! (data/instruction fetches do, null probes and indirection steps don't).

/// A set of reasons for a core memory access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CoreAccess(u16);

impl CoreAccess {
    pub const NULL: Self = Self(0);
    pub const READ: Self = Self(1 << 0);
    pub const WRITE: Self = Self(1 << 1);
    pub const MODIFY: Self = Self(1 << 2);
    pub const DMA: Self = Self(1 << 3);
    pub const INS: Self = Self(1 << 4);
    pub const INDIR: Self = Self(1 << 5);
    pub const DATA: Self = Self(1 << 6);

    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl core::ops::BitOr for CoreAccess {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_and_ins_combine() {
        let how = CoreAccess::READ | CoreAccess::INS;
        assert!(how.contains(CoreAccess::READ));
        assert!(how.contains(CoreAccess::INS));
        assert!(!how.contains(CoreAccess::WRITE));
    }

    #[test]
    fn null_contains_nothing_but_itself() {
        assert!(CoreAccess::NULL.contains(CoreAccess::NULL));
        assert!(!CoreAccess::NULL.contains(CoreAccess::READ));
    }
}
