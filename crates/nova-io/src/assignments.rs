//! The default device-number/interrupt-priority assignment table.
//!
//! Reproduces the standard factory device numbers and priority levels
//! for the peripherals this emulator knows about. A handful of
//! less-common synchronous-line (BSC/HLC) variants are omitted: their
//! device numbers weren't present in the retrieved source excerpt this
//! table was grounded on, and guessing would be worse than leaving them
//! out — `default_assignment` returns `None` for an unrecognised name
//! rather than a fabricated slot.

/// One factory device assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub name: &'static str,
    pub unit: u8,
    /// Device select code (decimal; the original documents these in
    /// octal — ASL unit 0 is device 005 octal, i.e. 5 decimal here).
    pub devno: u8,
    /// Interrupt priority bit position, or `None` for devices that never
    /// interrupt (e.g. the front-panel switch register).
    pub imask: Option<u8>,
}

const fn a(name: &'static str, unit: u8, devno: u8, imask: Option<u8>) -> Assignment {
    Assignment {
        name,
        unit,
        devno,
        imask,
    }
}

/// The factory table, in device.c's declaration order.
pub const ASSIGNMENTS: &[Assignment] = &[
    a("ASL", 0, 5, None),
    a("TTI", 0, 8, Some(14)),
    a("TTO", 0, 9, Some(15)),
    a("PTR", 0, 10, Some(11)),
    a("PTR", 1, 19, Some(11)),
    a("PTP", 0, 11, Some(13)),
    a("PTP", 1, 25, Some(13)),
    a("RTC", 0, 12, Some(13)),
    a("PLT", 0, 13, Some(12)),
    a("SPC", 0, 17, Some(9)),
    a("SPC", 1, 18, Some(9)),
    a("SPC", 2, 13, Some(9)),
    a("CDR", 0, 14, Some(10)),
    a("CDR", 1, 46, Some(10)),
    a("LPT", 0, 15, Some(12)),
    a("LPT", 1, 47, Some(12)),
    a("DSC", 0, 16, Some(4)),
    a("AMX", 0, 42, Some(2)),
    a("AMX", 1, 43, Some(2)),
    a("AMX", 2, 20, Some(2)),
    a("AMX", 3, 62, Some(2)),
    a("MT", 0, 24, Some(5)),
    a("MT", 1, 36, Some(5)),
    a("FDD", 0, 49, Some(7)),
    a("FDD", 1, 52, Some(7)),
    a("CRP", 0, 50, Some(10)),
    a("DTC", 0, 54, Some(9)),
    a("DST", 0, 56, None),
    a("DOT", 0, 57, None),
    a("CNT", 0, 58, None),
    a("DKP", 0, 59, Some(7)),
    a("CPU", 0, 63, None),
];

/// Look up a peripheral's factory device number and priority by driver
/// name and unit number.
#[must_use]
pub fn default_assignment(name: &str, unit: u8) -> Option<Assignment> {
    ASSIGNMENTS
        .iter()
        .copied()
        .find(|asn| asn.name == name && asn.unit == unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tti_tto_are_adjacent() {
        let tti = default_assignment("TTI", 0).unwrap();
        let tto = default_assignment("TTO", 0).unwrap();
        assert_eq!(tti.devno, 8);
        assert_eq!(tto.devno, 9);
    }

    #[test]
    fn unknown_name_returns_none() {
        assert!(default_assignment("NOPE", 0).is_none());
    }

    #[test]
    fn cpu_has_no_priority() {
        assert_eq!(default_assignment("CPU", 0).unwrap().imask, None);
    }
}
