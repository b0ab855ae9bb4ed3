//! The fixed 32-word autoload ROMs, selected by the front-panel switch
//! register's low 6 bits, and published as RCSL 52-AA894's lettered
//! appendices.

/// Appendix A: initialize the CPU711 console interface and write
/// correct parity into every memory location.
const APPENDIX_A: [u16; 32] = [
    0o060477, 0o101220, 0o024033, 0o107000, 0o066011, 0o101300, 0o024034, 0o107620, 0o030035,
    0o133000, 0o025000, 0o030033, 0o125002, 0o125300, 0o147300, 0o066011, 0o024036, 0o067011,
    0o030035, 0o051000, 0o151404, 0o000023, 0o062677, 0o007402, 0o002406, 0o004012, 0o006016,
    0o030116, 0o000017, 0o000027, 0o000047, 0o000035,
];

/// Appendix C: console echo / character generator test pattern. The
/// original's initializer only lists words through address 034
/// (`CSPACE`); the trailing three words are implicitly zero, matching
/// C's static-initializer padding.
const APPENDIX_C: [u16; 32] = [
    0o060477, 0o101102, 0o000011, 0o060110, 0o063610, 0o000004, 0o060610, 0o004025, 0o000003,
    0o020031, 0o040000, 0o020034, 0o004025, 0o101400, 0o014000, 0o000014, 0o020033, 0o004025,
    0o020032, 0o004025, 0o000011, 0o061111, 0o063611, 0o000026, 0o001400, 0o000120, 0o000012,
    0o000015, 0o000040, 0, 0, 0,
];

/// Appendix D: the generic "find and load from a device whose number is
/// read off the switches" loader, used for any switch setting not
/// otherwise assigned.
const APPENDIX_D: [u16; 32] = [
    0o060477, 0o105120, 0o124240, 0o010011, 0o010031, 0o010033, 0o010014, 0o125404, 0o000003,
    0o060077, 0o030017, 0o050377, 0o063377, 0o000011, 0o101102, 0o000377, 0o004031, 0o101065,
    0o000020, 0o004030, 0o046027, 0o010100, 0o000023, 0o000077, 0o126420, 0o063577, 0o000031,
    0o060477, 0o107363, 0o000031, 0o125300, 0o001400,
];

/// Appendix 3 ("appendix E" in the original's variable name): card
/// reader program load, for a CRC 705 or equivalent reader.
const APPENDIX_E: [u16; 32] = [
    0o020006, 0o004007, 0o004022, 0o020110, 0o142004, 0o063077, 0o000041, 0o062016, 0o061116,
    0o063516, 0o000010, 0o063516, 0o000013, 0o001400, 0o000000, 0o177730, 0o000040, 0o000040,
    0o152400, 0o020017, 0o040016, 0o022020, 0o101300, 0o026020, 0o107000, 0o046021, 0o133000,
    0o010016, 0o000025, 0o151004, 0o063077, 0o001400,
];

/// Appendix F: program load from flexible disc, falling back to a
/// moving-head disc or magtape as a secondary load medium.
const APPENDIX_F: [u16; 32] = [
    0o070477, 0o150122, 0o000026, 0o151240, 0o010010, 0o010013, 0o151404, 0o000004, 0o071077,
    0o024015, 0o044377, 0o063377, 0o000010, 0o000377, 0o126420, 0o061461, 0o107363, 0o000017,
    0o046025, 0o010100, 0o000016, 0o000077, 0o030037, 0o071161, 0o063461, 0o000027, 0o063661,
    0o000032, 0o151102, 0o000027, 0o000016, 0o101000,
];

/// Appendix G: program load from disk and other high-speed devices.
const APPENDIX_G: [u16; 32] = [
    0o064477, 0o020037, 0o123400, 0o100404, 0o010031, 0o010032, 0o010022, 0o010025, 0o101404,
    0o000004, 0o125102, 0o000022, 0o004030, 0o175000, 0o004030, 0o175400, 0o004030, 0o175000,
    0o061100, 0o030027, 0o050377, 0o063400, 0o000022, 0o000377, 0o025400, 0o065300, 0o064400,
    0o131300, 0o133405, 0o000032, 0o001401, 0o000077,
];

/// A switch setting the original's `AutoRom` never assigns a ROM
/// payload for (it asserts instead): the memory test program and the
/// disc storage module loaders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnimplementedRom(pub u8);

impl std::fmt::Display for UnimplementedRom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "no autoload ROM for switch setting 0o{:02o}", self.0)
    }
}

impl std::error::Error for UnimplementedRom {}

/// Select the 32-word ROM payload for the low 6 bits of the front-panel
/// switch register, matching `AutoRom`'s `switch (cs->switches & 0x3f)`.
pub fn select(switches: u16) -> Result<&'static [u16; 32], UnimplementedRom> {
    match switches & 0x3f {
        0o00 => Ok(&APPENDIX_A),
        0o01 => Err(UnimplementedRom(0o01)), // memory test program
        0o02 => Ok(&APPENDIX_C),
        0o16 | 0o56 => Ok(&APPENDIX_E),
        0o20 => Err(UnimplementedRom(0o20)), // disc storage module
        0o61 => Ok(&APPENDIX_F),
        0o73 => Ok(&APPENDIX_G),
        _ => Ok(&APPENDIX_D),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switches_zero_selects_appendix_a() {
        let rom = select(0).unwrap();
        assert_eq!(rom[0], 0o060477);
        assert_eq!(rom[31], 0o000035);
    }

    #[test]
    fn appendix_c_is_zero_padded_past_cspace() {
        let rom = select(0o02).unwrap();
        assert_eq!(rom[29], 0);
        assert_eq!(rom[30], 0);
        assert_eq!(rom[31], 0);
    }

    #[test]
    fn unassigned_switch_falls_back_to_appendix_d() {
        let rom = select(0o17).unwrap();
        assert_eq!(rom[0], 0o060477);
        assert_eq!(rom[1], 0o105120);
    }

    #[test]
    fn memory_test_and_disc_storage_are_unimplemented() {
        assert_eq!(select(0o01), Err(UnimplementedRom(0o01)));
        assert_eq!(select(0o20), Err(UnimplementedRom(0o20)));
    }

    #[test]
    fn card_reader_switch_aliases_share_appendix_e() {
        assert_eq!(select(0o16).unwrap(), select(0o56).unwrap());
    }
}
