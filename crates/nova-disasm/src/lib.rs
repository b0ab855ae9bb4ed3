//! Disassembler for the Nova/RC3600 16-bit instruction word.
//!
//! Pure function of the instruction word plus two optional lookups (a
//! page-zero symbol table and an I/O device name table); never touches
//! core memory itself. Callers own the per-address decode cache.

use std::collections::HashMap;

const ALU: [&str; 8] = ["COM", "NEG", "MOV", "INC", "ADC", "SUB", "ADD", "AND"];
const CARRY: [&str; 4] = [" ", "Z", "O", "C"];
const SHIFT: [&str; 4] = [" ", "L", "R", "S"];
const SKIP: [&str; 8] = [
    "    ", ",SKP", ",SZC", ",SNC", ",SZR", ",SNR", ",SEZ", ",SBN",
];
const HASH: [&str; 2] = ["   ", " # "];
const JJID: [&str; 4] = ["JMP", "JSR", "ISZ", "DSZ"];
const AT: [&str; 2] = ["   ", " @ "];
const LDST: [Option<&str>; 4] = [None, Some("LDA"), Some("STA"), None];
const IO: [&str; 8] = ["NIO", "DIA", "DOA", "DIB", "DOB", "DIC", "DOC", "SKP"];
const TEST: [&str; 4] = ["BN", "BZ", "DN", "DZ"];
const FUNC: [&str; 4] = ["  ", "S ", "C ", "P "];

/// An overridable mnemonic table for synthetic opcodes (NOP, HALT, IORST,
/// CPU720 extensions, ...) that don't fit the generic bit layouts below.
#[derive(Debug, Default)]
pub struct Disassembler {
    magics: HashMap<u16, String>,
}

impl Disassembler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install (or replace) the mnemonic text for one exact instruction
    /// word. A magic entry fully replaces the default decode for that
    /// word; it is not merged with it.
    pub fn set_magic(&mut self, word: u16, text: impl Into<String>) {
        self.magics.insert(word, text.into());
    }

    /// Decode one instruction word to its mnemonic text.
    ///
    /// `page_zero` maps a page-zero address (0-255) to a symbolic name,
    /// used only for PC-relative-mode-0 operands. `device_name` maps an
    /// I/O device select code to its installed driver name.
    #[must_use]
    pub fn decode(
        &self,
        word: u16,
        page_zero: &dyn Fn(u8) -> Option<&str>,
        device_name: &dyn Fn(u8) -> Option<String>,
    ) -> String {
        if let Some(m) = self.magics.get(&word) {
            return m.clone();
        }

        if word & 0x8000 != 0 {
            format_alu(word)
        } else if word & 0xe000 == 0x0000 {
            format_mem_ref(word, page_zero)
        } else if word & 0xe000 == 0x6000 {
            format_io(word, device_name)
        } else {
            format_ldsta(word, page_zero)
        }
    }
}

fn displ(word: u16, page_zero: &dyn Fn(u8) -> Option<&str>) -> String {
    let mode = (word >> 8) & 3;
    if mode == 0 {
        let idx = (word & 0x3ff) as u8;
        if let Some(name) = page_zero(idx) {
            return name.to_string();
        }
    }
    let i = (word & 0xff) as i32;
    if mode != 0 && i > 0x7f {
        format!("-{:02x},{} ", 256 - i, mode)
    } else {
        format!("+{i:02x},{mode} ")
    }
}

/// The PC-relative branch target offset encoded by a mode-1 operand, if
/// the instruction uses mode 1; `None` otherwise (matches the original's
/// `Rc3600Disass_NO_OFFSET` convention).
#[must_use]
pub fn pc_relative_offset(word: u16) -> Option<i16> {
    let mode = (word >> 8) & 3;
    if mode != 1 {
        return None;
    }
    let mut i = (word & 0xff) as i16;
    if i > 0x7f {
        i -= 256;
    }
    Some(i)
}

fn format_alu(word: u16) -> String {
    let mut buf = String::new();
    buf.push_str(ALU[usize::from((word >> 8) & 7)]);
    buf.push_str(CARRY[usize::from((word >> 4) & 3)]);
    buf.push_str(SHIFT[usize::from((word >> 6) & 3)]);
    buf.push_str(HASH[usize::from((word >> 3) & 1)]);
    buf.push_str(&format!("{},{}", (word >> 13) & 3, (word >> 11) & 3));
    buf.push_str(SKIP[usize::from(word & 7)]);
    buf
}

fn format_mem_ref(word: u16, page_zero: &dyn Fn(u8) -> Option<&str>) -> String {
    let mut buf = String::new();
    buf.push_str(JJID[usize::from((word >> 11) & 3)]);
    buf.push_str(AT[usize::from((word >> 10) & 1)]);
    buf.push_str(&displ(word, page_zero));
    buf.push_str("  ");
    buf
}

fn format_io(word: u16, device_name: &dyn Fn(u8) -> Option<String>) -> String {
    let devno = (word & 0x3f) as u8;
    let name = device_name(devno).unwrap_or_else(|| format!("{devno:02x}"));
    let op = (word >> 8) & 7;
    let mut buf = String::new();
    buf.push_str(IO[usize::from(op)]);
    if op == 7 {
        buf.push_str(TEST[usize::from((word >> 6) & 3)]);
        buf.push_str(&format!("   {name}     "));
    } else {
        buf.push_str(FUNC[usize::from((word >> 6) & 3)]);
        buf.push_str(&format!(" {},{}     ", (word >> 11) & 3, name));
    }
    buf
}

fn format_ldsta(word: u16, page_zero: &dyn Fn(u8) -> Option<&str>) -> String {
    let mut buf = String::new();
    buf.push_str(LDST[usize::from((word >> 13) & 3)].unwrap_or("???"));
    buf.push_str(AT[usize::from((word >> 10) & 1)]);
    buf.push_str(&format!("{},", (word >> 11) & 3));
    buf.push_str(&displ(word, page_zero));
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_pz(_: u8) -> Option<&'static str> {
        None
    }
    fn no_dev(_: u8) -> Option<String> {
        None
    }

    #[test]
    fn alu_mov_decodes() {
        // MOV 0,1, no carry/shift/skip/no-load
        let word = 0x8000 | (2 << 8) | (0 << 13) | (1 << 11);
        let d = Disassembler::new();
        let text = d.decode(word, &no_pz, &no_dev);
        assert!(text.starts_with("MOV"));
    }

    #[test]
    fn mem_ref_jmp_decodes() {
        let word = 0x0000 | (0 << 11); // JMP, mode 0
        let d = Disassembler::new();
        assert!(d.decode(word, &no_pz, &no_dev).starts_with("JMP"));
    }

    #[test]
    fn io_uses_device_name() {
        let word = 0x6000 | (1 << 8) | 5; // DIA, device 5
        let d = Disassembler::new();
        let text = d.decode(word, &no_pz, &|n| (n == 5).then(|| "TTI".to_string()));
        assert!(text.contains("TTI"));
    }

    #[test]
    fn magic_override_replaces_default() {
        let mut d = Disassembler::new();
        d.set_magic(0x663f, "HALT   0");
        assert_eq!(d.decode(0x663f, &no_pz, &no_dev), "HALT   0");
    }

    #[test]
    fn pc_relative_offset_is_signed() {
        // mode 1, displacement 0xff -> -1
        let word = (1 << 8) | 0xff;
        assert_eq!(pc_relative_offset(word), Some(-1));
        assert_eq!(pc_relative_offset(0), None);
    }
}
