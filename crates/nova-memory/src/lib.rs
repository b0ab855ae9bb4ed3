//! Core memory: 65,536 addressable 16-bit words, with an optional chain of
//! handlers for memory-mapped extensions and a lazily-computed, per-word
//! disassembly cache invalidated on write.

use nova_core::CoreAccess;
use nova_disasm::Disassembler;

/// Total address space. Whether the top half is reachable depends on the
/// CPU's extended-addressing mode (`ext_core`), tracked by `nova-cpu`, not
/// here.
pub const CORE_WORDS: usize = 1 << 16;

/// The default, unexpanded core size: 32K words, addressable with 15 bits.
pub const DEFAULT_CORE_SIZE: usize = 0x8000;

/// A handler that can intercept a core access before the default RAM
/// behaviour applies. Returning `true` claims the access (the handler has
/// set `*value` itself and the default store/fetch is skipped).
pub trait CoreHandler: Send + Sync {
    fn read(&self, _addr: u16, _value: &mut u16, _how: CoreAccess) -> bool {
        false
    }
    fn write(&self, _addr: u16, _value: &mut u16, _how: CoreAccess) -> bool {
        false
    }
}

struct Cell {
    word: u16,
    disasm_cache: Option<String>,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            word: 0,
            disasm_cache: None,
        }
    }
}

/// The machine's main memory.
pub struct CoreMemory {
    cells: Vec<Cell>,
    size: usize,
    handlers: Vec<Box<dyn CoreHandler>>,
}

impl Default for CoreMemory {
    fn default() -> Self {
        Self::new(DEFAULT_CORE_SIZE)
    }
}

impl CoreMemory {
    /// # Panics
    /// Panics if `size` exceeds `CORE_WORDS`.
    #[must_use]
    pub fn new(size: usize) -> Self {
        assert!(size <= CORE_WORDS, "core size exceeds address space");
        let mut cells = Vec::with_capacity(CORE_WORDS);
        cells.resize_with(CORE_WORDS, Cell::default);
        Self {
            cells,
            size,
            handlers: Vec::new(),
        }
    }

    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    pub fn set_size(&mut self, size: usize) {
        assert!(size <= CORE_WORDS, "core size exceeds address space");
        self.size = size;
    }

    pub fn install_handler(&mut self, handler: Box<dyn CoreHandler>) {
        self.handlers.push(handler);
    }

    /// Read one word. Addresses at or beyond the current size read as
    /// zero, the way an unpopulated memory bank does on real hardware.
    pub fn read(&mut self, addr: u16, how: CoreAccess) -> u16 {
        if addr as usize >= self.size {
            return 0;
        }
        let mut rv = self.cells[addr as usize].word;
        for h in &self.handlers {
            if h.read(addr, &mut rv, how) {
                break;
            }
        }
        rv
    }

    /// Write one word, invalidating that address's disassembly cache.
    pub fn write(&mut self, addr: u16, mut value: u16, how: CoreAccess) {
        for h in &self.handlers {
            if h.write(addr, &mut value, how) {
                break;
            }
        }
        if (addr as usize) < self.cells.len() {
            let cell = &mut self.cells[addr as usize];
            cell.word = value;
            cell.disasm_cache = None;
        }
    }

    /// A pointer-equivalent accessor for deposit/examine use: peeks the
    /// raw stored word without running handlers or disturbing timing.
    #[must_use]
    pub fn peek(&self, addr: u16) -> u16 {
        self.cells.get(addr as usize).map_or(0, |c| c.word)
    }

    /// Deposit a word directly (front-panel semantics: no handler chain,
    /// but still invalidates the disassembly cache).
    pub fn deposit(&mut self, addr: u16, value: u16) {
        if let Some(cell) = self.cells.get_mut(addr as usize) {
            cell.word = value;
            cell.disasm_cache = None;
        }
    }

    /// The cached (or freshly computed) disassembly text for `addr`.
    pub fn disassemble(
        &mut self,
        addr: u16,
        disasm: &Disassembler,
        page_zero: &dyn Fn(u8) -> Option<&str>,
        device_name: &dyn Fn(u8) -> Option<String>,
    ) -> String {
        let idx = addr as usize;
        if idx >= self.cells.len() {
            return String::new();
        }
        if let Some(cached) = &self.cells[idx].disasm_cache {
            return cached.clone();
        }
        let word = self.cells[idx].word;
        let text = disasm.decode(word, page_zero, device_name);
        self.cells[idx].disasm_cache = Some(text.clone());
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_beyond_size_return_zero() {
        let mut core = CoreMemory::new(0x100);
        assert_eq!(core.read(0x200, CoreAccess::READ), 0);
    }

    #[test]
    fn write_then_read_round_trips() {
        let mut core = CoreMemory::default();
        core.write(10, 0xBEEF, CoreAccess::WRITE);
        assert_eq!(core.read(10, CoreAccess::READ), 0xBEEF);
    }

    #[test]
    fn write_invalidates_disassembly_cache() {
        let mut core = CoreMemory::default();
        let disasm = Disassembler::new();
        core.write(0, 0x8000, CoreAccess::WRITE);
        let first = core.disassemble(0, &disasm, &|_| None, &|_| None);
        core.write(0, 0x0000, CoreAccess::WRITE);
        let second = core.disassemble(0, &disasm, &|_| None, &|_| None);
        assert_ne!(first, second);
    }

    struct DoublingHandler;
    impl CoreHandler for DoublingHandler {
        fn read(&self, _addr: u16, value: &mut u16, _how: CoreAccess) -> bool {
            *value = value.wrapping_mul(2);
            true
        }
    }

    #[test]
    fn handler_can_claim_a_read() {
        let mut core = CoreMemory::default();
        core.write(0, 21, CoreAccess::WRITE);
        core.install_handler(Box::new(DoublingHandler));
        assert_eq!(core.read(0, CoreAccess::READ), 42);
    }
}
