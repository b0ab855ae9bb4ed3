//! The CPU's architectural register state.

use nova_core::{Observable, Value};
use nova_timing::CpuModel;

/// The four accumulators, carry flag, program counter, and the other
/// pieces of state that survive between instructions.
pub struct Cpu {
    pub ac: [u16; 4],
    pub carry: bool,
    /// Address of the instruction currently executing.
    pub pc: u16,
    /// Address of the next instruction; instruction executors that
    /// branch overwrite this instead of `pc`.
    pub npc: u16,
    /// Extended (16-bit) addressing mode. Off by default (15-bit core).
    pub ext_core: bool,
    /// The one-instruction-delayed interrupt-enable shift register:
    /// `inten[0]` is live this instruction, `inten[1]` becomes live next
    /// instruction, `inten[2]` is staged by INTEN/synthetic opcodes.
    pub inten: [bool; 3],
    pub running: bool,
    pub model: CpuModel,
    /// The CPU720 `IDFY` identification byte.
    pub ident: u8,
    /// The front-panel data switch register, read by `READS`.
    pub switches: u16,
    /// Instruction execution paused here; `None` means no breakpoint set.
    pub breakpoint: Option<u16>,
    /// Running total of nanoseconds charged so far this instruction; the
    /// caller adds this to `sim_time` after `step()` returns.
    pub duration: u64,
    pub ins_count: u64,
}

impl Default for Cpu {
    fn default() -> Self {
        Self {
            ac: [0; 4],
            carry: false,
            pc: 0,
            npc: 0,
            ext_core: false,
            inten: [false; 3],
            running: false,
            model: CpuModel::default(),
            ident: 0,
            switches: 0,
            breakpoint: None,
            duration: 0,
            ins_count: 0,
        }
    }
}

impl Cpu {
    #[must_use]
    pub fn new(model: CpuModel) -> Self {
        Self {
            model,
            ..Self::default()
        }
    }

    /// `IORST`'s CPU-local effect: drop back to 15-bit addressing and
    /// clear the interrupt-enable shift register. Device and interrupt
    /// controller resets happen separately.
    pub fn reset_io(&mut self) {
        self.ext_core = false;
        self.inten = [false; 3];
    }

    /// Advance the interrupt-enable shift register by one instruction
    /// slot, called once at the end of every executed instruction.
    pub fn shift_inten(&mut self) {
        self.inten[0] = self.inten[1];
        self.inten[1] = self.inten[2];
    }
}

impl Observable for Cpu {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "pc" => Some(Value::U16(self.pc)),
            "carry" => Some(Value::Bool(self.carry)),
            "ac.0" => Some(Value::U16(self.ac[0])),
            "ac.1" => Some(Value::U16(self.ac[1])),
            "ac.2" => Some(Value::U16(self.ac[2])),
            "ac.3" => Some(Value::U16(self.ac[3])),
            "ext_core" => Some(Value::Bool(self.ext_core)),
            "running" => Some(Value::Bool(self.running)),
            "ident" => Some(Value::U8(self.ident)),
            "model" => Some(Value::String(self.model.name().to_string())),
            "ins_count" => Some(Value::U64(self.ins_count)),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "pc", "carry", "ac.0", "ac.1", "ac.2", "ac.3", "ext_core", "running", "ident",
            "model", "ins_count",
        ]
    }
}
