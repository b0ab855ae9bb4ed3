//! The assembled machine: core memory, CPU, interrupt controller, device
//! table, and the concrete drivers layered over it, all behind the one
//! entry point `step_one` advances.

use std::sync::Arc;

use nova_core::{DeviceNumber, Observable, SimTime, Value};
use nova_cpu::{Bus, Cpu};
use nova_devices::{DriverTable, Rtc, TtyInput, TtyOutput};
use nova_disasm::Disassembler;
use nova_elastic::Elastic;
use nova_interrupt::InterruptController;
use nova_io::{default_assignment, Device, DeviceTable};
use nova_memory::CoreMemory;
use nova_scheduler::{CalloutKind, Scheduler};
use nova_timing::CpuModel;

use crate::hook::MachineHook;
use crate::pacer::Pacer;
use crate::rom::{self, UnimplementedRom};

/// Everything one `step_one()` call touches, assembled once at startup.
pub struct Machine {
    pub core: CoreMemory,
    pub cpu: Cpu,
    pub interrupts: InterruptController,
    pub devices: DeviceTable,
    pub drivers: DriverTable,
    pub scheduler: Scheduler,
    pub disasm: Disassembler,
    pub sim_time: SimTime,
    pub pacer: Pacer,
    tty_in: Arc<Elastic>,
    tty_out: Arc<Elastic>,
}

fn install(devices: &mut DeviceTable, interrupts: &mut InterruptController, devno: DeviceNumber, name: &str, prio_bit: u16) {
    devices.install(Device::new(devno, name, prio_bit));
    interrupts.set_priority(devno, prio_bit);
}

impl Machine {
    /// Build a machine with the factory console (TTI/TTO) and real-time
    /// clock installed, matching the devices a stock RC3600 ships with.
    #[must_use]
    pub fn new(model: CpuModel) -> Self {
        let mut cpu = Cpu::new(model);
        cpu.ident = match model {
            CpuModel::Rc3703 | CpuModel::Rc3803 => 0x20,
            _ => 0,
        };

        let mut devices = DeviceTable::new();
        let mut interrupts = InterruptController::new();
        let mut drivers = DriverTable::new();

        let tty_in = Arc::new(Elastic::new());
        let tty_out = Arc::new(Elastic::new());

        let tti = default_assignment("TTI", 0).expect("TTI is a factory assignment");
        let tto = default_assignment("TTO", 0).expect("TTO is a factory assignment");
        let rtc = default_assignment("RTC", 0).expect("RTC is a factory assignment");

        let tti_bit = 1u16 << tti.imask.expect("TTI interrupts");
        let tto_bit = 1u16 << tto.imask.expect("TTO interrupts");
        let rtc_bit = 1u16 << rtc.imask.expect("RTC interrupts");

        install(&mut devices, &mut interrupts, DeviceNumber::new(tti.devno), "TTI", tti_bit);
        install(&mut devices, &mut interrupts, DeviceNumber::new(tto.devno), "TTO", tto_bit);
        install(&mut devices, &mut interrupts, DeviceNumber::new(rtc.devno), "RTC", rtc_bit);

        drivers.install(DeviceNumber::new(tti.devno), Box::new(TtyInput::new(Arc::clone(&tty_in))));
        drivers.install(DeviceNumber::new(tto.devno), Box::new(TtyOutput::new(Arc::clone(&tty_out))));
        drivers.install(DeviceNumber::new(rtc.devno), Box::new(Rtc::new()));

        let mut disasm = Disassembler::new();
        nova_cpu::install_mnemonics(&mut disasm);

        Self {
            core: CoreMemory::default(),
            cpu,
            interrupts,
            devices,
            drivers,
            scheduler: Scheduler::new(),
            disasm,
            sim_time: SimTime::ZERO,
            pacer: Pacer::new(),
            tty_in,
            tty_out,
        }
    }

    /// The pipe a host terminal feeds keystrokes into.
    #[must_use]
    pub fn console_input(&self) -> &Arc<Elastic> {
        &self.tty_in
    }

    /// The pipe the console prints to.
    #[must_use]
    pub fn console_output(&self) -> &Arc<Elastic> {
        &self.tty_out
    }

    /// Front-panel `examine`: the raw word stored at `addr`, with no
    /// handler side effects.
    #[must_use]
    pub fn examine(&self, addr: u16) -> u16 {
        self.core.peek(addr)
    }

    /// Front-panel `deposit`: store a word directly.
    pub fn deposit(&mut self, addr: u16, value: u16) {
        self.core.deposit(addr, value);
    }

    /// Query a CPU register by `Observable` path (`"pc"`, `"ac.0"`, ...).
    #[must_use]
    pub fn query(&self, path: &str) -> Option<Value> {
        self.cpu.query(path)
    }

    pub fn set_breakpoint(&mut self, addr: Option<u16>) {
        self.cpu.breakpoint = addr;
    }

    /// Copy the autoload ROM selected by the current switch register
    /// into the first 32 core words and ready the machine to run it.
    pub fn autoload(&mut self) -> Result<(), UnimplementedRom> {
        let rom = rom::select(self.cpu.switches)?;
        for (addr, word) in rom.iter().enumerate() {
            self.core.deposit(addr as u16, *word);
        }
        self.cpu.pc = 0;
        self.cpu.npc = 0;
        self.cpu.running = true;
        Ok(())
    }

    /// Run exactly one instruction, including the breakpoint check,
    /// pending-interrupt delivery, and post-instruction device/callout
    /// bookkeeping `cpu_thread` performs around `rc3600_exec`.
    ///
    /// The breakpoint is checked, and `running` cleared, *before* the
    /// instruction at that address executes — but it still executes:
    /// only the next call to `step_one` (or the run loop's next
    /// iteration) observes `running == false` and stops.
    pub fn step_one(&mut self) {
        if self.cpu.breakpoint == Some(self.cpu.pc) {
            println!("BREAKPOINT 0x{:04x}", self.cpu.pc);
            self.cpu.running = false;
        }

        let timing = self.cpu.model.timing();
        let mut hook = MachineHook {
            drivers: &mut self.drivers,
            scheduler: &mut self.scheduler,
            now: self.sim_time,
        };
        let mut bus = Bus::with_driver_hook(&mut self.core, &mut self.devices, &mut self.interrupts, &mut hook);
        nova_cpu::step(&mut self.cpu, &mut bus, &timing);

        self.sim_time = self.sim_time + SimTime::new(self.cpu.duration);

        let (due, _next) = self.scheduler.poll(self.sim_time);
        for callout in due {
            match callout.kind {
                CalloutKind::DeviceCompletes => {
                    self.drivers.dispatch_completes(callout.devno, &mut self.devices, &mut self.interrupts);
                }
                CalloutKind::WakeDevice => {}
            }
        }
        self.drivers.poll_workers(&mut self.devices, &mut self.interrupts);
    }

    /// `IORST`-adjacent full reset: CPU, interrupt controller, and every
    /// installed device, matching what the synthetic `IORST` opcode
    /// triggers plus a cold front-panel reset of `sim_time`/pacing.
    pub fn reset(&mut self) {
        self.cpu.reset_io();
        self.interrupts.reset();
        self.devices.reset_all();
        self.drivers.reset_all(&mut self.devices);
        self.pacer = Pacer::new();
    }

    /// The word currently stored at `addr`, read with no handler side
    /// effects — the pacer's "is this a JMP-to-self halt loop" peek.
    #[must_use]
    pub fn peek_for_pacer(&self, addr: u16) -> u16 {
        self.core.peek(addr)
    }

    /// Whether there is a due callout and when, without draining it —
    /// used by the pacer to avoid oversleeping past a scheduled event.
    #[must_use]
    pub fn next_callout(&self) -> Option<SimTime> {
        self.scheduler.next_when()
    }

    #[must_use]
    pub fn irq_list_is_empty(&self) -> bool {
        self.interrupts.irq_list_is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_machine_has_console_and_clock_installed() {
        let m = Machine::new(CpuModel::Nova);
        assert!(m.devices.is_installed(DeviceNumber::new(8))); // TTI
        assert!(m.devices.is_installed(DeviceNumber::new(9))); // TTO
        assert!(m.devices.is_installed(DeviceNumber::new(12))); // RTC
        assert!(m.drivers.has_driver(DeviceNumber::new(8)));
        assert!(m.drivers.has_driver(DeviceNumber::new(9)));
        assert!(m.drivers.has_driver(DeviceNumber::new(12)));
    }

    #[test]
    fn autoload_copies_appendix_a_and_starts_running() {
        let mut m = Machine::new(CpuModel::Nova);
        m.cpu.switches = 0;
        m.autoload().unwrap();
        assert_eq!(m.examine(0), 0o060477);
        assert_eq!(m.examine(31), 0o000035);
        assert_eq!(m.cpu.pc, 0);
        assert!(m.cpu.running);
    }

    #[test]
    fn autoload_rejects_unimplemented_switch_setting() {
        let mut m = Machine::new(CpuModel::Nova);
        m.cpu.switches = 0o01;
        assert_eq!(m.autoload(), Err(UnimplementedRom(0o01)));
    }

    #[test]
    fn step_one_executes_a_halt() {
        let mut m = Machine::new(CpuModel::Nova);
        m.deposit(0, 0x663f); // HALT 0
        m.cpu.pc = 0;
        m.cpu.running = true;
        m.step_one();
        assert!(!m.cpu.running);
        assert_eq!(m.cpu.pc, 1);
    }

    #[test]
    fn breakpoint_halts_after_executing_the_matched_instruction() {
        let mut m = Machine::new(CpuModel::Nova);
        m.deposit(5, 0x8000 | (2 << 8)); // MOV 0,0 (a no-op ALU instruction)
        m.cpu.pc = 5;
        m.cpu.running = true;
        m.set_breakpoint(Some(5));
        m.step_one();
        assert!(!m.cpu.running, "breakpoint should clear running");
        assert_eq!(m.cpu.pc, 6, "the breakpointed instruction still executes once");
    }

    #[test]
    fn tto_write_routes_through_its_driver_not_the_generic_handler() {
        let mut m = Machine::new(CpuModel::Nova);
        m.deposit(0, 0x6000 | (2 << 8) | (1 << 6) | 9); // DOAS 0,TTO
        m.cpu.ac[0] = u16::from(b'A');
        m.cpu.pc = 0;
        m.cpu.running = true;
        m.step_one();
        assert!(m.devices.get(DeviceNumber::new(9)).unwrap().busy);
        assert!(!m.scheduler.is_empty(), "TTO schedules a completion callout");
    }
}
