//! The real-time clock device: a four-rate interval timer, entirely
//! callout-driven (no worker thread — the original offers one as a
//! compile-time alternative it doesn't actually use).

use nova_core::SimTime;
use nova_interrupt::InterruptController;
use nova_io::{std_io, Device, IoAction, IoOper};
use nova_scheduler::{CalloutKind, Scheduler};

use crate::driver::DeviceDriver;

/// One interrupt every 1/50, 1/10, 1/100, or 1/1000 of a second,
/// selected by the low two bits written to the rate register.
fn rate_ns(selector: u8) -> u64 {
    match selector & 3 {
        0 => 1_000_000_000 / 50,
        1 => 1_000_000_000 / 10,
        2 => 1_000_000_000 / 100,
        _ => 1_000_000_000 / 1000,
    }
}

/// The clock. `rate_reg` holds the last value written by a `DOA`, so a
/// `START` with no preceding `DOA` free-runs at the 50Hz default.
#[derive(Default)]
pub struct Rtc {
    rate_reg: u8,
}

impl Rtc {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl DeviceDriver for Rtc {
    fn on_io(
        &mut self,
        dev: &mut Device,
        interrupts: &mut InterruptController,
        scheduler: &mut Scheduler,
        now: SimTime,
        ac: &mut u16,
        ioi: u16,
    ) -> IoAction {
        if IoOper::decode(ioi).is_output() {
            self.rate_reg = *ac as u8;
        }
        let action = std_io(dev, interrupts, ioi);
        if action == IoAction::Start {
            let r = rate_ns(self.rate_reg);
            let t = (now.get() / r + 1) * r;
            scheduler.insert(SimTime::new(t), dev.devno, CalloutKind::DeviceCompletes);
        }
        action
    }

    fn on_completes(&mut self, dev: &mut Device, interrupts: &mut InterruptController) {
        dev.busy = false;
        dev.done = true;
        interrupts.raise(dev.devno);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_core::DeviceNumber;

    #[test]
    fn start_schedules_an_aligned_tick() {
        let mut rtc = Rtc::new();
        let mut dev = Device::new(DeviceNumber::new(4), "RTC", 1 << 2);
        let mut interrupts = InterruptController::new();
        let mut scheduler = Scheduler::new();
        let mut ac = 0u16; // rate selector 0 => 50Hz => 20ms period
        rtc.on_io(&mut dev, &mut interrupts, &mut scheduler, SimTime::ZERO, &mut ac, 0x6000 | (1 << 6) | 4);
        assert_eq!(scheduler.next_when(), Some(SimTime::new(20_000_000)));
    }

    #[test]
    fn completes_raises_interrupt() {
        let mut rtc = Rtc::new();
        let mut dev = Device::new(DeviceNumber::new(4), "RTC", 1 << 2);
        let mut interrupts = InterruptController::new();
        dev.busy = true;
        rtc.on_completes(&mut dev, &mut interrupts);
        assert!(dev.done);
        assert_eq!(interrupts.inta(), 4);
    }
}
