//! The console TTY pair: an input device (TTI) fed by a background
//! thread blocked on an [`Elastic`] pipe, and an output device (TTO)
//! whose completion is timed by the scheduler instead of a thread.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;

use nova_core::SimTime;
use nova_interrupt::InterruptController;
use nova_io::{std_io, Device, IoAction, IoOper};
use nova_scheduler::{CalloutKind, Scheduler};

use nova_elastic::Elastic;

use crate::driver::DeviceDriver;

/// Roughly how many bit-times one character costs on the wire: 1 start +
/// 7 data + 1 parity/stop-ish bit, matching the original's fixed `11`
/// constant rather than computing true framing from the word format.
const BIT_TIMES_PER_CHAR: u64 = 11;

/// TTI: reads bytes out of `elastic` on its own thread (since it has to
/// block on external input) and hands them to the instruction loop
/// through a rendezvous channel, which only drains one at a time so the
/// thread can't race ahead of the program reading the previous byte.
pub struct TtyInput {
    elastic: Arc<Elastic>,
    rx: mpsc::Receiver<u8>,
    worker: Option<JoinHandle<()>>,
    last_byte: u8,
}

impl TtyInput {
    #[must_use]
    pub fn new(elastic: Arc<Elastic>) -> Self {
        let (tx, rx) = mpsc::sync_channel::<u8>(0);
        let worker_elastic = Arc::clone(&elastic);
        let worker = std::thread::spawn(move || {
            let mut buf = [0u8; 1];
            loop {
                worker_elastic.get(&mut buf);
                if tx.send(buf[0]).is_err() {
                    return;
                }
            }
        });
        Self {
            elastic,
            rx,
            worker: Some(worker),
            last_byte: 0,
        }
    }

    #[must_use]
    pub fn elastic(&self) -> &Arc<Elastic> {
        &self.elastic
    }
}

impl Drop for TtyInput {
    fn drop(&mut self) {
        // The worker is permanently blocked in `elastic.get()`; there's
        // no clean way to wake and join it, so it's left detached. Its
        // `Arc<Elastic>` keeps the pipe alive for as long as it runs.
        self.worker.take();
    }
}

impl DeviceDriver for TtyInput {
    fn on_io(
        &mut self,
        dev: &mut Device,
        interrupts: &mut InterruptController,
        _scheduler: &mut Scheduler,
        _now: SimTime,
        ac: &mut u16,
        ioi: u16,
    ) -> IoAction {
        if IoOper::decode(ioi).is_input() {
            *ac = u16::from(self.last_byte);
        }
        std_io(dev, interrupts, ioi)
    }

    /// Only pull the next character off the rendezvous channel once the
    /// program has acknowledged (cleared `done` on) the previous one —
    /// otherwise a fast typist could overrun a byte the program hasn't
    /// read yet.
    fn poll_worker(&mut self, dev: &mut Device, interrupts: &mut InterruptController) {
        if dev.done {
            return;
        }
        if let Ok(byte) = self.rx.try_recv() {
            self.last_byte = byte;
            dev.busy = false;
            dev.done = true;
            interrupts.raise(dev.devno);
        }
    }
}

/// TTO: writes accepted characters out to `elastic` immediately, then
/// times their completion through the scheduler the way the baud rate
/// would on real hardware.
pub struct TtyOutput {
    elastic: Arc<Elastic>,
    /// Characters per second; defaults to 2400 baud / ~240 cps, matching
    /// the original's default.
    pub speed: u32,
}

impl TtyOutput {
    #[must_use]
    pub fn new(elastic: Arc<Elastic>) -> Self {
        Self { elastic, speed: 240 }
    }
}

impl DeviceDriver for TtyOutput {
    fn on_io(
        &mut self,
        dev: &mut Device,
        interrupts: &mut InterruptController,
        scheduler: &mut Scheduler,
        now: SimTime,
        ac: &mut u16,
        ioi: u16,
    ) -> IoAction {
        let action = std_io(dev, interrupts, ioi);
        if action == IoAction::Start {
            let byte = (*ac & 0x7f) as u8;
            self.elastic.put(&[byte]);
            let delay = BIT_TIMES_PER_CHAR * (1_000_000_000 / u64::from(self.speed.max(1)));
            scheduler.insert_relative(now, delay, dev.devno, CalloutKind::DeviceCompletes);
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
    fn output_schedules_a_completion() {
        let elastic = Arc::new(Elastic::new());
        let mut out = TtyOutput::new(Arc::clone(&elastic));
        let mut dev = Device::new(DeviceNumber::new(16), "TTO", 1 << 10);
        let mut interrupts = InterruptController::new();
        let mut scheduler = Scheduler::new();
        let mut ac = 0x41u16;
        let ioi = 0x6000 | (2 << 8) | (1 << 6) | 16; // DOA start
        out.on_io(&mut dev, &mut interrupts, &mut scheduler, SimTime::ZERO, &mut ac, ioi);
        assert!(dev.busy);
        assert!(!scheduler.is_empty());
    }
}
