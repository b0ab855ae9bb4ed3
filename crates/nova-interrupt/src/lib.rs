//! The priority-masked interrupt controller.
//!
//! A raised device sits in the *IRQ list* until either it is serviced
//! (cleared by its own driver, which lowers it) or `MSKO` masks its
//! priority bit, at which point `pending()` migrates it to the *masked
//! list* until a later `MSKO` unmasks it again. List order is raise
//! order, not priority order — the first unmasked device found when
//! scanning front-to-back wins, matching a real backplane's daisy chain.

use std::collections::VecDeque;

use nova_core::{DeviceNumber, MAX_DEVICES};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingState {
    Clear,
    Irq,
    Masked,
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    state: PendingState,
    /// The device's single-bit priority mask, tested against `imask`.
    prio_bit: u16,
}

impl Default for Slot {
    fn default() -> Self {
        Self {
            state: PendingState::Clear,
            prio_bit: 0,
        }
    }
}

/// The interrupt controller. Owns no device state beyond each device's
/// raised/masked/clear status and priority bit.
pub struct InterruptController {
    slots: [Slot; MAX_DEVICES],
    irq_list: VecDeque<u8>,
    masked_irq_list: VecDeque<u8>,
    imask: u16,
}

impl Default for InterruptController {
    fn default() -> Self {
        Self {
            slots: [Slot::default(); MAX_DEVICES],
            irq_list: VecDeque::new(),
            masked_irq_list: VecDeque::new(),
            imask: 0,
        }
    }
}

impl InterruptController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a device's priority bit (its position in the interrupt
    /// mask word). Call once at device-install time.
    pub fn set_priority(&mut self, dev: DeviceNumber, prio_bit: u16) {
        self.slots[dev.index()].prio_bit = prio_bit;
    }

    /// Raise an interrupt request. No-op if the device is already
    /// pending (IRQ or masked). Returns `true` if this call actually
    /// changed the device from clear to pending, which callers use to
    /// decide whether to wake a sleeping CPU thread.
    pub fn raise(&mut self, dev: DeviceNumber) -> bool {
        let idx = dev.index();
        if self.slots[idx].state != PendingState::Clear {
            return false;
        }
        self.slots[idx].state = PendingState::Irq;
        self.irq_list.push_back(dev.get());
        true
    }

    /// Lower (clear) a pending interrupt request, wherever it currently
    /// sits. No-op if the device isn't pending.
    pub fn lower(&mut self, dev: DeviceNumber) {
        let idx = dev.index();
        match self.slots[idx].state {
            PendingState::Clear => {}
            PendingState::Irq => {
                self.irq_list.retain(|&d| d != dev.get());
            }
            PendingState::Masked => {
                self.masked_irq_list.retain(|&d| d != dev.get());
            }
        }
        self.slots[idx].state = PendingState::Clear;
    }

    /// Find the first deliverable interrupt, migrating any device whose
    /// priority bit is currently masked out of the IRQ list as it scans
    /// past it. Returns `None` (and clears nothing) if `inten0` is false
    /// or no unmasked device is pending; the caller owns clearing the
    /// CPU's interrupt-enable shift register when this returns `Some`.
    pub fn pending(&mut self, inten0: bool) -> Option<DeviceNumber> {
        if !inten0 {
            return None;
        }
        while let Some(&devno) = self.irq_list.front() {
            let idx = devno as usize;
            if self.slots[idx].prio_bit & self.imask == 0 {
                return Some(DeviceNumber::new(devno));
            }
            self.irq_list.pop_front();
            self.slots[idx].state = PendingState::Masked;
            self.masked_irq_list.push_back(devno);
        }
        None
    }

    /// `MSKO`: install a new interrupt mask, then migrate every masked
    /// device whose priority bit is no longer set in the new mask back
    /// onto the IRQ list, in the order they were masked.
    pub fn msko(&mut self, mask: u16) {
        self.imask = mask;
        let mut still_masked = VecDeque::new();
        while let Some(devno) = self.masked_irq_list.pop_front() {
            let idx = devno as usize;
            if self.slots[idx].prio_bit & self.imask == 0 {
                self.slots[idx].state = PendingState::Irq;
                self.irq_list.push_back(devno);
            } else {
                still_masked.push_back(devno);
            }
        }
        self.masked_irq_list = still_masked;
    }

    /// `INTA`: the device number at the head of the IRQ list, or 0 if
    /// none is pending. Does not remove the entry — only the device's
    /// own driver lowering the request does that.
    #[must_use]
    pub fn inta(&self) -> u8 {
        self.irq_list.front().copied().unwrap_or(0)
    }

    /// `IORST`: drop every pending request, masked or not.
    pub fn reset(&mut self) {
        self.irq_list.clear();
        self.masked_irq_list.clear();
        for slot in &mut self.slots {
            slot.state = PendingState::Clear;
        }
    }

    #[must_use]
    pub fn current_mask(&self) -> u16 {
        self.imask
    }

    /// Whether any device is currently pending delivery (masked or not).
    /// The pacer only sleeps when this is empty — a real backplane can't
    /// be napping with an IRQ sitting on the line.
    #[must_use]
    pub fn irq_list_is_empty(&self) -> bool {
        self.irq_list.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raise_then_pending_finds_device() {
        let mut ic = InterruptController::new();
        let d = DeviceNumber::new(10);
        ic.set_priority(d, 1 << 3);
        ic.raise(d);
        assert_eq!(ic.pending(true), Some(d));
    }

    #[test]
    fn masked_device_is_skipped_until_unmasked() {
        let mut ic = InterruptController::new();
        let d = DeviceNumber::new(10);
        ic.set_priority(d, 1 << 3);
        ic.raise(d);
        ic.msko(1 << 3); // mask this device's priority bit
        assert_eq!(ic.pending(true), None);
        ic.msko(0); // unmask
        assert_eq!(ic.pending(true), Some(d));
    }

    #[test]
    fn inten0_false_blocks_delivery() {
        let mut ic = InterruptController::new();
        let d = DeviceNumber::new(10);
        ic.raise(d);
        assert_eq!(ic.pending(false), None);
    }

    #[test]
    fn raise_is_idempotent_while_pending() {
        let mut ic = InterruptController::new();
        let d = DeviceNumber::new(5);
        assert!(ic.raise(d));
        assert!(!ic.raise(d));
    }

    #[test]
    fn lower_clears_from_either_list() {
        let mut ic = InterruptController::new();
        let d = DeviceNumber::new(7);
        ic.set_priority(d, 1);
        ic.raise(d);
        ic.msko(1);
        ic.pending(true); // migrate to masked list
        ic.lower(d);
        ic.msko(0);
        assert_eq!(ic.pending(true), None);
    }

    #[test]
    fn inta_peeks_without_removing() {
        let mut ic = InterruptController::new();
        let d = DeviceNumber::new(3);
        ic.raise(d);
        assert_eq!(ic.inta(), 3);
        assert_eq!(ic.inta(), 3);
    }

    #[test]
    fn reset_clears_everything() {
        let mut ic = InterruptController::new();
        let d = DeviceNumber::new(3);
        ic.raise(d);
        ic.reset();
        assert_eq!(ic.inta(), 0);
        assert_eq!(ic.pending(true), None);
    }
}
