//! The callout scheduler: a list of future events sorted by simulated
//! time, drained by the CPU thread's pacer between instructions.

use nova_core::{DeviceNumber, SimTime};

/// What a due callout asks the machine to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalloutKind {
    /// Wake a device's sleeping worker thread (it was blocked in
    /// `Scheduler::sleep_until`-style timed wait).
    WakeDevice,
    /// A device's in-flight operation (e.g. a completed TTY character)
    /// has finished: the device's busy/done bits should transition.
    DeviceCompletes,
}

/// One scheduled future event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Callout {
    pub when: SimTime,
    pub devno: DeviceNumber,
    pub kind: CalloutKind,
}

/// The sorted callout list. Kept sorted by ascending `when` at insertion
/// time (a linear scan, matching the original's list size in practice:
/// a handful of in-flight device operations, never thousands).
#[derive(Default)]
pub struct Scheduler {
    list: Vec<Callout>,
}

impl Scheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a callout at an absolute simulated time.
    pub fn insert(&mut self, when: SimTime, devno: DeviceNumber, kind: CalloutKind) {
        let pos = self.list.partition_point(|c| c.when <= when);
        self.list.insert(pos, Callout { when, devno, kind });
    }

    /// Schedule a callout `delay` nanoseconds after `now`.
    pub fn insert_relative(&mut self, now: SimTime, delay: u64, devno: DeviceNumber, kind: CalloutKind) {
        self.insert(now + SimTime::new(delay), devno, kind);
    }

    /// Remove every callout for `devno` (used when a device is reset or
    /// its in-flight operation is abandoned).
    pub fn cancel_device(&mut self, devno: DeviceNumber) {
        self.list.retain(|c| c.devno != devno);
    }

    /// Drain every callout due at or before `now` (`when < now`, matching
    /// the original's strict inequality), in ascending time order.
    /// Returns the drained callouts plus the next pending `when`, if any
    /// remain.
    pub fn poll(&mut self, now: SimTime) -> (Vec<Callout>, Option<SimTime>) {
        let split = self.list.partition_point(|c| c.when < now);
        let due: Vec<Callout> = self.list.drain(..split).collect();
        let next = self.list.first().map(|c| c.when);
        (due, next)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    #[must_use]
    pub fn next_when(&self) -> Option<SimTime> {
        self.list.first().map(|c| c.when)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_keeps_ascending_order() {
        let mut s = Scheduler::new();
        let d = DeviceNumber::new(1);
        s.insert(SimTime::new(30), d, CalloutKind::WakeDevice);
        s.insert(SimTime::new(10), d, CalloutKind::WakeDevice);
        s.insert(SimTime::new(20), d, CalloutKind::WakeDevice);
        let (due, next) = s.poll(SimTime::new(100));
        let whens: Vec<u64> = due.iter().map(|c| c.when.get()).collect();
        assert_eq!(whens, vec![10, 20, 30]);
        assert_eq!(next, None);
    }

    #[test]
    fn poll_only_drains_due_callouts() {
        let mut s = Scheduler::new();
        let d = DeviceNumber::new(1);
        s.insert(SimTime::new(10), d, CalloutKind::WakeDevice);
        s.insert(SimTime::new(1000), d, CalloutKind::WakeDevice);
        let (due, next) = s.poll(SimTime::new(50));
        assert_eq!(due.len(), 1);
        assert_eq!(next, Some(SimTime::new(1000)));
    }

    #[test]
    fn cancel_device_removes_its_callouts() {
        let mut s = Scheduler::new();
        let d0 = DeviceNumber::new(0);
        let d1 = DeviceNumber::new(1);
        s.insert(SimTime::new(10), d0, CalloutKind::WakeDevice);
        s.insert(SimTime::new(20), d1, CalloutKind::WakeDevice);
        s.cancel_device(d0);
        let (due, _) = s.poll(SimTime::new(100));
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].devno, d1);
    }
}
