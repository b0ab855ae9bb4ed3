//! A bidirectional byte pipeline connecting a serial-style device (TTY,
//! paper tape, cassette) to the outside world.
//!
//! Two independent flows share one `Elastic`:
//!
//! - *Inbound*: bytes arriving from the outside (a host terminal, an
//!   injected test fixture) are pushed with [`Elastic::inject`] and
//!   consumed, blocking, by the device driver's worker thread via
//!   [`Elastic::get`].
//! - *Outbound*: bytes the device driver produces with [`Elastic::put`]
//!   are fanned out to every subscriber. Each subscriber owns a worker
//!   thread and its own chunk queue, and paces its consumption to a
//!   configured nanoseconds-per-character rate — the mechanism that
//!   makes simulated baud rate visible to a real terminal on the other
//!   end.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;

struct Inbound {
    queue: Mutex<VecDeque<u8>>,
    cond: Condvar,
}

struct SubscriberState {
    queue: Mutex<VecDeque<Vec<u8>>>,
    cond: Condvar,
    die: Mutex<bool>,
}

struct Subscriber {
    id: u64,
    state: Arc<SubscriberState>,
    handle: Option<JoinHandle<()>>,
}

/// A subscriber's identity, returned by [`Elastic::subscribe`] and
/// consumed by [`Elastic::unsubscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriberId(u64);

/// The pipeline. Cheaply cloneable (`Arc`-backed internally via
/// `subscribe`'s worker threads); share one instance between a device
/// driver and whatever feeds/drains it.
pub struct Elastic {
    inbound: Inbound,
    subscribers: Mutex<Vec<Subscriber>>,
    next_id: Mutex<u64>,
}

impl Default for Elastic {
    fn default() -> Self {
        Self::new()
    }
}

impl Elastic {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inbound: Inbound {
                queue: Mutex::new(VecDeque::new()),
                cond: Condvar::new(),
            },
            subscribers: Mutex::new(Vec::new()),
            next_id: Mutex::new(0),
        }
    }

    /// Feed bytes into the inbound queue (e.g. keystrokes from a host
    /// terminal, or a test fixture's canned input).
    pub fn inject(&self, data: &[u8]) {
        let mut q = self.inbound.queue.lock().expect("inbound mutex poisoned");
        q.extend(data.iter().copied());
        self.inbound.cond.notify_all();
    }

    /// Blocking read of up to `buf.len()` inbound bytes. Blocks until at
    /// least one byte is available. Returns the number of bytes filled.
    pub fn get(&self, buf: &mut [u8]) -> usize {
        let mut q = self.inbound.queue.lock().expect("inbound mutex poisoned");
        while q.is_empty() {
            q = self.inbound.cond.wait(q).expect("inbound mutex poisoned");
        }
        let mut n = 0;
        while n < buf.len() {
            match q.pop_front() {
                Some(b) => {
                    buf[n] = b;
                    n += 1;
                }
                None => break,
            }
        }
        n
    }

    #[must_use]
    pub fn inbound_empty(&self) -> bool {
        self.inbound.queue.lock().expect("inbound mutex poisoned").is_empty()
    }

    /// Publish outbound bytes to every current subscriber.
    pub fn put(&self, data: &[u8]) {
        let subs = self.subscribers.lock().expect("subscriber list poisoned");
        for sub in subs.iter() {
            let mut q = sub.state.queue.lock().expect("subscriber mutex poisoned");
            q.push_back(data.to_vec());
            sub.state.cond.notify_all();
        }
    }

    /// Subscribe to outbound bytes. `nsec_per_char` paces delivery: the
    /// worker sleeps that many nanoseconds per byte in a chunk before
    /// invoking `deliver`, so a subscriber attached to a 110-baud device
    /// sees bytes arrive at 110 baud rather than all at once.
    pub fn subscribe<F>(self: &Arc<Self>, nsec_per_char: u64, deliver: F) -> SubscriberId
    where
        F: Fn(&[u8]) + Send + 'static,
    {
        let state = Arc::new(SubscriberState {
            queue: Mutex::new(VecDeque::new()),
            cond: Condvar::new(),
            die: Mutex::new(false),
        });
        let worker_state = Arc::clone(&state);
        let handle = std::thread::spawn(move || {
            loop {
                let chunk = {
                    let mut q = worker_state.queue.lock().expect("subscriber mutex poisoned");
                    loop {
                        if *worker_state.die.lock().expect("die flag poisoned") {
                            return;
                        }
                        if let Some(c) = q.pop_front() {
                            break c;
                        }
                        q = worker_state.cond.wait(q).expect("subscriber mutex poisoned");
                    }
                };
                if nsec_per_char > 0 {
                    std::thread::sleep(std::time::Duration::from_nanos(
                        nsec_per_char.saturating_mul(chunk.len().max(1) as u64),
                    ));
                }
                deliver(&chunk);
            }
        });

        let mut id_guard = self.next_id.lock().expect("id counter poisoned");
        let id = *id_guard;
        *id_guard += 1;
        drop(id_guard);

        self.subscribers.lock().expect("subscriber list poisoned").push(Subscriber {
            id,
            state,
            handle: Some(handle),
        });
        SubscriberId(id)
    }

    /// Remove a subscriber and join its worker thread.
    pub fn unsubscribe(&self, id: SubscriberId) {
        let removed = {
            let mut subs = self.subscribers.lock().expect("subscriber list poisoned");
            let pos = subs.iter().position(|s| s.id == id.0);
            pos.map(|p| subs.remove(p))
        };
        if let Some(mut sub) = removed {
            *sub.state.die.lock().expect("die flag poisoned") = true;
            sub.state.cond.notify_all();
            if let Some(h) = sub.handle.take() {
                let _ = h.join();
            }
        }
    }
}

impl Drop for Elastic {
    fn drop(&mut self) {
        let ids: Vec<u64> = self
            .subscribers
            .lock()
            .expect("subscriber list poisoned")
            .iter()
            .map(|s| s.id)
            .collect();
        for id in ids {
            self.unsubscribe(SubscriberId(id));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn inject_then_get_round_trips() {
        let e = Elastic::new();
        e.inject(b"A");
        let mut buf = [0u8; 1];
        assert_eq!(e.get(&mut buf), 1);
        assert_eq!(buf[0], b'A');
    }

    #[test]
    fn put_delivers_to_subscriber() {
        let e = Arc::new(Elastic::new());
        let (tx, rx) = mpsc::channel();
        let id = e.subscribe(0, move |chunk| {
            let _ = tx.send(chunk.to_vec());
        });
        e.put(b"hello");
        let got = rx.recv_timeout(Duration::from_secs(1)).expect("subscriber delivery");
        assert_eq!(got, b"hello");
        e.unsubscribe(id);
    }

    #[test]
    fn get_blocks_until_injected() {
        let e = Arc::new(Elastic::new());
        let e2 = Arc::clone(&e);
        let handle = std::thread::spawn(move || {
            let mut buf = [0u8; 1];
            e2.get(&mut buf);
            buf[0]
        });
        std::thread::sleep(Duration::from_millis(20));
        e.inject(b"Z");
        let byte = handle.join().expect("worker thread panicked");
        assert_eq!(byte, b'Z');
    }
}
