//! Debounce-window ownership: the pending batch, the single flush
//! deadline, and the timer context that flushes expired windows.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::Sender;
use parking_lot::{Condvar, Mutex};

use super::batch::PendingBatch;
use super::event::{Change, EventBatch};

/// State shared between the OS delivery context and the timer thread.
///
/// The pending batch and the deadline form a single critical section:
/// recording a change and re-arming the deadline happen under one lock,
/// and the flush reads and clears the same state under the same lock.
#[derive(Debug)]
struct State {
    pending: PendingBatch,
    /// Armed flush deadline; `None` while no window is open.
    deadline: Option<Instant>,
    shutdown: bool,
}

struct Shared {
    state: Mutex<State>,
    timer: Condvar,
    batches: Sender<EventBatch>,
    window: Duration,
}

/// Owns the debounce window for a running watcher.
///
/// Every recorded change restarts the single flush deadline. A dedicated
/// timer thread sleeps until the deadline and flushes the pending batch
/// into the hand-off channel once the deadline passes without being
/// pushed back. At most one deadline is armed at any instant.
#[derive(Clone)]
pub(crate) struct Debouncer {
    shared: Arc<Shared>,
}

impl Debouncer {
    pub(crate) fn new(window: Duration, batches: Sender<EventBatch>) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    pending: PendingBatch::new(),
                    deadline: None,
                    shutdown: false,
                }),
                timer: Condvar::new(),
                batches,
                window,
            }),
        }
    }

    /// Record a surviving change and restart the flush deadline.
    ///
    /// Called from the OS delivery context. Restarts the deadline even
    /// when the pending batch drops the change as a same-kind duplicate.
    pub(crate) fn record(&self, change: Change) {
        let mut state = self.shared.state.lock();
        state.pending.record(change);
        state.deadline = Some(Instant::now() + self.shared.window);
        self.shared.timer.notify_one();
    }

    /// Spawn the timer thread that flushes expired windows.
    pub(crate) fn spawn_timer(&self) -> io::Result<JoinHandle<()>> {
        let shared = Arc::clone(&self.shared);
        thread::Builder::new()
            .name("docwatch-debounce".into())
            .spawn(move || timer_loop(&shared))
    }

    /// Signal the timer thread to exit.
    pub(crate) fn shutdown(&self) {
        let mut state = self.shared.state.lock();
        state.shutdown = true;
        self.shared.timer.notify_one();
    }
}

fn timer_loop(shared: &Shared) {
    let mut state = shared.state.lock();
    loop {
        if state.shutdown {
            return;
        }

        match state.deadline {
            None => {
                shared.timer.wait(&mut state);
            }
            Some(deadline) => {
                if Instant::now() >= deadline {
                    state.deadline = None;
                    let batch = state.pending.flush();
                    crate::debug_event!("watcher", "flush", "{} changes", batch.len());
                    if shared.batches.send(batch).is_err() {
                        // consumer dropped the stream; nothing left to deliver
                        return;
                    }
                } else {
                    // waits until exactly the deadline, so wake granularity
                    // never flushes a window early or late
                    shared.timer.wait_until(&mut state, deadline);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use std::thread::sleep;

    #[test]
    fn test_flush_after_quiet_window() {
        let (tx, rx) = unbounded();
        let debouncer = Debouncer::new(Duration::from_millis(50), tx);
        let timer = debouncer.spawn_timer().unwrap();

        debouncer.record(Change::created("/docs/a.md"));

        let batch = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(batch.created.len(), 1);

        debouncer.shutdown();
        timer.join().unwrap();
    }

    #[test]
    fn test_burst_collapses_into_one_batch() {
        let (tx, rx) = unbounded();
        let debouncer = Debouncer::new(Duration::from_millis(80), tx);
        let timer = debouncer.spawn_timer().unwrap();

        debouncer.record(Change::created("/docs/a.md"));
        debouncer.record(Change::modified("/docs/a.md"));
        debouncer.record(Change::modified("/docs/b.md"));

        let batch = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(batch.created.is_empty());
        assert_eq!(batch.modified.len(), 2);

        // no second flush for the same window
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());

        debouncer.shutdown();
        timer.join().unwrap();
    }

    #[test]
    fn test_new_change_restarts_window() {
        let (tx, rx) = unbounded();
        let debouncer = Debouncer::new(Duration::from_millis(200), tx);
        let timer = debouncer.spawn_timer().unwrap();

        debouncer.record(Change::modified("/docs/a.md"));
        sleep(Duration::from_millis(120));
        debouncer.record(Change::modified("/docs/a.md"));

        // waits past where the original window would have expired, but
        // not as far as the restarted one
        assert!(rx.recv_timeout(Duration::from_millis(140)).is_err());

        let batch = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(batch.modified.len(), 1);

        debouncer.shutdown();
        timer.join().unwrap();
    }

    #[test]
    fn test_shutdown_without_pending_changes() {
        let (tx, rx) = unbounded();
        let debouncer = Debouncer::new(Duration::from_millis(50), tx);
        let timer = debouncer.spawn_timer().unwrap();

        debouncer.shutdown();
        timer.join().unwrap();
        drop(rx);
    }
}
