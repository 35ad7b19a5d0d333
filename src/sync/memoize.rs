//! Concurrency-safe memoization
//!
//! A [`ConcurrentMemo`] wraps a zero-argument producer and guarantees that,
//! no matter how many threads call [`ConcurrentMemo::get`] at once, at most
//! one producer invocation runs at a time and at most one ever succeeds.
//! Once a value is published every later read is lock-free.
//!
//! The producer itself is not required to be thread-safe: it is only ever
//! invoked while holding the producer lock, so an `FnMut` with unsynchronized
//! internal state is fine.
//!
//! # Example
//!
//! ```rust
//! use clusterkit::sync::ConcurrentMemo;
//!
//! let memo = ConcurrentMemo::new(|| Some(String::from("cluster-config")));
//! assert_eq!(memo.get().unwrap(), "cluster-config");
//! assert!(memo.get_if_completed().is_some());
//! ```

use crate::error::{Error, Result};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, OnceLock, PoisonError};
use tracing::{debug, trace};

/// Lifecycle of a memo cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoState {
    /// No value has been published and the producer is idle
    Uninitialized,
    /// A caller is currently running the producer
    InProgress,
    /// A value has been published; it never changes afterwards
    Completed,
}

/// Run-once cell around a value producer.
///
/// A producer returning `None` does not complete the cell: the calling
/// `get` fails with [`Error::InvalidResult`] and the next caller runs the
/// producer again.
pub struct ConcurrentMemo<T, F> {
    value: OnceLock<T>,
    producer: Mutex<F>,
    running: AtomicBool,
}

impl<T, F> ConcurrentMemo<T, F>
where
    F: FnMut() -> Option<T>,
{
    /// Create a new memo cell around `producer`. The producer is not invoked.
    pub fn new(producer: F) -> Self {
        Self {
            value: OnceLock::new(),
            producer: Mutex::new(producer),
            running: AtomicBool::new(false),
        }
    }

    /// Create a memo cell from a producer that may be absent.
    ///
    /// Fails with [`Error::InvalidArgument`] when `producer` is `None`.
    pub fn try_new(producer: Option<F>) -> Result<Self> {
        producer
            .map(Self::new)
            .ok_or_else(|| Error::invalid_argument("value producer must not be absent"))
    }

    /// Return the memoized value, running the producer if no value is published yet.
    ///
    /// Concurrent callers that arrive while the producer runs block until it
    /// returns and then observe its result.
    pub fn get(&self) -> Result<&T> {
        match self.value.get() {
            Some(value) => Ok(value),
            None => self.get_slow(),
        }
    }

    #[cold]
    fn get_slow(&self) -> Result<&T> {
        trace!("Memo not completed, waiting for producer lock");
        // A panicking producer publishes nothing, so a poisoned lock holds no torn state
        let mut producer = self
            .producer
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(value) = self.value.get() {
            trace!("Memo completed by another caller while waiting");
            return Ok(value);
        }

        let produced = {
            let _running = RunningGuard::enter(&self.running);
            debug!("Running memoized value producer");
            (*producer)()
        };

        match produced {
            Some(value) => Ok(self.value.get_or_init(|| value)),
            None => {
                debug!("Memoized value producer returned no value");
                Err(Error::invalid_result("value producer returned no value"))
            }
        }
    }
}

impl<T, F> ConcurrentMemo<T, F> {
    /// Return the published value without ever running the producer.
    pub fn get_if_completed(&self) -> Option<&T> {
        self.value.get()
    }

    /// Current lifecycle state of the cell.
    pub fn state(&self) -> MemoState {
        if self.value.get().is_some() {
            MemoState::Completed
        } else if self.running.load(Ordering::Acquire) {
            MemoState::InProgress
        } else {
            MemoState::Uninitialized
        }
    }
}

impl<T: fmt::Debug, F> fmt::Debug for ConcurrentMemo<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcurrentMemo")
            .field("state", &self.state())
            .field("value", &self.value.get())
            .finish()
    }
}

/// Clears the running flag on every exit, including a producer panic.
struct RunningGuard<'a>(&'a AtomicBool);

impl<'a> RunningGuard<'a> {
    fn enter(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self(flag)
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Wrap `producer` in a shareable zero-argument function that runs it at most once.
///
/// Each call returns a clone of the memoized value, so wrap the value in an
/// `Arc` when callers must observe the identical instance.
///
/// ```rust
/// use clusterkit::sync::memoize_concurrent;
/// use std::sync::Arc;
///
/// let get = memoize_concurrent(|| Some(Arc::new(42)));
/// let first = get().unwrap();
/// let second = get().unwrap();
/// assert!(Arc::ptr_eq(&first, &second));
/// ```
pub fn memoize_concurrent<T, F>(producer: F) -> impl Fn() -> Result<T> + Send + Sync
where
    T: Clone + Send + Sync,
    F: FnMut() -> Option<T> + Send,
{
    let memo = ConcurrentMemo::new(producer);
    move || memo.get().cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::{Arc, Barrier};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_producer_runs_once_sequentially() {
        let calls = AtomicUsize::new(0);
        let memo = ConcurrentMemo::new(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            Some(7u32)
        });

        assert_eq!(memo.state(), MemoState::Uninitialized);
        assert_eq!(*memo.get().unwrap(), 7);
        assert_eq!(*memo.get().unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(memo.state(), MemoState::Completed);
    }

    #[test]
    fn test_new_does_not_invoke_producer() {
        let memo = ConcurrentMemo::new(|| -> Option<u8> { panic!("must not run") });
        assert!(memo.get_if_completed().is_none());
        assert_eq!(memo.state(), MemoState::Uninitialized);
    }

    #[test]
    fn test_absent_producer_is_invalid_argument() {
        let result = ConcurrentMemo::<u8, fn() -> Option<u8>>::try_new(None);
        assert!(result.unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_absent_value_fails_every_call() {
        let calls = AtomicUsize::new(0);
        let memo: ConcurrentMemo<String, _> = ConcurrentMemo::new(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            None
        });

        for _ in 0..3 {
            let err = memo.get().unwrap_err();
            assert!(err.is_invalid_result());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(memo.state(), MemoState::Uninitialized);
        assert!(memo.get_if_completed().is_none());
    }

    #[test]
    fn test_retries_after_absent_value() {
        let mut attempts = 0;
        let memo = ConcurrentMemo::new(move || {
            attempts += 1;
            (attempts > 1).then_some(attempts)
        });

        assert!(memo.get().is_err());
        assert_eq!(*memo.get().unwrap(), 2);
        assert_eq!(*memo.get().unwrap(), 2);
    }

    #[test]
    fn test_concurrent_callers_share_single_instance() {
        const THREADS: usize = 8;
        let mut supplied = false;
        let memo = ConcurrentMemo::new(move || {
            assert!(!supplied, "producer was already called once");
            supplied = true;
            thread::sleep(Duration::from_millis(20));
            Some(String::from("shared"))
        });
        let barrier = Barrier::new(THREADS);

        let addresses: Vec<usize> = thread::scope(|s| {
            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    s.spawn(|| {
                        barrier.wait();
                        memo.get().map(|v| v as *const String as usize)
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap().unwrap())
                .collect()
        });

        assert!(addresses.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(memo.get().unwrap(), "shared");
    }

    #[test]
    fn test_state_in_progress_while_producer_runs() {
        let started = Arc::new(Barrier::new(2));
        let release = Arc::new(Barrier::new(2));
        let (s, r) = (Arc::clone(&started), Arc::clone(&release));
        let memo = Arc::new(ConcurrentMemo::new(move || {
            s.wait();
            r.wait();
            Some(1u8)
        }));

        let worker = {
            let memo = Arc::clone(&memo);
            thread::spawn(move || *memo.get().unwrap())
        };

        started.wait();
        assert_eq!(memo.state(), MemoState::InProgress);
        release.wait();

        assert_eq!(worker.join().unwrap(), 1);
        assert_eq!(memo.state(), MemoState::Completed);
    }

    #[test]
    fn test_memoize_concurrent_function() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let get = Arc::new(memoize_concurrent(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Some(Arc::new(vec![1, 2, 3]))
        }));

        let results: Vec<_> = (0..4)
            .map(|_| {
                let get = Arc::clone(&get);
                thread::spawn(move || get().unwrap())
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect();

        assert!(results.iter().all(|r| Arc::ptr_eq(r, &results[0])));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_panicking_producer_does_not_poison_cell() {
        let mut first = true;
        let memo = ConcurrentMemo::new(move || {
            if first {
                first = false;
                panic!("transient failure");
            }
            Some(5i32)
        });

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| memo.get().is_ok()));
        assert!(outcome.is_err());
        assert_eq!(memo.state(), MemoState::Uninitialized);
        assert_eq!(*memo.get().unwrap(), 5);
    }
}
