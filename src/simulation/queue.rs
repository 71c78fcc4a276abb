//! Thread-safe multi-producer / multi-consumer FIFO queue
//!
//! Vehicles push their own handles here when their battery runs out and
//! chargers pull them off in arrival order. Every accessor takes the single
//! internal mutex; blocking consumers wait on a condition variable and
//! re-check the queue after every wakeup.

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Locked FIFO queue with blocking, non-blocking and timed dequeue
#[derive(Debug)]
pub struct LockedQueue<T> {
    items: Mutex<VecDeque<T>>,
    not_empty: Condvar,
}

impl<T> Default for LockedQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LockedQueue<T> {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            not_empty: Condvar::new(),
        }
    }

    /// Push an item to the tail and wake one waiting consumer
    pub fn enqueue(&self, item: T) {
        let mut items = self.items.lock();
        items.push_back(item);
        drop(items);
        self.not_empty.notify_one();
    }

    /// Pop the head, blocking until an item is available
    pub fn dequeue(&self) -> T {
        let mut items = self.items.lock();
        loop {
            if let Some(item) = items.pop_front() {
                return item;
            }
            self.not_empty.wait(&mut items);
        }
    }

    /// Pop the head if there is one, without blocking
    pub fn try_dequeue(&self) -> Option<T> {
        self.items.lock().pop_front()
    }

    /// Pop the head, waiting at most `timeout` for an item to arrive
    pub fn dequeue_timeout(&self, timeout: Duration) -> Option<T> {
        let mut items = self.items.lock();
        if let Some(item) = items.pop_front() {
            return Some(item);
        }

        // A deadline past the representable range waits like `dequeue`
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            loop {
                self.not_empty.wait(&mut items);
                if let Some(item) = items.pop_front() {
                    return Some(item);
                }
            }
        };

        loop {
            if self.not_empty.wait_until(&mut items, deadline).timed_out() {
                return items.pop_front();
            }
            if let Some(item) = items.pop_front() {
                return Some(item);
            }
        }
    }

    /// Remove every waiting item, oldest first
    pub fn drain(&self) -> Vec<T> {
        self.items.lock().drain(..).collect()
    }

    /// Number of waiting items at the time of the call
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}
