//! Fixed-capacity in-memory job queue.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;

/// Rejected push. The item is handed back so nothing is retained.
#[derive(Debug, PartialEq, Eq)]
pub enum PushError<T> {
    /// The queue is at capacity.
    Full(T),
    /// The queue has been closed.
    Closed(T),
}

impl<T> PushError<T> {
    /// Returns the rejected item.
    pub fn into_inner(self) -> T {
        match self {
            PushError::Full(item) | PushError::Closed(item) => item,
        }
    }

    /// Returns true if the queue was full.
    pub fn is_full(&self) -> bool {
        matches!(self, PushError::Full(_))
    }
}

impl<T> fmt::Display for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PushError::Full(_) => write!(f, "queue is full"),
            PushError::Closed(_) => write!(f, "queue is closed"),
        }
    }
}

/// Bounded multi-producer, multi-consumer queue.
///
/// `try_push` never waits. `pop` waits until an item arrives or the queue is
/// closed and drained. Capacity is fixed at construction.
pub struct BoundedQueue<T> {
    name: &'static str,
    capacity: usize,
    items: Mutex<VecDeque<T>>,
    closed: AtomicBool,
    notify: Notify,
}

impl<T> BoundedQueue<T> {
    /// Creates an empty queue. A zero capacity is raised to one.
    pub fn new(name: &'static str, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            name,
            capacity,
            items: Mutex::new(VecDeque::with_capacity(capacity)),
            closed: AtomicBool::new(false),
            notify: Notify::new(),
        }
    }

    /// Queue name used in logs and errors.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Appends an item without waiting.
    pub fn try_push(&self, item: T) -> Result<(), PushError<T>> {
        {
            let mut items = self.items.lock();
            if self.closed.load(Ordering::Acquire) {
                return Err(PushError::Closed(item));
            }
            if items.len() >= self.capacity {
                return Err(PushError::Full(item));
            }
            items.push_back(item);
        }
        self.notify.notify_one();
        Ok(())
    }

    /// Removes the oldest item if one is available.
    pub fn try_pop(&self) -> Option<T> {
        let (item, more) = {
            let mut items = self.items.lock();
            let item = items.pop_front();
            (item, !items.is_empty())
        };
        if item.is_some() && more {
            // Pass the wakeup on so another waiter sees the rest.
            self.notify.notify_one();
        }
        item
    }

    /// Waits for the next item.
    ///
    /// Returns `None` once the queue is closed and empty. Cancel-safe: a
    /// dropped `pop` future never loses an item.
    pub async fn pop(&self) -> Option<T> {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(item) = self.try_pop() {
                return Some(item);
            }
            if self.closed.load(Ordering::Acquire) {
                return None;
            }

            notified.await;
        }
    }

    /// Stops accepting new items and wakes every waiter.
    ///
    /// Items already queued can still be popped.
    pub fn close(&self) {
        {
            let _items = self.items.lock();
            self.closed.store(true, Ordering::Release);
        }
        self.notify.notify_waiters();
    }

    /// Removes and returns everything still queued.
    pub fn drain(&self) -> Vec<T> {
        self.items.lock().drain(..).collect()
    }

    /// Current number of queued items.
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    /// Returns true if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of queued items.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns true once `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl<T> fmt::Debug for BoundedQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedQueue")
            .field("name", &self.name)
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_push_until_full() {
        let queue = BoundedQueue::new("primary", 2);
        assert!(queue.try_push(1).is_ok());
        assert!(queue.try_push(2).is_ok());

        let err = queue.try_push(3).unwrap_err();
        assert!(err.is_full());
        assert_eq!(err.into_inner(), 3);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_zero_capacity_is_raised_to_one() {
        let queue = BoundedQueue::new("retry", 0);
        assert_eq!(queue.capacity(), 1);
        assert!(queue.try_push("a").is_ok());
        assert!(queue.try_push("b").is_err());
    }

    #[test]
    fn test_fifo_order() {
        let queue = BoundedQueue::new("primary", 3);
        queue.try_push("a").unwrap();
        queue.try_push("b").unwrap();
        assert_eq!(queue.try_pop(), Some("a"));
        assert_eq!(queue.try_pop(), Some("b"));
        assert_eq!(queue.try_pop(), None);
    }

    #[test]
    fn test_closed_queue_rejects_push() {
        let queue = BoundedQueue::new("primary", 2);
        queue.close();

        let err = queue.try_push(1).unwrap_err();
        assert_eq!(err, PushError::Closed(1));
        assert!(queue.is_closed());
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_pop_drains_before_reporting_closed() {
        let queue = BoundedQueue::new("primary", 2);
        queue.try_push(7).unwrap();
        queue.close();

        assert_eq!(queue.pop().await, Some(7));
        assert_eq!(queue.pop().await, None);
    }

    #[tokio::test]
    async fn test_pop_waits_for_push() {
        let queue = Arc::new(BoundedQueue::new("primary", 1));
        let consumer = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.pop().await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        queue.try_push(42).unwrap();

        assert_eq!(consumer.await.unwrap(), Some(42));
    }

    #[tokio::test]
    async fn test_close_wakes_waiters() {
        let queue: Arc<BoundedQueue<u32>> = Arc::new(BoundedQueue::new("primary", 1));
        let consumer = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.pop().await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        queue.close();

        assert_eq!(consumer.await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_cancelled_pop_loses_nothing() {
        let queue = BoundedQueue::new("primary", 1);
        let timed_out =
            tokio::time::timeout(Duration::from_millis(5), queue.pop()).await;
        assert!(timed_out.is_err());

        queue.try_push(1).unwrap();
        assert_eq!(queue.pop().await, Some(1));
    }

    #[test]
    fn test_drain_empties_queue() {
        let queue = BoundedQueue::new("retry", 3);
        queue.try_push(1).unwrap();
        queue.try_push(2).unwrap();
        assert_eq!(queue.drain(), vec![1, 2]);
        assert_eq!(queue.len(), 0);
    }
}
