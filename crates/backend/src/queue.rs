//! Bounded queue connecting two pipeline stages.
//!
//! A fixed-capacity FIFO with two suspension points:
//!
//! - [`BoundedQueue::insert`] waits while every slot is taken
//! - [`BoundedQueue::remove`] waits while nothing is buffered
//!
//! Shutdown is signalled two ways. The upstream stage calls
//! [`BoundedQueue::mark_finished`] once it will insert nothing more, which
//! consumers observe through [`BoundedQueue::is_drained`] before they block.
//! The orchestrator then injects one [`Message::End`] per consumer with
//! [`BoundedQueue::insert_end_marker`] to wake anyone already blocked in
//! `remove`.
//!
//! End markers are counted apart from the item slots. Injecting them never
//! suspends, so a marker meant for a consumer that already left through the
//! drained check cannot wedge the orchestrator on a full queue.
//!
//! State lives behind a `std::sync::Mutex` that is never held across an
//! `.await`; the two wait conditions are `tokio::sync::Notify` handles, which
//! wake waiters in FIFO order.

use std::{
  collections::VecDeque,
  fmt,
  sync::{Mutex, MutexGuard, PoisonError},
};

use tokio::sync::Notify;

/// What a consumer gets back from [`BoundedQueue::remove`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message<T> {
  Item(T),
  /// In-band request for the consumer to stop
  End,
}

impl<T> Message<T> {
  pub fn is_end(&self) -> bool {
    matches!(self, Message::End)
  }

  pub fn into_item(self) -> Option<T> {
    match self {
      Message::Item(item) => Some(item),
      Message::End => None,
    }
  }
}

/// Counters collected over the lifetime of a queue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueStats {
  /// Items accepted by `insert`
  pub inserted: u64,
  /// Items handed out by `remove` (end markers excluded)
  pub removed: u64,
  pub end_markers_sent: u64,
  pub end_markers_delivered: u64,
  /// Highest number of buffered items observed
  pub peak_len: usize,
  /// Inserts that found the queue full at least once
  pub inserts_waited: u64,
  /// Removes that found the queue empty at least once
  pub removes_waited: u64,
}

impl fmt::Display for QueueStats {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "in: {}, out: {}, peak: {}, full waits: {}, empty waits: {}",
      self.inserted, self.removed, self.peak_len, self.inserts_waited, self.removes_waited
    )
  }
}

struct QueueState<T> {
  items: VecDeque<T>,
  end_markers: usize,
  closed: bool,
  stats: QueueStats,
}

impl<T> QueueState<T> {
  fn len(&self) -> usize {
    self.items.len() + self.end_markers
  }

  /// Items first; an end marker only once nothing is left ahead of it.
  fn take_next(&mut self) -> Option<Message<T>> {
    if let Some(item) = self.items.pop_front() {
      self.stats.removed += 1;
      return Some(Message::Item(item));
    }

    if self.end_markers > 0 {
      self.end_markers -= 1;
      self.stats.end_markers_delivered += 1;
      return Some(Message::End);
    }

    None
  }
}

/// Fixed-capacity FIFO shared by two adjacent stages.
pub struct BoundedQueue<T> {
  state: Mutex<QueueState<T>>,
  not_full: Notify,
  not_empty: Notify,
  capacity: usize,
}

impl<T> BoundedQueue<T> {
  /// Create a queue holding at most `capacity` items.
  ///
  /// # Panics
  ///
  /// Panics if `capacity` is zero: such a queue could never accept an item.
  pub fn new(capacity: usize) -> Self {
    assert!(capacity > 0, "queue capacity must be at least 1");

    Self {
      state: Mutex::new(QueueState {
        items: VecDeque::with_capacity(capacity),
        end_markers: 0,
        closed: false,
        stats: QueueStats::default(),
      }),
      not_full: Notify::new(),
      not_empty: Notify::new(),
      capacity,
    }
  }

  // Every critical section leaves the state consistent, so a panic elsewhere
  // while the lock was held does not invalidate it.
  fn lock(&self) -> MutexGuard<'_, QueueState<T>> {
    self.state.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Append an item, waiting for a free slot if the queue is full.
  pub async fn insert(&self, item: T) {
    let mut waited = false;

    loop {
      // Registered before the check so a remove between the check and the
      // await still wakes us.
      let space = self.not_full.notified();

      {
        let mut state = self.lock();
        if state.items.len() < self.capacity {
          state.items.push_back(item);
          state.stats.inserted += 1;
          state.stats.peak_len = state.stats.peak_len.max(state.items.len());
          if waited {
            state.stats.inserts_waited += 1;
          }
          drop(state);

          self.not_empty.notify_one();
          return;
        }
      }

      waited = true;
      space.await;
    }
  }

  /// Take the next message, waiting while the queue holds nothing.
  ///
  /// Closing the queue does not release a waiting caller; only an insert or
  /// an end marker does.
  pub async fn remove(&self) -> Message<T> {
    let mut waited = false;

    loop {
      let available = self.not_empty.notified();

      {
        let mut state = self.lock();
        if let Some(message) = state.take_next() {
          if waited {
            state.stats.removes_waited += 1;
          }
          drop(state);

          if !message.is_end() {
            self.not_full.notify_one();
          }
          return message;
        }
      }

      waited = true;
      available.await;
    }
  }

  /// Queue one end marker behind everything currently buffered. Never waits.
  pub fn insert_end_marker(&self) {
    {
      let mut state = self.lock();
      state.end_markers += 1;
      state.stats.end_markers_sent += 1;
    }

    self.not_empty.notify_one();
  }

  /// Record that the upstream stage will insert nothing more.
  pub fn mark_finished(&self) {
    self.lock().closed = true;
  }

  /// True once the queue is finished and holds neither items nor end markers.
  pub fn is_drained(&self) -> bool {
    let state = self.lock();
    state.closed && state.len() == 0
  }

  pub fn is_closed(&self) -> bool {
    self.lock().closed
  }

  /// Buffered items plus pending end markers.
  pub fn len(&self) -> usize {
    self.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn capacity(&self) -> usize {
    self.capacity
  }

  pub fn stats(&self) -> QueueStats {
    self.lock().stats.clone()
  }
}

impl<T> fmt::Debug for BoundedQueue<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let state = self.lock();
    f.debug_struct("BoundedQueue")
      .field("capacity", &self.capacity)
      .field("items", &state.items.len())
      .field("end_markers", &state.end_markers)
      .field("closed", &state.closed)
      .finish()
  }
}
