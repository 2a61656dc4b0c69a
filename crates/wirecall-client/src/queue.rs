//! Call Queue
//!
//! Unbounded FIFO of pending asynchronous calls, used when the pool is
//! saturated or enough async workers are already running. Entries are never
//! revisited: each is dequeued exactly once, by whichever worker next
//! becomes free. Locking belongs to the dispatcher, which guards the queue
//! together with its scheduling decisions.

use std::collections::VecDeque;

use wirecall_common::Call;

use crate::client::AsyncCallback;

/// A pending asynchronous call plus its (optional) completion callback.
pub(crate) struct QueuedCall {
    pub call: Call,
    pub callback: Option<Box<dyn AsyncCallback>>,
}

#[derive(Default)]
pub(crate) struct CallQueue {
    entries: VecDeque<QueuedCall>,
}

impl CallQueue {
    pub(crate) fn push(&mut self, queued: QueuedCall) {
        self.entries.push_back(queued);
    }

    /// Puts a call back at the head after a failed hand-off, preserving
    /// FIFO order.
    pub(crate) fn push_front(&mut self, queued: QueuedCall) {
        self.entries.push_front(queued);
    }

    pub(crate) fn pop(&mut self) -> Option<QueuedCall> {
        self.entries.pop_front()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
