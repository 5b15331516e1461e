//! Deferred operation queue

use std::cell::RefCell;

/// A buffer of pending operations applied only at a phase boundary.
///
/// Pushing is always allowed, including from inside a callback running
/// while the queue is being drained: `take` swaps the whole batch out
/// first, so ops pushed during the drain land in the next batch.
pub(crate) struct OpQueue<T> {
    ops: RefCell<Vec<T>>,
}

impl<T> OpQueue<T> {
    pub(crate) fn new() -> Self {
        Self {
            ops: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn push(&self, op: T) {
        self.ops.borrow_mut().push(op);
    }

    /// Takes the current batch, leaving the queue empty.
    pub(crate) fn take(&self) -> Vec<T> {
        self.ops.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_drains_in_push_order() {
        let queue = OpQueue::new();
        queue.push(1);
        queue.push(2);
        queue.push(3);
        assert_eq!(queue.take(), vec![1, 2, 3]);
        assert!(queue.take().is_empty());
    }

    #[test]
    fn test_push_during_drain_lands_in_next_batch() {
        let queue = OpQueue::new();
        queue.push(1);
        let batch = queue.take();
        for _ in batch {
            queue.push(2);
        }
        assert_eq!(queue.take(), vec![2]);
    }
}
