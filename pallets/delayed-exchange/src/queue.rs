//! FIFO order counters.
//!
//! Ids are assigned densely from 1. An id `n` is queued while
//! `last_processed_order_id < n <= newest_order_id` and processed once the processed
//! counter has passed it. Only the oldest queued id may leave the queue.

use codec::{Decode, DecodeWithMemTracking, Encode, MaxEncodedLen};
use scale_info::TypeInfo;

pub type OrderId = u64;

#[derive(
  Clone,
  Copy,
  Debug,
  Default,
  Decode,
  DecodeWithMemTracking,
  Encode,
  Eq,
  PartialEq,
  TypeInfo,
  MaxEncodedLen,
)]
pub struct OrderQueue {
  pub newest_order_id: OrderId,
  pub last_processed_order_id: OrderId,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum QueueError {
  IdOverflow,
  OutOfSequence,
}

impl OrderQueue {
  /// Reserves the next id.
  pub fn enqueue(&mut self) -> Result<OrderId, QueueError> {
    let id = self
      .newest_order_id
      .checked_add(1)
      .ok_or(QueueError::IdOverflow)?;
    self.newest_order_id = id;
    Ok(id)
  }

  pub fn next_due(&self) -> Option<OrderId> {
    (self.last_processed_order_id < self.newest_order_id)
      .then(|| self.last_processed_order_id.saturating_add(1))
  }

  /// Marks `order_id` processed. It must be the next due id.
  pub fn advance(&mut self, order_id: OrderId) -> Result<(), QueueError> {
    if self.next_due() != Some(order_id) {
      return Err(QueueError::OutOfSequence);
    }
    self.last_processed_order_id = order_id;
    Ok(())
  }

  pub fn is_queued(&self, order_id: OrderId) -> bool {
    order_id > self.last_processed_order_id && order_id <= self.newest_order_id
  }

  pub fn is_processed(&self, order_id: OrderId) -> bool {
    order_id != 0 && order_id <= self.last_processed_order_id
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ids_start_at_one_and_increase() {
    let mut q = OrderQueue::default();
    assert_eq!(q.next_due(), None);
    assert_eq!(q.enqueue(), Ok(1));
    assert_eq!(q.enqueue(), Ok(2));
    assert_eq!(q.newest_order_id, 2);
    assert_eq!(q.last_processed_order_id, 0);
    assert_eq!(q.next_due(), Some(1));
    assert!(q.is_queued(2));
  }

  #[test]
  fn advance_is_strictly_sequential() {
    let mut q = OrderQueue::default();
    q.enqueue().unwrap();
    q.enqueue().unwrap();

    assert_eq!(q.advance(2), Err(QueueError::OutOfSequence));
    assert_eq!(q.advance(1), Ok(()));
    assert_eq!(q.advance(1), Err(QueueError::OutOfSequence));
    assert_eq!(q.advance(2), Ok(()));
    assert_eq!(q.advance(3), Err(QueueError::OutOfSequence));
    assert_eq!(q.next_due(), None);
  }

  #[test]
  fn counters_never_cross() {
    let mut q = OrderQueue::default();
    for round in 0..50u64 {
      if round % 3 == 0 {
        if let Some(id) = q.next_due() {
          let before = q.last_processed_order_id;
          q.advance(id).unwrap();
          assert_eq!(q.last_processed_order_id, before + 1);
        }
      } else {
        let before = q.newest_order_id;
        q.enqueue().unwrap();
        assert_eq!(q.newest_order_id, before + 1);
      }
      assert!(q.last_processed_order_id <= q.newest_order_id);
    }
  }

  #[test]
  fn membership() {
    let mut q = OrderQueue::default();
    q.enqueue().unwrap();
    q.enqueue().unwrap();
    q.advance(1).unwrap();

    assert!(q.is_processed(1));
    assert!(!q.is_queued(1));
    assert!(q.is_queued(2));
    assert!(!q.is_processed(2));
    assert!(!q.is_processed(0));
    assert!(!q.is_queued(3));
  }

  #[test]
  fn id_overflow_is_an_error() {
    let mut q = OrderQueue {
      newest_order_id: OrderId::MAX,
      last_processed_order_id: OrderId::MAX,
    };
    assert_eq!(q.enqueue(), Err(QueueError::IdOverflow));
    assert_eq!(q.newest_order_id, OrderId::MAX);
  }
}
