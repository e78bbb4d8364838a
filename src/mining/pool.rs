//! Transaction pool for pending transfers
//!
//! A plain FIFO queue. Nothing is validated on submission; the mining cycle
//! drains the pool in bounded batches and clears it at the end, so rejected
//! transfers are discarded rather than requeued.

use crate::core::Transaction;
use std::collections::VecDeque;

/// FIFO queue of submitted, not yet committed transfers
#[derive(Debug, Default)]
pub struct TransactionPool {
    queue: VecDeque<Transaction>,
}

impl TransactionPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transfer to the tail
    pub fn submit(&mut self, tx: Transaction) {
        log::debug!("Pool accepted transfer {}", tx);
        self.queue.push_back(tx);
    }

    /// Remove and return up to `max_size` of the oldest entries
    pub fn drain_batch(&mut self, max_size: usize) -> Vec<Transaction> {
        let count = max_size.min(self.queue.len());
        self.queue.drain(..count).collect()
    }

    /// Drop everything still queued
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Pending transfers in submission order
    pub fn pending(&self) -> Vec<Transaction> {
        self.queue.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(n: usize) -> Transaction {
        Transaction::new("seller", &format!("p{}", n), "buyer")
    }

    #[test]
    fn test_pool_fifo_batches() {
        let mut pool = TransactionPool::new();
        for n in 0..5 {
            pool.submit(tx(n));
        }

        assert_eq!(pool.drain_batch(3), vec![tx(0), tx(1), tx(2)]);
        assert_eq!(pool.pending(), vec![tx(3), tx(4)]);
        assert_eq!(pool.drain_batch(3), vec![tx(3), tx(4)]);
        assert!(pool.drain_batch(3).is_empty());
        assert!(pool.is_empty());
    }

    #[test]
    fn test_pool_clear() {
        let mut pool = TransactionPool::new();
        pool.submit(tx(0));
        pool.submit(tx(1));
        pool.clear();
        assert_eq!(pool.len(), 0);
    }
}
