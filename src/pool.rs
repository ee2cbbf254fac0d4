//! Bounded worker pool for shard tasks
//!
//! The pool is a counting semaphore: a shard task holds one permit while its
//! searcher runs. When every permit is taken, further tasks queue until one is
//! released; nothing is rejected. The pool is shared by all concurrent
//! searches of one coordinator.
//!
//! Shrinking only retires idle permits immediately. Permits that are in use
//! when the pool shrinks are retired as their tasks finish.

use crate::error::FederexError;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::debug;

/// Counting-semaphore worker pool
#[derive(Debug)]
pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
    size: Mutex<usize>,
    shrink_debt: Arc<AtomicUsize>,
}

/// A held slot of the worker pool, released on drop
#[derive(Debug)]
pub struct PoolPermit {
    permit: Option<OwnedSemaphorePermit>,
    shrink_debt: Arc<AtomicUsize>,
}

impl WorkerPool {
    /// Create a pool with `size` permits
    pub fn new(size: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(size)),
            size: Mutex::new(size),
            shrink_debt: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Configured number of permits
    pub fn size(&self) -> usize {
        *self.size.lock()
    }

    /// Permits not currently held by a task
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Wait for a free slot
    pub async fn acquire(&self) -> Result<PoolPermit, FederexError> {
        let permit = Arc::clone(&self.semaphore).acquire_owned().await.map_err(|_| {
            FederexError::concurrency_error(
                "acquire_worker",
                "worker pool is closed",
                "Recreate the coordinator",
            )
        })?;

        Ok(PoolPermit {
            permit: Some(permit),
            shrink_debt: Arc::clone(&self.shrink_debt),
        })
    }

    /// Change the number of permits
    pub fn resize(&self, new_size: usize) {
        let mut size = self.size.lock();
        let old_size = *size;

        if new_size > old_size {
            let wanted = new_size - old_size;
            // Cancel pending retirements before minting new permits
            let mut debt = self.shrink_debt.load(Ordering::SeqCst);
            let paid = loop {
                let paid = debt.min(wanted);
                match self
                    .shrink_debt
                    .compare_exchange(debt, debt - paid, Ordering::SeqCst, Ordering::SeqCst)
                {
                    Ok(_) => break paid,
                    Err(current) => debt = current,
                }
            };
            self.semaphore.add_permits(wanted - paid);
        } else if new_size < old_size {
            let shrink = old_size - new_size;
            let forgotten = self.semaphore.forget_permits(shrink);
            self.shrink_debt.fetch_add(shrink - forgotten, Ordering::SeqCst);
        }

        *size = new_size;
        debug!(old_size, new_size, "Worker pool resized");
    }
}

impl Drop for PoolPermit {
    fn drop(&mut self) {
        if let Some(permit) = self.permit.take() {
            let retire = self
                .shrink_debt
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |debt| debt.checked_sub(1))
                .is_ok();
            if retire {
                permit.forget();
            }
        }
    }
}
