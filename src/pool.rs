/*!
 * Bounded worker pool shared by the directory, URL and pane collectors
 *
 * Workers are dedicated threads pulling from one shared queue. Results are
 * sent on a channel buffered to the number of queued items, so a worker never
 * blocks on a slow reader and results arrive in completion order.
 */

use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use tracing::{error, warn};

/// Per-worker state handed to the work function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerContext {
    /// Index of this worker, `0..pool_size`
    pub index: usize,
    /// Number of workers actually started
    pub pool_size: usize,
    /// Items this worker has already processed
    pub completed: usize,
}

/// Fixed-size pool configuration
#[derive(Debug, Clone)]
pub struct WorkerPool {
    name: String,
    size: usize,
}

impl WorkerPool {
    /// Create a pool with at most `size` workers (at least one)
    pub fn new(name: impl Into<String>, size: usize) -> Self {
        Self {
            name: name.into(),
            size: size.max(1),
        }
    }

    /// Process `items` on up to `size` workers.
    ///
    /// `work` returns `None` for items that produced nothing (failures are
    /// expected to be reported by the work function itself). The returned
    /// handle yields results as they complete.
    pub fn run<T, R, F>(&self, items: Vec<T>, work: F) -> PoolHandle<R>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(&mut WorkerContext, T) -> Option<R> + Send + Sync + 'static,
    {
        let (tx, rx) = mpsc::sync_channel(items.len().max(1));
        let pool_size = self.size.min(items.len());
        let queue = Arc::new(Mutex::new(VecDeque::from(items)));
        let work = Arc::new(work);

        let mut workers = Vec::with_capacity(pool_size);
        for index in 0..pool_size {
            let queue = Arc::clone(&queue);
            let work = Arc::clone(&work);
            let tx = tx.clone();
            let ctx = WorkerContext {
                index,
                pool_size,
                completed: 0,
            };

            let spawned = thread::Builder::new()
                .name(format!("{}-{}", self.name, index))
                .spawn(move || drain(ctx, &queue, work.as_ref(), &tx));

            match spawned {
                Ok(handle) => workers.push(handle),
                Err(err) => warn!(pool = %self.name, error = %err, "failed to spawn worker"),
            }
        }

        // Nothing could be spawned: do the work here rather than drop it
        if workers.is_empty() && pool_size > 0 {
            let ctx = WorkerContext {
                index: 0,
                pool_size: 1,
                completed: 0,
            };
            drain(ctx, &queue, work.as_ref(), &tx);
        }

        PoolHandle {
            name: self.name.clone(),
            results: rx,
            workers,
        }
    }
}

fn drain<T, R, F>(
    mut ctx: WorkerContext,
    queue: &Mutex<VecDeque<T>>,
    work: &F,
    tx: &SyncSender<R>,
) where
    F: Fn(&mut WorkerContext, T) -> Option<R>,
{
    loop {
        let next = match queue.lock() {
            Ok(mut guard) => guard.pop_front(),
            Err(poisoned) => poisoned.into_inner().pop_front(),
        };
        let Some(item) = next else {
            break;
        };

        let result = work(&mut ctx, item);
        ctx.completed += 1;

        if let Some(result) = result {
            if tx.send(result).is_err() {
                // Receiver dropped; nobody wants the rest
                break;
            }
        }
    }
}

/// Running pool; yields results in completion order
pub struct PoolHandle<R> {
    name: String,
    results: Receiver<R>,
    workers: Vec<JoinHandle<()>>,
}

impl<R> PoolHandle<R> {
    /// Iterate over results as they arrive
    pub fn iter(&self) -> mpsc::Iter<'_, R> {
        self.results.iter()
    }

    /// Drain every remaining result and wait for the workers
    pub fn collect_all(self) -> Vec<R> {
        let results: Vec<R> = self.results.iter().collect();
        for worker in self.workers {
            if worker.join().is_err() {
                error!(pool = %self.name, "worker panicked");
            }
        }
        results
    }
}
