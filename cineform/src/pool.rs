// CineForm-rs
// Licensed under either the Apache License, Version 2.0, or the MIT license, at your option.

//! The fixed worker pool: `min(cpu_count, CPU_LIMIT)` workers, created lazily on the first
//! encode/decode call and destroyed at session shutdown, consuming work items from a single
//! MPMC queue. No work item spawns further work items.
//!
//! This is a from-scratch `Arc<Mutex<VecDeque<_>>>` + `Condvar` queue (see `DESIGN.md`).

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;

type Job = Box<dyn FnOnce() + Send + 'static>;

struct Shared {
    queue: Mutex<VecDeque<Job>>,
    not_empty: Condvar,
    shutdown: AtomicBool,
}

/// A fixed-size pool of worker threads draining a shared MPMC queue.
///
/// The submitting thread is always the completion joiner: [`WorkerPool::run_batch`] blocks until
/// every job in the batch has run.
pub struct WorkerPool {
    shared: Arc<Shared>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns `thread_count` workers (minimum 1).
    pub fn new(thread_count: usize) -> Self {
        let thread_count = thread_count.max(1);
        let shared = Arc::new(Shared {
            queue: Mutex::new(VecDeque::new()),
            not_empty: Condvar::new(),
            shutdown: AtomicBool::new(false),
        });

        let handles = (0..thread_count)
            .map(|_| {
                let shared = Arc::clone(&shared);
                std::thread::spawn(move || worker_loop(shared))
            })
            .collect();

        WorkerPool { shared, handles }
    }

    pub fn thread_count(&self) -> usize {
        self.handles.len()
    }

    /// Runs `jobs` to completion. Jobs do not spawn further jobs: each closure must
    /// be a leaf work item (one row group, one band, one channel).
    pub fn run_batch(&self, jobs: Vec<Job>) {
        if jobs.is_empty() {
            return;
        }

        let remaining = Arc::new((Mutex::new(jobs.len()), Condvar::new()));

        {
            let mut queue = self.shared.queue.lock().unwrap();
            for job in jobs {
                let remaining = Arc::clone(&remaining);
                queue.push_back(Box::new(move || {
                    job();
                    let (count, cvar) = &*remaining;
                    let mut count = count.lock().unwrap();
                    *count -= 1;
                    if *count == 0 {
                        cvar.notify_all();
                    }
                }));
            }
        }
        self.shared.not_empty.notify_all();

        let (count, cvar) = &*remaining;
        let mut count = count.lock().unwrap();
        while *count > 0 {
            count = cvar.wait(count).unwrap();
        }
    }

    /// Convenience wrapper: runs `f(item)` for every item in `items`, across the pool, blocking
    /// until all complete. Used for the channel- and band-level parallelism boundaries: channels
    /// run in parallel, while entropy decoding is sequential *within* a band, not across bands.
    pub fn for_each<T, F>(&self, items: Vec<T>, f: F)
    where
        T: Send + 'static,
        F: Fn(T) + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        let jobs: Vec<Job> = items
            .into_iter()
            .map(|item| {
                let f = Arc::clone(&f);
                Box::new(move || f(item)) as Job
            })
            .collect();
        self.run_batch(jobs);
    }
}

fn worker_loop(shared: Arc<Shared>) {
    loop {
        let job = {
            let mut queue = shared.queue.lock().unwrap();
            loop {
                if let Some(job) = queue.pop_front() {
                    break Some(job);
                }
                if shared.shutdown.load(Ordering::Acquire) {
                    break None;
                }
                queue = shared.not_empty.wait(queue).unwrap();
            }
        };

        match job {
            Some(job) => job(),
            None => return,
        }
    }
}

impl Drop for WorkerPool {
    /// Session shutdown cancels by dropping the queue and joining workers; any jobs still queued are simply never run.
    fn drop(&mut self) {
        self.shared.shutdown.store(true, Ordering::Release);
        self.shared.not_empty.notify_all();
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn run_batch_blocks_until_every_job_completes() {
        let pool = WorkerPool::new(4);
        let total = Arc::new(AtomicUsize::new(0));

        let jobs: Vec<Job> = (0..100)
            .map(|_| {
                let total = Arc::clone(&total);
                Box::new(move || {
                    total.fetch_add(1, Ordering::SeqCst);
                }) as Job
            })
            .collect();

        pool.run_batch(jobs);
        assert_eq!(total.load(Ordering::SeqCst), 100);
    }

    #[test]
    fn for_each_processes_every_item() {
        let pool = WorkerPool::new(2);
        let total = Arc::new(AtomicUsize::new(0));
        let items: Vec<usize> = (0..50).collect();

        let total_for_closure = Arc::clone(&total);
        pool.for_each(items, move |i| {
            total_for_closure.fetch_add(i, Ordering::SeqCst);
        });

        assert_eq!(total.load(Ordering::SeqCst), (0..50).sum());
    }

    #[test]
    fn empty_batch_returns_immediately() {
        let pool = WorkerPool::new(2);
        pool.run_batch(Vec::new());
    }

    #[test]
    fn pool_shuts_down_cleanly_on_drop() {
        let pool = WorkerPool::new(3);
        assert_eq!(pool.thread_count(), 3);
        drop(pool);
    }
}
