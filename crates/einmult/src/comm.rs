//! Thread communicator for cooperative contraction work.
//!
//! A contraction call spawns a fixed pool of scoped threads; every thread
//! runs the same code path and coordinates through a [`Communicator`]:
//! barriers, master-to-all broadcast, deterministic range partitioning, and
//! gang creation (splitting the pool into independent sub-communicators that
//! each own a slice of an outer batch loop).
//!
//! Work distribution is deterministic: a range of `n` items over `p` ranks
//! is split evenly with the remainder going to the lowest-indexed ranks, so
//! results do not depend on scheduling.

use std::any::Any;
use std::ops::{Add, Range};
use std::sync::{Arc, Barrier, Mutex};

struct Shared {
    barrier: Barrier,
    slot: Mutex<Option<Arc<dyn Any + Send + Sync>>>,
}

impl Shared {
    fn new(nthreads: usize) -> Self {
        Self {
            barrier: Barrier::new(nthreads),
            slot: Mutex::new(None),
        }
    }
}

/// Handle through which one thread of a gang coordinates with its peers.
#[derive(Clone)]
pub struct Communicator {
    rank: usize,
    size: usize,
    gang_id: usize,
    n_gangs: usize,
    shared: Arc<Shared>,
}

/// Run `f` once on each of `num_threads` scoped threads.
///
/// Rank 0 runs on the calling thread. Returns after every thread has
/// finished, so all writes made by the workers are visible to the caller.
pub(crate) fn run<F>(num_threads: usize, f: F)
where
    F: Fn(&Communicator) + Sync,
{
    let size = num_threads.max(1);
    if size == 1 {
        f(&Communicator::single());
        return;
    }
    let shared = Arc::new(Shared::new(size));
    std::thread::scope(|scope| {
        for rank in 1..size {
            let comm = Communicator {
                rank,
                size,
                gang_id: 0,
                n_gangs: 1,
                shared: Arc::clone(&shared),
            };
            let f = &f;
            scope.spawn(move || f(&comm));
        }
        let comm = Communicator {
            rank: 0,
            size,
            gang_id: 0,
            n_gangs: 1,
            shared,
        };
        f(&comm);
    });
}

/// Split `n` items over `nparts` parts: even shares, remainder to the
/// lowest-indexed parts.
fn split_range(n: usize, nparts: usize, part: usize) -> Range<usize> {
    let base = n / nparts;
    let rem = n % nparts;
    let start = part * base + part.min(rem);
    let len = base + usize::from(part < rem);
    start..start + len
}

/// Factor `nthreads` into a 2-D grid `(pm, pn)` with `pm * pn == nthreads`,
/// balancing the per-thread tile aspect against the work shape `(m, n)`.
pub(crate) fn partition_2x2(nthreads: usize, m: usize, n: usize) -> (usize, usize) {
    if nthreads <= 1 {
        return (1, 1);
    }
    if m == 0 {
        return (1, nthreads);
    }
    if n == 0 {
        return (nthreads, 1);
    }
    let mut best = (1, nthreads);
    let mut best_score = f64::INFINITY;
    for pm in 1..=nthreads {
        if nthreads % pm != 0 {
            continue;
        }
        let pn = nthreads / pm;
        let score = (m as f64 / pm as f64 - n as f64 / pn as f64).abs();
        if score < best_score {
            best_score = score;
            best = (pm, pn);
        }
    }
    best
}

impl Communicator {
    /// A communicator covering a single thread.
    pub(crate) fn single() -> Self {
        Self {
            rank: 0,
            size: 1,
            gang_id: 0,
            n_gangs: 1,
            shared: Arc::new(Shared::new(1)),
        }
    }

    /// This thread's rank within the gang.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Number of threads in the gang.
    pub fn num_threads(&self) -> usize {
        self.size
    }

    /// Whether this thread is the gang master (rank 0).
    pub fn master(&self) -> bool {
        self.rank == 0
    }

    /// Index of this gang among its siblings.
    pub fn gang_id(&self) -> usize {
        self.gang_id
    }

    /// Number of sibling gangs.
    pub fn num_gangs(&self) -> usize {
        self.n_gangs
    }

    /// Wait until every thread in the gang has arrived.
    pub fn barrier(&self) {
        if self.size > 1 {
            self.shared.barrier.wait();
        }
    }

    /// The master evaluates `f`; every thread receives the resulting value.
    ///
    /// Collective: all threads of the gang must call this.
    pub fn broadcast<T, F>(&self, f: F) -> Arc<T>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> T,
    {
        if self.size == 1 {
            return Arc::new(f());
        }
        if self.master() {
            let value = Arc::new(f());
            *self.shared.slot.lock().expect("lock poisoned") = Some(value.clone());
            self.barrier();
            self.barrier();
            *self.shared.slot.lock().expect("lock poisoned") = None;
            value
        } else {
            self.barrier();
            let any = self
                .shared
                .slot
                .lock()
                .expect("lock poisoned")
                .clone()
                .expect("master published a value");
            let value = any.downcast::<T>().expect("broadcast type agreed upon");
            self.barrier();
            value
        }
    }

    /// Sum a per-thread value over the gang; every thread gets the total.
    ///
    /// Collective. The summation order is fixed by rank, so the result is
    /// bit-identical across runs with the same thread count.
    pub fn allreduce_sum<T>(&self, value: T) -> T
    where
        T: Copy + Default + Send + Sync + 'static + Add<Output = T>,
    {
        if self.size == 1 {
            return value;
        }
        let buf: Arc<Vec<Mutex<T>>> =
            self.broadcast(|| (0..self.size).map(|_| Mutex::new(T::default())).collect());
        *buf[self.rank].lock().expect("lock poisoned") = value;
        self.barrier();
        let mut acc = T::default();
        for slot in buf.iter() {
            acc = acc + *slot.lock().expect("lock poisoned");
        }
        self.barrier();
        acc
    }

    /// This thread's share of `0..n`.
    pub fn distribute_over_threads(&self, n: usize) -> Range<usize> {
        split_range(n, self.size, self.rank)
    }

    /// This thread's 2-D share of `0..m` x `0..n` over a balanced grid.
    pub fn distribute_over_threads_2d(&self, m: usize, n: usize) -> (Range<usize>, Range<usize>) {
        let (pm, pn) = partition_2x2(self.size, m, n);
        debug_assert_eq!(pm * pn, self.size);
        let im = self.rank % pm;
        let in_ = self.rank / pm;
        (split_range(m, pm, im), split_range(n, pn, in_))
    }

    /// This gang's share of `0..n` among its sibling gangs.
    pub fn distribute_over_gangs(&self, n: usize) -> Range<usize> {
        split_range(n, self.n_gangs, self.gang_id)
    }

    /// Split the gang into `n_gangs` sub-gangs of contiguous ranks.
    ///
    /// Collective. Threads split evenly; when `n_gangs` does not divide the
    /// gang size, the lowest-indexed gangs get one extra thread. Returns the
    /// sub-communicator this thread belongs to.
    pub fn gang(&self, n_gangs: usize) -> Communicator {
        let n_gangs = n_gangs.clamp(1, self.size);
        if n_gangs == 1 {
            let mut sub = self.clone();
            sub.gang_id = 0;
            sub.n_gangs = 1;
            return sub;
        }
        let mut gang_id = 0;
        let mut sub_rank = 0;
        let mut sub_size = 1;
        for g in 0..n_gangs {
            let r = split_range(self.size, n_gangs, g);
            if r.contains(&self.rank) {
                gang_id = g;
                sub_rank = self.rank - r.start;
                sub_size = r.len();
                break;
            }
        }
        let shareds: Arc<Vec<Arc<Shared>>> = self.broadcast(|| {
            (0..n_gangs)
                .map(|g| Arc::new(Shared::new(split_range(self.size, n_gangs, g).len())))
                .collect()
        });
        Communicator {
            rank: sub_rank,
            size: sub_size,
            gang_id,
            n_gangs,
            shared: Arc::clone(&shareds[gang_id]),
        }
    }
}
