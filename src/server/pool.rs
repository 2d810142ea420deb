//! # Pool de Workers
//! src/server/pool.rs
//!
//! Número fijo de threads que consumen tareas de una cola acotada.
//! Cuando la cola está llena `execute` bloquea al que encola (el thread
//! de accept), así las conexiones nuevas esperan en el backlog del
//! sistema operativo hasta que se libere un worker.
//!
//! ```text
//! acceptor ──execute──▶ [cola acotada] ──▶ worker-0 .. worker-N
//! ```

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use tracing::{debug, error};

/// Trabajo que ejecuta un worker
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// El pool ya fue cerrado
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolClosed;

impl std::fmt::Display for PoolClosed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "worker pool is shut down")
    }
}

impl std::error::Error for PoolClosed {}

struct State {
    jobs: VecDeque<Job>,
    shutdown: bool,
}

struct Shared {
    state: Mutex<State>,

    /// Se notifica cuando entra un job o se cierra el pool
    job_ready: Condvar,

    /// Se notifica cuando un worker saca un job de la cola
    slot_free: Condvar,

    capacity: usize,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        // Los jobs corren fuera del lock; el estado sigue siendo consistente
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Pool de threads de tamaño fijo
pub struct WorkerPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Arranca `size` workers con una cola de `queue_capacity` jobs pendientes
    pub fn new(size: usize, queue_capacity: usize) -> std::io::Result<Self> {
        let shared = Arc::new(Shared {
            state: Mutex::new(State {
                jobs: VecDeque::with_capacity(queue_capacity),
                shutdown: false,
            }),
            job_ready: Condvar::new(),
            slot_free: Condvar::new(),
            capacity: queue_capacity.max(1),
        });

        let mut workers = Vec::with_capacity(size);
        for i in 0..size {
            let shared = Arc::clone(&shared);
            let handle = thread::Builder::new()
                .name(format!("worker-{}", i))
                .spawn(move || Self::worker_loop(&shared))?;
            workers.push(handle);
        }

        Ok(Self { shared, workers })
    }

    /// Encola un job; bloquea mientras la cola esté llena
    pub fn execute<F>(&self, job: F) -> Result<(), PoolClosed>
    where
        F: FnOnce() + Send + 'static,
    {
        let mut state = self.shared.lock();

        while state.jobs.len() >= self.shared.capacity && !state.shutdown {
            state = self
                .shared
                .slot_free
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }

        if state.shutdown {
            return Err(PoolClosed);
        }

        state.jobs.push_back(Box::new(job));
        self.shared.job_ready.notify_one();
        Ok(())
    }

    /// Cierra el pool sin esperar a los workers
    ///
    /// Los jobs encolados que no empezaron se descartan; los que están
    /// corriendo terminan por su cuenta.
    pub fn shutdown(&self) {
        let dropped = {
            let mut state = self.shared.lock();
            state.shutdown = true;
            std::mem::take(&mut state.jobs)
        };

        if !dropped.is_empty() {
            debug!(count = dropped.len(), "dropping queued jobs");
        }
        drop(dropped);

        self.shared.job_ready.notify_all();
        self.shared.slot_free.notify_all();
    }

    /// Espera a que todos los workers terminen. Útil tras `shutdown`.
    pub fn join(mut self) {
        self.shutdown();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Jobs encolados que todavía no tomó ningún worker
    pub fn pending(&self) -> usize {
        self.shared.lock().jobs.len()
    }

    fn worker_loop(shared: &Shared) {
        loop {
            let job = {
                let mut state = shared.lock();
                loop {
                    if let Some(job) = state.jobs.pop_front() {
                        break job;
                    }
                    if state.shutdown {
                        return;
                    }
                    state = shared
                        .job_ready
                        .wait(state)
                        .unwrap_or_else(PoisonError::into_inner);
                }
            };
            shared.slot_free.notify_one();

            // Un panic no debe matar al worker
            if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                error!("job panicked; worker keeps running");
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}
