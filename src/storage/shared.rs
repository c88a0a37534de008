#![forbid(unsafe_code)]

//! Single-writer handle for sharing one [`Graph`] between threads.
//!
//! The engine has no internal locking, so every operation goes through one
//! mutex. There is no reader concurrency.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use super::graph::Graph;
use crate::types::{GraphError, Result};

/// Cloneable handle serializing access to a graph.
#[derive(Clone)]
pub struct SharedGraph {
    inner: Arc<Mutex<Graph>>,
}

impl SharedGraph {
    /// Wraps an open graph.
    pub fn new(graph: Graph) -> Self {
        Self {
            inner: Arc::new(Mutex::new(graph)),
        }
    }

    /// Runs `f` with exclusive access to the graph.
    pub fn with<T>(&self, f: impl FnOnce(&mut Graph) -> Result<T>) -> Result<T> {
        let mut guard = self.inner.lock();
        f(&mut guard)
    }

    /// Locks the graph until the guard is dropped.
    pub fn lock(&self) -> MutexGuard<'_, Graph> {
        self.inner.lock()
    }

    /// Closes the graph. Fails while other handles are alive.
    pub fn close(self) -> Result<()> {
        match Arc::try_unwrap(self.inner) {
            Ok(mutex) => mutex.into_inner().close(),
            Err(_) => Err(GraphError::InvalidArgument(
                "graph is still shared by other handles".into(),
            )),
        }
    }
}
