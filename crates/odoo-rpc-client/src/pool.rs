//! Bounded pool for blocking remote calls

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::warn;

use crate::error::{RpcError, RpcResult};

/// Runs blocking closures off the async runtime, at most `size` at a time.
///
/// Submitting is the only operation: callers await the returned future and
/// get the closure's own result back.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    size: usize,
}

impl WorkerPool {
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            permits: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Workers currently free
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Run `work` on a blocking worker once a slot frees up
    pub async fn submit<F, T>(&self, work: F) -> RpcResult<T>
    where
        F: FnOnce() -> RpcResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|e| RpcError::WorkerPool(e.to_string()))?;

        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            work()
        });

        match handle.await {
            Ok(result) => result,
            Err(join_error) if join_error.is_panic() => {
                warn!("Remote call worker panicked");
                Err(RpcError::WorkerPool("remote call worker panicked".into()))
            }
            Err(join_error) => Err(RpcError::WorkerPool(join_error.to_string())),
        }
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(8)
    }
}
