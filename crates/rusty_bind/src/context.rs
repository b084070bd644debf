//! Context - async runtime owned by the plugin library
//!
//! Host callbacks arrive on host threads that know nothing about async; the
//! context lets them run a future to completion or detach background work.

use std::future::Future;

use contracts::{PluginError, RuntimeConfig};
use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::JoinHandle;
use tracing::debug;

/// Shared async context passed to every plugin callback
#[derive(Debug)]
pub struct Context {
    handle: Handle,
    runtime: Option<Runtime>,
}

impl Context {
    /// Build a multi-threaded runtime
    ///
    /// # Errors
    /// Returns `PluginError::Runtime` if the runtime cannot be created
    pub fn new(config: &RuntimeConfig) -> Result<Self, PluginError> {
        let mut builder = Builder::new_multi_thread();
        builder.enable_all().thread_name("rusty-bind-worker");
        if let Some(threads) = config.worker_threads {
            builder.worker_threads(threads);
        }

        let runtime = builder
            .build()
            .map_err(|e| PluginError::runtime(format!("failed to build tokio runtime: {e}")))?;

        debug!(worker_threads = ?config.worker_threads, "async context created");

        Ok(Self {
            handle: runtime.handle().clone(),
            runtime: Some(runtime),
        })
    }

    /// Run a future to completion on the calling (host) thread
    ///
    /// Must not be called from inside the runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.handle.block_on(future)
    }

    /// Detach a task onto the runtime
    pub fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.handle.spawn(future)
    }

    /// Runtime handle, for code that needs to enter the runtime itself
    pub fn handle(&self) -> &Handle {
        &self.handle
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        // Never block the host thread on outstanding tasks.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    fn context() -> Context {
        Context::new(&RuntimeConfig {
            worker_threads: Some(2),
        })
        .unwrap()
    }

    #[test]
    fn test_block_on_returns_output() {
        let ctx = context();
        let value = ctx.block_on(async {
            tokio::time::sleep(Duration::from_millis(1)).await;
            7
        });
        assert_eq!(value, 7);
    }

    #[test]
    fn test_spawned_task_runs_in_background() {
        let ctx = context();
        let (tx, rx) = mpsc::channel();

        ctx.spawn(async move {
            tx.send(std::thread::current().name().map(str::to_string))
                .unwrap();
        });

        let name = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(name.as_deref(), Some("rusty-bind-worker"));
    }

    #[test]
    fn test_drop_does_not_wait_for_tasks() {
        let ctx = context();
        ctx.spawn(async {
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let started = std::time::Instant::now();
        drop(ctx);
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
