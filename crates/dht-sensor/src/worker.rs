//! Background reads.
//!
//! A background read is queued on the Tokio runtime, waits for one of the
//! `max_workers` permits, then runs the same initialize-and-read sequence as a
//! blocking read on the blocking thread pool. The caller either awaits the
//! returned [`ReadHandle`] or hands over a completion callback.
//!
//! Both entry points must be called from within a Tokio runtime.

use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use dht_hardware::SensorDriver;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error};

use crate::{
    Result,
    error::ReadError,
    service::{Readout, SensorService},
};

/// Awaitable result of a background read.
///
/// Dropping the handle does not cancel the read; it still runs and updates
/// the cache.
#[derive(Debug)]
pub struct ReadHandle {
    task: JoinHandle<Result<Result<Readout>>>,
}

impl Future for ReadHandle {
    type Output = Result<Readout>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.task).poll(cx).map(|joined| {
            joined
                .unwrap_or_else(|e| Err(join_failure(e)))
                .and_then(|read| read)
        })
    }
}

fn join_failure(error: JoinError) -> ReadError {
    if error.is_panic() {
        error!("Background read panicked");
        ReadError::worker_failed("read worker panicked")
    } else {
        ReadError::worker_failed("read worker was cancelled")
    }
}

/// What a completion handler is called with.
type Completion = (Option<ReadError>, f32, f32);

impl<D: SensorDriver> SensorService<D> {
    /// Queue a read of `sensor_type` on `pin` and return without blocking.
    ///
    /// The handle resolves to the same result a blocking [`read`] would
    /// produce. Settings are sampled when the read starts executing.
    ///
    /// [`read`]: SensorService::read
    pub fn read_async(&self, sensor_type: u8, pin: u8) -> ReadHandle {
        let task = self.spawn_worker(move |service| service.read(sensor_type, pin));
        ReadHandle { task }
    }

    /// Queue a read and deliver its result to `handler`.
    ///
    /// The handler receives `(error, temperature, humidity)`:
    ///
    /// - success: no error and the fresh values
    /// - exhausted retries: `ReadError::ReadFailed` and the best-effort values
    /// - failed bring-up: the error and the values cached for `pin`
    /// - invalid arguments or a failed worker: the error and `0.0` for both
    ///   values
    ///
    /// The returned task completes after the handler has run.
    pub fn read_with_callback<F>(&self, sensor_type: u8, pin: u8, handler: F) -> JoinHandle<()>
    where
        F: FnOnce(Option<ReadError>, f32, f32) + Send + 'static,
    {
        let task = self.spawn_worker(move |service| service.complete(sensor_type, pin));

        tokio::spawn(async move {
            let (error, temperature, humidity) = match task.await {
                Ok(Ok(completion)) => completion,
                Ok(Err(e)) => (Some(e), 0.0, 0.0),
                Err(e) => (Some(join_failure(e)), 0.0, 0.0),
            };
            handler(error, temperature, humidity);
        })
    }

    /// Run `work` on the blocking pool once a worker permit is free.
    fn spawn_worker<T, F>(&self, work: F) -> JoinHandle<Result<T>>
    where
        T: Send + 'static,
        F: FnOnce(SensorService<D>) -> T + Send + 'static,
    {
        let service = self.clone();

        tokio::spawn(async move {
            let workers = Arc::clone(&service.shared.workers);
            let _permit = workers
                .acquire_owned()
                .await
                .map_err(|_| ReadError::worker_failed("worker pool closed"))?;

            debug!("Background read started");
            tokio::task::spawn_blocking(move || work(service))
                .await
                .map_err(join_failure)
        })
    }

    /// Blocking read mapped onto the handler's arguments.
    fn complete(&self, sensor_type: u8, pin: u8) -> Completion {
        match self.read(sensor_type, pin) {
            Ok(readout) if readout.is_valid => (None, readout.temperature, readout.humidity),
            Ok(readout) => (
                Some(ReadError::ReadFailed {
                    attempts: readout.error_count,
                }),
                readout.temperature,
                readout.humidity,
            ),
            Err(e @ ReadError::InitializationFailed { .. }) => {
                let cached = self
                    .last_reading(pin)
                    .map(|entry| entry.reading)
                    .unwrap_or_default();
                (Some(e), cached.temperature, cached.humidity)
            }
            Err(e) => (Some(e), 0.0, 0.0),
        }
    }
}
