// Copyright 2022, The Android Open Source Project
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The event loop of the Hands-Free coordinator. Indications from the profile
//! transport and user commands are both posted here and run one at a time on
//! the coordinator thread, which is what keeps the slot table consistent.

use log::{error, info, warn};
use tokio::runtime::Builder;
use tokio::sync::{mpsc, oneshot};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub mod core;
pub mod hfp;
pub mod utils;

use crate::hfp::{Coordinator, CoordinatorError, CoordinatorResult, Indication};

/// State of a coordinator event loop. Starts in an idle state.
#[derive(Default, Debug)]
enum CoordinatorRunner {
    /// Not started yet
    #[default]
    NotStarted,
    /// Main event loop is running and callbacks can be processed.
    /// Use [`CoordinatorRunner::send`] to queue a callback.
    Running { tx: mpsc::UnboundedSender<BoxedCoordinatorCallback> },
    /// The event loop has been asked to stop and will stop when all callbacks
    /// in the queue are processed. No further callbacks can be sent.
    Stopping,
    /// The event loop has ended. `result` holds an error if it did not end gracefully.
    Ended { result: Result<(), String> },
}

impl CoordinatorRunner {
    fn send(&self, f: BoxedCoordinatorCallback) -> Result<(), String> {
        match self {
            Self::NotStarted => Err("Not started yet".to_string()),
            Self::Ended { .. } | Self::Stopping => Err("Runner ended".to_string()),
            Self::Running { tx } => tx.send(f).map_err(|_| "Failed to send".to_string()),
        }
    }

    fn start(&mut self) -> Result<mpsc::UnboundedReceiver<BoxedCoordinatorCallback>, String> {
        match self {
            Self::Running { .. } => {
                return Err("Already started".to_string());
            }
            Self::Ended { result } => {
                return Err(format!("Already finished: {result:?}"));
            }
            Self::Stopping => {
                return Err("Can't start, finishing".to_string());
            }
            Self::NotStarted => {}
        };

        let (tx, rx) = mpsc::unbounded_channel();

        *self = Self::Running { tx };
        Ok(rx)
    }

    fn shutdown(&mut self) {
        match std::mem::replace(self, Self::Stopping) {
            Self::NotStarted => {
                warn!("Runner being stopped when it hasn't been started");
                *self = Self::Ended { result: Err("Never started".to_string()) };
            }
            Self::Stopping => {
                warn!("Asked to shutdown twice before stopped");
            }
            ended @ Self::Ended { .. } => *self = ended,
            Self::Running { .. } => {}
        }
    }

    fn finished(&mut self, result: Result<(), String>) -> Result<(), String> {
        match self {
            Self::NotStarted => return Err("Not started".to_string()),
            Self::Ended { result } => return Err(format!("Already finished with {result:?}")),
            Self::Running { .. } | Self::Stopping => {}
        }

        *self = Self::Ended { result };
        Ok(())
    }
}

type BoxedCoordinatorCallback = Box<dyn FnOnce(&mut Coordinator) + Send + 'static>;

/// Shared handle to one coordinator event loop. Clones refer to the same loop.
///
/// The loop itself runs on whichever thread calls [`CoordinatorHandle::run`];
/// every other thread posts work to it.
#[derive(Clone, Debug, Default)]
pub struct CoordinatorHandle {
    runner: Arc<Mutex<CoordinatorRunner>>,
}

impl CoordinatorHandle {
    /// Constructor. The loop is not started.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the event loop on the current thread until [`CoordinatorHandle::stop`]
    /// is called and the queue is drained. `on_started` is invoked once the loop
    /// accepts work.
    ///
    /// A handle can only be run once.
    pub fn run(&self, coordinator: Coordinator, on_started: impl FnOnce()) -> CoordinatorResult {
        info!("starting HFP coordinator");
        let mut rx = self.runner().start().map_err(|reason| {
            error!("Cannot start HFP coordinator: {reason}");
            CoordinatorError::NotRunning
        })?;

        let rt = match Builder::new_current_thread().build() {
            Ok(rt) => rt,
            Err(e) => {
                error!("Failed to start tokio runtime: {e}");
                let _ = self.runner().finished(Err(e.to_string()));
                return Err(CoordinatorError::NotRunning);
            }
        };

        let result = rt.block_on(async move {
            let mut coordinator = coordinator;
            on_started();

            info!("starting event loop");
            while let Some(f) = rx.recv().await {
                f(&mut coordinator);
            }
            Ok(())
        });
        warn!("HFP coordinator has stopped, shutting down executor thread");

        if let Err(e) = self.runner().finished(result) {
            warn!("failed to record runner finish: {e:?}");
        }
        Ok(())
    }

    /// Stops the loop once the callbacks already queued have run.
    pub fn stop(&self) {
        self.runner().shutdown();
    }

    /// Whether work posted now would be run
    pub fn is_running(&self) -> bool {
        matches!(*self.runner(), CoordinatorRunner::Running { .. })
    }

    /// Queues `f` to run on the coordinator thread.
    pub fn post<F>(&self, f: F) -> CoordinatorResult
    where
        F: FnOnce(&mut Coordinator) + Send + 'static,
    {
        self.runner().send(Box::new(f)).map_err(|reason| {
            warn!("Dropping coordinator callback: {reason}");
            CoordinatorError::NotRunning
        })
    }

    /// Queues an indication from the profile transport. Failures are logged on the
    /// coordinator thread; the transport has nobody to report them to.
    pub fn post_indication(&self, indication: Indication) -> CoordinatorResult {
        self.post(move |coordinator| {
            let port = indication.port();
            if let Err(e) = coordinator.handle_indication(indication) {
                warn!("Indication on port {port} failed: {e}");
            }
        })
    }

    /// Runs `f` on the coordinator thread and waits for its result.
    pub async fn call<T, F>(&self, f: F) -> CoordinatorResult<T>
    where
        F: FnOnce(&mut Coordinator) -> T + Send + 'static,
        T: Send + 'static,
    {
        self.request(f)?.await.map_err(|_| CoordinatorError::NotRunning)
    }

    /// Same as [`CoordinatorHandle::call`], for threads outside any runtime.
    pub fn call_blocking<T, F>(&self, f: F) -> CoordinatorResult<T>
    where
        F: FnOnce(&mut Coordinator) -> T + Send + 'static,
        T: Send + 'static,
    {
        self.request(f)?.blocking_recv().map_err(|_| CoordinatorError::NotRunning)
    }

    fn request<T, F>(&self, f: F) -> CoordinatorResult<oneshot::Receiver<T>>
    where
        F: FnOnce(&mut Coordinator) -> T + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        self.post(move |coordinator| {
            // the caller may have stopped waiting
            let _ = tx.send(f(coordinator));
        })?;
        Ok(rx)
    }

    fn runner(&self) -> MutexGuard<'_, CoordinatorRunner> {
        self.runner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
