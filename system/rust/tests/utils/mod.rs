use std::future::Future;
use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use bluetooth_hfp::hfp::mocks::mock_stack::{MockStack, MockStackEvent};
use bluetooth_hfp::hfp::{Coordinator, CoordinatorConfig, CoordinatorResult};
use bluetooth_hfp::CoordinatorHandle;
use tokio::sync::mpsc::UnboundedReceiver;

pub fn start_test(f: impl Future<Output = ()>) {
    tokio_test::block_on(async move {
        bluetooth_hfp::utils::init_logging();
        f.await;
    });
}

/// A coordinator running on its own thread, driven by a mock stack
pub struct TestCoordinator {
    pub handle: CoordinatorHandle,
    pub stack: MockStack,
    pub events: UnboundedReceiver<MockStackEvent>,
    thread: Option<JoinHandle<CoordinatorResult>>,
}

impl TestCoordinator {
    pub fn start(config: CoordinatorConfig) -> Self {
        let (stack, events) = MockStack::new();
        let coordinator = Coordinator::new(
            config,
            Box::new(stack.clone()),
            Box::new(stack.clone()),
            Box::new(stack.clone()),
        );

        let handle = CoordinatorHandle::new();
        let runner = handle.clone();
        let (started_tx, started_rx) = mpsc::channel();
        let thread = thread::spawn(move || {
            runner.run(coordinator, move || started_tx.send(()).unwrap())
        });
        started_rx.recv().unwrap();

        Self { handle, stack, events, thread: Some(thread) }
    }

    /// Stops the loop and waits for the coordinator thread
    pub fn stop(&mut self) -> CoordinatorResult {
        self.handle.stop();
        self.thread.take().map_or(Ok(()), |thread| thread.join().unwrap())
    }
}
