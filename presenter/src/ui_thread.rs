use std::fmt;

use async_channel::{Receiver, Sender, unbounded};
use log::warn;

/// A unit of work that must run on the UI thread.
pub type UiTask = Box<dyn FnOnce() + Send + 'static>;

/// Marshals work onto the host's UI thread.
pub trait UiThread: Send + Sync {
    /// Schedule `task` to run on the UI thread.
    fn run_on_ui_thread(&self, task: UiTask);
}

/// Runs tasks immediately on the calling thread.
///
/// Only correct when every caller already is the UI thread, as in a
/// single-threaded simulator.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineUiThread;

impl UiThread for InlineUiThread {
    fn run_on_ui_thread(&self, task: UiTask) {
        task();
    }
}

/// Queues tasks until the UI thread drains them.
///
/// An optional waker is invoked after each post so the host can schedule a
/// drain on its UI loop.
pub struct QueuedUiThread {
    sender: Sender<UiTask>,
    receiver: Receiver<UiTask>,
    waker: Option<Box<dyn Fn() + Send + Sync>>,
}

impl fmt::Debug for QueuedUiThread {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueuedUiThread")
            .field("pending", &self.pending())
            .field("has_waker", &self.waker.is_some())
            .finish()
    }
}

impl Default for QueuedUiThread {
    fn default() -> Self {
        Self::new()
    }
}

impl QueuedUiThread {
    /// Creates a queue without a waker.
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self {
            sender,
            receiver,
            waker: None,
        }
    }

    /// Creates a queue that calls `waker` whenever a task is posted.
    #[must_use]
    pub fn with_waker(waker: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            waker: Some(Box::new(waker)),
            ..Self::new()
        }
    }

    /// Number of tasks waiting to run.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    /// Run every queued task. Call this from the UI thread.
    ///
    /// Returns the number of tasks run.
    pub fn drain(&self) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.receiver.try_recv() {
            task();
            ran += 1;
        }
        ran
    }
}

impl UiThread for QueuedUiThread {
    fn run_on_ui_thread(&self, task: UiTask) {
        if let Err(err) = self.sender.try_send(task) {
            warn!("dropping UI task: {err}");
            return;
        }
        if let Some(waker) = &self.waker {
            waker();
        }
    }
}
