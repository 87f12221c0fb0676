//! A completion-order queue of asynchronous tasks (§4.1).
//!
//! `put` enqueues an awaitable; `get` resolves whichever registered task
//! finishes *first*, regardless of enqueue order; `cancel` aborts every
//! still-pending task and awaits their settlement.
//!
//! Realized on top of `tokio::task::LocalSet::spawn_local` (the instance
//! method, which queues work on the set directly and does not itself
//! require an entered `LocalSet` context — only the free-standing
//! `tokio::task::spawn_local` does) plus an unbounded `mpsc` channel that
//! each spawned task's wrapper pushes its result into on completion. This
//! is the same completion-channel-keyed-by-task-handle shape as the design
//! note in §9 recommends, and mirrors how `tokio::task::JoinSet` is used
//! elsewhere in the grounding codebase for bulk-cancellable work pools —
//! we hand-roll the channel instead of reaching for `JoinSet` itself
//! because our tasks are `!Send` (they close over `Rc`-based element
//! state) and drive one render per task, so a plain join handle per task is
//! simpler to cancel individually than coordinating through `JoinSet`'s
//! `!Send` spawn surface.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;

use tokio::sync::mpsc;
use tokio::task::{JoinHandle, LocalSet};

use crate::error::{LayoutError, Result};

/// A completion-order queue of `!Send` tasks, all driven on the `LocalSet`
/// supplied at construction (shared with the owning `Layout`).
pub struct FutureQueue<T: 'static> {
    local: Rc<LocalSet>,
    sender: mpsc::UnboundedSender<T>,
    receiver: RefCell<mpsc::UnboundedReceiver<T>>,
    handles: RefCell<Vec<JoinHandle<()>>>,
    closed: Cell<bool>,
}

impl<T: 'static> FutureQueue<T> {
    /// Create a new, empty queue driven by `local`.
    pub fn new(local: Rc<LocalSet>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            local,
            sender,
            receiver: RefCell::new(receiver),
            handles: RefCell::new(Vec::new()),
            closed: Cell::new(false),
        }
    }

    /// Register `task`; returns immediately without awaiting it.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::TornDown`] if called after [`cancel`](Self::cancel).
    pub fn put(&self, task: impl Future<Output = T> + 'static) -> Result<()> {
        if self.closed.get() {
            return Err(LayoutError::TornDown);
        }

        let sender = self.sender.clone();
        // Pre-register the completion hook by constructing it as part of
        // the spawned future itself, so there is no window between "task
        // finishes" and "hook attached" (§4.1 concurrency note) — the send
        // happens as the very last step of the very future that computes
        // the result.
        let handle = self.local.spawn_local(async move {
            let value = task.await;
            // The receiver may already be gone (queue cancelled concurrently
            // with this task's completion); dropping the value is correct
            // in that case, not a bug.
            let _ = sender.send(value);
        });
        self.handles.borrow_mut().push(handle);
        Ok(())
    }

    /// Suspend until any registered task completes, then return its result.
    ///
    /// Exactly one completion is consumed per call. Ordering of `put` calls
    /// is not preserved — whichever task finishes first is returned first.
    pub async fn get(&self) -> T {
        let mut receiver = self.receiver.borrow_mut();
        receiver
            .recv()
            .await
            .expect("FutureQueue sender dropped while queue is still in use")
    }

    /// Number of tasks put but not yet consumed via `get` or settled via
    /// `cancel`. Exposed for tests and for a host's own backpressure
    /// decisions; not used internally for correctness.
    pub fn pending_count(&self) -> usize {
        self.handles.borrow().len()
    }

    /// Request cancellation of every still-pending task and await their
    /// settlement (in any terminal state). After this, `put` fails.
    pub async fn cancel(&self) {
        self.closed.set(true);
        let handles: Vec<_> = std::mem::take(&mut *self.handles.borrow_mut());
        for handle in &handles {
            handle.abort();
        }
        for handle in handles {
            // Awaiting an aborted handle resolves (to a cancelled JoinError)
            // rather than hanging; we don't otherwise care about the
            // result here, only that the task has settled.
            let _ = handle.await;
        }
    }
}
