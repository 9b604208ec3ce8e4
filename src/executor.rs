//! Contract with the external execution engine.
//!
//! The engine runs inference and reports progress by writing node status
//! into the store. When a model job finishes it calls
//! `on_model_job_complete(model, output)`; what the UI does about that
//! (show "complete" for a moment, then return to idle and select the output)
//! lives in [`CompletionQueue`], not in the engine.

use crate::graph::NodeStatus;
use crate::id::NodeId;
use crate::store::GraphStore;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Result of one [`ExecutionEngine::execute`] run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecutionOutcome {
    pub success: bool,
    pub error: Option<String>,
}

impl ExecutionOutcome {
    pub fn ok() -> Self {
        Self { success: true, error: None }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self { success: false, error: Some(error.into()) }
    }
}

pub type ModelJobCallback = Box<dyn FnMut(&NodeId, &NodeId)>;

#[derive(Default)]
pub struct ExecutionCallbacks {
    /// Called with `(model node, output node)` when a model job finishes.
    pub on_model_job_complete: Option<ModelJobCallback>,
}

impl ExecutionCallbacks {
    pub fn model_job_complete(&mut self, model: &NodeId, output: &NodeId) {
        if let Some(callback) = self.on_model_job_complete.as_mut() {
            callback(model, output);
        }
    }
}

pub trait ExecutionEngine {
    /// Run the graph. Per-node failures are written to the store as
    /// `NodeStatus::Error` with a message; the outcome summarises the run.
    ///
    /// The store is only borrowed for the duration of the call. An engine
    /// that keeps working afterwards reports progress through
    /// [`ExecutionCallbacks`], and the host applies later status changes
    /// (`GraphStore::set_node_status`) when they arrive.
    fn execute(&mut self, store: &mut GraphStore) -> ExecutionOutcome;

    fn cancel(&mut self);

    fn set_callbacks(&mut self, callbacks: ExecutionCallbacks);
}

#[derive(Debug, Clone)]
struct PendingCompletion {
    model: NodeId,
    output: NodeId,
    /// Set on the first poll after the job reported completion.
    due: Option<Instant>,
}

/// Delayed "job finished" handling shared between the engine callback and
/// the editor's frame tick.
#[derive(Debug, Clone)]
pub struct CompletionQueue {
    delay: Duration,
    pending: Rc<RefCell<Vec<PendingCompletion>>>,
}

impl CompletionQueue {
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: Rc::new(RefCell::new(Vec::new())) }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn len(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }

    pub fn push(&self, model: NodeId, output: NodeId) {
        log::debug!("model {model} finished, output {output}");
        self.pending.borrow_mut().push(PendingCompletion { model, output, due: None });
    }

    /// Callbacks that feed this queue, for [`ExecutionEngine::set_callbacks`].
    pub fn callbacks(&self) -> ExecutionCallbacks {
        let queue = self.clone();
        ExecutionCallbacks {
            on_model_job_complete: Some(Box::new(move |model, output| {
                queue.push(model.clone(), output.clone());
            })),
        }
    }

    /// Settle every completion whose display delay has passed: the model
    /// returns to idle and the output node becomes the selection. Returns
    /// how many were settled.
    pub fn poll(&self, store: &mut GraphStore, now: Instant) -> usize {
        let due: Vec<PendingCompletion> = {
            let mut pending = self.pending.borrow_mut();
            for entry in pending.iter_mut().filter(|e| e.due.is_none()) {
                entry.due = Some(now + self.delay);
            }
            let (ready, waiting): (Vec<_>, Vec<_>) = pending
                .drain(..)
                .partition(|entry| entry.due.is_some_and(|due| now >= due));
            *pending = waiting;
            ready
        };

        for entry in &due {
            store.set_node_status(&entry.model, NodeStatus::Idle, None);
            store.select_node(&entry.output, false);
        }
        due.len()
    }
}
