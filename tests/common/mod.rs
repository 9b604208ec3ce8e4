//! Common test utilities for integration tests.

#![allow(dead_code)]

pub mod harness;

use pipeline_node_editor::executor::{ExecutionCallbacks, ExecutionEngine, ExecutionOutcome};
use pipeline_node_editor::{GraphStore, NodeId, NodeStatus};
use std::cell::RefCell;
use std::rc::Rc;

/// Install the test logger once; later calls are no-ops.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Records callback invocations for assertions.
#[derive(Default, Clone)]
pub struct CallbackTracker {
    /// (model, output)
    pub model_job_complete: Rc<RefCell<Vec<(NodeId, NodeId)>>>,
}

impl CallbackTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&self) {
        self.model_job_complete.borrow_mut().clear();
    }

    /// Callbacks that record into this tracker.
    pub fn callbacks(&self) -> ExecutionCallbacks {
        let calls = self.model_job_complete.clone();
        ExecutionCallbacks {
            on_model_job_complete: Some(Box::new(move |model, output| {
                calls.borrow_mut().push((model.clone(), output.clone()));
            })),
        }
    }
}

/// Execution engine that "runs" every model node instantly.
///
/// A model with an unconnected image input fails with an error status.
#[derive(Default)]
pub struct InstantEngine {
    callbacks: ExecutionCallbacks,
    pub cancelled: bool,
}

impl ExecutionEngine for InstantEngine {
    fn execute(&mut self, store: &mut GraphStore) -> ExecutionOutcome {
        let models: Vec<NodeId> = store
            .nodes()
            .values()
            .filter(|n| n.kind.is_model())
            .map(|n| n.id.clone())
            .collect();
        let mut failed = None;
        for model in models {
            let fed = store.edges().values().any(|e| e.target == model && e.target_port == "image");
            if !fed {
                store.set_node_status(&model, NodeStatus::Error, Some("missing image input".into()));
                failed = Some(format!("{model} has no image input"));
                continue;
            }
            store.set_node_status(&model, NodeStatus::Complete, None);
            let outputs: Vec<NodeId> = store
                .edges()
                .values()
                .filter(|e| e.source == model)
                .map(|e| e.target.clone())
                .collect();
            for output in outputs {
                self.callbacks.model_job_complete(&model, &output);
            }
        }
        match failed {
            Some(error) => ExecutionOutcome::failed(error),
            None => ExecutionOutcome::ok(),
        }
    }

    fn cancel(&mut self) {
        self.cancelled = true;
    }

    fn set_callbacks(&mut self, callbacks: ExecutionCallbacks) {
        self.callbacks = callbacks;
    }
}
